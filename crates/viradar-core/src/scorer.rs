//! Viral-score arithmetic and label classification.
//!
//! The viral score is the views-to-followers ratio rounded to two decimals:
//! a video with 50k views from a 1k-follower account scores 50.0, while a
//! 100k-view video from a 100k-subscriber channel scores 1.0.

use serde::{Deserialize, Serialize};

/// Compute the viral score for a video.
///
/// Returns `0.0` when `followers == 0`. Callers normally floor followers to 1
/// before calling (see [`crate::types::ContentItem`]), so the zero branch is
/// a totality guard rather than a reachable path.
#[must_use]
pub fn viral_score(views: u64, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = views as f64 / followers as f64;
    (ratio * 100.0).round() / 100.0
}

/// Human-readable virality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViralityLabel {
    MegaViral,
    Viral,
    Trending,
    Popular,
    Normal,
}

impl std::fmt::Display for ViralityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViralityLabel::MegaViral => write!(f, "🔥 Mega Viral"),
            ViralityLabel::Viral => write!(f, "⚡ Viral"),
            ViralityLabel::Trending => write!(f, "🚀 Trending"),
            ViralityLabel::Popular => write!(f, "👍 Popular"),
            ViralityLabel::Normal => write!(f, "😐 Normal"),
        }
    }
}

/// Threshold ladder used to bucket a viral score into a [`ViralityLabel`].
///
/// Two ladders exist because platform audiences behave differently: TikTok's
/// recommendation feed routinely pushes content past small followings, so its
/// ladder rewards any score above 1.0, while YouTube search traffic makes a
/// 2x ratio already noteworthy.
///
/// Thresholds are evaluated highest-first; the first match wins, so every
/// score maps to exactly one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreLadder {
    /// ≥10 mega-viral, ≥3 trending, ≥1 popular, else normal.
    Conservative,
    /// ≥10 mega-viral, ≥5 viral, ≥2 trending, else normal.
    Strict,
}

impl ScoreLadder {
    /// Classify a viral score into its tier.
    #[must_use]
    pub fn classify(self, score: f64) -> ViralityLabel {
        match self {
            ScoreLadder::Conservative => {
                if score >= 10.0 {
                    ViralityLabel::MegaViral
                } else if score >= 3.0 {
                    ViralityLabel::Trending
                } else if score >= 1.0 {
                    ViralityLabel::Popular
                } else {
                    ViralityLabel::Normal
                }
            }
            ScoreLadder::Strict => {
                if score >= 10.0 {
                    ViralityLabel::MegaViral
                } else if score >= 5.0 {
                    ViralityLabel::Viral
                } else if score >= 2.0 {
                    ViralityLabel::Trending
                } else {
                    ViralityLabel::Normal
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_followers_returns_zero() {
        assert_eq!(viral_score(50_000, 0), 0.0);
    }

    #[test]
    fn score_is_views_over_followers() {
        assert_eq!(viral_score(50_000, 1_000), 50.0);
        assert_eq!(viral_score(100_000, 100_000), 1.0);
    }

    #[test]
    fn score_rounds_to_two_decimals() {
        // 1000 / 300 = 3.3333... -> 3.33
        assert_eq!(viral_score(1_000, 300), 3.33);
        // 2000 / 300 = 6.6666... -> 6.67
        assert_eq!(viral_score(2_000, 300), 6.67);
    }

    #[test]
    fn zero_views_scores_zero() {
        assert_eq!(viral_score(0, 12_345), 0.0);
    }

    #[test]
    fn conservative_ladder_buckets() {
        let ladder = ScoreLadder::Conservative;
        assert_eq!(ladder.classify(50.0), ViralityLabel::MegaViral);
        assert_eq!(ladder.classify(10.0), ViralityLabel::MegaViral);
        assert_eq!(ladder.classify(9.99), ViralityLabel::Trending);
        assert_eq!(ladder.classify(3.0), ViralityLabel::Trending);
        assert_eq!(ladder.classify(2.99), ViralityLabel::Popular);
        assert_eq!(ladder.classify(1.0), ViralityLabel::Popular);
        assert_eq!(ladder.classify(0.99), ViralityLabel::Normal);
        assert_eq!(ladder.classify(0.0), ViralityLabel::Normal);
    }

    #[test]
    fn strict_ladder_buckets() {
        let ladder = ScoreLadder::Strict;
        assert_eq!(ladder.classify(12.0), ViralityLabel::MegaViral);
        assert_eq!(ladder.classify(10.0), ViralityLabel::MegaViral);
        assert_eq!(ladder.classify(9.99), ViralityLabel::Viral);
        assert_eq!(ladder.classify(5.0), ViralityLabel::Viral);
        assert_eq!(ladder.classify(4.99), ViralityLabel::Trending);
        assert_eq!(ladder.classify(2.0), ViralityLabel::Trending);
        assert_eq!(ladder.classify(1.99), ViralityLabel::Normal);
        assert_eq!(ladder.classify(0.0), ViralityLabel::Normal);
    }

    #[test]
    fn strict_ladder_never_yields_popular() {
        let ladder = ScoreLadder::Strict;
        for score in [0.0, 0.5, 1.0, 1.5, 2.0, 5.0, 10.0, 100.0] {
            assert_ne!(ladder.classify(score), ViralityLabel::Popular);
        }
    }

    #[test]
    fn labels_render_human_readable() {
        assert_eq!(ViralityLabel::MegaViral.to_string(), "🔥 Mega Viral");
        assert_eq!(ViralityLabel::Normal.to_string(), "😐 Normal");
    }
}
