//! ISO-8601 duration parsing for the `contentDetails.duration` field.
//!
//! YouTube reports video length as an ISO-8601 duration such as `PT4M13S`,
//! `PT2H1M`, or `P1DT3H` for very long streams. Only day/hour/minute/second
//! designators are supported; year and month designators have no fixed
//! length in seconds and never appear in YouTube payloads.

/// Parses an ISO-8601 duration into whole seconds.
///
/// Returns `None` if:
/// - the string does not start with `P`,
/// - a designator other than `W`/`D` (date part) or `H`/`M`/`S` (time part)
///   appears,
/// - digits trail without a designator, or a number fails to parse.
#[must_use]
pub(crate) fn parse_duration_secs(input: &str) -> Option<u64> {
    let rest = input.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    let mut secs: u64 = 0;
    let mut digits = String::new();

    for (part, is_time) in [(date_part, false), (time_part, true)] {
        for c in part.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let value: u64 = digits.parse().ok()?;
            digits.clear();
            let multiplier = match (c, is_time) {
                ('W', false) => 604_800,
                ('D', false) => 86_400,
                ('H', true) => 3_600,
                ('M', true) => 60,
                ('S', true) => 1,
                _ => return None,
            };
            secs = secs.checked_add(value.checked_mul(multiplier)?)?;
        }
        // Digits with no trailing designator are malformed.
        if !digits.is_empty() {
            return None;
        }
    }

    Some(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_only() {
        assert_eq!(parse_duration_secs("PT45S"), Some(45));
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(parse_duration_secs("PT4M13S"), Some(253));
    }

    #[test]
    fn hours_minutes_seconds() {
        assert_eq!(parse_duration_secs("PT2H3M4S"), Some(7384));
    }

    #[test]
    fn hours_and_minutes_without_seconds() {
        assert_eq!(parse_duration_secs("PT2H1M"), Some(7260));
    }

    #[test]
    fn days_and_time() {
        assert_eq!(parse_duration_secs("P1DT3H"), Some(97_200));
    }

    #[test]
    fn zero_duration() {
        assert_eq!(parse_duration_secs("PT0S"), Some(0));
    }

    #[test]
    fn empty_period_is_zero() {
        // "PT" is what YouTube emits for upcoming live streams.
        assert_eq!(parse_duration_secs("PT"), Some(0));
    }

    #[test]
    fn missing_p_prefix_is_rejected() {
        assert_eq!(parse_duration_secs("T45S"), None);
        assert_eq!(parse_duration_secs(""), None);
    }

    #[test]
    fn month_designator_is_rejected() {
        // 'M' in the date part means months, which have no fixed length.
        assert_eq!(parse_duration_secs("P1M"), None);
    }

    #[test]
    fn trailing_digits_are_rejected() {
        assert_eq!(parse_duration_secs("PT45"), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_duration_secs("PTXS"), None);
        assert_eq!(parse_duration_secs("four minutes"), None);
    }
}
