mod client;
mod duration;
mod types;

pub use client::YouTubeClient;
