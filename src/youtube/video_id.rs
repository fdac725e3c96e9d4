//! Video ID extraction from pasted YouTube links.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Watch, short-link and embed URLs. Unanchored: matches anywhere in the input.
static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
        .expect("Failed to compile YouTube link regex")
});

/// A bare 11-character ID.
static BARE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9_-]{11})$").expect("Failed to compile YouTube ID regex")
});

/// A YouTube video identifier as extracted from user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract a video ID from a YouTube URL or a bare ID.
///
/// Patterns are tried in order and the first match wins.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    [&*LINK_PATTERN, &*BARE_ID_PATTERN]
        .iter()
        .find_map(|pattern| pattern.captures(input))
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_owned()))
}
