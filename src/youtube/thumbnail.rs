//! Thumbnail quality tiers and URL derivation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::video_id::VideoId;

/// Public host serving video thumbnails.
pub const DEFAULT_THUMBNAIL_BASE: &str = "https://img.youtube.com";

/// Thumbnail resolution tier, named by the file YouTube serves for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThumbnailQuality {
    #[default]
    #[serde(rename = "maxresdefault")]
    MaxRes,
    #[serde(rename = "sddefault")]
    Standard,
    #[serde(rename = "hqdefault")]
    High,
}

impl ThumbnailQuality {
    pub const ALL: [ThumbnailQuality; 3] = [Self::MaxRes, Self::Standard, Self::High];

    /// File stem used in the thumbnail URL.
    pub fn slug(self) -> &'static str {
        match self {
            Self::MaxRes => "maxresdefault",
            Self::Standard => "sddefault",
            Self::High => "hqdefault",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MaxRes => "Max Resolution",
            Self::Standard => "Standard Quality",
            Self::High => "High Quality",
        }
    }

    /// Nominal (width, height) in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::MaxRes => (1920, 1080),
            Self::Standard => (640, 480),
            Self::High => (480, 360),
        }
    }
}

impl fmt::Display for ThumbnailQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown thumbnail quality '{0}' (expected maxresdefault, sddefault or hqdefault)")]
pub struct UnknownQuality(pub String);

impl FromStr for ThumbnailQuality {
    type Err = UnknownQuality;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|q| q.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownQuality(s.to_string()))
    }
}

/// Build `{base}/vi/{id}/{quality}.jpg`.
pub fn thumbnail_url(base: &str, video_id: &VideoId, quality: ThumbnailQuality) -> String {
    format!("{}/vi/{}/{}.jpg", base.trim_end_matches('/'), video_id, quality.slug())
}

/// A thumbnail selected for one video at one quality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub video_id: VideoId,
    pub quality: ThumbnailQuality,
}

impl Thumbnail {
    pub fn new(video_id: VideoId, quality: ThumbnailQuality) -> Self {
        Self { video_id, quality }
    }

    /// Same video at a different quality.
    pub fn with_quality(&self, quality: ThumbnailQuality) -> Self {
        Self::new(self.video_id.clone(), quality)
    }

    pub fn url(&self, base: &str) -> String {
        thumbnail_url(base, &self.video_id, self.quality)
    }

    /// Suggested download file name.
    pub fn filename(&self) -> String {
        format!("thumbnail-{}-{}.jpg", self.video_id, self.quality.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::extract_video_id;

    fn thumb(quality: ThumbnailQuality) -> Thumbnail {
        Thumbnail::new(extract_video_id("dQw4w9WgXcQ").unwrap(), quality)
    }

    #[test]
    fn test_url_derivation() {
        assert_eq!(
            thumb(ThumbnailQuality::MaxRes).url(DEFAULT_THUMBNAIL_BASE),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
        );
        assert_eq!(
            thumb(ThumbnailQuality::High).url("http://127.0.0.1:9000/"),
            "http://127.0.0.1:9000/vi/dQw4w9WgXcQ/hqdefault.jpg"
        );
    }

    #[test]
    fn test_quality_change_keeps_video() {
        let original = thumb(ThumbnailQuality::MaxRes);
        let changed = original.with_quality(ThumbnailQuality::Standard);
        assert_eq!(changed.video_id, original.video_id);
        assert_eq!(
            changed.url(DEFAULT_THUMBNAIL_BASE),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/sddefault.jpg"
        );
    }

    #[test]
    fn test_filename() {
        assert_eq!(
            thumb(ThumbnailQuality::Standard).filename(),
            "thumbnail-dQw4w9WgXcQ-sddefault.jpg"
        );
    }

    #[test]
    fn test_quality_parsing() {
        assert_eq!("hqdefault".parse(), Ok(ThumbnailQuality::High));
        assert_eq!(" MAXRESDEFAULT ".parse(), Ok(ThumbnailQuality::MaxRes));
        assert!("4k".parse::<ThumbnailQuality>().is_err());
        assert_eq!(ThumbnailQuality::default(), ThumbnailQuality::MaxRes);
        assert_eq!(ThumbnailQuality::Standard.dimensions(), (640, 480));
    }

    #[test]
    fn test_quality_serde_uses_slug() {
        let json = serde_json::to_string(&ThumbnailQuality::Standard).unwrap();
        assert_eq!(json, "\"sddefault\"");
        let back: ThumbnailQuality = serde_json::from_str("\"hqdefault\"").unwrap();
        assert_eq!(back, ThumbnailQuality::High);
    }
}
