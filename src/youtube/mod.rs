//! YouTube link handling.
//!
//! # Data Flow
//! ```text
//! pasted text
//!     → video_id.rs (watch / youtu.be / embed link, or bare 11-char ID)
//!     → thumbnail.rs (quality tier → https://img.youtube.com/vi/{id}/{tier}.jpg)
//! ```
//!
//! Pure string work; nothing here touches the network.

pub mod thumbnail;
pub mod video_id;

pub use thumbnail::{thumbnail_url, Thumbnail, ThumbnailQuality, UnknownQuality, DEFAULT_THUMBNAIL_BASE};
pub use video_id::{extract_video_id, VideoId};
