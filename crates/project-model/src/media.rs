//! Media references.
//!
//! A media item is immutable once stored and is referenced by its position
//! in the composition's media list.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// An image or video placed into cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaItem {
    /// A still image, drawn directly onto the canvas.
    Image {
        /// `data:` URI or filesystem path.
        url: String,
    },
    /// A video clip, composited frame by frame on export.
    Video {
        /// `data:` URI or filesystem path.
        url: String,
    },
}

/// The kind of a media item, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaItem {
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image { url: url.into() }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self::Video { url: url.into() }
    }

    /// Build an item of the given kind.
    pub fn new(kind: MediaKind, url: impl Into<String>) -> Self {
        match kind {
            MediaKind::Image => Self::image(url),
            MediaKind::Video => Self::video(url),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image { .. } => MediaKind::Image,
            Self::Video { .. } => MediaKind::Video,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Image { url } | Self::Video { url } => url,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video { .. })
    }

    /// Resolve the payload behind this item's URL.
    pub fn source(&self) -> MediaSource<'_> {
        MediaSource::from_url(self.url())
    }
}

/// (extension, kind, MIME type) of every importable file type.
const MEDIA_TYPES: &[(&str, MediaKind, &str)] = &[
    ("png", MediaKind::Image, "image/png"),
    ("jpg", MediaKind::Image, "image/jpeg"),
    ("jpeg", MediaKind::Image, "image/jpeg"),
    ("gif", MediaKind::Image, "image/gif"),
    ("webp", MediaKind::Image, "image/webp"),
    ("bmp", MediaKind::Image, "image/bmp"),
    ("mp4", MediaKind::Video, "video/mp4"),
    ("webm", MediaKind::Video, "video/webm"),
    ("mov", MediaKind::Video, "video/quicktime"),
    ("mkv", MediaKind::Video, "video/x-matroska"),
];

impl MediaKind {
    /// Classify a file by extension, returning its kind and MIME type.
    pub fn from_extension(ext: &str) -> Option<(MediaKind, &'static str)> {
        let ext = ext.to_ascii_lowercase();
        MEDIA_TYPES
            .iter()
            .find(|(known, _, _)| *known == ext)
            .map(|(_, kind, mime)| (*kind, *mime))
    }
}

/// Preferred file extension for a MIME type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let mime = mime.trim().to_ascii_lowercase();
    MEDIA_TYPES
        .iter()
        .find(|(_, _, known)| *known == mime)
        .map(|(ext, _, _)| *ext)
}

/// Where a media item's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource<'a> {
    /// An inline `data:<mime>;base64,<payload>` URI.
    DataUrl { mime: &'a str, payload: &'a str },
    /// Anything else is treated as a filesystem path.
    Path(&'a str),
}

impl<'a> MediaSource<'a> {
    pub fn from_url(url: &'a str) -> Self {
        let Some(rest) = url.strip_prefix("data:") else {
            return Self::Path(url);
        };
        match rest.split_once(";base64,") {
            Some((mime, payload)) => Self::DataUrl { mime, payload },
            None => Self::Path(url),
        }
    }

    /// Decode an inline payload. `None` for paths.
    pub fn decode(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        match self {
            Self::DataUrl { payload, .. } => Some(STANDARD.decode(payload.trim())),
            Self::Path(_) => None,
        }
    }
}

/// Encode bytes as a base64 `data:` URI.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_tagged_record() {
        let item = MediaItem::video("clip.webm");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"type":"video","url":"clip.webm"}"#);

        let parsed: MediaItem = serde_json::from_str(r#"{"type":"image","url":"x"}"#).unwrap();
        assert_eq!(parsed, MediaItem::image("x"));
        assert_eq!(parsed.kind(), MediaKind::Image);
    }

    #[test]
    fn test_data_url_round_trip() {
        let url = encode_data_url("image/png", &[1, 2, 3, 250]);
        assert!(url.starts_with("data:image/png;base64,"));

        let source = MediaSource::from_url(&url);
        let MediaSource::DataUrl { mime, .. } = &source else {
            panic!("expected data url, got {source:?}");
        };
        assert_eq!(*mime, "image/png");
        assert_eq!(source.decode().unwrap().unwrap(), vec![1, 2, 3, 250]);
    }

    #[test]
    fn test_paths_are_not_decoded() {
        let source = MediaSource::from_url("/tmp/photo.jpg");
        assert_eq!(source, MediaSource::Path("/tmp/photo.jpg"));
        assert!(source.decode().is_none());

        // Non-base64 data URIs are not supported inline.
        assert!(matches!(
            MediaSource::from_url("data:text/plain,hello"),
            MediaSource::Path(_)
        ));
    }

    #[test]
    fn test_extension_classification() {
        assert_eq!(
            MediaKind::from_extension("JPG"),
            Some((MediaKind::Image, "image/jpeg"))
        );
        assert_eq!(
            MediaKind::from_extension("webm").map(|(k, _)| k),
            Some(MediaKind::Video)
        );
        assert!(MediaKind::from_extension("txt").is_none());
        assert_eq!(extension_for_mime("video/webm"), Some("webm"));
        assert_eq!(extension_for_mime("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_mime("text/plain"), None);
    }
}
