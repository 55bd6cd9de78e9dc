//! Media kind classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an uploaded media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    /// Parse a client-supplied kind, falling back to [`MediaKind::Image`]
    /// when absent or unrecognised.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("video") => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }

    /// Guess the kind from a content type such as `video/mp4`
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort content type for an uploaded file.
///
/// A specific type sent by the client wins; otherwise the file extension
/// decides.
pub fn detect_content_type(original_name: &str, declared: Option<&str>) -> String {
    match declared {
        Some(declared) if !declared.is_empty() && declared != "application/octet-stream" => {
            declared.to_string()
        }
        _ => mime_guess::from_path(original_name)
            .first_or_octet_stream()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_or_missing_kind_defaults_to_image() {
        assert_eq!(MediaKind::parse_or_default(None), MediaKind::Image);
        assert_eq!(MediaKind::parse_or_default(Some("gif")), MediaKind::Image);
        assert_eq!(MediaKind::parse_or_default(Some("Video")), MediaKind::Video);
    }

    #[test]
    fn content_type_detection() {
        assert_eq!(detect_content_type("clip.mp4", None), "video/mp4");
        assert_eq!(detect_content_type("photo.png", Some("")), "image/png");
        assert_eq!(
            detect_content_type("noext", Some("image/webp")),
            "image/webp"
        );
        assert_eq!(
            detect_content_type("noext", None),
            "application/octet-stream"
        );
        assert_eq!(
            MediaKind::from_content_type(&detect_content_type("clip.mov", None)),
            MediaKind::Video
        );
    }

    #[test]
    fn kinds_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&MediaKind::Video).unwrap(), "\"video\"");
    }
}
