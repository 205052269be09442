//! Photo data model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// Pixel dimensions of a photo as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoSize {
    pub width: f64,
    pub height: f64,
}

/// A photo in the in-memory feed collection.
///
/// `id` is the unique key within the collection; the feed service never
/// holds two photos with the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: String,
    pub size: PhotoSize,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub thumb_url: String,
    pub large_url: String,
    pub full_url: String,
    pub is_liked: bool,
}

impl Photo {
    /// Width over height, with a zero height defined as ratio 1.
    pub fn aspect_ratio(&self) -> f64 {
        if self.size.height == 0.0 {
            1.0
        } else {
            self.size.width / self.size.height
        }
    }

    /// Copy of this photo with the like state replaced.
    pub fn with_liked(&self, is_liked: bool) -> Self {
        Self { is_liked, ..self.clone() }
    }
}

/// Image URL variants of a raw photo record.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PhotoUrls {
    pub thumb: String,
    pub regular: String,
    pub full: String,
}

/// Raw photo record as returned by `GET /photos`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PhotoRecord {
    pub id: String,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub urls: PhotoUrls,
    pub liked_by_user: bool,
}

impl From<PhotoRecord> for Photo {
    fn from(record: PhotoRecord) -> Self {
        let created_at = record.created_at.as_deref().and_then(parse_created_at);
        Self {
            id: record.id,
            size: PhotoSize { width: record.width, height: record.height },
            created_at,
            description: record.description,
            thumb_url: record.urls.thumb,
            large_url: record.urls.regular,
            full_url: record.urls.full,
            is_liked: record.liked_by_user,
        }
    }
}

/// Parse a server timestamp.
///
/// Primary format is RFC 3339 with fractional seconds; records without the
/// fraction (or without an offset at all) fall back to a plain
/// `YYYY-MM-DDTHH:MM:SS` parse interpreted as UTC. Unparseable input maps
/// to `None` rather than failing the whole record.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            width: 1080.0,
            height: 720.0,
            created_at: Some("2024-01-01T12:00:00.000Z".to_string()),
            description: None,
            urls: PhotoUrls {
                thumb: "https://img.example.com/t".to_string(),
                regular: "https://img.example.com/r".to_string(),
                full: "https://img.example.com/f".to_string(),
            },
            liked_by_user: false,
        }
    }

    #[test]
    fn test_aspect_ratio() {
        let photo = Photo::from(record("a"));
        assert!((photo.aspect_ratio() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_aspect_ratio_zero_height() {
        let mut raw = record("a");
        raw.height = 0.0;
        let photo = Photo::from(raw);
        assert!((photo.aspect_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_created_at_fractional_and_fallback_agree() {
        let primary = parse_created_at("2024-01-01T12:00:00.000Z").unwrap();
        let fallback = parse_created_at("2024-01-01T12:00:00Z").unwrap();
        assert_eq!(primary, fallback);
    }

    #[test]
    fn test_created_at_without_offset() {
        let parsed = parse_created_at("2024-01-01T12:00:00").unwrap();
        assert_eq!(parsed, parse_created_at("2024-01-01T12:00:00Z").unwrap());
    }

    #[test]
    fn test_created_at_garbage_is_none() {
        assert!(parse_created_at("yesterday").is_none());
    }

    #[test]
    fn test_decode_record() {
        let json = r#"{
            "id": "abc",
            "width": 400,
            "height": 300,
            "created_at": "2024-01-01T12:00:00Z",
            "description": "hills",
            "urls": {"thumb": "t", "regular": "r", "full": "f"},
            "liked_by_user": true
        }"#;
        let record: PhotoRecord = serde_json::from_str(json).unwrap();
        let photo = Photo::from(record);
        assert_eq!(photo.id, "abc");
        assert_eq!(photo.large_url, "r");
        assert!(photo.is_liked);
        assert!(photo.created_at.is_some());
    }

    #[test]
    fn test_with_liked_preserves_identity() {
        let photo = Photo::from(record("a"));
        let liked = photo.with_liked(true);
        assert_eq!(liked.id, photo.id);
        assert_eq!(liked.size, photo.size);
        assert!(liked.is_liked);
    }
}
