use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{Block, PostId};

/// The full content of one post: title, ordered blocks and save time.
///
/// Field names follow the stored row (`raw_elements`, `savedAt`) so the
/// same type is used for insert/update bodies and for fetched rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(
        rename = "raw_elements",
        default,
        deserialize_with = "null_as_default"
    )]
    pub blocks: Vec<Block>,
    #[serde(
        rename = "savedAt",
        default,
        with = "timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Document {
    /// A new post: blank title, no blocks, never saved
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.blocks.is_empty()
    }
}

/// A stored post row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(flatten)]
    pub document: Document,
}

/// A row of the paginated post list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "savedAt", default, with = "timestamp")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Render a save time for display in the local timezone
pub fn format_saved_at(saved_at: Option<DateTime<Utc>>) -> String {
    match saved_at {
        Some(time) => time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "never".to_string(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `savedAt` is written as RFC 3339. Columns declared without a timezone
/// come back without an offset; those are read as UTC.
mod timestamp {
    use super::*;
    use serde::Serializer;
    use serde::de::Error;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&time.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if let Ok(time) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(time.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Some(naive.and_utc()))
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::text_block;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_row_with_null_elements_is_empty_document() {
        let post: Post = serde_json::from_value(json!({
            "id": 7,
            "title": "Hello",
            "raw_elements": null,
            "savedAt": "2024-06-01T12:00:00+00:00"
        }))
        .unwrap();

        assert_eq!(post.id, PostId::from("7"));
        assert_eq!(post.document.title, "Hello");
        assert!(post.document.blocks.is_empty());
        assert_eq!(
            post.document.saved_at,
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        let summary: PostSummary = serde_json::from_value(json!({
            "id": "1",
            "title": "t",
            "savedAt": "2024-06-01T12:00:00.250"
        }))
        .unwrap();

        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(summary.saved_at, Some(expected));
    }

    #[test]
    fn test_document_body_uses_row_field_names() {
        let document = Document {
            title: "Post".to_string(),
            blocks: vec![text_block("a", 1.0, 2.0)],
            saved_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
        };

        let body = serde_json::to_value(&document).unwrap();

        assert_eq!(body["title"], json!("Post"));
        assert_eq!(body["raw_elements"][0]["id"], json!("a"));
        assert_eq!(body["savedAt"], json!("2024-01-02T03:04:05+00:00"));

        let back: Document = serde_json::from_value(body).unwrap();
        assert_eq!(back, document);
    }

    #[test]
    fn test_format_saved_at_without_time() {
        assert_eq!(format_saved_at(None), "never");
    }
}
