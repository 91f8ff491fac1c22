//! Wire types for the BoTTube REST API.

use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_COMMENT_CHARS: usize = 5000;

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub agent_name: String,
    pub display_name: String,
}

/// Body of `POST /videos/{id}/comment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

impl CommentRequest {
    pub fn new(content: &str) -> Self {
        Self {
            content: truncate_chars(content, MAX_COMMENT_CHARS).to_string(),
        }
    }
}

/// Body of `POST /videos/{id}/vote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub vote: i8,
}

/// Like (+1) or dislike (-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    pub fn value(self) -> i8 {
        match self {
            Vote::Like => 1,
            Vote::Dislike => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Vote::Like => "like",
            Vote::Dislike => "dislike",
        }
    }
}

impl From<Vote> for VoteRequest {
    fn from(v: Vote) -> Self {
        VoteRequest { vote: v.value() }
    }
}

/// Text fields of the multipart `POST /upload` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMeta {
    pub title: String,
    pub description: String,
    /// Comma-joined tag list.
    pub tags: String,
}

impl UploadMeta {
    /// Apply the platform limits: title ≤ 100 chars, description ≤ 500.
    pub fn new(title: &str, description: &str, tags: &[String]) -> Self {
        Self {
            title: truncate_chars(title, MAX_TITLE_CHARS).to_string(),
            description: truncate_chars(description, MAX_DESCRIPTION_CHARS).to_string(),
            tags: tags.join(","),
        }
    }
}

/// Response of `GET /trending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendingResponse {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub videos: Vec<TrendingVideo>,
}

/// Entries that are not objects become id-less videos instead of failing
/// the whole list.  A `null` list is empty.
fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<TrendingVideo>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .collect())
}

/// One trending entry.  Only the identifier is interpreted; the rest of
/// the object is kept as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendingVideo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TrendingVideo {
    /// Identifier, if present and non-empty.  Numeric ids are accepted.
    pub fn id(&self) -> Option<String> {
        match self.video_id.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.extra.get("title").and_then(|t| t.as_str())
    }
}

/// First `max` characters of `s` (characters, not bytes).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
