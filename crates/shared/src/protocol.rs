use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Article, ArticleId, Comment, TopicId, TopicRef};

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: TopicId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedTopic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TopicId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The `topic` field of an article comes back either as an embedded object
/// or, from older endpoints, as a bare label. Only the object form carries a
/// usable topic name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicField {
    Embedded(EmbeddedTopic),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub username: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ArticleId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
}

impl ArticlePayload {
    /// Embedded topic name first, flat `topicName` second. Empty names count
    /// as missing.
    pub fn resolve_topic(&self) -> Option<TopicRef> {
        let embedded = match &self.topic {
            Some(TopicField::Embedded(topic)) => topic
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| TopicRef {
                    id: topic.id,
                    name: name.to_string(),
                }),
            Some(TopicField::Label(_)) | None => None,
        };

        embedded.or_else(|| {
            self.topic_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| TopicRef {
                    id: None,
                    name: name.to_string(),
                })
        })
    }
}

impl From<ArticlePayload> for Article {
    fn from(payload: ArticlePayload) -> Self {
        let topic = payload.resolve_topic();
        Self {
            id: payload.id,
            title: payload.title,
            content: payload.content,
            author_username: payload.author_username,
            topic,
            created_at: payload.created_at.as_deref().and_then(parse_timestamp),
            updated_at: payload.updated_at.as_deref().and_then(parse_timestamp),
            comments: payload
                .comments
                .unwrap_or_default()
                .into_iter()
                .map(|comment| Comment {
                    username: comment.username,
                    content: comment.content,
                })
                .collect(),
        }
    }
}

/// Parses the timestamp shapes the API emits: RFC 3339, naive date-time
/// (read as UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}
