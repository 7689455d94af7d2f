use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::safety::{redact, redact_url};

/// Stored in place of the author when the platform no longer reports one.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// Annotation stamped on every collected row.
pub const COMPLIANCE_NOTE: &str =
    "Data collected in compliance with Reddit API terms using the official OAuth API";

/// Prefix that turns a relative permalink into a canonical link.
pub const PERMALINK_BASE: &str = "https://reddit.com";

// --- Raw search results ---

/// One search hit as the search capability reports it, before redaction.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub score: i64,
    pub comment_count: i64,
    /// Epoch seconds.
    pub created_utc: f64,
    pub url: String,
    /// Relative path, e.g. "/r/SaaS/comments/abc/title/".
    pub permalink: String,
}

// --- Collected records ---

/// A redacted search result, ready to be written to `reddit_posts`.
/// Serialized field names are the table's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(rename = "reddit_id")]
    pub source_id: String,
    #[serde(rename = "subreddit")]
    pub community: String,
    pub title: String,
    #[serde(rename = "selftext")]
    pub body: String,
    pub author: String,
    pub score: i64,
    #[serde(rename = "num_comments")]
    pub comment_count: i64,
    #[serde(rename = "created_utc")]
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub permalink: String,
    #[serde(rename = "sanitized_content")]
    pub combined_redacted_text: String,
    pub compliance_note: String,
}

impl SearchRecord {
    /// Normalize a raw hit from `community`, redacting every free-text field.
    pub fn from_raw(raw: RawPost, community: &str) -> Result<Self, RecordError> {
        let created_at = timestamp_from_epoch(raw.created_utc).ok_or_else(|| {
            RecordError::InvalidTimestamp {
                source_id: raw.id.clone(),
                value: raw.created_utc,
            }
        })?;

        let author = match raw.author {
            Some(name) if !name.is_empty() => name,
            _ => DELETED_AUTHOR.to_string(),
        };

        Ok(Self {
            combined_redacted_text: redact(&format!("{} {}", raw.title, raw.body)),
            title: redact(&raw.title),
            body: redact(&raw.body),
            source_id: raw.id,
            community: community.to_string(),
            author,
            score: raw.score,
            comment_count: raw.comment_count,
            created_at,
            url: redact_url(&raw.url),
            permalink: format!("{PERMALINK_BASE}{}", raw.permalink),
            compliance_note: COMPLIANCE_NOTE.to_string(),
        })
    }
}

fn timestamp_from_epoch(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc();
    let nanos = ((secs - whole) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawPost {
        RawPost {
            id: id.to_string(),
            title: "Need a CRM for plumbers".to_string(),
            body: "Email me at pat@example.com".to_string(),
            author: Some("pat".to_string()),
            score: 12,
            comment_count: 4,
            created_utc: 1_700_000_000.0,
            url: "https://www.reddit.com/r/smallbusiness/comments/abc/".to_string(),
            permalink: "/r/smallbusiness/comments/abc/need_a_crm/".to_string(),
        }
    }

    #[test]
    fn maps_and_redacts_fields() {
        let record = SearchRecord::from_raw(raw("abc"), "smallbusiness").unwrap();

        assert_eq!(record.source_id, "abc");
        assert_eq!(record.community, "smallbusiness");
        assert_eq!(record.title, "Need a CRM for plumbers");
        assert_eq!(record.body, "Email me at [EMAIL]");
        assert_eq!(
            record.combined_redacted_text,
            "Need a CRM for plumbers Email me at [EMAIL]"
        );
        assert_eq!(
            record.permalink,
            "https://reddit.com/r/smallbusiness/comments/abc/need_a_crm/"
        );
        assert_eq!(record.created_at.timestamp(), 1_700_000_000);
        assert_eq!(record.compliance_note, COMPLIANCE_NOTE);
    }

    #[test]
    fn missing_author_becomes_sentinel() {
        let mut post = raw("abc");
        post.author = None;
        let record = SearchRecord::from_raw(post, "SaaS").unwrap();
        assert_eq!(record.author, DELETED_AUTHOR);
    }

    #[test]
    fn link_emails_are_redacted() {
        let mut post = raw("abc");
        post.url = "mailto:pat@example.com?subject=idea".to_string();
        let record = SearchRecord::from_raw(post, "SaaS").unwrap();
        assert_eq!(record.url, "mailto:[EMAIL]?subject=idea");
    }

    #[test]
    fn rejects_unrepresentable_timestamp() {
        let mut post = raw("abc");
        post.created_utc = f64::NAN;
        assert!(matches!(
            SearchRecord::from_raw(post, "SaaS"),
            Err(RecordError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn serializes_with_table_column_names() {
        let record = SearchRecord::from_raw(raw("abc"), "SaaS").unwrap();
        let json = serde_json::to_value(&record).unwrap();

        for column in [
            "reddit_id",
            "subreddit",
            "selftext",
            "num_comments",
            "created_utc",
            "sanitized_content",
            "compliance_note",
        ] {
            assert!(json.get(column).is_some(), "missing column {column}");
        }
        assert_eq!(json["created_utc"], "2023-11-14T22:13:20Z");
    }
}
