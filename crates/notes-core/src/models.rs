//! Data models for notes
//!
//! Defines the stored `Note`, the inputs used to create and patch it, and
//! the paginated list shape returned by the HTTP adapter.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Maximum title length, in characters
pub const TITLE_MAX_LEN: usize = 200;

/// A stored note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Note {
    /// Unique identifier, assigned by the store
    pub id: u64,
    /// Note title (non-empty, at most `TITLE_MAX_LEN` characters)
    pub title: String,
    /// Note body, may be empty
    pub content: String,
    /// When this note was created
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    /// When this note was last updated
    #[serde(deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Apply the fields set in `patch`
    ///
    /// Returns true if the patch carried at least one field. Timestamps are
    /// left to the caller.
    pub fn apply(&mut self, patch: NotePatch) -> bool {
        let mut touched = false;
        if let Some(title) = patch.title {
            self.title = title;
            touched = true;
        }
        if let Some(content) = patch.content {
            self.content = content;
            touched = true;
        }
        touched
    }

    /// Check whether `needle` occurs in the title or content
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}

/// Input for creating a note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Check field constraints
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)
    }
}

/// Partial update of a note
///
/// `None` leaves a field untouched; `Some("")` sets it to empty. Over JSON
/// both a missing key and an explicit `null` mean "leave untouched".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NotePatch {
    /// Patch that only sets the title
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    /// Patch that only sets the content
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Check constraints of the fields that are set
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

/// One page of notes plus the paging parameters that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct NotePage {
    pub notes: Vec<Note>,
    /// Number of notes in the store, irrespective of paging
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Input constraint violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title is {len} characters long, at most {max} are allowed")]
    TitleTooLong { len: usize, max: usize },
}

/// Check a title against the length bounds
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if len == 0 {
        return Err(ValidationError::EmptyTitle);
    }
    if len > TITLE_MAX_LEN {
        return Err(ValidationError::TitleTooLong {
            len,
            max: TITLE_MAX_LEN,
        });
    }
    Ok(())
}

/// A timestamp for a mutation that happened after `previous`
///
/// Normally the current time; bumped by a microsecond when the clock has not
/// moved past `previous`, so `updated_at` always strictly increases.
pub(crate) fn timestamp_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Parse a stored timestamp
///
/// Accepts RFC 3339, and offset-less `T`- or space-separated date-times,
/// which are taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {:?}", raw)))
}
