//! Issue change domain model.
//!
//! An issue change is either a user comment or a field diff (changelog
//! entry). Both share one record shape and are told apart by [`ChangeType`].

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of an issue change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Markdown comment written by a user
    Comment,
    /// Field changelog serialized as [`FieldDiffs`]
    Diff,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Diff => "diff",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "comment" => Some(Self::Comment),
            "diff" => Some(Self::Diff),
            _ => None,
        }
    }
}

/// A persisted change attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueChange {
    /// Store-assigned row id, `None` until inserted
    pub id: Option<i64>,
    /// Unique change key
    pub key: String,
    /// Key of the issue this change belongs to
    pub issue_key: String,
    /// Author login, if any
    pub user_login: Option<String>,
    /// Comment or diff
    pub change_type: ChangeType,
    /// Comment markdown or serialized field diffs
    pub change_data: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
    /// When the change happened on the issue
    pub issue_change_creation_date: Option<DateTime<Utc>>,
}

impl IssueChange {
    /// Create a comment change with a generated key.
    pub fn new_comment(issue_key: impl Into<String>, user_login: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(issue_key, Some(user_login.into()), ChangeType::Comment, text.into())
    }

    /// Create a diff change from field diffs, with a generated key.
    pub fn new_diff(issue_key: impl Into<String>, diffs: &FieldDiffs) -> Self {
        Self::new(issue_key, diffs.user_login.clone(), ChangeType::Diff, diffs.to_string())
    }

    fn new(issue_key: impl Into<String>, user_login: Option<String>, change_type: ChangeType, data: String) -> Self {
        let now = now_millis();
        Self {
            id: None,
            key: Uuid::new_v4().to_string(),
            issue_key: issue_key.into(),
            user_login,
            change_type,
            change_data: Some(data),
            created_at: now,
            updated_at: now,
            issue_change_creation_date: Some(now),
        }
    }

    /// Date the change happened on the issue, falling back to the record creation date.
    pub fn effective_creation_date(&self) -> DateTime<Utc> {
        self.issue_change_creation_date.unwrap_or(self.created_at)
    }

    /// View as a comment. `None` for diff records.
    pub fn to_comment(&self) -> Option<IssueComment> {
        if self.change_type != ChangeType::Comment {
            return None;
        }
        Some(IssueComment {
            key: self.key.clone(),
            issue_key: self.issue_key.clone(),
            user_login: self.user_login.clone(),
            markdown_text: self.change_data.clone().unwrap_or_default(),
            created_at: self.effective_creation_date(),
            updated_at: self.updated_at,
        })
    }

    /// View as field diffs. `None` for comment records.
    pub fn to_field_diffs(&self) -> Option<FieldDiffs> {
        if self.change_type != ChangeType::Diff {
            return None;
        }
        let mut diffs = FieldDiffs::parse(self.change_data.as_deref().unwrap_or_default());
        diffs.issue_key = Some(self.issue_key.clone());
        diffs.user_login = self.user_login.clone();
        diffs.creation_date = Some(self.effective_creation_date());
        Some(diffs)
    }
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub key: String,
    pub issue_key: String,
    pub user_login: Option<String>,
    pub markdown_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Old and new value of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref old) = self.old_value {
            write!(f, "{old}|")?;
        }
        if let Some(ref new) = self.new_value {
            f.write_str(new)?;
        }
        Ok(())
    }
}

/// Set of field diffs recorded by one changelog entry.
///
/// Serialized as `field=old|new` pairs joined by `,`; `field=new` when there
/// is no old value. Empty values are read back as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiffs {
    pub issue_key: Option<String>,
    pub user_login: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    diffs: IndexMap<String, Diff>,
}

impl FieldDiffs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diff for a field, replacing any previous one.
    pub fn set_diff(&mut self, field: impl Into<String>, old_value: Option<&str>, new_value: Option<&str>) -> &mut Self {
        let diff = Diff {
            old_value: non_empty(old_value),
            new_value: non_empty(new_value),
        };
        self.diffs.insert(field.into(), diff);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Diff> {
        self.diffs.get(field)
    }

    pub fn diffs(&self) -> &IndexMap<String, Diff> {
        &self.diffs
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    /// Parse the serialized form. Unparsable fragments are skipped.
    pub fn parse(data: &str) -> Self {
        let mut diffs = Self::new();
        for field in data.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match field.split_once('=') {
                Some((name, values)) => match values.split_once('|') {
                    Some((old, new)) => diffs.set_diff(name, Some(old), Some(new)),
                    None => diffs.set_diff(name, None, Some(values)),
                },
                None => diffs.set_diff(field, None, None),
            };
        }
        diffs
    }
}

impl fmt::Display for FieldDiffs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, diff)) in self.diffs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field}={diff}")?;
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Current time truncated to the millisecond precision the store keeps.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
