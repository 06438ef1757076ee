use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ServiceError;

pub const DEFAULT_STATUS: &str = "open";
pub const DEFAULT_PRIORITY: &str = "medium";
pub const FIRST_ID: u64 = 1;

/// A tracked unit of work. Keys are serialized in camelCase (`createdAt`, `updatedAt`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: u64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default = "default_status", deserialize_with = "null_as_status")]
    pub status: String,
    #[serde(default = "default_priority", deserialize_with = "null_as_priority")]
    pub priority: String,
    #[serde(default)]
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_status() -> String { DEFAULT_STATUS.to_string() }
fn default_priority() -> String { DEFAULT_PRIORITY.to_string() }
fn first_id() -> u64 { FIRST_ID }

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn null_as_status<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_else(default_status))
}

fn null_as_priority<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_else(default_priority))
}

/// Blank assignees are stored as unassigned.
fn normalize_assignee(value: Option<String>) -> Option<String> {
    value.filter(|a| !a.trim().is_empty())
}

/// Persisted unit: all issues in insertion order plus the id counter.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IssueCollection {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default = "first_id")]
    pub next_id: u64,
}

impl Default for IssueCollection {
    fn default() -> Self {
        Self { issues: Vec::new(), next_id: FIRST_ID }
    }
}

impl IssueCollection {
    /// Hand out the next id and advance the counter.
    /// A counter that fell behind the live ids (hand-edited file) is moved past them.
    /// The collection is left untouched when the id space is exhausted.
    pub fn allocate_id(&mut self) -> Result<u64, ServiceError> {
        let exhausted = || ServiceError::Storage("issue id space exhausted".into());
        let floor = match self.issues.iter().map(|i| i.id).max() {
            Some(max) => max.checked_add(1).ok_or_else(exhausted)?,
            None => FIRST_ID,
        };
        let id = self.next_id.max(floor);
        self.next_id = id.checked_add(1).ok_or_else(exhausted)?;
        Ok(id)
    }

    pub fn find(&self, id: u64) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == id)
    }

    pub fn find_mut(&mut self, id: u64) -> Option<&mut Issue> {
        self.issues.iter_mut().find(|i| i.id == id)
    }

    /// Remove by id, keeping the order of the remaining issues.
    pub fn remove(&mut self, id: u64) -> Option<Issue> {
        let idx = self.issues.iter().position(|i| i.id == id)?;
        Some(self.issues.remove(idx))
    }
}

/// Create payload. Only `title` is required; `null` optional fields take their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NewIssue {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl NewIssue {
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        match self.title.as_deref() {
            None => Err(ServiceError::validation("title is required")),
            Some(t) if t.trim().is_empty() => Err(ServiceError::validation("title must not be empty")),
            Some(_) => Ok(()),
        }
    }

    /// Build the stored record. Callers validate first.
    pub fn into_issue(self, id: u64, now: DateTime<Utc>) -> Issue {
        Issue {
            id,
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_else(default_status),
            priority: self.priority.unwrap_or_else(default_priority),
            assignee: normalize_assignee(self.assignee),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One field of a partial update: absent from the body, explicitly `null`, or a value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> FieldPatch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<T> From<T> for FieldPatch<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

// Only invoked when the key is present; `#[serde(default)]` covers the absent case.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldPatch<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(d)? {
            Some(v) => Self::Value(v),
            None => Self::Null,
        })
    }
}

impl<T: Serialize> Serialize for FieldPatch<T> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => s.serialize_some(v),
            Self::Absent | Self::Null => s.serialize_none(),
        }
    }
}

/// Update payload: only fields present in the request are applied.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct IssuePatch {
    #[serde(default, skip_serializing_if = "FieldPatch::is_absent")]
    pub title: FieldPatch<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_absent")]
    pub description: FieldPatch<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_absent")]
    pub status: FieldPatch<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_absent")]
    pub priority: FieldPatch<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_absent")]
    pub assignee: FieldPatch<String>,
}

impl IssuePatch {
    /// `assignee` may be cleared with `null`; the other fields are not nullable.
    pub fn validate(&self) -> Result<(), ServiceError> {
        for (name, field) in [
            ("title", &self.title),
            ("description", &self.description),
            ("status", &self.status),
            ("priority", &self.priority),
        ] {
            if matches!(field, FieldPatch::Null) {
                return Err(ServiceError::validation(format!("{name} cannot be null")));
            }
        }
        if let FieldPatch::Value(t) = &self.title {
            if t.trim().is_empty() {
                return Err(ServiceError::validation("title must not be empty"));
            }
        }
        Ok(())
    }

    /// Apply present fields and stamp `updated_at`. Callers validate first.
    pub fn apply_to(self, issue: &mut Issue, now: DateTime<Utc>) {
        if let FieldPatch::Value(v) = self.title { issue.title = v; }
        if let FieldPatch::Value(v) = self.description { issue.description = v; }
        if let FieldPatch::Value(v) = self.status { issue.status = v; }
        if let FieldPatch::Value(v) = self.priority { issue.priority = v; }
        match self.assignee {
            FieldPatch::Absent => {}
            FieldPatch::Null => issue.assignee = None,
            FieldPatch::Value(v) => issue.assignee = normalize_assignee(Some(v)),
        }
        issue.updated_at = now;
    }
}

/// Acknowledgment returned by delete: `{"status": "deleted", "id": N}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedIssue {
    pub status: String,
    pub id: u64,
}

impl DeletedIssue {
    pub fn new(id: u64) -> Self {
        Self { status: "deleted".into(), id }
    }
}
