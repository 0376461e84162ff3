//! Event model for the monitored GitHub activity kinds.
//!
//! The source delivers loosely typed JSON records. They enter the system as
//! [`RawEvent`] and are narrowed into the closed [`Event`] model by
//! [`parse_event`]; anything outside the three monitored kinds is rejected at
//! this boundary and never reaches the store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ParseError;

/// The closed set of event kinds the service retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "PullRequestEvent")]
    PullRequest,
    #[serde(rename = "WatchEvent")]
    Watch,
    #[serde(rename = "IssuesEvent")]
    Issues,
}

impl EventKind {
    /// Every monitored kind, in reporting order.
    pub const ALL: [EventKind; 3] = [EventKind::PullRequest, EventKind::Watch, EventKind::Issues];

    /// Wire tag used by the GitHub events API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PullRequest => "PullRequestEvent",
            Self::Watch => "WatchEvent",
            Self::Issues => "IssuesEvent",
        }
    }

    /// Resolve a wire tag. Tags are case-sensitive, as GitHub sends them.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-assigned event identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoName(String);

impl RepoName {
    /// Validate and wrap an `owner/name` identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, ParseError> {
        let name = name.into();
        match name.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self(name)),
            _ => Err(ParseError::invalid("repo", format!("`{name}` is not in owner/name form"))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A retained event. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub repo: RepoName,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(id: EventId, kind: EventKind, repo: RepoName, created_at: DateTime<Utc>) -> Self {
        Self { id, kind, repo, created_at }
    }
}

/// A record as received from the source, before validation.
///
/// Every field is optional; [`parse_event`] decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub repo: Option<String>,
    pub created_at: Option<String>,
}

impl RawEvent {
    /// Extract the fields of interest from a GitHub event object.
    ///
    /// Numeric ids are accepted and stringified. Non-object values produce an
    /// empty record, which [`parse_event`] reports as malformed.
    pub fn from_json(value: &Value) -> Self {
        let id = match value.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Self {
            id,
            kind: string_field(value.get("type")),
            repo: string_field(value.get("repo").and_then(|repo| repo.get("name"))),
            created_at: string_field(value.get("created_at")),
        }
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_owned)
}

/// Narrow a raw record into an [`Event`].
///
/// The type tag is checked first so unsupported records are reported as
/// [`ParseError::UnsupportedType`] even when other fields are incomplete.
pub fn parse_event(raw: &RawEvent) -> Result<Event, ParseError> {
    let tag = raw.kind.as_deref().ok_or_else(|| ParseError::missing("type"))?;
    let kind =
        EventKind::from_tag(tag).ok_or_else(|| ParseError::UnsupportedType(tag.to_owned()))?;

    let id = match raw.id.as_deref() {
        Some(id) if !id.trim().is_empty() => EventId::new(id),
        Some(_) => return Err(ParseError::invalid("id", "is empty")),
        None => return Err(ParseError::missing("id")),
    };

    let repo = RepoName::new(raw.repo.clone().ok_or_else(|| ParseError::missing("repo"))?)?;

    let created_at = raw.created_at.as_deref().ok_or_else(|| ParseError::missing("created_at"))?;
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .map_err(|err| ParseError::invalid("created_at", err.to_string()))?
        .with_timezone(&Utc);

    Ok(Event { id, kind, repo, created_at })
}

impl TryFrom<&RawEvent> for Event {
    type Error = ParseError;

    fn try_from(raw: &RawEvent) -> Result<Self, Self::Error> {
        parse_event(raw)
    }
}
