//! # Relay Event Shapes
//!
//! The signed transport event exactly as relays serialize it, its unsigned
//! precursor, and subscription filters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::Timestamp;
use crate::tags::TagSet;

/// Lowercase hex sha256 of an event's canonical serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
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

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One tag: a name followed by zero or more values.
pub type Tag = Vec<String>;

/// A signed event as exchanged with relays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportEvent {
    pub id: EventId,
    pub pubkey: String,
    pub created_at: Timestamp,
    pub kind: u32,
    pub tags: Vec<Tag>,
    pub content: String,
    pub sig: String,
}

impl TransportEvent {
    /// First value of the first tag called `name`.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        first_tag_value(&self.tags, name)
    }

    pub fn tag_set(&self) -> TagSet {
        TagSet::parse(&self.tags)
    }
}

/// An event before the signer has assigned id, pubkey and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedEvent {
    pub created_at: Timestamp,
    pub kind: u32,
    pub tags: Vec<Tag>,
    pub content: String,
}

impl UnsignedEvent {
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        first_tag_value(&self.tags, name)
    }
}

pub(crate) fn first_tag_value<'a>(tags: &'a [Tag], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.first().map(String::as_str) == Some(name))
        .and_then(|tag| tag.get(1))
        .map(String::as_str)
}

/// Relay subscription filter. Absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<u32>>,
    #[serde(rename = "#p", default, skip_serializing_if = "Option::is_none")]
    pub p_tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = u32>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn p_tag(mut self, pubkey: impl Into<String>) -> Self {
        self.p_tags.get_or_insert_with(Vec::new).push(pubkey.into());
        self
    }

    pub fn since(mut self, since: Timestamp) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: Timestamp) -> Self {
        self.until = Some(until);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a relay honoring this filter would deliver `event`.
    /// `limit` only bounds stored-event replay and is ignored here.
    pub fn matches(&self, event: &TransportEvent) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.iter().any(|id| id == event.id.as_str()) {
                return false;
            }
        }
        if let Some(authors) = &self.authors {
            if !authors.iter().any(|a| *a == event.pubkey) {
                return false;
            }
        }
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }
        if let Some(targets) = &self.p_tags {
            let tagged = event.tags.iter().any(|tag| {
                tag.first().map(String::as_str) == Some("p")
                    && tag.get(1).is_some_and(|v| targets.contains(v))
            });
            if !tagged {
                return false;
            }
        }
        if self.since.is_some_and(|since| event.created_at < since) {
            return false;
        }
        if self.until.is_some_and(|until| event.created_at > until) {
            return false;
        }
        true
    }
}
