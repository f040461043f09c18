//! Typed view over an event's tag list.

use crate::constants::{tag_names, APP_NAME, PROTOCOL_VERSION};
use crate::entities::Millisats;
use crate::event::{first_tag_value, EventId, Tag};

/// Known tags extracted from an event. The first occurrence of a tag wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    pub target: Option<String>,
    pub relays: Vec<String>,
    /// `None` when absent or not an unsigned integer.
    pub amount: Option<Millisats>,
    pub app: Option<String>,
    pub encoding: Option<String>,
    pub version: Option<String>,
    /// Set by any non-empty `requires_payment` value.
    pub requires_payment: bool,
    pub message: Option<String>,
    pub url: Option<String>,
    pub pixel_event_id: Option<EventId>,
    pub description: Option<String>,
}

impl TagSet {
    pub fn parse(tags: &[Tag]) -> Self {
        let value = |name: &str| first_tag_value(tags, name).map(str::to_string);
        let relays = tags
            .iter()
            .find(|tag| tag.first().map(String::as_str) == Some(tag_names::RELAYS))
            .map(|tag| tag.iter().skip(1).cloned().collect())
            .unwrap_or_default();

        Self {
            target: value(tag_names::TARGET),
            relays,
            amount: first_tag_value(tags, tag_names::AMOUNT).and_then(|v| v.parse().ok()),
            app: value(tag_names::APP),
            encoding: value(tag_names::ENCODING),
            version: value(tag_names::VERSION),
            requires_payment: first_tag_value(tags, tag_names::REQUIRES_PAYMENT)
                .is_some_and(|v| !v.is_empty()),
            message: value(tag_names::MESSAGE),
            url: value(tag_names::URL),
            pixel_event_id: value(tag_names::PIXEL_EVENT_ID).map(EventId::new),
            description: value(tag_names::DESCRIPTION),
        }
    }

    pub fn is_application(&self) -> bool {
        self.app.as_deref() == Some(APP_NAME)
    }

    pub fn is_current_version(&self) -> bool {
        self.version.as_deref() == Some(PROTOCOL_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(parts: &[&str]) -> Tag {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_placement_tags() {
        let tags = vec![
            tag(&["p", "canvas"]),
            tag(&["relays", "wss://a", "wss://b"]),
            tag(&["amount", "5000"]),
            tag(&["app", "Zappy Place"]),
            tag(&["encoding", "gzip+base64:v1"]),
            tag(&["version", "2"]),
            tag(&["requires_payment", "true"]),
            tag(&["message", "hello"]),
        ];
        let set = TagSet::parse(&tags);
        assert_eq!(set.target.as_deref(), Some("canvas"));
        assert_eq!(set.relays, vec!["wss://a", "wss://b"]);
        assert_eq!(set.amount, Some(5000));
        assert!(set.is_application());
        assert!(set.is_current_version());
        assert!(set.requires_payment);
        assert_eq!(set.message.as_deref(), Some("hello"));
        assert!(set.url.is_none());
    }

    #[test]
    fn test_non_numeric_amount_is_absent() {
        let set = TagSet::parse(&[tag(&["amount", "lots"])]);
        assert_eq!(set.amount, None);
    }

    #[test]
    fn test_any_requires_payment_value_counts() {
        assert!(TagSet::parse(&[tag(&["requires_payment", "1"])]).requires_payment);
        assert!(TagSet::parse(&[tag(&["requires_payment", "false"])]).requires_payment);
        assert!(!TagSet::parse(&[tag(&["requires_payment", ""])]).requires_payment);
        assert!(!TagSet::parse(&[tag(&["requires_payment"])]).requires_payment);
        assert!(!TagSet::parse(&[]).requires_payment);
    }
}
