//! Relay wire frames.
//!
//! Every frame is a JSON array whose first element names the message.

use serde_json::{json, Value};
use shared_types::{EventId, Filter, TransportEvent};

use super::RelayError;

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// `["EVENT", event]`
    Event(TransportEvent),
    /// `["REQ", id, filter...]`
    Req {
        subscription_id: String,
        filters: Vec<Filter>,
    },
    /// `["CLOSE", id]`
    Close(String),
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, RelayError> {
        let frame = match self {
            ClientMessage::Event(event) => json!(["EVENT", event]),
            ClientMessage::Req {
                subscription_id,
                filters,
            } => {
                let mut parts = Vec::with_capacity(filters.len() + 2);
                parts.push(json!("REQ"));
                parts.push(json!(subscription_id));
                for filter in filters {
                    parts.push(
                        serde_json::to_value(filter)
                            .map_err(|e| RelayError::InvalidMessage(e.to_string()))?,
                    );
                }
                Value::Array(parts)
            }
            ClientMessage::Close(subscription_id) => json!(["CLOSE", subscription_id]),
        };
        Ok(frame.to_string())
    }
}

/// Frames received from a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// `["EVENT", id, event]`
    Event {
        subscription_id: String,
        event: TransportEvent,
    },
    /// `["EOSE", id]`: stored events are exhausted.
    Eose(String),
    /// `["OK", event_id, accepted, message]`
    Ok {
        event_id: EventId,
        accepted: bool,
        message: String,
    },
    /// `["CLOSED", id, message]`: the relay ended a subscription.
    Closed {
        subscription_id: String,
        message: String,
    },
    /// `["NOTICE", message]`
    Notice(String),
    /// `["AUTH", challenge]`
    Auth(String),
}

impl RelayMessage {
    pub fn from_json(text: &str) -> Result<Self, RelayError> {
        let frame: Vec<Value> =
            serde_json::from_str(text).map_err(|e| RelayError::InvalidMessage(e.to_string()))?;
        let label = frame
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing message label"))?;

        match label {
            "EVENT" => {
                let subscription_id = string_at(&frame, 1)?;
                let raw = frame.get(2).cloned().ok_or_else(|| invalid("EVENT without event"))?;
                let event = serde_json::from_value(raw)
                    .map_err(|e| RelayError::InvalidMessage(e.to_string()))?;
                Ok(RelayMessage::Event {
                    subscription_id,
                    event,
                })
            }
            "EOSE" => Ok(RelayMessage::Eose(string_at(&frame, 1)?)),
            "OK" => Ok(RelayMessage::Ok {
                event_id: EventId::new(string_at(&frame, 1)?),
                accepted: frame
                    .get(2)
                    .and_then(Value::as_bool)
                    .ok_or_else(|| invalid("OK without status"))?,
                message: optional_string_at(&frame, 3),
            }),
            "CLOSED" => Ok(RelayMessage::Closed {
                subscription_id: string_at(&frame, 1)?,
                message: optional_string_at(&frame, 2),
            }),
            "NOTICE" => Ok(RelayMessage::Notice(optional_string_at(&frame, 1))),
            "AUTH" => Ok(RelayMessage::Auth(optional_string_at(&frame, 1))),
            other => Err(invalid(&format!("unknown message {other:?}"))),
        }
    }
}

fn invalid(reason: &str) -> RelayError {
    RelayError::InvalidMessage(reason.to_string())
}

fn string_at(frame: &[Value], index: usize) -> Result<String, RelayError> {
    frame
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(&format!("expected string at position {index}")))
}

fn optional_string_at(frame: &[Value], index: usize) -> String {
    frame
        .get(index)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> TransportEvent {
        TransportEvent {
            id: EventId::new("aa"),
            pubkey: "bb".into(),
            created_at: 5,
            kind: 90001,
            tags: vec![vec!["p".into(), "cc".into()]],
            content: "x".into(),
            sig: "dd".into(),
        }
    }

    #[test]
    fn test_req_frame_flattens_filters() {
        let frame = ClientMessage::Req {
            subscription_id: "s1".into(),
            filters: vec![Filter::new().kinds([90001]), Filter::new().limit(5)],
        }
        .to_json()
        .unwrap();
        assert_eq!(frame, r#"["REQ","s1",{"kinds":[90001]},{"limit":5}]"#);
    }

    #[test]
    fn test_close_and_event_frames() {
        assert_eq!(
            ClientMessage::Close("s1".into()).to_json().unwrap(),
            r#"["CLOSE","s1"]"#
        );
        let frame = ClientMessage::Event(event()).to_json().unwrap();
        assert!(frame.starts_with(r#"["EVENT",{"#));
    }

    #[test]
    fn test_parse_event() {
        let text = format!(
            r#"["EVENT","s1",{}]"#,
            serde_json::to_string(&event()).unwrap()
        );
        assert_eq!(
            RelayMessage::from_json(&text).unwrap(),
            RelayMessage::Event {
                subscription_id: "s1".into(),
                event: event()
            }
        );
    }

    #[test]
    fn test_parse_control_frames() {
        assert_eq!(
            RelayMessage::from_json(r#"["EOSE","s1"]"#).unwrap(),
            RelayMessage::Eose("s1".into())
        );
        assert_eq!(
            RelayMessage::from_json(r#"["OK","e1",false,"blocked: spam"]"#).unwrap(),
            RelayMessage::Ok {
                event_id: EventId::new("e1"),
                accepted: false,
                message: "blocked: spam".into()
            }
        );
        assert_eq!(
            RelayMessage::from_json(r#"["OK","e1",true]"#).unwrap(),
            RelayMessage::Ok {
                event_id: EventId::new("e1"),
                accepted: true,
                message: String::new()
            }
        );
        assert_eq!(
            RelayMessage::from_json(r#"["CLOSED","s1","error: shutting down"]"#).unwrap(),
            RelayMessage::Closed {
                subscription_id: "s1".into(),
                message: "error: shutting down".into()
            }
        );
        assert_eq!(
            RelayMessage::from_json(r#"["NOTICE","hi"]"#).unwrap(),
            RelayMessage::Notice("hi".into())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RelayMessage::from_json("not json").is_err());
        assert!(RelayMessage::from_json("[]").is_err());
        assert!(RelayMessage::from_json(r#"["WHAT"]"#).is_err());
        assert!(RelayMessage::from_json(r#"["EVENT","s1",{"id":1}]"#).is_err());
        assert!(RelayMessage::from_json(r#"["OK","e1"]"#).is_err());
    }
}
