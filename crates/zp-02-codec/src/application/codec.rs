//! Builds and reads canvas events.

use shared_types::{
    tag_names, EventId, PlacementBatch, Tag, TagSet, Timestamp, TransportEvent, UnsignedEvent,
    APP_NAME, ENCODING_V1, KIND_PAYMENT_RECEIPT, KIND_PAYMENT_REQUEST, KIND_PLACEMENT,
    PROTOCOL_VERSION,
};

use crate::algorithms::{decode_pixels, encode_pixels};
use crate::domain::{CodecError, DecodedPlacement, PaymentReceipt, SettlementReceipt};

/// Event codec bound to one canvas and its relay set.
#[derive(Debug, Clone)]
pub struct PlacementCodec {
    canvas_pubkey: String,
    relays: Vec<String>,
}

impl PlacementCodec {
    pub fn new(canvas_pubkey: impl Into<String>, relays: Vec<String>) -> Self {
        Self {
            canvas_pubkey: canvas_pubkey.into(),
            relays,
        }
    }

    pub fn canvas_pubkey(&self) -> &str {
        &self.canvas_pubkey
    }

    /// Builds an unsigned placement event.
    pub fn encode_placement(
        &self,
        batch: &PlacementBatch,
        requires_payment: bool,
        created_at: Timestamp,
    ) -> Result<UnsignedEvent, CodecError> {
        let content = encode_pixels(&batch.pixels)?;

        let mut tags = self.common_tags(batch.amount);
        tags.push(tag(tag_names::ENCODING, ENCODING_V1));
        tags.push(tag(tag_names::VERSION, PROTOCOL_VERSION));
        if requires_payment {
            tags.push(tag(tag_names::REQUIRES_PAYMENT, "true"));
        }
        if let Some(message) = &batch.message {
            tags.push(tag(tag_names::MESSAGE, message));
        }
        if let Some(url) = &batch.url {
            tags.push(tag(tag_names::URL, url));
        }

        Ok(UnsignedEvent {
            created_at,
            kind: KIND_PLACEMENT,
            tags,
            content,
        })
    }

    /// Builds the payment request that pays for `placement_id`.
    /// Carries no pixel data.
    pub fn payment_request(
        &self,
        batch: &PlacementBatch,
        placement_id: &EventId,
        created_at: Timestamp,
    ) -> UnsignedEvent {
        let mut tags = self.common_tags(batch.amount);
        tags.push(tag(tag_names::PIXEL_EVENT_ID, placement_id.as_str()));
        tags.push(tag(tag_names::VERSION, PROTOCOL_VERSION));

        UnsignedEvent {
            created_at,
            kind: KIND_PAYMENT_REQUEST,
            tags,
            content: format!(
                "Zap request for {} pixels on {}",
                batch.pixels.len(),
                APP_NAME
            ),
        }
    }

    /// Reads a placement event.
    pub fn decode_placement(&self, event: &TransportEvent) -> Result<DecodedPlacement, CodecError> {
        expect_kind(event, KIND_PLACEMENT)?;
        decode_payload(event)
    }

    /// Reads the payment request embedded in a legacy receipt as a placement.
    pub fn decode_legacy_request(
        &self,
        request: &TransportEvent,
    ) -> Result<DecodedPlacement, CodecError> {
        expect_kind(request, KIND_PAYMENT_REQUEST)?;
        decode_payload(request)
    }

    /// Reads a payment receipt.
    ///
    /// The embedded request decides the protocol generation. Requests from
    /// other applications are rejected.
    pub fn decode_receipt(&self, event: &TransportEvent) -> Result<PaymentReceipt, CodecError> {
        expect_kind(event, KIND_PAYMENT_RECEIPT)?;
        let description = event
            .tag_value(tag_names::DESCRIPTION)
            .ok_or(CodecError::MissingTag(tag_names::DESCRIPTION))?;
        let request: TransportEvent = serde_json::from_str(description)
            .map_err(|e| CodecError::MalformedDescription(e.to_string()))?;

        let request_tags = request.tag_set();
        if !request_tags.is_application() {
            return Err(CodecError::ForeignApplication(request_tags.app));
        }

        if !request_tags.is_current_version() {
            return Ok(PaymentReceipt::Legacy {
                receipt_id: event.id.clone(),
                issuer: event.pubkey.clone(),
                request,
            });
        }

        let placement_id = request_tags
            .pixel_event_id
            .ok_or(CodecError::MissingTag(tag_names::PIXEL_EVENT_ID))?;

        Ok(PaymentReceipt::Settlement(SettlementReceipt {
            receipt_id: event.id.clone(),
            issuer: event.pubkey.clone(),
            placement_id,
            amount: request_tags.amount,
            created_at: event.created_at,
        }))
    }

    fn common_tags(&self, amount: u64) -> Vec<Tag> {
        let mut relays = Vec::with_capacity(self.relays.len() + 1);
        relays.push(tag_names::RELAYS.to_string());
        relays.extend(self.relays.iter().cloned());

        vec![
            tag(tag_names::TARGET, &self.canvas_pubkey),
            relays,
            tag(tag_names::AMOUNT, &amount.to_string()),
            tag(tag_names::APP, APP_NAME),
        ]
    }
}

fn tag(name: &str, value: &str) -> Tag {
    vec![name.to_string(), value.to_string()]
}

fn expect_kind(event: &TransportEvent, expected: u32) -> Result<(), CodecError> {
    if event.kind == expected {
        Ok(())
    } else {
        Err(CodecError::WrongKind {
            expected,
            actual: event.kind,
        })
    }
}

fn decode_payload(event: &TransportEvent) -> Result<DecodedPlacement, CodecError> {
    let tags = TagSet::parse(&event.tags);
    if !tags.is_application() {
        return Err(CodecError::ForeignApplication(tags.app));
    }
    if let Some(encoding) = &tags.encoding {
        if encoding != ENCODING_V1 {
            return Err(CodecError::UnsupportedEncoding(encoding.clone()));
        }
    }
    let amount = tags.amount.ok_or(CodecError::MissingTag(tag_names::AMOUNT))?;
    let pixels = decode_pixels(&event.content)?;

    let batch = PlacementBatch {
        pixels,
        amount,
        message: tags.message.clone(),
        url: tags.url.clone(),
        author: Some(event.pubkey.clone()),
        timestamp: Some(event.created_at),
    };

    Ok(DecodedPlacement {
        event_id: event.id.clone(),
        author: event.pubkey.clone(),
        created_at: event.created_at,
        batch,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Pixel;

    const CANVAS: &str = "c0ffee";

    fn codec() -> PlacementCodec {
        PlacementCodec::new(CANVAS, vec!["wss://a".into(), "wss://b".into()])
    }

    fn batch() -> PlacementBatch {
        PlacementBatch::new(
            vec![Pixel::new(1, 2, "#ff0000"), Pixel::new(3, 4, "#00ff00")],
            2000,
        )
        .with_message("hi")
    }

    fn seal(unsigned: UnsignedEvent, id: &str) -> TransportEvent {
        TransportEvent {
            id: EventId::new(id),
            pubkey: "a1".repeat(32),
            created_at: unsigned.created_at,
            kind: unsigned.kind,
            tags: unsigned.tags,
            content: unsigned.content,
            sig: String::new(),
        }
    }

    fn receipt_with(request: &TransportEvent) -> TransportEvent {
        TransportEvent {
            id: EventId::new("r1"),
            pubkey: "b2".repeat(32),
            created_at: 1_760_000_100,
            kind: KIND_PAYMENT_RECEIPT,
            tags: vec![
                tag("p", CANVAS),
                tag("description", &serde_json::to_string(request).unwrap()),
            ],
            content: String::new(),
            sig: String::new(),
        }
    }

    #[test]
    fn test_placement_tags() {
        let event = codec().encode_placement(&batch(), true, 1_760_000_000).unwrap();
        assert_eq!(event.kind, KIND_PLACEMENT);
        assert_eq!(event.tag_value("p"), Some(CANVAS));
        assert_eq!(event.tag_value("amount"), Some("2000"));
        assert_eq!(event.tag_value("app"), Some(APP_NAME));
        assert_eq!(event.tag_value("encoding"), Some(ENCODING_V1));
        assert_eq!(event.tag_value("version"), Some("2"));
        assert_eq!(event.tag_value("requires_payment"), Some("true"));
        assert_eq!(event.tag_value("message"), Some("hi"));
        assert_eq!(event.tag_value("url"), None);
        let relays = event.tags.iter().find(|t| t[0] == "relays").unwrap();
        assert_eq!(relays[1..], ["wss://a".to_string(), "wss://b".to_string()]);
    }

    #[test]
    fn test_unpaid_placement_omits_requirement() {
        let event = codec().encode_placement(&batch(), false, 1).unwrap();
        assert_eq!(event.tag_value("requires_payment"), None);
    }

    #[test]
    fn test_decode_placement_fills_author_and_time() {
        let event = seal(codec().encode_placement(&batch(), true, 1_760_000_000).unwrap(), "e1");
        let decoded = codec().decode_placement(&event).unwrap();
        assert_eq!(decoded.batch.pixels, batch().pixels);
        assert_eq!(decoded.batch.amount, 2000);
        assert_eq!(decoded.batch.author.as_deref(), Some(event.pubkey.as_str()));
        assert_eq!(decoded.batch.timestamp, Some(1_760_000_000));
        assert!(decoded.requires_payment());
    }

    #[test]
    fn test_decode_rejects_other_app_and_encoding() {
        let mut event = seal(codec().encode_placement(&batch(), true, 1).unwrap(), "e1");
        for t in event.tags.iter_mut().filter(|t| t[0] == "app") {
            t[1] = "Other".into();
        }
        assert_eq!(
            codec().decode_placement(&event),
            Err(CodecError::ForeignApplication(Some("Other".into())))
        );

        let mut event = seal(codec().encode_placement(&batch(), true, 1).unwrap(), "e1");
        for t in event.tags.iter_mut().filter(|t| t[0] == "encoding") {
            t[1] = "brotli:v9".into();
        }
        assert!(matches!(
            codec().decode_placement(&event),
            Err(CodecError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_decode_requires_amount() {
        let mut event = seal(codec().encode_placement(&batch(), true, 1).unwrap(), "e1");
        event.tags.retain(|t| t[0] != "amount");
        assert_eq!(
            codec().decode_placement(&event),
            Err(CodecError::MissingTag("amount"))
        );
    }

    #[test]
    fn test_payment_request_references_placement() {
        let request = codec().payment_request(&batch(), &EventId::new("e1"), 5);
        assert_eq!(request.kind, KIND_PAYMENT_REQUEST);
        assert_eq!(request.tag_value("pixel_event_id"), Some("e1"));
        assert_eq!(request.tag_value("amount"), Some("2000"));
        assert_eq!(request.tag_value("encoding"), None);
        assert_eq!(request.content, "Zap request for 2 pixels on Zappy Place");
    }

    #[test]
    fn test_settlement_receipt() {
        let request = seal(codec().payment_request(&batch(), &EventId::new("e1"), 5), "q1");
        let receipt = codec().decode_receipt(&receipt_with(&request)).unwrap();
        match receipt {
            PaymentReceipt::Settlement(s) => {
                assert_eq!(s.placement_id, EventId::new("e1"));
                assert_eq!(s.amount, Some(2000));
                assert_eq!(s.issuer, "b2".repeat(32));
            }
            other => panic!("expected settlement, got {other:?}"),
        }
    }

    #[test]
    fn test_legacy_receipt_carries_pixels() {
        // Older clients put the pixels straight into the payment request.
        let mut legacy = codec().encode_placement(&batch(), false, 7).unwrap();
        legacy.kind = KIND_PAYMENT_REQUEST;
        legacy.tags.retain(|t| t[0] != "version");
        let request = seal(legacy, "q2");

        let receipt = codec().decode_receipt(&receipt_with(&request)).unwrap();
        let PaymentReceipt::Legacy { request, .. } = receipt else {
            panic!("expected legacy receipt");
        };
        let decoded = codec().decode_legacy_request(&request).unwrap();
        assert_eq!(decoded.batch.pixels, batch().pixels);
    }

    #[test]
    fn test_receipt_for_other_app_is_rejected() {
        let mut request = seal(codec().payment_request(&batch(), &EventId::new("e1"), 5), "q1");
        request.tags.retain(|t| t[0] != "app");
        assert_eq!(
            codec().decode_receipt(&receipt_with(&request)),
            Err(CodecError::ForeignApplication(None))
        );
    }

    #[test]
    fn test_receipt_without_description() {
        let mut receipt = receipt_with(&seal(
            codec().payment_request(&batch(), &EventId::new("e1"), 5),
            "q1",
        ));
        receipt.tags.retain(|t| t[0] != "description");
        assert_eq!(
            codec().decode_receipt(&receipt),
            Err(CodecError::MissingTag("description"))
        );

        receipt.tags.push(tag("description", "{not json"));
        assert!(matches!(
            codec().decode_receipt(&receipt),
            Err(CodecError::MalformedDescription(_))
        ));
    }
}
