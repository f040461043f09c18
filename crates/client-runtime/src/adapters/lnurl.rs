//! LNURL-pay invoice retrieval.
//!
//! Two round trips: the pay endpoint names a callback, the callback is asked
//! for an invoice with `amount` (millisats) and the signed payment request
//! as `nostr`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use shared_types::{Millisats, TransportEvent};
use tracing::debug;

use super::ports::InvoiceProvider;
use crate::errors::ClientError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct PayEndpoint {
    callback: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvoiceResponse {
    pr: Option<String>,
    reason: Option<String>,
}

/// Fetches invoices from an LNURL-pay endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct LnurlInvoiceProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl LnurlInvoiceProvider {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Payment(format!("http client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ClientError::Payment(e.to_string()))?
            .json::<T>()
            .await
            .map_err(|e| ClientError::Payment(format!("malformed LNURL response: {e}")))
    }
}

#[async_trait]
impl InvoiceProvider for LnurlInvoiceProvider {
    async fn fetch_invoice(
        &self,
        amount: Millisats,
        payment_request: &TransportEvent,
    ) -> Result<String, ClientError> {
        let endpoint: PayEndpoint = self.get_json(self.http.get(&self.endpoint)).await?;
        let callback = endpoint.callback.ok_or_else(|| {
            ClientError::Payment(
                endpoint
                    .reason
                    .unwrap_or_else(|| "pay endpoint has no callback".to_string()),
            )
        })?;
        debug!(%callback, amount, "Requesting invoice");

        let nostr = serde_json::to_string(payment_request)
            .map_err(|e| ClientError::Payment(e.to_string()))?;
        let response: InvoiceResponse = self
            .get_json(
                self.http
                    .get(&callback)
                    .query(&[("amount", amount.to_string()), ("nostr", nostr)]),
            )
            .await?;

        response.pr.ok_or_else(|| {
            ClientError::Payment(
                response
                    .reason
                    .unwrap_or_else(|| "callback returned no invoice".to_string()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_lnurl_shapes() {
        let pay: PayEndpoint = serde_json::from_str(
            r#"{"callback":"https://pay.test/cb","minSendable":1000,"tag":"payRequest"}"#,
        )
        .unwrap();
        assert_eq!(pay.callback.as_deref(), Some("https://pay.test/cb"));

        let err: InvoiceResponse =
            serde_json::from_str(r#"{"status":"ERROR","reason":"amount too low"}"#).unwrap();
        assert!(err.pr.is_none());
        assert_eq!(err.reason.as_deref(), Some("amount too low"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_payment_error() {
        let provider = LnurlInvoiceProvider::new("http://127.0.0.1:9/lnurlp").unwrap();
        let request = TransportEvent {
            id: shared_types::EventId::new("00".repeat(32)),
            pubkey: "ab".repeat(32),
            created_at: 0,
            kind: 9734,
            tags: vec![],
            content: String::new(),
            sig: String::new(),
        };
        let err = provider.fetch_invoice(1_000, &request).await.unwrap_err();
        assert!(matches!(err, ClientError::Payment(_)));
    }
}
