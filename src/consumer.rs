//! NATS message consumer for incoming claim requests

use crate::types::ClaimRequest;
use anyhow::{Context, Result};
use async_nats::{Client, Subscriber};
use tracing::info;

/// Consumer for receiving claim requests from NATS
pub struct ClaimConsumer {
    client: Client,
    subject: String,
    queue_group: Option<String>,
}

impl ClaimConsumer {
    /// Create a new claim consumer
    pub fn new(client: Client, subject: &str, queue_group: Option<String>) -> Self {
        Self {
            client,
            subject: subject.to_string(),
            queue_group,
        }
    }

    /// Subscribe to the claim subject, joining the queue group when configured
    pub async fn subscribe(&self) -> Result<Subscriber> {
        let subscriber = match &self.queue_group {
            Some(group) => {
                self.client
                    .queue_subscribe(self.subject.clone(), group.clone())
                    .await?
            }
            None => self.client.subscribe(self.subject.clone()).await?,
        };

        info!(
            subject = %self.subject,
            queue_group = ?self.queue_group,
            "Subscribed to claim subject"
        );
        Ok(subscriber)
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Decode a claim request payload.
pub fn decode_claim(payload: &[u8]) -> Result<ClaimRequest> {
    serde_json::from_slice(payload).context("Failed to deserialize claim request")
}

/// Best-effort claim id from a payload that failed to decode, so the
/// rejection can still be matched to its claim.
pub fn claim_id_hint(payload: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(payload).ok()?;
    let id = value.get("claim_id").or_else(|| value.get("id"))?;

    match id {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
