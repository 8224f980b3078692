//! NATS message producer for verdicts

use crate::types::VerdictMessage;
use anyhow::Result;
use async_nats::{Client, Subject};
use std::future::Future;
use tracing::{debug, warn};

/// Producer for publishing verdicts to NATS
#[derive(Clone)]
pub struct VerdictProducer {
    client: Client,
    subject: String,
}

impl VerdictProducer {
    /// Create a new verdict producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a verdict to the request's reply subject when the claim was
    /// sent as a NATS request, and always to the verdict subject.
    ///
    /// A failed publish does not stop the other one; the first error is
    /// returned once both were attempted.
    pub async fn publish(&self, verdict: &VerdictMessage, reply: Option<&Subject>) -> Result<()> {
        let payload = serde_json::to_vec(verdict)?;

        let targets = reply
            .cloned()
            .into_iter()
            .chain(std::iter::once(Subject::from(self.subject.as_str())));

        publish_to_each(targets, |subject| {
            let client = self.client.clone();
            let payload = payload.clone();
            async move {
                client
                    .publish(subject, payload.into())
                    .await
                    .map_err(anyhow::Error::from)
            }
        })
        .await?;

        debug!(
            verdict_id = %verdict.verdict_id,
            claim_id = %verdict.claim_id,
            replied = reply.is_some(),
            "Published verdict"
        );

        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Run `publish` for every subject in order, then report the first failure.
async fn publish_to_each<I, F, Fut>(subjects: I, mut publish: F) -> Result<()>
where
    I: IntoIterator<Item = Subject>,
    F: FnMut(Subject) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut first_error = None;

    for subject in subjects {
        if let Err(e) = publish(subject.clone()).await {
            warn!(subject = %subject, error = %e, "Failed to publish verdict");
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
