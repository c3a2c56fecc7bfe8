//! HTTP beacon transport.
//!
//! `send` serializes the batch and hands it to a detached forwarding task
//! over an unbounded channel, then returns; the caller never waits on the
//! network. The task keeps running after the transport (and the reporter
//! that owned it) is dropped, draining whatever was queued, so a
//! teardown-time flush still reaches the wire.
//!
//! Delivery outcome is logged at debug level and otherwise discarded: no
//! retry, no surfaced errors.

use tokio::sync::mpsc;

use pagebeat_types::Envelope;

use crate::transport::Transport;

pub struct BeaconTransport {
    endpoint: String,
    sender: mpsc::UnboundedSender<String>,
}

impl BeaconTransport {
    /// Create the transport and spawn its forwarding task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(forward(endpoint.clone(), receiver));
        Self { endpoint, sender }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for BeaconTransport {
    fn send(&self, batch: &[Envelope]) {
        let payload = match serde_json::to_string(batch) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize batch");
                return;
            }
        };
        // A closed channel means the runtime is gone; nothing to do with the
        // payload either way.
        let _ = self.sender.send(payload);
    }
}

async fn forward(endpoint: String, mut receiver: mpsc::UnboundedReceiver<String>) {
    let client = reqwest::Client::new();
    // Runs until every sender is dropped and the queue is drained.
    while let Some(payload) = receiver.recv().await {
        let result = client
            .post(&endpoint)
            .header("content-type", "application/json")
            .body(payload)
            .send()
            .await;
        match result {
            Ok(response) => {
                tracing::debug!(status = %response.status(), "beacon delivered");
            }
            Err(e) => {
                tracing::debug!(error = %e, "beacon delivery failed");
            }
        }
    }
    tracing::debug!(endpoint = %endpoint, "beacon forwarder stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagebeat_types::{AnonymousId, Properties, SessionId};

    #[tokio::test]
    async fn test_send_does_not_block_or_panic() {
        // Port 9 (discard) is not listening; delivery fails silently.
        let transport = BeaconTransport::new("http://127.0.0.1:9/t");
        let envelope = Envelope::new(
            "$page_view",
            AnonymousId::new("a"),
            SessionId::new("s"),
            Properties::new(),
            Properties::new(),
        );
        transport.send(&[envelope]);
        assert_eq!(transport.endpoint(), "http://127.0.0.1:9/t");
    }
}
