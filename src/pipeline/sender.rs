//! Result sender.
//!
//! A single task drains completed items in the order they finish, encodes
//! each outcome, and writes it back to the item's originating connection.
//! This is the only place response bytes leave the pipeline, so every
//! submitted command yields at most one response.

use super::item::{CompletedItem, ItemStage};
use crate::codec::{ErrorKind, ResultEnvelope, WireCodec};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

pub(crate) struct ResultSender {
    completion_rx: mpsc::UnboundedReceiver<CompletedItem>,
    codec: Arc<dyn WireCodec>,
}

impl ResultSender {
    pub(crate) fn new(
        completion_rx: mpsc::UnboundedReceiver<CompletedItem>,
        codec: Arc<dyn WireCodec>,
    ) -> Self {
        Self {
            completion_rx,
            codec,
        }
    }

    /// Runs until every worker has dropped its completion sender and all
    /// queued completions have been delivered.
    pub(crate) async fn run(mut self) {
        while let Some(completed) = self.completion_rx.recv().await {
            self.deliver(completed);
        }
        debug!("Result sender stopped");
    }

    /// Encodes one outcome and writes it to the originating connection.
    fn deliver(&self, completed: CompletedItem) {
        let CompletedItem { item, outcome } = completed;
        let envelope = ResultEnvelope::from_outcome(&item.command.handler_id, outcome);

        let bytes = match self.codec.encode_result(&envelope) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(
                    item_id = item.id,
                    handler = %item.command.handler_id,
                    error = %err,
                    "Failed to encode result, substituting error envelope"
                );
                // A minimal error envelope stands in for an unencodable
                // result so the connection still gets its one response.
                let fallback = ResultEnvelope::Err {
                    handler_id: item.command.handler_id.clone(),
                    kind: ErrorKind::HandlerFailed,
                    message: "result could not be encoded".to_string(),
                };
                match self.codec.encode_result(&fallback) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        error!(
                            item_id = item.id,
                            error = %err,
                            "Codec rejected the fallback error envelope"
                        );
                        return;
                    }
                }
            }
        };

        match item.connection.send(bytes) {
            Ok(()) => {
                item.set_stage(ItemStage::Sent);
                debug!(
                    item_id = item.id,
                    connection = item.connection.id(),
                    elapsed_ms = item.submitted_at.elapsed().as_millis() as u64,
                    "Result sent"
                );
            }
            Err(err) => {
                // The caller went away; the result is dropped, not retried.
                warn!(
                    item_id = item.id,
                    connection = item.connection.id(),
                    error = %err,
                    "Failed to deliver result"
                );
            }
        }
    }
}
