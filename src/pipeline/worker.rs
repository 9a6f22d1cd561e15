//! Pipeline workers.
//!
//! Each worker pulls items off the shared bounded queue, dispatches them,
//! and forwards the completed item to the result sender. A dispatch failure
//! marks the item `Failed` and produces an error result; it never terminates
//! the worker.

use super::item::{CompletedItem, ItemStage, PipelineItem};
use crate::dispatch::{DispatchError, Dispatcher};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A single pipeline worker.
///
/// Workers share one receiver behind a mutex: only the dequeue is
/// serialized, dispatch runs concurrently across the pool.
pub(crate) struct Worker {
    pub worker_id: usize,
    pub work_rx: Arc<Mutex<mpsc::Receiver<PipelineItem>>>,
    pub dispatcher: Dispatcher,
    pub completion_tx: mpsc::UnboundedSender<CompletedItem>,
    pub dispatch_timeout: Option<Duration>,
}

impl Worker {
    /// Runs until the queue is closed or shutdown has fired and the queue
    /// has drained.
    pub(crate) async fn run(self, shutdown: CancellationToken) {
        debug!(worker_id = self.worker_id, "Worker started");

        loop {
            let next = self.next_item(&shutdown).await;
            let Some(item) = next else {
                break;
            };
            self.process_item(item).await;
        }

        debug!(worker_id = self.worker_id, "Worker stopped");
    }

    /// Dequeues the next item.
    ///
    /// Before shutdown this waits on the queue; after shutdown it only
    /// drains what is already queued and returns `None` once empty.
    async fn next_item(&self, shutdown: &CancellationToken) -> Option<PipelineItem> {
        let mut work_rx = self.work_rx.lock().await;

        if shutdown.is_cancelled() {
            return work_rx.try_recv().ok();
        }

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => work_rx.try_recv().ok(),

            item = work_rx.recv() => item,
        }
    }

    /// Dispatches one item and forwards it to the result sender.
    async fn process_item(&self, item: PipelineItem) {
        item.set_stage(ItemStage::Running);
        debug!(
            worker_id = self.worker_id,
            item_id = item.id,
            handler = %item.command.handler_id,
            "Dispatching command"
        );

        let outcome = self.dispatch_isolated(&item).await;

        let stage = if outcome.is_ok() {
            ItemStage::Completed
        } else {
            ItemStage::Failed
        };
        item.set_stage(stage);

        if let Err(ref err) = outcome {
            warn!(
                worker_id = self.worker_id,
                item_id = item.id,
                error = %err,
                "Dispatch failed"
            );
        }

        // Receiver only closes after all workers exit, so this cannot fail
        // while an item is in flight.
        let _ = self.completion_tx.send(CompletedItem { item, outcome });
    }

    /// Runs the dispatch on its own task so a panicking handler cannot take
    /// the worker down, applying the configured timeout if any.
    async fn dispatch_isolated(&self, item: &PipelineItem) -> Result<Value, DispatchError> {
        let dispatcher = self.dispatcher.clone();
        let command = item.command.clone();
        let handler_id = item.command.handler_id.clone();

        let mut dispatch_task = tokio::spawn(async move { dispatcher.dispatch(&command).await });

        let join_result = match self.dispatch_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut dispatch_task).await {
                Ok(joined) => joined,
                Err(_) => {
                    dispatch_task.abort();
                    return Err(DispatchError::Cancelled(handler_id));
                }
            },
            None => dispatch_task.await,
        };

        match join_result {
            Ok(outcome) => outcome,
            Err(join_err) if join_err.is_cancelled() => Err(DispatchError::Cancelled(handler_id)),
            Err(_) => Err(DispatchError::HandlerFailed {
                handler_id,
                message: "handler panicked".to_string(),
            }),
        }
    }
}
