//! Pipeline core - construction, submission, and the run loop.

use super::error::SubmitError;
use super::item::{CompletedItem, ItemId, ItemStage, PipelineItem};
use super::sender::ResultSender;
use super::worker::Worker;
use crate::codec::WireCodec;
use crate::config::{ConfigError, PipelineConfig};
use crate::dispatch::{DispatchError, Dispatcher};
use crate::transport::Connection;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The work pipeline: bounded queue, worker pool, and result sender.
///
/// Constructed together with its [`SubmitHandle`]; consumed by
/// [`run`](WorkPipeline::run).
pub struct WorkPipeline {
    config: PipelineConfig,
    dispatcher: Dispatcher,
    codec: Arc<dyn WireCodec>,
    work_rx: Arc<Mutex<mpsc::Receiver<PipelineItem>>>,
    completion_tx: mpsc::UnboundedSender<CompletedItem>,
    completion_rx: mpsc::UnboundedReceiver<CompletedItem>,
    shutdown: CancellationToken,
}

impl WorkPipeline {
    /// Creates a pipeline and its submission handle.
    ///
    /// The `shutdown` token is shared: cancelling it makes the handle reject
    /// new submissions while the pipeline drains what is already queued.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid. This is
    /// the only process-fatal failure in the pipeline's lifetime.
    pub fn new(
        config: PipelineConfig,
        dispatcher: Dispatcher,
        codec: Arc<dyn WireCodec>,
        shutdown: CancellationToken,
    ) -> Result<(Self, SubmitHandle), ConfigError> {
        config.validate()?;

        let (work_tx, work_rx) = mpsc::channel(config.queue_capacity);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let handle = SubmitHandle {
            work_tx,
            codec: Arc::clone(&codec),
            shutdown: shutdown.clone(),
            next_item_id: Arc::new(AtomicU64::new(0)),
            capacity: config.queue_capacity,
        };

        let pipeline = Self {
            config,
            dispatcher,
            codec,
            work_rx: Arc::new(Mutex::new(work_rx)),
            completion_tx,
            completion_rx,
            shutdown,
        };

        Ok((pipeline, handle))
    }

    /// Runs the pipeline until shutdown completes.
    ///
    /// Returns only once the queue has drained, every in-flight dispatch has
    /// finished, and all results have been sent. The pipeline also stops
    /// once every [`SubmitHandle`] clone has been dropped and the queue is
    /// empty.
    pub async fn run(self) {
        let Self {
            config,
            dispatcher,
            codec,
            work_rx,
            completion_tx,
            completion_rx,
            shutdown,
        } = self;

        info!(
            workers = config.worker_count,
            queue_capacity = config.queue_capacity,
            "Pipeline started"
        );

        let sender_task = tokio::spawn(ResultSender::new(completion_rx, codec).run());

        let mut worker_tasks = Vec::with_capacity(config.worker_count);
        for worker_id in 0..config.worker_count {
            let worker = Worker {
                worker_id,
                work_rx: Arc::clone(&work_rx),
                dispatcher: dispatcher.clone(),
                completion_tx: completion_tx.clone(),
                dispatch_timeout: config.dispatch_timeout,
            };
            worker_tasks.push(tokio::spawn(worker.run(shutdown.clone())));
        }

        for worker_task in worker_tasks {
            let _ = worker_task.await;
        }

        // A submit racing the shutdown signal can enqueue an item after the
        // workers have stopped looking; fail anything left so its caller
        // still gets a response.
        fail_stranded(&work_rx, &completion_tx).await;

        // The sender exits once the last completion sender is gone.
        drop(completion_tx);
        let _ = sender_task.await;

        info!("Pipeline stopped");
    }
}

/// Fails every item still in the work queue after the workers have exited,
/// forwarding each to the result sender with a cancelled outcome.
async fn fail_stranded(
    work_rx: &Mutex<mpsc::Receiver<PipelineItem>>,
    completion_tx: &mpsc::UnboundedSender<CompletedItem>,
) {
    let mut work_rx = work_rx.lock().await;
    while let Ok(item) = work_rx.try_recv() {
        warn!(
            item_id = item.id,
            handler = %item.command.handler_id,
            "Failing item stranded in the queue at shutdown"
        );
        item.set_stage(ItemStage::Failed);
        let handler_id = item.command.handler_id.clone();
        let _ = completion_tx.send(CompletedItem {
            item,
            outcome: Err(DispatchError::Cancelled(handler_id)),
        });
    }
}

impl std::fmt::Debug for WorkPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkPipeline")
            .field("worker_count", &self.config.worker_count)
            .field("queue_capacity", &self.config.queue_capacity)
            .finish_non_exhaustive()
    }
}

/// Handle for submitting raw command bytes to the pipeline.
///
/// Cloneable; all clones feed the same bounded queue.
#[derive(Clone)]
pub struct SubmitHandle {
    work_tx: mpsc::Sender<PipelineItem>,
    codec: Arc<dyn WireCodec>,
    shutdown: CancellationToken,
    next_item_id: Arc<AtomicU64>,
    capacity: usize,
}

impl SubmitHandle {
    /// Decodes and enqueues a command, failing fast when the queue is full.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Decode`] if the bytes are not a valid command
    ///   (nothing is queued).
    /// - [`SubmitError::QueueFull`] if the bounded queue is at capacity.
    /// - [`SubmitError::ShuttingDown`] after shutdown has been signalled.
    pub fn submit(
        &self,
        raw: &[u8],
        connection: Arc<dyn Connection>,
    ) -> Result<ItemId, SubmitError> {
        if self.shutdown.is_cancelled() {
            return Err(SubmitError::ShuttingDown);
        }

        let command = self.codec.decode_command(raw)?;
        let item_id = self.next_item_id.fetch_add(1, Ordering::Relaxed);
        let item = PipelineItem::new(item_id, command, connection);

        match self.work_tx.try_send(item) {
            Ok(()) => Ok(item_id),
            Err(TrySendError::Full(_)) => Err(SubmitError::QueueFull {
                capacity: self.capacity,
            }),
            Err(TrySendError::Closed(_)) => Err(SubmitError::ShuttingDown),
        }
    }

    /// Decodes and enqueues a command, waiting for queue capacity instead of
    /// failing fast.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Decode`] if the bytes are not a valid command.
    /// - [`SubmitError::ShuttingDown`] after shutdown has been signalled.
    pub async fn submit_blocking(
        &self,
        raw: &[u8],
        connection: Arc<dyn Connection>,
    ) -> Result<ItemId, SubmitError> {
        if self.shutdown.is_cancelled() {
            return Err(SubmitError::ShuttingDown);
        }

        let command = self.codec.decode_command(raw)?;
        let item_id = self.next_item_id.fetch_add(1, Ordering::Relaxed);
        let item = PipelineItem::new(item_id, command, connection);

        tokio::select! {
            biased;

            _ = self.shutdown.cancelled() => Err(SubmitError::ShuttingDown),

            sent = self.work_tx.send(item) => match sent {
                Ok(()) => Ok(item_id),
                Err(_) => Err(SubmitError::ShuttingDown),
            },
        }
    }
}

impl std::fmt::Debug for SubmitHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitHandle")
            .field("capacity", &self.capacity)
            .field("shutting_down", &self.shutdown.is_cancelled())
            .finish()
    }
}
