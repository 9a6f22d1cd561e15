//! Work Pipeline
//!
//! Bounded producer/consumer pipeline connecting the transport to the
//! command dispatcher.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        SubmitHandle                          │
//! │  decode bytes, enqueue item (fail fast on full queue)        │
//! ├──────────────────────────────────────────────────────────────┤
//! │                    bounded work queue                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │   Worker 0    Worker 1   ...   Worker N-1                    │
//! │   dequeue, dispatch, forward completion                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │                       ResultSender                           │
//! │  single task: encode result, write to origin connection      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Ordering
//!
//! Results are delivered in **completion order**, not submission order: two
//! items submitted A then B may be answered B then A if B finishes first.
//! Each connection only ever receives the results addressed to it.
//!
//! # Shutdown
//!
//! Once the shutdown token fires, `submit` rejects new items, queued items
//! drain through the workers, and [`WorkPipeline::run`] returns only after
//! every in-flight dispatch has completed and its result has been sent. An
//! item that slips into the queue as shutdown fires is failed with a
//! cancelled outcome rather than dropped, so it still yields its one
//! response.

mod core;
mod error;
mod item;
mod sender;
mod worker;

pub use self::core::{SubmitHandle, WorkPipeline};
pub use error::SubmitError;
pub use item::{CompletedItem, ItemId, ItemStage, PipelineItem};
