//! Pipeline items and their lifecycle.
//!
//! Ownership of an item transfers along the pipeline: producer to exactly
//! one worker, then to the result sender. The stage is stored as an atomic
//! u8 so it can be updated through shared references along the way.

use crate::dispatch::{Command, DispatchError};
use crate::transport::Connection;
use serde_json::Value;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Unique identifier for a submitted item, scoped to one pipeline.
pub type ItemId = u64;

/// Lifecycle stage of a pipeline item.
///
/// Items progress `Queued -> Running -> Completed -> Sent`; a failed
/// dispatch records `Failed` instead of `Completed` but still reaches
/// `Sent` carrying its error result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ItemStage {
    /// Waiting in the bounded work queue.
    Queued = 0,
    /// Picked up by a worker; dispatch in progress.
    Running = 1,
    /// Dispatch finished successfully.
    Completed = 2,
    /// Dispatch failed; an error result will still be sent.
    Failed = 3,
    /// Result delivered to the originating connection.
    Sent = 4,
}

impl ItemStage {
    /// Converts from the u8 representation.
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Queued),
            1 => Some(Self::Running),
            2 => Some(Self::Completed),
            3 => Some(Self::Failed),
            4 => Some(Self::Sent),
            _ => None,
        }
    }

    /// Returns true if this is the terminal stage.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Returns the stage name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Sent => "sent",
        }
    }
}

impl std::fmt::Display for ItemStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A command in flight through the pipeline.
pub struct PipelineItem {
    /// Unique item identifier.
    pub id: ItemId,

    /// The decoded command to dispatch.
    pub command: Command,

    /// Connection the result will be written back to.
    pub connection: Arc<dyn Connection>,

    /// When the item entered the queue.
    pub submitted_at: Instant,

    /// Current lifecycle stage.
    stage: AtomicU8,
}

impl PipelineItem {
    /// Creates a freshly-queued item.
    pub fn new(id: ItemId, command: Command, connection: Arc<dyn Connection>) -> Self {
        Self {
            id,
            command,
            connection,
            submitted_at: Instant::now(),
            stage: AtomicU8::new(ItemStage::Queued as u8),
        }
    }

    /// Returns the item's current stage.
    pub fn stage(&self) -> ItemStage {
        ItemStage::from_u8(self.stage.load(Ordering::Acquire)).unwrap_or(ItemStage::Queued)
    }

    /// Advances the item to a new stage.
    pub fn set_stage(&self, stage: ItemStage) {
        self.stage.store(stage as u8, Ordering::Release);
    }
}

impl std::fmt::Debug for PipelineItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineItem")
            .field("id", &self.id)
            .field("handler", &self.command.handler_id)
            .field("connection", &self.connection.id())
            .field("stage", &self.stage())
            .finish()
    }
}

/// An item whose dispatch has finished, on its way to the result sender.
pub struct CompletedItem {
    /// The item, now in stage `Completed` or `Failed`.
    pub item: PipelineItem,

    /// The dispatch outcome to encode and deliver.
    pub outcome: Result<Value, DispatchError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;

    #[test]
    fn test_stage_round_trips_through_u8() {
        for stage in [
            ItemStage::Queued,
            ItemStage::Running,
            ItemStage::Completed,
            ItemStage::Failed,
            ItemStage::Sent,
        ] {
            assert_eq!(ItemStage::from_u8(stage as u8), Some(stage));
        }
        assert_eq!(ItemStage::from_u8(99), None);
    }

    #[test]
    fn test_only_sent_is_terminal() {
        assert!(ItemStage::Sent.is_terminal());
        assert!(!ItemStage::Queued.is_terminal());
        assert!(!ItemStage::Failed.is_terminal());
    }

    #[test]
    fn test_item_starts_queued_and_advances() {
        let (connection, _receiver) = ChannelTransport::pair(1);
        let item = PipelineItem::new(1, Command::new("noop", vec![]), Arc::new(connection));

        assert_eq!(item.stage(), ItemStage::Queued);
        item.set_stage(ItemStage::Running);
        assert_eq!(item.stage(), ItemStage::Running);
        item.set_stage(ItemStage::Sent);
        assert!(item.stage().is_terminal());
    }
}
