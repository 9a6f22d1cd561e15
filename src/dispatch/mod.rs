//! Command Registry & Dispatcher
//!
//! Maps command identifiers to singleton executor instances and invokes
//! them with error isolation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Dispatcher                   │
//! │  resolve handler, invoke, wrap failures      │
//! ├──────────────────────────────────────────────┤
//! │               CommandRegistry                │
//! │  lock-free cache reads, single-flight        │
//! │  construction on first access                │
//! ├──────────────────────────────────────────────┤
//! │  HandlerFactory per id (startup-registered)  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Handler construction happens at most once per id for the lifetime of the
//! registry, even under concurrent first access; every caller observing a
//! cache hit receives the identical instance. A failure inside a handler is
//! caught and wrapped with the handler id rather than propagated, so one bad
//! command cannot crash a pipeline worker.

mod command;
mod dispatcher;
mod error;
mod registry;

pub use command::{Command, CommandExecutor, ExecutorError, HandlerFactory};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use registry::{CommandRegistry, RegistryBuilder};
