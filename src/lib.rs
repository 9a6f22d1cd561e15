//! Forkline - divide-and-conquer parallel task execution core
//!
//! This library provides two cooperating engines:
//!
//! - A **fork/join executor** ([`forkjoin`]) that takes a unit of work,
//!   recursively splits it into independent sub-units, executes the sub-units
//!   in parallel on the Tokio runtime, and recombines their partial results
//!   in a fixed, deterministic order.
//!
//! - A **work pipeline** ([`pipeline`]) that decodes incoming commands,
//!   queues them on a bounded queue, executes them on a fixed pool of
//!   workers via a command registry ([`dispatch`]), and streams results back
//!   to their originating connections in completion order.
//!
//! # High-Level API
//!
//! ```ignore
//! use forkline::config::PipelineConfig;
//! use forkline::codec::JsonCodec;
//! use forkline::dispatch::{Dispatcher, RegistryBuilder};
//! use forkline::pipeline::WorkPipeline;
//! use forkline::transport::ChannelTransport;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let registry = RegistryBuilder::new()
//!     .register("sort", || Arc::new(SortHandler) as _)?
//!     .build();
//!
//! let shutdown = CancellationToken::new();
//! let (pipeline, submit) = WorkPipeline::new(
//!     PipelineConfig::default(),
//!     Dispatcher::new(Arc::new(registry)),
//!     Arc::new(JsonCodec),
//!     shutdown.clone(),
//! )?;
//! tokio::spawn(pipeline.run());
//!
//! let (connection, mut responses) = ChannelTransport::pair(1);
//! submit.submit(&request_bytes, connection)?;
//! let response_bytes = responses.recv().await;
//! ```

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod forkjoin;
pub mod logging;
pub mod pipeline;
pub mod transport;

/// Version of the forkline library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
