//! Wire codec boundary.
//!
//! The pipeline is transport-agnostic: commands arrive as bytes and results
//! leave as bytes. The [`WireCodec`] trait is the serialize/deserialize seam;
//! [`JsonCodec`] is the provided implementation. Every value the system
//! passes through a codec must round-trip.

use crate::dispatch::{Command, DispatchError};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised at the encode/decode boundary.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A value could not be encoded to bytes.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Incoming bytes could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),
}

/// The category of a dispatch failure, as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No handler registered under the command's id.
    UnknownHandler,

    /// The handler raised a domain error.
    HandlerFailed,

    /// The dispatch was cancelled or timed out.
    Cancelled,
}

/// The single response produced for a submitted command.
///
/// Success and failure use the same envelope so the submitter always
/// receives exactly one decodable result per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultEnvelope {
    /// The handler completed; `payload` is its result value.
    Ok { handler_id: String, payload: Value },

    /// Dispatch failed; the error is tagged with its category and context.
    Err {
        handler_id: String,
        kind: ErrorKind,
        message: String,
    },
}

impl ResultEnvelope {
    /// Builds the envelope for a dispatch outcome.
    pub fn from_outcome(handler_id: &str, outcome: Result<Value, DispatchError>) -> Self {
        match outcome {
            Ok(payload) => Self::Ok {
                handler_id: handler_id.to_string(),
                payload,
            },
            Err(err) => {
                let kind = match &err {
                    DispatchError::UnknownHandler(_) => ErrorKind::UnknownHandler,
                    DispatchError::HandlerFailed { .. } => ErrorKind::HandlerFailed,
                    DispatchError::Cancelled(_) => ErrorKind::Cancelled,
                };
                Self::Err {
                    handler_id: handler_id.to_string(),
                    kind,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Returns the handler id this result belongs to.
    pub fn handler_id(&self) -> &str {
        match self {
            Self::Ok { handler_id, .. } | Self::Err { handler_id, .. } => handler_id,
        }
    }

    /// Returns true if this is a success envelope.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Serializes commands and results to and from bytes.
pub trait WireCodec: Send + Sync {
    /// Encodes a command for transmission.
    fn encode_command(&self, command: &Command) -> Result<Bytes, CodecError>;

    /// Decodes a command from incoming bytes.
    fn decode_command(&self, bytes: &[u8]) -> Result<Command, CodecError>;

    /// Encodes a result envelope for transmission.
    fn encode_result(&self, envelope: &ResultEnvelope) -> Result<Bytes, CodecError>;

    /// Decodes a result envelope from incoming bytes.
    fn decode_result(&self, bytes: &[u8]) -> Result<ResultEnvelope, CodecError>;
}

/// JSON wire codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl WireCodec for JsonCodec {
    fn encode_command(&self, command: &Command) -> Result<Bytes, CodecError> {
        serde_json::to_vec(command)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode_command(&self, bytes: &[u8]) -> Result<Command, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn encode_result(&self, envelope: &ResultEnvelope) -> Result<Bytes, CodecError> {
        serde_json::to_vec(envelope)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode_result(&self, bytes: &[u8]) -> Result<ResultEnvelope, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
