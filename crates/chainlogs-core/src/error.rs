//! Error types for the ChainLogs decode pipeline.
//!
//! Per-log failures are plain data (`DecodeFailure`) so they can travel inside
//! a `DecodeOutcome`. Only configuration errors are fatal.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a single-log decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorKind {
    /// topics[0] does not match the hash of the event definition used to decode.
    SignatureMismatch,
    /// Fewer topics than indexed parameters.
    TruncatedTopics,
    /// The data payload is inconsistent with the non-indexed type list.
    DataLengthMismatch,
    /// The ABI declares a type the decoder does not implement.
    UnsupportedType,
}

impl DecodeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeErrorKind::SignatureMismatch => "signature_mismatch",
            DecodeErrorKind::TruncatedTopics => "truncated_topics",
            DecodeErrorKind::DataLengthMismatch => "data_length_mismatch",
            DecodeErrorKind::UnsupportedType => "unsupported_type",
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decode failure for one log: its kind plus a human-readable context.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {context}")]
pub struct DecodeFailure {
    pub kind: DecodeErrorKind,
    pub context: String,
}

impl DecodeFailure {
    pub fn new(kind: DecodeErrorKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }

    pub fn truncated_topics(expected: usize, got: usize) -> Self {
        Self::new(
            DecodeErrorKind::TruncatedTopics,
            format!("expected {expected} indexed topics, got {got}"),
        )
    }

    pub fn data_length(context: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::DataLengthMismatch, context)
    }

    pub fn unsupported_type(ty: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            DecodeErrorKind::UnsupportedType,
            format!("type '{ty}': {reason}"),
        )
    }
}

/// Errors raised while ingesting ABI items. Each is scoped to one item.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("Malformed ABI item #{index}: {reason}")]
    MalformedAbi { index: usize, reason: String },

    #[error("Invalid ABI JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Invalid configuration. The only fatal, constructor-time error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cache capacity must be greater than zero")]
    ZeroCapacity,

    #[error("Cache TTL must be greater than zero")]
    ZeroTtl,

    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("Concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}
