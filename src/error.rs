//! Error types for agentwire.
//!
//! The decoding core never fails: scanners, the frame demuxer and the update
//! decoders return partial results instead. `WireError` only covers the outer
//! surfaces (codecs, configuration loading, the async transport adapter).

use thiserror::Error;

/// Error type for the fallible edges of the crate.
#[derive(Debug, Error)]
pub enum WireError {
    /// I/O error while reading a captured stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// Update receiver went away while forwarding.
    #[error("Update channel closed")]
    ChannelClosed,
}

/// Result type alias using WireError.
pub type Result<T> = std::result::Result<T, WireError>;
