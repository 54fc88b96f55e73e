//! Decoder configuration.
//!
//! Every knob has a default, so a config can be built fluently or loaded from
//! a partial JSON document.
//!
//! # Example
//!
//! ```
//! use agentwire::config::DecoderConfig;
//! use agentwire::endpoint::FilterMode;
//!
//! let config = DecoderConfig::new()
//!     .filter_mode(FilterMode::Ai)
//!     .read_buffer_size(16 * 1024);
//! assert!(config.validate().is_ok());
//!
//! let loaded = DecoderConfig::from_json_str(r#"{"filter_mode": "all"}"#).unwrap();
//! assert_eq!(loaded.filter_mode, FilterMode::All);
//! ```

use serde::{Deserialize, Serialize};

use crate::endpoint::FilterMode;
use crate::error::{Result, WireError};
use crate::protocol::{DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_FRAME_PAYLOAD};

/// Default size of a single read in the async adapter (64 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Settings shared by stream sessions and the transport adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Which exchanges to surface.
    pub filter_mode: FilterMode,
    /// Initial capacity of each demuxer buffer.
    pub initial_buffer_capacity: usize,
    /// Declared frame lengths above this are logged (never rejected).
    pub max_frame_payload: u32,
    /// Bytes requested per read from an async source.
    pub read_buffer_size: usize,
    /// Keep raw bytes of tool-call updates for capture records.
    pub capture_raw_tool_calls: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            filter_mode: FilterMode::default(),
            initial_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_frame_payload: DEFAULT_MAX_FRAME_PAYLOAD,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            capture_raw_tool_calls: false,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| WireError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.read_buffer_size == 0 {
            return Err(WireError::Config(
                "read_buffer_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    pub fn initial_buffer_capacity(mut self, capacity: usize) -> Self {
        self.initial_buffer_capacity = capacity;
        self
    }

    pub fn max_frame_payload(mut self, limit: u32) -> Self {
        self.max_frame_payload = limit;
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    pub fn capture_raw_tool_calls(mut self, enabled: bool) -> Self {
        self.capture_raw_tool_calls = enabled;
        self
    }
}
