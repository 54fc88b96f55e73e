//! Codec module - encodings for handing decoded data to collaborators.
//!
//! - [`JsonCodec`] - JSON via `serde_json`, for logs and capture files
//! - [`MsgPackCodec`] - MessagePack via `rmp-serde` (`to_vec_named`, struct-as-map)
//!
//! Both work over any serde type; in practice `Vec<Update>`, `StreamSummary`
//! and `ToolCallRecord` batches.
//!
//! # Example
//!
//! ```
//! use agentwire::codec::{JsonCodec, MsgPackCodec};
//! use agentwire::Update;
//!
//! let updates = vec![Update::Heartbeat, Update::TurnEnded];
//!
//! let json = JsonCodec::encode(&updates).unwrap();
//! assert_eq!(JsonCodec::decode::<Vec<Update>>(&json).unwrap(), updates);
//!
//! let packed = MsgPackCodec::encode(&updates).unwrap();
//! assert_eq!(MsgPackCodec::decode::<Vec<Update>>(&packed).unwrap(), updates);
//! ```

mod json;
mod msgpack;

pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;
