//! # agentwire
//!
//! Schema-less decoder for the agent streaming protocol.
//!
//! Responses arrive as length-prefixed frames over a chunked transport. Each
//! data frame holds a protobuf-encoded message whose field numbers were
//! mapped by observation; this crate turns those bytes into ordered
//! [`Update`] records (text, reasoning, tool invocations).
//!
//! ## Layers
//!
//! - [`protocol`]: varints, the wire-format field scanner, frames and the
//!   incremental [`FrameDemuxer`]
//! - [`schema`]: field number tables (update kinds, tools, tool arguments)
//! - [`decode`]: tool-call and update decoding
//! - [`stream`]: per-stream reassembly, sessions and event-stream bodies
//! - [`transport`]: tokio adapter over any `AsyncRead`
//!
//! Decoding never fails. Malformed or truncated input yields as many updates
//! as could be recovered; errors exist only at the edges (codecs, config,
//! I/O).
//!
//! ## Example
//!
//! ```
//! use agentwire::protocol::{build_frame, MessageWriter};
//! use agentwire::{StreamSession, Update};
//!
//! let message = MessageWriter::new()
//!     .message(1, MessageWriter::new().message(1, MessageWriter::new().string(1, "Hello")))
//!     .finish();
//! let bytes = build_frame(0, &message);
//!
//! let mut session = StreamSession::new();
//! assert!(session.feed(&bytes[..4]).is_empty());
//! let updates = session.feed(&bytes[4..]);
//! assert_eq!(updates, vec![Update::TextDelta { text: "Hello".into() }]);
//! ```

pub mod capture;
pub mod codec;
pub mod config;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod protocol;
pub mod schema;
pub mod stream;
pub mod transport;

pub use capture::ToolCallRecord;
pub use config::DecoderConfig;
pub use decode::{decode_tool_call, decode_updates, ArgValue, DecodedUpdate, ToolCallInfo, Update};
pub use error::{Result, WireError};
pub use protocol::{Frame, FrameDemuxer};
pub use stream::{StreamAccumulator, StreamSession, StreamSummary};
