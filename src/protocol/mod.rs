//! Protocol module - varints, wire-format scanning, framing.
//!
//! This module implements the schema-less layers of the agent stream:
//! - Base-128 varint decoding/encoding
//! - Protobuf field scanning without a schema
//! - 5-byte length-prefixed frames and an incremental demuxer

mod frame;
mod frame_buffer;
mod varint;
mod wire_format;

pub use frame::{build_frame, Frame, FrameHeader, COMPRESSED_FLAG, FRAME_HEADER_SIZE, TRAILER_FLAG};
pub use frame_buffer::{FrameDemuxer, DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_FRAME_PAYLOAD};
pub use varint::{decode_varint, encode_varint, encoded_len, try_decode_varint, MAX_VARINT_LEN};
pub use wire_format::{
    first_bytes, first_string, scan_fields, unwrap_string, Fields, MessageWriter, WireField,
    WireType, WireValue,
};
