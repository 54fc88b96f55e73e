//! Stream-level state: reassembly, sessions and event-stream bodies.

mod accumulator;
mod session;
mod sse;

pub use accumulator::{PartialArgs, StreamAccumulator};
pub use session::{StreamSession, StreamSummary};
pub use sse::{decode_sse_body, SseDecode};
