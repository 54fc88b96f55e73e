//! Async adapter that drives a [`StreamSession`] from a tokio reader.
//!
//! The decoder itself never awaits; this is the only place that does, and
//! only on the caller's reader or channel.
//!
//! # Example
//!
//! ```
//! use agentwire::protocol::{build_frame, MessageWriter};
//! use agentwire::stream::StreamSession;
//! use agentwire::transport::read_stream;
//!
//! # block_on(async {
//! let message = MessageWriter::new()
//!     .message(1, MessageWriter::new().message(1, MessageWriter::new().string(1, "Hello")))
//!     .finish();
//! let body = build_frame(0, &message);
//!
//! let summary = read_stream(body.as_slice(), StreamSession::new()).await.unwrap();
//! assert_eq!(summary.text, "Hello");
//! # });
//! # fn block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::{DecoderConfig, DEFAULT_READ_BUFFER_SIZE};
use crate::decode::Update;
use crate::error::{Result, WireError};
use crate::stream::{StreamSession, StreamSummary};

/// Read `reader` to EOF through `session`.
pub async fn read_stream<R>(reader: R, session: StreamSession) -> Result<StreamSummary>
where
    R: AsyncRead + Unpin,
{
    read_loop(reader, session, DEFAULT_READ_BUFFER_SIZE, None).await
}

/// Like [`read_stream`], with a session and read size built from `config`.
pub async fn read_stream_with_config<R>(reader: R, config: &DecoderConfig) -> Result<StreamSummary>
where
    R: AsyncRead + Unpin,
{
    config.validate()?;
    let session = StreamSession::with_config(config);
    read_loop(reader, session, config.read_buffer_size, None).await
}

/// Read `reader` to EOF, sending each update on `tx` as soon as it decodes.
///
/// Fails with [`WireError::ChannelClosed`] if the receiver is dropped.
pub async fn forward_updates<R>(
    reader: R,
    session: StreamSession,
    tx: mpsc::Sender<Update>,
) -> Result<StreamSummary>
where
    R: AsyncRead + Unpin,
{
    read_loop(reader, session, DEFAULT_READ_BUFFER_SIZE, Some(&tx)).await
}

/// Like [`forward_updates`], with a session and read size built from `config`.
pub async fn forward_updates_with_config<R>(
    reader: R,
    config: &DecoderConfig,
    tx: mpsc::Sender<Update>,
) -> Result<StreamSummary>
where
    R: AsyncRead + Unpin,
{
    config.validate()?;
    let session = StreamSession::with_config(config);
    read_loop(reader, session, config.read_buffer_size, Some(&tx)).await
}

async fn read_loop<R>(
    mut reader: R,
    mut session: StreamSession,
    read_buffer_size: usize,
    tx: Option<&mpsc::Sender<Update>>,
) -> Result<StreamSummary>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; read_buffer_size.max(1)];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break, // EOF
            Ok(n) => n,
            Err(e) => return Err(WireError::Io(e)),
        };

        let updates = session.feed(&buf[..n]);
        if let Some(tx) = tx {
            for update in updates {
                if tx.send(update).await.is_err() {
                    debug!("update receiver dropped, stopping read");
                    return Err(WireError::ChannelClosed);
                }
            }
        }
    }

    Ok(session.finish())
}
