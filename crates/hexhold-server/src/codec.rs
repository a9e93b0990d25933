//! Length-prefixed message framing over any async byte stream.
//!
//! Every frame is a big-endian u32 payload length followed by a
//! MessagePack payload. The first frame on a connection carries the
//! peer's identity string; every later frame carries a game message.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use hexhold_protocol::{
    deserialize_identity, deserialize_message, serialize_identity, serialize_message, Message,
    WireError,
};

/// Upper bound on a single frame; larger prefixes indicate a corrupt or
/// hostile stream.
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Framing error types
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {0} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    Oversized(u32),

    #[error(transparent)]
    Wire(#[from] WireError),

    /// Clean close at a frame boundary. An ordinary terminal state, not
    /// a fault.
    #[error("peer closed the channel")]
    Closed,
}

pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let len = payload.len() as u32;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::Oversized(len));
    }
    writer.write_u32(len).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(FrameError::Closed),
        Err(e) => return Err(e.into()),
    };
    if len > MAX_FRAME_LEN {
        return Err(FrameError::Oversized(len));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

pub async fn write_message<W>(writer: &mut W, message: &Message) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serialize_message(message)?;
    write_frame(writer, &payload).await
}

pub async fn read_message<R>(reader: &mut R) -> Result<Message, FrameError>
where
    R: AsyncRead + Unpin,
{
    let payload = read_frame(reader).await?;
    Ok(deserialize_message(&payload)?)
}

/// First frame of the handshake: the connecting side announces its
/// identity string.
pub async fn write_identity<W>(writer: &mut W, identity: &str) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serialize_identity(identity)?;
    write_frame(writer, &payload).await
}

pub async fn read_identity<R>(reader: &mut R) -> Result<String, FrameError>
where
    R: AsyncRead + Unpin,
{
    let payload = read_frame(reader).await?;
    Ok(deserialize_identity(&payload)?)
}
