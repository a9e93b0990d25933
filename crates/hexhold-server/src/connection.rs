//! Per-peer connection plumbing.
//!
//! Each accepted socket gets its own receive loop so a slow peer never
//! blocks the others. The first frame is the identity handshake; every
//! later frame is a game message, funneled as a `PeerEvent` into the
//! single server loop.

use std::net::SocketAddr;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use hexhold_protocol::Message;

use crate::codec::{self, FrameError};

/// Events a peer task delivers to the server loop.
#[derive(Debug)]
pub enum PeerEvent {
    /// Identity handshake completed. The server answers over `accepted`:
    /// true registers `outgoing` for fan-out, false refuses the peer
    /// (duplicate identity) and the task drops the connection.
    Connected {
        id: String,
        outgoing: mpsc::UnboundedSender<Message>,
        accepted: oneshot::Sender<bool>,
    },
    /// One decoded game message from `id`.
    Message { id: String, message: Message },
    /// Terminal sentinel, delivered exactly once per accepted peer.
    /// Disconnect is an ordinary end state, not a fault.
    Disconnected { id: String },
}

/// Drive one accepted socket to completion: handshake, then a receive
/// loop feeding `events` until the peer goes away.
pub async fn run_peer(stream: TcpStream, events: mpsc::UnboundedSender<PeerEvent>) {
    let peer_addr = stream.peer_addr().ok();
    let (mut reader, writer) = stream.into_split();

    let id = match codec::read_identity(&mut reader).await {
        Ok(id) => id,
        Err(e) => {
            warn!("handshake failed from {:?}: {}", peer_addr, e);
            return;
        }
    };

    let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
    let (accepted_tx, accepted_rx) = oneshot::channel();
    let connected = PeerEvent::Connected {
        id: id.clone(),
        outgoing: outgoing_tx,
        accepted: accepted_tx,
    };
    if events.send(connected).is_err() {
        return;
    }
    if !matches!(accepted_rx.await, Ok(true)) {
        debug!("connection for {:?} refused", id);
        return;
    }

    let writer_task = tokio::spawn(write_loop(writer, outgoing_rx));

    loop {
        match codec::read_message(&mut reader).await {
            Ok(message) => {
                let event = PeerEvent::Message {
                    id: id.clone(),
                    message,
                };
                if events.send(event).is_err() {
                    break;
                }
            }
            Err(FrameError::Closed) => break,
            Err(e) => {
                debug!("read failure for {:?}: {}", id, e);
                break;
            }
        }
    }

    let _ = events.send(PeerEvent::Disconnected { id });
    writer_task.abort();
}

async fn write_loop(mut writer: OwnedWriteHalf, mut outgoing: mpsc::UnboundedReceiver<Message>) {
    while let Some(message) = outgoing.recv().await {
        if let Err(e) = codec::write_message(&mut writer, &message).await {
            debug!("write failure: {}", e);
            break;
        }
    }
}

/// Client side of the channel: connect, announce an identity, then
/// exchange framed messages.
pub struct ClientConnection {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
}

impl ClientConnection {
    pub async fn connect(addr: SocketAddr, identity: &str) -> Result<Self, FrameError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true).ok();
        let (reader, mut writer) = stream.into_split();
        codec::write_identity(&mut writer, identity).await?;
        Ok(Self { reader, writer })
    }

    pub async fn send(&mut self, message: &Message) -> Result<(), FrameError> {
        codec::write_message(&mut self.writer, message).await
    }

    pub async fn recv(&mut self) -> Result<Message, FrameError> {
        codec::read_message(&mut self.reader).await
    }
}
