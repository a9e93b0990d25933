//! Hexhold Multiplayer Server
//!
//! Authoritative server relaying game messages over framed TCP channels.
//! Peers announce an identity, receive a full state transfer, and from
//! then on every accepted message is applied server-side and relayed.

pub mod broadcast;
pub mod codec;
pub mod config;
pub mod connection;
pub mod server;

pub use broadcast::Broadcaster;
pub use codec::{FrameError, MAX_FRAME_LEN};
pub use config::ServerConfig;
pub use connection::{ClientConnection, PeerEvent};
pub use server::GameServer;
