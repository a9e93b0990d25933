//! Accept loop and the single message-application loop.
//!
//! Every peer task funnels its events into one queue, so all
//! `WorldState` mutation happens on one task in server-arrival order.
//! That order is the authoritative total order: per-peer FIFO is
//! preserved, and cross-peer ordering is whatever arrival produced.

use std::io;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use hexhold_core::WorldState;
use hexhold_protocol::Message;

use crate::broadcast::Broadcaster;
use crate::config::ServerConfig;
use crate::connection::{run_peer, PeerEvent};

pub struct GameServer {
    listener: TcpListener,
    world: WorldState,
}

impl GameServer {
    /// Bind the listener and generate the authoritative world.
    pub async fn bind(config: &ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(config.bind_address).await?;
        let seed = config.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos() as u64
        });
        let world = WorldState::generate(
            config.map_width,
            config.map_height,
            config.hex_radius,
            seed,
        );
        info!(
            "world generated ({}x{}, radius {}, seed {})",
            config.map_width, config.map_height, config.hex_radius, seed
        );
        Ok(Self { listener, world })
    }

    /// Actual bound address (useful when the config asked for port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the process stops.
    pub async fn run(self) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let listener = self.listener;
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        info!("connection from {}", addr);
                        stream.set_nodelay(true).ok();
                        tokio::spawn(run_peer(stream, events_tx.clone()));
                    }
                    Err(e) => warn!("accept failed: {}", e),
                }
            }
        });
        event_loop(self.world, events_rx).await;
    }
}

async fn event_loop(mut world: WorldState, mut events: mpsc::UnboundedReceiver<PeerEvent>) {
    let mut broadcaster = Broadcaster::new();
    while let Some(event) = events.recv().await {
        match event {
            PeerEvent::Connected {
                id,
                outgoing,
                accepted,
            } => {
                if broadcaster.contains(&id) {
                    warn!("duplicate identity {:?} refused", id);
                    let _ = accepted.send(false);
                    continue;
                }
                let _ = accepted.send(true);
                broadcaster.register(id.clone(), outgoing);
                handle_join(&mut world, &mut broadcaster, &id);
            }
            PeerEvent::Message { id, message } => {
                handle_message(&mut world, &mut broadcaster, &id, message);
            }
            PeerEvent::Disconnected { id } => {
                info!("{} disconnected", id);
                broadcaster.deregister(&id);
            }
        }
    }
}

/// Join flow: apply the join and starting units, acknowledge the newcomer
/// with a full state transfer, and relay the deltas to everyone else.
fn handle_join(world: &mut WorldState, broadcaster: &mut Broadcaster, id: &str) {
    info!("{} joined ({} players known)", id, world.players().len());

    let join = Message::PlayerJoin { id: id.to_string() };
    world.apply_message(&join);

    let mut spawned = Vec::new();
    for msg in world.starting_unit_messages(id) {
        match world.validate_message(&msg) {
            Ok(()) => {
                world.apply_message(&msg);
                spawned.push(msg);
            }
            Err(violation) => warn!("starting unit for {} skipped: {}", id, violation),
        }
    }

    broadcaster.broadcast_to(
        &Message::State {
            snapshot: world.snapshot(),
        },
        id,
    );
    broadcaster.broadcast_excluding(&join, id);
    for msg in &spawned {
        broadcaster.broadcast_excluding(msg, id);
    }
}

fn handle_message(
    world: &mut WorldState,
    broadcaster: &mut Broadcaster,
    id: &str,
    message: Message,
) {
    // Joins come from the handshake, state transfers and turn rollover
    // from the server itself.
    if matches!(
        message,
        Message::PlayerJoin { .. } | Message::State { .. } | Message::TurnEnded
    ) {
        warn!("{} sent a server-only message, ignoring", id);
        return;
    }

    if impersonates(world, id, &message) {
        warn!("{} sent a message for another player, ignoring", id);
        return;
    }

    if let Err(violation) = world.validate_message(&message) {
        warn!("rejecting message from {}: {}", id, violation);
        return;
    }

    let is_ready = matches!(message, Message::Ready { .. });
    world.apply_message(&message);
    broadcaster.broadcast_excluding(&message, id);

    if is_ready && world.all_players_ready() {
        info!("all players ready, advancing turn");
        world.apply_message(&Message::TurnEnded);
        broadcaster.broadcast(&Message::TurnEnded);
    }
}

/// Identity-bearing messages must name the peer that sent them: a peer
/// may not ready another player, act for another owner, or touch units
/// and cities it does not own.
fn impersonates(world: &WorldState, sender: &str, message: &Message) -> bool {
    match message {
        Message::Ready { id, .. } => id != sender,
        Message::CityCreate { owner, .. } | Message::UnitCreate { owner, .. } => owner != sender,
        Message::CityGrow { center, .. } => world
            .cities()
            .iter()
            .find(|c| c.center() == *center)
            .is_some_and(|c| c.owner != sender),
        Message::UnitMove { from, .. } => world
            .unit_at(*from)
            .is_some_and(|u| u.owner != sender),
        Message::UnitDelete { at } => world
            .unit_at(*at)
            .is_some_and(|u| u.owner != sender),
        _ => false,
    }
}
