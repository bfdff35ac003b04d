use std::borrow::Cow;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Instant;

use glam::{DVec2, IVec2};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use lookout::{ClientMessage, EntityId, Facing, ServerMessage, World};

use crate::config::ServerConfig;
use crate::connection::Inbound;
use crate::events::{DisconnectReason, ServerEvent};

struct ClientHandle {
    addr: SocketAddr,
    entity_id: EntityId,
    outbound: mpsc::UnboundedSender<Message>,
    connected_at: Instant,
}

/// Owns the world and every connection's outbound queue.
///
/// Runs as a single task: inbound connection traffic and broadcast ticks are
/// serialized through one `select!`, so the world never needs a lock.
pub struct GameServer {
    config: ServerConfig,
    world: World,
    clients: BTreeMap<u64, ClientHandle>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    events_tx: mpsc::UnboundedSender<ServerEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<ServerEvent>>,
    stats_tx: watch::Sender<ServerStats>,
    frames_sent: u64,
    bytes_sent: u64,
    start_time: Instant,
}

impl GameServer {
    pub fn new(config: ServerConfig, world: World) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (stats_tx, _) = watch::channel(ServerStats {
            max_clients: config.max_clients,
            ..Default::default()
        });

        Self {
            config,
            world,
            clients: BTreeMap::new(),
            inbound_tx,
            inbound_rx,
            events_tx,
            events_rx: Some(events_rx),
            stats_tx,
            frames_sent: 0,
            bytes_sent: 0,
            start_time: Instant::now(),
        }
    }

    /// Sender handed to the accept loop.
    pub fn inbound(&self) -> mpsc::UnboundedSender<Inbound> {
        self.inbound_tx.clone()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<ServerStats> {
        self.stats_tx.subscribe()
    }

    /// Event stream for a dashboard. Events are dropped if nobody takes it
    /// before `run`.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ServerEvent>> {
        self.events_rx.take()
    }

    #[cfg(test)]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[cfg(test)]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        self.events_rx = None;

        let mut interval = tokio::time::interval(self.config.tick_duration());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                Some(inbound) = self.inbound_rx.recv() => self.handle_inbound(inbound),
                _ = shutdown.changed() => break,
            }
        }

        self.shutdown_connections();
    }

    pub fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Connected {
                conn_id,
                addr,
                outbound,
            } => self.handle_connected(conn_id, addr, outbound),
            Inbound::Message { conn_id, text } => self.handle_message(conn_id, &text),
            Inbound::Closed { conn_id } => self.handle_closed(conn_id, DisconnectReason::Closed),
        }
    }

    pub fn tick(&mut self) {
        self.world.advance_tick();
        self.broadcast();
        self.publish_stats();
    }

    pub fn shutdown_connections(&mut self) {
        let conn_ids: Vec<u64> = self.clients.keys().copied().collect();
        for conn_id in conn_ids {
            if let Some(client) = self.clients.get(&conn_id) {
                let _ = client.outbound.send(close_message(CloseCode::Away, "server shutting down"));
            }
            self.handle_closed(conn_id, DisconnectReason::Shutdown);
        }
    }

    fn handle_connected(
        &mut self,
        conn_id: u64,
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<Message>,
    ) {
        if self.clients.len() >= self.config.max_clients {
            self.deny(addr, &outbound, "server full".to_string());
            return;
        }

        let entity_id = match self.world.registry_mut().create() {
            Ok(id) => id,
            Err(e) => {
                self.deny(addr, &outbound, e.to_string());
                return;
            }
        };

        let Some(entity) = self.world.registry().get(entity_id) else {
            return;
        };
        let init = ServerMessage::Init {
            id: entity_id,
            skin: entity.skin.content.to_string(),
            skin_name: entity.skin.name.clone(),
        };
        let skin_name = entity.skin.name.clone();

        match init.to_json() {
            Ok(json) => {
                let _ = outbound.send(Message::Text(json));
            }
            Err(e) => log::error!("Failed to encode init for client {}: {}", conn_id, e),
        }

        self.clients.insert(
            conn_id,
            ClientHandle {
                addr,
                entity_id,
                outbound,
                connected_at: Instant::now(),
            },
        );

        log::info!(
            "Client {} connected from {} (entity {}, skin {})",
            conn_id,
            addr,
            entity_id,
            skin_name
        );
        let _ = self.events_tx.send(ServerEvent::ClientConnected {
            conn_id,
            addr,
            entity_id,
            skin: skin_name,
        });
    }

    fn deny(&mut self, addr: SocketAddr, outbound: &mpsc::UnboundedSender<Message>, reason: String) {
        log::warn!("Connection denied to {}: {}", addr, reason);
        let _ = outbound.send(close_message(CloseCode::Again, &reason));
        let _ = self
            .events_tx
            .send(ServerEvent::ConnectionDenied { addr, reason });
    }

    fn handle_message(&mut self, conn_id: u64, text: &str) {
        let Some(client) = self.clients.get(&conn_id) else {
            return;
        };
        let entity_id = client.entity_id;

        match ClientMessage::from_json(text) {
            Ok(ClientMessage::Move { dx, dy }) => {
                self.world.registry_mut().apply_move(entity_id, dx, dy);
            }
            Ok(ClientMessage::Look { x, y }) => {
                self.world
                    .registry_mut()
                    .set_look_target(entity_id, DVec2::new(x, y));
            }
            Err(e) => {
                log::debug!("Discarding message from client {}: {}", conn_id, e);
                let _ = self.events_tx.send(ServerEvent::MessageDiscarded {
                    conn_id,
                    error: e.to_string(),
                });
            }
        }
    }

    fn handle_closed(&mut self, conn_id: u64, reason: DisconnectReason) {
        let Some(client) = self.clients.remove(&conn_id) else {
            return;
        };
        self.world.registry_mut().remove(client.entity_id);

        log::info!("Client {} {}", conn_id, reason.as_str());
        let _ = self.events_tx.send(ServerEvent::ClientDisconnected {
            conn_id,
            entity_id: client.entity_id,
            reason,
        });
    }

    fn broadcast(&mut self) {
        for client in self.clients.values() {
            if client.outbound.is_closed() {
                continue;
            }
            let Some(frame) = self.world.frame_for(client.entity_id) else {
                continue;
            };
            let len = frame.len() as u64;
            if client.outbound.send(Message::Binary(frame)).is_ok() {
                self.frames_sent += 1;
                self.bytes_sent += len;
            }
        }
    }

    fn publish_stats(&self) {
        if self.stats_tx.receiver_count() == 0 {
            return;
        }
        self.stats_tx.send_replace(self.stats());
    }

    pub fn stats(&self) -> ServerStats {
        let registry = self.world.registry();
        ServerStats {
            tick: self.world.tick(),
            client_count: self.clients.len(),
            max_clients: self.config.max_clients,
            entity_count: registry.len(),
            frames_sent: self.frames_sent,
            bytes_sent: self.bytes_sent,
            uptime_secs: self.start_time.elapsed().as_secs(),
            clients: self
                .clients
                .iter()
                .map(|(&conn_id, client)| {
                    let entity = registry.get(client.entity_id);
                    ClientInfo {
                        conn_id,
                        addr: client.addr.to_string(),
                        entity_id: client.entity_id,
                        position: entity.map(|e| e.position).unwrap_or_default(),
                        facing: entity.map(|e| e.facing).unwrap_or_default(),
                        skin: entity.map(|e| e.skin.name.clone()).unwrap_or_default(),
                        connected_secs: client.connected_at.elapsed().as_secs(),
                    }
                })
                .collect(),
        }
    }
}

fn close_message(code: CloseCode, reason: &str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: Cow::Owned(reason.to_string()),
    }))
}

#[derive(Debug, Clone, Default)]
pub struct ServerStats {
    pub tick: u64,
    pub client_count: usize,
    pub max_clients: usize,
    pub entity_count: usize,
    pub frames_sent: u64,
    pub bytes_sent: u64,
    pub uptime_secs: u64,
    pub clients: Vec<ClientInfo>,
}

#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub conn_id: u64,
    pub addr: String,
    pub entity_id: EntityId,
    pub position: IVec2,
    pub facing: Facing,
    pub skin: String,
    pub connected_secs: u64,
}
