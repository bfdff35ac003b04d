use std::net::SocketAddr;

use lookout::EntityId;

#[derive(Debug, Clone)]
pub enum ServerEvent {
    ClientConnected {
        conn_id: u64,
        addr: SocketAddr,
        entity_id: EntityId,
        skin: String,
    },
    ClientDisconnected {
        conn_id: u64,
        entity_id: EntityId,
        reason: DisconnectReason,
    },
    ConnectionDenied {
        addr: SocketAddr,
        reason: String,
    },
    MessageDiscarded {
        conn_id: u64,
        error: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum DisconnectReason {
    Closed,
    Shutdown,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::Closed => "disconnected",
            DisconnectReason::Shutdown => "dropped at shutdown",
        }
    }
}
