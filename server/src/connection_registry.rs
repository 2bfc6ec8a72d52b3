use std::collections::HashMap;

use system::{ConnectionId, OutboundEvent, RoomId};
use tokio::sync::mpsc::error::TrySendError;

pub type ConnectionTx = tokio::sync::mpsc::Sender<OutboundEvent>;

pub struct Connection {
    tx: ConnectionTx,
    pub room_id: Option<RoomId>,
    pub display_name: Option<String>,
}

/// Live links and the room each one currently occupies.
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    pub fn register(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connections.insert(
            connection_id,
            Connection {
                tx,
                room_id: None,
                display_name: None,
            },
        );
    }

    /// Removing an absent id is a no-op so repeated disconnect signals are harmless.
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(connection_id)
    }

    pub fn get_mut(&mut self, connection_id: &ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(connection_id)
    }

    pub fn current_room(&self, connection_id: &ConnectionId) -> Option<&RoomId> {
        self.connections
            .get(connection_id)
            .and_then(|c| c.room_id.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &Connection)> {
        self.connections.iter()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Fire-and-forget delivery. Returns whether the event was queued.
    pub fn send(&self, to: &ConnectionId, event: OutboundEvent) -> bool {
        let connection = match self.connections.get(to) {
            Some(connection) => connection,
            None => {
                log::debug!("Dropping {:?} for unknown connection {}", event, to);
                return false;
            }
        };
        match connection.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::warn!("Outbox of connection {} is full, dropping {:?}", to, event);
                false
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("Connection {} is already closed", to);
                false
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use system::new_connection_id;
    use tokio::sync::mpsc::channel;

    #[test]
    fn it_registers_without_room() {
        let mut registry = ConnectionRegistry::new();
        let (tx, _rx) = channel(4);
        let id = new_connection_id();
        registry.register(id, tx);
        assert!(registry.contains(&id));
        assert_eq!(registry.current_room(&id), None);
    }

    #[test]
    fn it_unregisters_idempotently() {
        let mut registry = ConnectionRegistry::new();
        let (tx, _rx) = channel(4);
        let id = new_connection_id();
        registry.register(id, tx);
        assert!(registry.unregister(&id).is_some());
        assert!(registry.unregister(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn it_delivers_to_registered_connection() {
        let mut registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel(4);
        let id = new_connection_id();
        registry.register(id, tx);
        assert!(registry.send(&id, OutboundEvent::UserLeft { connection_id: id }));
        assert_eq!(
            rx.try_recv().expect(""),
            OutboundEvent::UserLeft { connection_id: id }
        );
    }

    #[test]
    fn it_drops_send_to_unknown_or_closed_connection() {
        let mut registry = ConnectionRegistry::new();
        let id = new_connection_id();
        assert!(!registry.send(&id, OutboundEvent::Connected { connection_id: id }));

        let (tx, rx) = channel(4);
        registry.register(id, tx);
        drop(rx);
        assert!(!registry.send(&id, OutboundEvent::Connected { connection_id: id }));
    }

    #[test]
    fn it_drops_instead_of_blocking_on_full_outbox() {
        let mut registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel(1);
        let id = new_connection_id();
        registry.register(id, tx);
        assert!(registry.send(&id, OutboundEvent::Connected { connection_id: id }));
        assert!(!registry.send(&id, OutboundEvent::UserLeft { connection_id: id }));
        assert_eq!(
            rx.try_recv().expect(""),
            OutboundEvent::Connected { connection_id: id }
        );
        assert!(rx.try_recv().is_err());
    }
}
