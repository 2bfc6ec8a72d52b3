use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::{ConnectionId, InboundEvent};

use crate::admin::{AdminCommand, ServerStats};
use crate::connection_registry::{ConnectionRegistry, ConnectionTx};
use crate::room_directory::RoomDirectory;
use crate::{router, session};

pub type ServerTx = UnboundedSender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connect {
        connection_id: ConnectionId,
        tx: ConnectionTx,
    },
    Event {
        from: ConnectionId,
        event: InboundEvent,
    },
    Disconnect {
        from: ConnectionId,
    },
    Admin(AdminCommand),
}

/// Sole owner of the registry and the directory. Commands are applied one at a time.
struct Server {
    registry: ConnectionRegistry,
    rooms: RoomDirectory,
}

impl Server {
    fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            rooms: RoomDirectory::new(),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connect { connection_id, tx } => {
                session::connect(&mut self.registry, connection_id, tx);
            }
            ServerCommand::Event { from, event } => self.handle_event(from, event),
            ServerCommand::Disconnect { from } => {
                session::disconnect(&mut self.registry, &mut self.rooms, from);
            }
            ServerCommand::Admin(command) => self.handle_admin_command(command),
        }
        debug_assert!(session::is_consistent(&self.registry, &self.rooms));
    }

    fn handle_event(&mut self, from: ConnectionId, event: InboundEvent) {
        match event {
            InboundEvent::JoinRoom {
                room_id,
                display_name,
            } => {
                session::join(
                    &mut self.registry,
                    &mut self.rooms,
                    from,
                    room_id,
                    display_name,
                );
            }
            InboundEvent::LeaveRoom { room_id } => {
                session::leave(&mut self.registry, &mut self.rooms, from, &room_id);
            }
            event => {
                if let Some((room_id, room_event)) = event.into_room_event() {
                    router::route(&self.registry, &self.rooms, from, &room_id, room_event);
                }
            }
        }
    }

    fn handle_admin_command(&self, command: AdminCommand) {
        // A dropped receiver means the requester gave up; nothing to do.
        match command {
            AdminCommand::ListRooms { tx } => {
                let _ = tx.send(self.rooms.snapshot());
            }
            AdminCommand::GetStats { tx } => {
                let joined_connections = self
                    .registry
                    .iter()
                    .filter(|(_, c)| c.room_id.is_some())
                    .count();
                let _ = tx.send(ServerStats {
                    connections: self.registry.len(),
                    joined_connections,
                    rooms: self.rooms.room_count(),
                });
            }
        }
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();

    tokio::spawn(async move {
        let mut server = Box::new(Server::new());

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
        log::info!("Server task terminated");
    });

    srv_tx
}
