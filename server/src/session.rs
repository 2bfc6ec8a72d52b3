//! Join, leave and disconnect transitions.
//!
//! A connection is either unjoined (`room_id == None`) or joined to exactly one room.
//! Every transition updates the registry entry and the room directory together, so a
//! connection id is in `room`'s member set iff its `room_id` is `room`.

use system::{ConnectionId, OutboundEvent, RoomId};

use crate::connection_registry::{ConnectionRegistry, ConnectionTx};
use crate::room_directory::RoomDirectory;
use crate::router::broadcast;

pub fn connect(registry: &mut ConnectionRegistry, connection_id: ConnectionId, tx: ConnectionTx) {
    registry.register(connection_id, tx);
    registry.send(&connection_id, OutboundEvent::Connected { connection_id });
    log::info!("Connection {} established", connection_id);
}

/// Moves the connection into `room_id`, leaving its previous room first.
///
/// Joining the room the connection already occupies only refreshes its display name.
/// Returns whether a membership change happened.
pub fn join(
    registry: &mut ConnectionRegistry,
    rooms: &mut RoomDirectory,
    connection_id: ConnectionId,
    room_id: RoomId,
    display_name: String,
) -> bool {
    let previous = match registry.get(&connection_id) {
        Some(connection) => connection.room_id.clone(),
        None => {
            log::warn!("Ignoring join from unknown connection {}", connection_id);
            return false;
        }
    };

    if previous.as_ref() == Some(&room_id) {
        if let Some(connection) = registry.get_mut(&connection_id) {
            connection.display_name = Some(display_name);
        }
        return false;
    }

    if let Some(previous) = previous {
        leave_room(registry, rooms, connection_id, &previous);
    }

    if let Some(connection) = registry.get_mut(&connection_id) {
        connection.room_id = Some(room_id.clone());
        connection.display_name = Some(display_name.clone());
    }
    rooms.join(&room_id, connection_id);
    log::info!(
        "Connection {} ({}) joined room {}",
        connection_id,
        display_name,
        room_id
    );

    broadcast(
        registry,
        rooms,
        &room_id,
        &connection_id,
        OutboundEvent::UserJoined {
            connection_id,
            display_name,
        },
    );
    true
}

/// Explicit leave. A no-op unless the connection currently occupies `room_id`.
pub fn leave(
    registry: &mut ConnectionRegistry,
    rooms: &mut RoomDirectory,
    connection_id: ConnectionId,
    room_id: &RoomId,
) -> bool {
    if registry.current_room(&connection_id) != Some(room_id) {
        log::debug!(
            "Connection {} is not in room {}, nothing to leave",
            connection_id,
            room_id
        );
        return false;
    }
    leave_room(registry, rooms, connection_id, room_id);
    true
}

/// Leaves the current room, if any, then forgets the connection.
///
/// Returns `false` for a connection that is already gone.
pub fn disconnect(
    registry: &mut ConnectionRegistry,
    rooms: &mut RoomDirectory,
    connection_id: ConnectionId,
) -> bool {
    let room_id = match registry.get(&connection_id) {
        Some(connection) => connection.room_id.clone(),
        None => return false,
    };
    if let Some(room_id) = room_id {
        leave_room(registry, rooms, connection_id, &room_id);
    }
    registry.unregister(&connection_id);
    log::info!("Connection {} closed", connection_id);
    true
}

fn leave_room(
    registry: &mut ConnectionRegistry,
    rooms: &mut RoomDirectory,
    connection_id: ConnectionId,
    room_id: &RoomId,
) {
    rooms.leave(room_id, &connection_id);
    if let Some(connection) = registry.get_mut(&connection_id) {
        connection.room_id = None;
    }
    log::info!("Connection {} left room {}", connection_id, room_id);
    broadcast(
        registry,
        rooms,
        room_id,
        &connection_id,
        OutboundEvent::UserLeft { connection_id },
    );
}

/// Registry and directory agree in both directions, and no room is empty.
pub fn is_consistent(registry: &ConnectionRegistry, rooms: &RoomDirectory) -> bool {
    let forward = registry.iter().all(|(id, connection)| match &connection.room_id {
        Some(room_id) => rooms.contains(room_id, id),
        None => true,
    });
    let backward = rooms.iter().all(|(room_id, members)| {
        !members.is_empty()
            && members
                .iter()
                .all(|id| registry.current_room(id) == Some(room_id))
    });
    forward && backward
}
