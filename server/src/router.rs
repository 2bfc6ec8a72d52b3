use system::{ConnectionId, OutboundEvent, RoomEvent, RoomId};

use crate::connection_registry::ConnectionRegistry;
use crate::room_directory::RoomDirectory;

/// Forwards an update to every other member of `room_id` as of now.
///
/// The sender must currently occupy `room_id`; otherwise the event is dropped.
/// Returns the number of peers the event was queued for.
pub fn route(
    registry: &ConnectionRegistry,
    rooms: &RoomDirectory,
    from: ConnectionId,
    room_id: &RoomId,
    event: RoomEvent,
) -> usize {
    if registry.current_room(&from) != Some(room_id) {
        log::warn!(
            "Dropping {} from {}: not a member of room {}",
            event.kind(),
            from,
            room_id
        );
        return 0;
    }
    let kind = event.kind();
    let delivered = broadcast(
        registry,
        rooms,
        room_id,
        &from,
        OutboundEvent::relayed(from, event),
    );
    log::debug!(
        "Routed {} from {} in room {} to {} peer(s)",
        kind,
        from,
        room_id,
        delivered
    );
    delivered
}

pub fn broadcast(
    registry: &ConnectionRegistry,
    rooms: &RoomDirectory,
    room_id: &RoomId,
    without: &ConnectionId,
    event: OutboundEvent,
) -> usize {
    rooms
        .members_except(room_id, without)
        .iter()
        .filter(|to| registry.send(to, event.clone()))
        .count()
}
