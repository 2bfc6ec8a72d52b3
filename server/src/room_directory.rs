use std::collections::{HashMap, HashSet};

use system::{ConnectionId, RoomId, RoomSnapshot};

/// Room id to member set. Rooms exist only while they have members.
pub struct RoomDirectory {
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Returns `false` when the connection was already a member.
    pub fn join(&mut self, room_id: &RoomId, connection_id: ConnectionId) -> bool {
        self.rooms
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id)
    }

    /// Returns `false` when the connection was not a member.
    pub fn leave(&mut self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let members = match self.rooms.get_mut(room_id) {
            Some(members) => members,
            None => return false,
        };
        let removed = members.remove(connection_id);
        if members.is_empty() {
            self.rooms.remove(room_id);
            log::info!("Room {} is empty and was removed", room_id);
        }
        removed
    }

    pub fn members_except(&self, room_id: &RoomId, except: &ConnectionId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().filter(|c| *c != except).copied().collect())
            .unwrap_or_default()
    }

    pub fn members(&self, room_id: &RoomId) -> Option<&HashSet<ConnectionId>> {
        self.rooms.get(room_id)
    }

    pub fn contains(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .map_or(false, |members| members.contains(connection_id))
    }

    pub fn has_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RoomId, &HashSet<ConnectionId>)> {
        self.rooms.iter()
    }

    /// Rooms sorted by id, members sorted for stable output.
    pub fn snapshot(&self) -> Vec<RoomSnapshot> {
        let mut result = self
            .rooms
            .iter()
            .map(|(room_id, members)| {
                let mut members = members.iter().copied().collect::<Vec<_>>();
                members.sort();
                RoomSnapshot {
                    room_id: room_id.clone(),
                    members,
                }
            })
            .collect::<Vec<_>>();
        result.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        result
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}
