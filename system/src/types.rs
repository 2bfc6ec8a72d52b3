use serde::{Deserialize, Serialize};

pub type ConnectionId = uuid::Uuid;
pub type RoomId = String;

pub const ANONYMOUS: &str = "Anonymous";

pub fn new_connection_id() -> ConnectionId {
    uuid::Uuid::new_v4()
}

/// Membership of one room at the moment it was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub members: Vec<ConnectionId>,
}
