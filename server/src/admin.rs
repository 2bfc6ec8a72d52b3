use serde::Serialize;
use system::RoomSnapshot;
use tokio::sync::oneshot::Sender;

/// Read-only queries answered by the server task.
#[derive(Debug)]
pub enum AdminCommand {
    ListRooms { tx: Sender<Vec<RoomSnapshot>> },
    GetStats { tx: Sender<ServerStats> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    pub connections: usize,
    pub joined_connections: usize,
    pub rooms: usize,
}
