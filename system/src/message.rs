use crate::types::{ConnectionId, RoomId, ANONYMOUS};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn anonymous() -> String {
    ANONYMOUS.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("cannot decode inbound frame: {0}")]
    Decode(serde_json::Error),
    #[error("cannot encode outbound event: {0}")]
    Encode(serde_json::Error),
}

/// Frames a client sends. Every kind names the room it addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum InboundEvent {
    JoinRoom {
        room_id: RoomId,
        #[serde(alias = "username", default = "anonymous")]
        display_name: String,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    CursorUpdate {
        room_id: RoomId,
        #[serde(alias = "cursor", default)]
        cursor_position: Option<Value>,
        #[serde(alias = "username", default = "anonymous")]
        display_name: String,
    },
    CodeUpdate {
        room_id: RoomId,
        #[serde(alias = "code")]
        document_content: String,
        #[serde(alias = "userId", default)]
        sender_id: Option<String>,
    },
    FileCreated {
        room_id: RoomId,
        file: Value,
    },
    FileDeleted {
        room_id: RoomId,
        file_id: String,
    },
    FileSelected {
        room_id: RoomId,
        file_id: String,
    },
}

impl InboundEvent {
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::JoinRoom { room_id, .. }
            | Self::LeaveRoom { room_id }
            | Self::CursorUpdate { room_id, .. }
            | Self::CodeUpdate { room_id, .. }
            | Self::FileCreated { room_id, .. }
            | Self::FileDeleted { room_id, .. }
            | Self::FileSelected { room_id, .. } => room_id,
        }
    }

    /// Splits a peer-visible update from its room. Lifecycle kinds yield `None`.
    pub fn into_room_event(self) -> Option<(RoomId, RoomEvent)> {
        match self {
            Self::JoinRoom { .. } | Self::LeaveRoom { .. } => None,
            Self::CursorUpdate {
                room_id,
                cursor_position,
                display_name,
            } => Some((
                room_id,
                RoomEvent::CursorUpdate {
                    cursor_position,
                    display_name,
                },
            )),
            Self::CodeUpdate {
                room_id,
                document_content,
                sender_id,
            } => Some((
                room_id,
                RoomEvent::CodeUpdate {
                    document_content,
                    sender_id,
                },
            )),
            Self::FileCreated { room_id, file } => Some((room_id, RoomEvent::FileCreated { file })),
            Self::FileDeleted { room_id, file_id } => {
                Some((room_id, RoomEvent::FileDeleted { file_id }))
            }
            Self::FileSelected { room_id, file_id } => {
                Some((room_id, RoomEvent::FileSelected { file_id }))
            }
        }
    }
}

/// Payload of an update that is fanned out to the other members of a room.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    CursorUpdate {
        cursor_position: Option<Value>,
        display_name: String,
    },
    CodeUpdate {
        document_content: String,
        sender_id: Option<String>,
    },
    FileCreated {
        file: Value,
    },
    FileDeleted {
        file_id: String,
    },
    FileSelected {
        file_id: String,
    },
}

impl RoomEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CursorUpdate { .. } => "cursor-update",
            Self::CodeUpdate { .. } => "code-update",
            Self::FileCreated { .. } => "file-created",
            Self::FileDeleted { .. } => "file-deleted",
            Self::FileSelected { .. } => "file-selected",
        }
    }
}

/// Frames the server sends. Relayed updates carry the sender's connection id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum OutboundEvent {
    Connected {
        connection_id: ConnectionId,
    },
    UserJoined {
        connection_id: ConnectionId,
        display_name: String,
    },
    UserLeft {
        connection_id: ConnectionId,
    },
    CursorUpdate {
        connection_id: ConnectionId,
        cursor_position: Option<Value>,
        display_name: String,
    },
    CodeUpdate {
        connection_id: ConnectionId,
        document_content: String,
        sender_id: Option<String>,
    },
    FileCreated {
        connection_id: ConnectionId,
        file: Value,
    },
    FileDeleted {
        connection_id: ConnectionId,
        file_id: String,
    },
    FileSelected {
        connection_id: ConnectionId,
        file_id: String,
    },
}

impl OutboundEvent {
    pub fn relayed(connection_id: ConnectionId, event: RoomEvent) -> Self {
        match event {
            RoomEvent::CursorUpdate {
                cursor_position,
                display_name,
            } => Self::CursorUpdate {
                connection_id,
                cursor_position,
                display_name,
            },
            RoomEvent::CodeUpdate {
                document_content,
                sender_id,
            } => Self::CodeUpdate {
                connection_id,
                document_content,
                sender_id,
            },
            RoomEvent::FileCreated { file } => Self::FileCreated {
                connection_id,
                file,
            },
            RoomEvent::FileDeleted { file_id } => Self::FileDeleted {
                connection_id,
                file_id,
            },
            RoomEvent::FileSelected { file_id } => Self::FileSelected {
                connection_id,
                file_id,
            },
        }
    }
}

pub fn decode_inbound(text: &str) -> Result<InboundEvent, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

pub fn encode_outbound(event: &OutboundEvent) -> Result<String, ProtocolError> {
    serde_json::to_string(event).map_err(ProtocolError::Encode)
}
