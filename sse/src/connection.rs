use crate::message::Frame;
use dashmap::DashMap;
use events::DeliveryRoom;
use log::*;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection information (no redundant connection_id)
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub rooms: Vec<DeliveryRoom>,
    pub sender: UnboundedSender<Frame>,
}

/// Connection registry with dual indices for O(1) lookups
pub struct ConnectionRegistry {
    /// Primary storage: lookup by connection_id for registration/cleanup - O(1)
    connections: DashMap<ConnectionId, ConnectionInfo>,

    /// Secondary index: room membership for message routing - O(1)
    room_index: DashMap<DeliveryRoom, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            room_index: DashMap::new(),
        }
    }

    /// Register a new connection as a member of every room in `rooms` - O(r)
    pub fn register(&self, rooms: Vec<DeliveryRoom>, sender: UnboundedSender<Frame>) -> ConnectionId {
        let connection_id = ConnectionId::new();

        for room in &rooms {
            self.room_index
                .entry(room.clone())
                .or_default()
                .insert(connection_id.clone());
        }

        self.connections
            .insert(connection_id.clone(), ConnectionInfo { rooms, sender });

        connection_id
    }

    /// Unregister a connection and leave all of its rooms - O(r)
    pub fn unregister(&self, connection_id: &ConnectionId) {
        if let Some((_, info)) = self.connections.remove(connection_id) {
            for room in &info.rooms {
                self.leave(room, connection_id);
            }
        }
    }

    fn leave(&self, room: &DeliveryRoom, connection_id: &ConnectionId) {
        if let Some(mut entry) = self.room_index.get_mut(room) {
            entry.remove(connection_id);

            // Clean up empty rooms
            if entry.is_empty() {
                drop(entry); // Release lock before removal
                self.room_index.remove_if(room, |_, members| members.is_empty());
            }
        }
    }

    /// Current members of `room`, sorted for stable diagnostics. Empty if nobody is subscribed.
    pub fn members_of(&self, room: &DeliveryRoom) -> Vec<ConnectionId> {
        let mut members: Vec<ConnectionId> = self
            .room_index
            .get(room)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    /// Queue `frame` on every connection in `room` - O(1) lookup + O(k) send.
    ///
    /// Returns how many connections accepted the frame. A closed receiver is
    /// skipped; its stream is already ending and will unregister itself.
    pub fn send_to_room(&self, room: &DeliveryRoom, frame: &Frame) -> usize {
        let mut sent = 0;
        if let Some(connection_ids) = self.room_index.get(room) {
            for conn_id in connection_ids.iter() {
                if let Some(info) = self.connections.get(conn_id) {
                    match info.sender.send(frame.clone()) {
                        Ok(()) => sent += 1,
                        Err(e) => warn!(
                            "Failed to send event to connection {}: {}. Connection will be cleaned up.",
                            conn_id.as_str(),
                            e
                        ),
                    }
                }
            }
        }
        sent
    }

    /// Drop every connection. Their senders go away, so each open stream ends.
    pub fn clear(&self) {
        self.connections.clear();
        self.room_index.clear();
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
