//! Delivery contract shared between the artifact relay and the real-time fabric.
//!
//! This crate defines what gets delivered and the interface of whatever delivers it,
//! so that the relay logic in `domain` never depends on a concrete transport.
//!
//! # Architecture
//!
//! - **DeliveryRoom**: Named delivery group in the fabric. A room has no storage of
//!   its own; it "exists" whenever zero or more sessions are subscribed under its name.
//! - **EventEnvelope**: The normalized payload broadcast to a room.
//! - **SessionRegistry**: Trait implemented by the fabric (see the `sse` crate) that
//!   reports room membership and broadcasts envelopes fire-and-forget.
//!
//! This crate has no dependencies on internal crates (domain, sse, etc.),
//! avoiding circular dependencies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;

pub use error::{Error, ErrorKind};

/// Event name every envelope is tagged with when handed to the fabric.
pub const EVENTS_CHANNEL: &str = "events";

/// Type tag carried by artifact envelopes in `data.type`.
pub const ARTIFACT_EVENT_TYPE: &str = "chat:artifact";

/// Identifier of one live session (connection) in the fabric.
pub type SessionId = String;

/// A named delivery group in the real-time fabric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeliveryRoom(String);

impl DeliveryRoom {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryRoom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire payload broadcast to a room.
///
/// Optional fields serialize as JSON `null` when absent. They are never
/// coerced to empty strings and never dropped from the object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub chat_id: Option<String>,
    /// Artifacts are not attached to a message, so this is always `None`.
    pub message_id: Option<String>,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: ArtifactData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactData {
    pub content: String,
    pub title: Option<String>,
}

impl EventEnvelope {
    /// Build a `chat:artifact` envelope. Ownership of `content` moves into the
    /// envelope so large payloads are never copied.
    pub fn artifact(chat_id: Option<String>, content: String, title: Option<String>) -> Self {
        Self {
            chat_id,
            message_id: None,
            data: EventData {
                event_type: ARTIFACT_EVENT_TYPE.to_string(),
                data: ArtifactData { content, title },
            },
        }
    }
}

/// Interface to the real-time fabric's group-membership and point-to-group send
/// primitives.
///
/// Implementations must treat both calls as potentially blocking I/O and must not
/// fail on a room without members.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Sessions currently subscribed to `room`. An empty room yields an empty list.
    async fn members_of(&self, room: &DeliveryRoom) -> Result<Vec<SessionId>, Error>;

    /// Broadcast `envelope` to every current member of `room`, tagged with
    /// `event_name`. Fire-and-forget: no per-recipient acknowledgement, and a room
    /// with no members is not an error.
    async fn send_to_room(
        &self,
        room: &DeliveryRoom,
        event_name: &str,
        envelope: &EventEnvelope,
    ) -> Result<(), Error>;
}
