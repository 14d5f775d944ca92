//! Server-Sent Events (SSE) fabric for real-time delivery.
//!
//! This crate is the in-process implementation of [`events::SessionRegistry`]:
//! it tracks which live connections belong to which delivery room and pushes
//! encoded events to them.
//!
//! # Architecture
//!
//! - **Rooms, not users**: Connections join one or more named rooms when they are
//!   registered. The web layer puts every authenticated connection in its
//!   owner's user room, so several tabs or devices of the same user all receive
//!   the same events.
//! - **Dual-index registry**: O(1) lookups for both connection management and
//!   room-scoped message routing via separate DashMap indices.
//! - **Ephemeral messages**: All events are fire-and-forget. If no connection is
//!   in the room the event is dropped; nothing is queued for later.
//! - **Shared payloads**: An event is serialized once per broadcast and the
//!   encoded frame is shared across every recipient.
//!
//! # Message Flow
//!
//! 1. Frontend establishes SSE connection via `/sse` endpoint
//! 2. Backend authenticates the bearer token (AuthenticatedUser)
//! 3. Connection registered in ConnectionRegistry under the user's room
//! 4. A push arrives for that user:
//!    - The relay asks `Manager::members_of` for the room (diagnostics only)
//!    - The relay calls `Manager::send_to_room` with the envelope
//!    - Manager serializes once and queues the frame on each member connection
//! 5. Frontend receives an `events` SSE event carrying the envelope JSON
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry with dual-index architecture and type-safe ConnectionId
//! - `manager`: Room routing, shutdown, and the `SessionRegistry` implementation
//! - `message`: Encoded frame type and its SSE rendering

pub mod connection;
pub mod manager;
pub mod message;

pub use manager::Manager;
