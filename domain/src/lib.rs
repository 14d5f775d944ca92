//! Domain logic for the artifact relay.
//!
//! - `artifact`: authorization-gated push of an artifact to a user's live sessions
//! - `room`: the user -> delivery room naming convention
//! - `caller` / `auth`: who is calling, and how bearer tokens resolve to a caller
//! - `error`: layered error type consumed by `web`

pub use events::{DeliveryRoom, EventEnvelope, SessionRegistry};

pub mod artifact;
pub mod auth;
pub mod caller;
pub mod error;
pub mod room;
