//! Pushing artifacts to a user's live sessions.
//!
//! An external service hands over an HTML artifact for a target user, and the
//! relay broadcasts it as an `events` envelope to every session currently in that
//! user's room. Delivery is fire-and-forget: success means the broadcast was
//! issued, not that anyone received it.

use crate::caller::CallerIdentity;
use crate::error::Error;
use crate::room;
use events::{DeliveryRoom, EventEnvelope, SessionRegistry, EVENTS_CHANNEL};
use log::*;

pub const FORBIDDEN_REASON: &str = "Cannot push artifacts to other users";

/// One push, as received from the caller. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PushRequest {
    pub target_user_id: String,
    pub chat_id: Option<String>,
    /// Full HTML document. No size limit is applied here.
    pub content: String,
    pub title: Option<String>,
}

impl PushRequest {
    pub fn validate(&self) -> Result<(), Error> {
        if self.target_user_id.is_empty() {
            warn!("Rejecting artifact push with empty target user id");
            return Err(Error::invalid("user_id must not be empty"));
        }
        Ok(())
    }
}

/// What a successful push did.
#[derive(Debug, Clone, PartialEq)]
pub struct PushOutcome {
    pub room: DeliveryRoom,
    /// Sessions in the room when membership was checked. Zero is still a success.
    pub session_count: usize,
}

/// Admins may push to anyone, everyone else only to themselves.
pub fn authorize(caller: &CallerIdentity, target_user_id: &str) -> Result<(), Error> {
    if caller.is_admin() || caller.id == target_user_id {
        Ok(())
    } else {
        warn!(
            "Denied artifact push from {} (role {}) to user {target_user_id}",
            caller.id, caller.role
        );
        Err(Error::forbidden(FORBIDDEN_REASON))
    }
}

/// Validate, authorize, then broadcast `request` to the target user's room.
///
/// Nothing touches the registry until authorization has passed. Registry
/// failures are returned as errors rather than reported as success.
pub async fn push<R>(
    registry: &R,
    caller: &CallerIdentity,
    request: PushRequest,
) -> Result<PushOutcome, Error>
where
    R: SessionRegistry + ?Sized,
{
    request.validate()?;
    authorize(caller, &request.target_user_id)?;

    let room = room::for_user(&request.target_user_id);
    let sessions = registry.members_of(&room).await?;

    // Content is logged by size only; it is arbitrary markup and can be large.
    info!(
        "Pushing artifact to room {room}: sessions={} {:?}, chat_id={:?}, title={:?}, content_bytes={}, content_chars={}",
        sessions.len(),
        sessions,
        request.chat_id,
        request.title,
        request.content.len(),
        request.content.chars().count(),
    );

    let PushRequest {
        chat_id,
        content,
        title,
        ..
    } = request;
    let envelope = EventEnvelope::artifact(chat_id, content, title);

    registry
        .send_to_room(&room, EVENTS_CHANNEL, &envelope)
        .await?;

    info!("Artifact broadcast issued to room {room}");

    Ok(PushOutcome {
        room,
        session_count: sessions.len(),
    })
}
