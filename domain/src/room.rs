//! Naming convention mapping a user to their delivery room.
//!
//! A room is not stored anywhere. It is just the name under which the fabric
//! groups a user's live sessions, and this module is the only place that name is
//! derived. Both the push relay and the SSE endpoint go through [`for_user`].

use events::DeliveryRoom;

pub const ROOM_PREFIX: &str = "user:";

/// The delivery room for `user_id`. The id is used verbatim: no trimming, no case folding.
pub fn for_user(user_id: &str) -> DeliveryRoom {
    DeliveryRoom::new(format!("{ROOM_PREFIX}{user_id}"))
}
