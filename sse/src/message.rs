use axum::response::sse::Event;
use std::sync::Arc;

/// One encoded event as queued to a connection.
///
/// `data` is shared between every connection in a room, so a large payload is
/// serialized once per broadcast rather than once per recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub event: String,
    pub data: Arc<str>,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: impl Into<Arc<str>>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    /// Render as an SSE event: `event: <name>` followed by `data: <json>`.
    pub fn to_sse_event(&self) -> Event {
        Event::default().event(&self.event).data(&*self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_payload() {
        let frame = Frame::new("events", "{\"chat_id\":null}".to_string());
        let copy = frame.clone();
        assert!(Arc::ptr_eq(&frame.data, &copy.data));
    }

    #[test]
    fn renders_to_sse_event_without_panicking() {
        let frame = Frame::new("events", "{}");
        let _event = frame.to_sse_event();
    }
}
