use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::message::Frame;
use async_trait::async_trait;
use events::{DeliveryRoom, Error, EventEnvelope, SessionId, SessionRegistry};
use log::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    shut_down: AtomicBool,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Register a new connection in `rooms` and return its unique ID
    pub fn register_connection(
        &self,
        rooms: Vec<DeliveryRoom>,
        sender: UnboundedSender<Frame>,
    ) -> Result<ConnectionId, Error> {
        self.ensure_running()?;
        let connection_id = self.registry.register(rooms, sender);
        self.admit(&connection_id)?;
        info!(
            "Registered new SSE connection {} ({} active)",
            connection_id.as_str(),
            self.registry.connection_count()
        );
        Ok(connection_id)
    }

    /// Unregister a connection by ID
    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        info!("Unregistering SSE connection {}", connection_id.as_str());
        self.registry.unregister(connection_id);
    }

    /// Stop accepting work and close every open stream.
    pub fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            info!(
                "Shutting down SSE manager, closing {} connection(s)",
                self.registry.connection_count()
            );
            self.registry.clear();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    /// A shutdown that landed between the running check and the insert has
    /// already cleared the registry, so the new entry must not outlive it.
    fn admit(&self, connection_id: &ConnectionId) -> Result<(), Error> {
        if self.is_shut_down() {
            self.registry.unregister(connection_id);
            warn!(
                "SSE manager shut down while registering {}, dropping it",
                connection_id.as_str()
            );
            return Err(Error::unavailable());
        }
        Ok(())
    }

    fn ensure_running(&self) -> Result<(), Error> {
        if self.is_shut_down() {
            warn!("SSE manager is shut down, rejecting request");
            return Err(Error::unavailable());
        }
        Ok(())
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRegistry for Manager {
    async fn members_of(&self, room: &DeliveryRoom) -> Result<Vec<SessionId>, Error> {
        self.ensure_running()?;
        Ok(self
            .registry
            .members_of(room)
            .into_iter()
            .map(|id| id.as_str().to_string())
            .collect())
    }

    async fn send_to_room(
        &self,
        room: &DeliveryRoom,
        event_name: &str,
        envelope: &EventEnvelope,
    ) -> Result<(), Error> {
        self.ensure_running()?;

        let data = serde_json::to_string(envelope).map_err(|e| {
            error!("Failed to serialize SSE event: {e}");
            Error::from(e)
        })?;

        let sent = self
            .registry
            .send_to_room(room, &Frame::new(event_name, data));
        debug!("Queued '{event_name}' event for {sent} connection(s) in room {room}");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::ErrorKind;
    use tokio::sync::mpsc;

    fn room(name: &str) -> DeliveryRoom {
        DeliveryRoom::new(name)
    }

    #[tokio::test]
    async fn members_of_reports_registered_connections() {
        let manager = Manager::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = manager
            .register_connection(vec![room("user:u1")], tx)
            .unwrap();

        let members = manager.members_of(&room("user:u1")).await.unwrap();

        assert_eq!(members, vec![id.as_str().to_string()]);
    }

    #[tokio::test]
    async fn members_of_empty_room_is_ok() {
        let manager = Manager::new();
        let members = manager.members_of(&room("user:u1")).await.unwrap();
        assert!(members.is_empty());
    }

    #[tokio::test]
    async fn send_to_room_delivers_envelope_json() {
        let manager = Manager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager
            .register_connection(vec![room("user:u1")], tx)
            .unwrap();

        let envelope = EventEnvelope::artifact(None, "<p>hi</p>".to_string(), None);
        manager
            .send_to_room(&room("user:u1"), "events", &envelope)
            .await
            .unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.event, "events");
        let parsed: EventEnvelope = serde_json::from_str(&frame.data).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[tokio::test]
    async fn send_to_empty_room_is_ok() {
        let manager = Manager::new();
        let envelope = EventEnvelope::artifact(None, "x".to_string(), None);
        let result = manager
            .send_to_room(&room("user:nobody"), "events", &envelope)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unregistered_connection_stops_receiving() {
        let manager = Manager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = manager
            .register_connection(vec![room("user:u1")], tx)
            .unwrap();
        manager.unregister_connection(&id);

        let envelope = EventEnvelope::artifact(None, "x".to_string(), None);
        manager
            .send_to_room(&room("user:u1"), "events", &envelope)
            .await
            .unwrap();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn shutdown_closes_streams_and_rejects_work() {
        let manager = Manager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager
            .register_connection(vec![room("user:u1")], tx)
            .unwrap();

        manager.shutdown();

        assert!(manager.is_shut_down());
        assert_eq!(manager.connection_count(), 0);
        assert!(rx.recv().await.is_none());

        let err = manager.members_of(&room("user:u1")).await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Unavailable);

        let envelope = EventEnvelope::artifact(None, "x".to_string(), None);
        let err = manager
            .send_to_room(&room("user:u1"), "events", &envelope)
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Unavailable);

        let (tx, _rx) = mpsc::unbounded_channel();
        let err = manager
            .register_connection(vec![room("user:u1")], tx)
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn registration_racing_shutdown_does_not_survive_it() {
        let manager = Manager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        // Insert lands after shutdown has already cleared the registry.
        manager.shutdown();
        let id = manager.registry.register(vec![room("user:u1")], tx);

        let err = manager.admit(&id).unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Unavailable);
        assert_eq!(manager.connection_count(), 0);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn shutdown_twice_is_harmless() {
        let manager = Manager::new();
        manager.shutdown();
        manager.shutdown();
        assert!(manager.is_shut_down());
    }
}
