//! Best-effort domain event publishing over NATS.

use crate::domain::events::DomainEvent;

#[derive(Clone, Debug, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    /// A publisher that drops every event.
    pub fn disabled() -> Self { Self { nats: None } }

    /// Connects to `url`; an unreachable server leaves publishing disabled.
    pub async fn connect(url: &str) -> Self {
        match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(%url, "connected to NATS");
                Self { nats: Some(client) }
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "NATS unavailable, events will not be published");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    /// Publishes each event on its subject. Failures are logged, never returned.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        let Some(nats) = &self.nats else { return };
        for event in events {
            let subject = event.subject();
            let payload = match serde_json::to_vec(&event) {
                Ok(p) => p,
                Err(e) => { tracing::error!(subject, error = %e, "failed to encode event"); continue; }
            };
            if let Err(e) = nats.publish(subject.to_string(), payload.into()).await {
                tracing::warn!(subject, error = %e, "failed to publish event");
            }
        }
    }
}
