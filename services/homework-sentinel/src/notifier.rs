//! Notifier adapter over the messaging transport

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NotifyError;

/// Something that can deliver a text message to a destination
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait MessageTransport: Send + Sync {
    /// Get the transport type name (e.g. "telegram")
    fn type_name(&self) -> &str;

    /// Send `text` to `destination`
    async fn send(&self, destination: &str, text: &str) -> crate::Result<()>;
}

/// Sends messages to the configured chat and never lets a transport failure
/// escape as anything but a [`NotifyError`]
pub struct Notifier {
    transport: Arc<dyn MessageTransport>,
    destination: String,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("transport", &self.transport.type_name())
            .field("destination", &self.destination)
            .finish()
    }
}

impl Notifier {
    pub fn new(transport: Arc<dyn MessageTransport>, destination: &str) -> Self {
        Self {
            transport,
            destination: destination.to_string(),
        }
    }

    /// Deliver one message; a single attempt, no retries
    pub async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        match self.transport.send(&self.destination, message).await {
            Ok(()) => {
                tracing::debug!("Message sent: {}", message);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to send message \"{}\": {}", message, e);
                Err(NotifyError(e.to_string()))
            }
        }
    }
}
