//! Live change feed.
//!
//! Every accepted mutation publishes exactly one [`ServerEvent`] after the
//! underlying write has succeeded. Subscribers that connect later do not see
//! earlier events; they start from a fresh `pdfs-list` snapshot instead.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::pdf_store::PdfAsset;
use crate::registry::Registry;

/// An event pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServerEvent {
    PdfUpdated(PdfAsset),
    PdfDeleted { name: String },
    SubjectsUpdated(Registry),
    /// Full PDF listing, sent once to each new subscriber.
    PdfsList(Vec<PdfAsset>),
}

impl ServerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::PdfUpdated(_) => "pdf-updated",
            ServerEvent::PdfDeleted { .. } => "pdf-deleted",
            ServerEvent::SubjectsUpdated(_) => "subjects-updated",
            ServerEvent::PdfsList(_) => "pdfs-list",
        }
    }
}

/// Fan-out channel shared by the registry, the PDF library and the SSE endpoint.
///
/// Publishing never waits on subscribers: each one has its own bounded buffer
/// and a slow reader only loses its own oldest events.
#[derive(Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<ServerEvent>,
}

impl NotificationBus {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }

    pub fn publish(&self, event: ServerEvent) {
        let kind = event.event_type();
        match self.tx.send(event) {
            Ok(receivers) => tracing::debug!(event = kind, receivers, "Published event"),
            Err(_) => tracing::trace!(event = kind, "No subscribers for event"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
