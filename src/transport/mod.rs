//! Transcription transport seam and implementations.

pub mod message;
pub mod stdio;

pub use message::{InboundEvent, OutboundMessage, parse_inbound_line, parse_server_message};
pub use stdio::StdioTransport;

use crate::error::Result;
use async_trait::async_trait;

/// Connection to the transcription service.
///
/// Sends are fire-and-forget from the session's point of view: a frame
/// produced while the transport is not ready is dropped, not queued.
#[async_trait]
pub trait TranscriptionTransport: Send + Sync {
    /// Whether the transport will currently accept messages.
    fn is_ready(&self) -> bool;

    /// Sends one outbound message.
    async fn send(&self, message: OutboundMessage) -> Result<()>;

    /// Closes the transport. Must be idempotent.
    async fn close(&self) -> Result<()>;
}

/// In-memory transport for testing. Records every sent message.
pub struct MockTransport {
    ready: std::sync::atomic::AtomicBool,
    closed: std::sync::atomic::AtomicBool,
    fail_authorization: std::sync::atomic::AtomicBool,
    sent: std::sync::Mutex<Vec<OutboundMessage>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            ready: std::sync::atomic::AtomicBool::new(true),
            closed: std::sync::atomic::AtomicBool::new(false),
            fail_authorization: std::sync::atomic::AtomicBool::new(false),
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Starts the transport in a not-ready state.
    pub fn not_ready(self) -> Self {
        self.ready
            .store(false, std::sync::atomic::Ordering::SeqCst);
        self
    }

    /// Makes every send fail with an authorization error.
    pub fn with_authorization_failure(self) -> Self {
        self.fail_authorization
            .store(true, std::sync::atomic::Ordering::SeqCst);
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready
            .store(ready, std::sync::atomic::Ordering::SeqCst);
    }

    /// Everything sent so far, in order.
    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionTransport for MockTransport {
    fn is_ready(&self) -> bool {
        self.ready.load(std::sync::atomic::Ordering::SeqCst)
            && !self.closed.load(std::sync::atomic::Ordering::SeqCst)
    }

    async fn send(&self, message: OutboundMessage) -> Result<()> {
        if !self.is_ready() {
            return Err(crate::error::WordwatchError::SessionClosed);
        }
        if self
            .fail_authorization
            .load(std::sync::atomic::Ordering::SeqCst)
        {
            return Err(crate::error::WordwatchError::TransportAuthorization {
                message: "requested entity was not found".to_string(),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message);
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed
            .store(true, std::sync::atomic::Ordering::SeqCst);
        self.ready
            .store(false, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
