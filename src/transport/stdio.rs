//! JSON-lines transport over standard streams.
//!
//! Each outbound message is one JSON object per line on the writer. The
//! paired reader side (inbound server messages, also JSON lines) lives in
//! the binary, which feeds parsed lines into the session channel.

use crate::error::{Result, WordwatchError};
use crate::transport::TranscriptionTransport;
use crate::transport::message::OutboundMessage;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Transport writing one JSON message per line.
pub struct StdioTransport {
    writer: Mutex<Box<dyn Write + Send>>,
    closed: AtomicBool,
}

impl StdioTransport {
    /// Writes to stdout.
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    /// Writes to an arbitrary sink, for tests and piping.
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionTransport for StdioTransport {
    fn is_ready(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    async fn send(&self, message: OutboundMessage) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(WordwatchError::SessionClosed);
        }

        let line = serde_json::to_string(&message).map_err(|e| WordwatchError::Transport {
            message: format!("failed to encode outbound message: {}", e),
        })?;

        let mut writer = self.writer.lock().map_err(|_| WordwatchError::Transport {
            message: "transport writer lock poisoned".to_string(),
        })?;
        writeln!(writer, "{}", line).map_err(|e| WordwatchError::Transport {
            message: format!("failed to write outbound message: {}", e),
        })?;
        writer.flush().map_err(|e| WordwatchError::Transport {
            message: format!("failed to flush outbound message: {}", e),
        })?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // Repeated closes are no-ops
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
        Ok(())
    }
}
