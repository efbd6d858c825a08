use std::io::Write;
use std::pin::pin;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::debug;

use super::{estimate_speech_ms, Narrator};
use crate::error::NarrationError;

/// Prints each utterance to stderr and holds it for its estimated reading
/// time.
#[derive(Debug)]
pub struct ConsoleNarrator {
    prefix: String,
    cancel: Notify,
}

impl ConsoleNarrator {
    pub fn new() -> Self {
        Self::with_prefix("🔊 ")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            cancel: Notify::new(),
        }
    }
}

impl Default for ConsoleNarrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Narrator for ConsoleNarrator {
    async fn speak(&self, text: &str, language: &str, rate: f32) -> Result<(), NarrationError> {
        let mut cancelled = pin!(self.cancel.notified());
        cancelled.as_mut().enable();

        debug!(language, rate, "speaking");
        writeln!(std::io::stderr().lock(), "{}{text}", self.prefix)
            .map_err(|e| NarrationError::Engine(e.to_string()))?;
        let hold = Duration::from_millis(estimate_speech_ms(text, rate));
        tokio::select! {
            _ = tokio::time::sleep(hold) => {}
            _ = cancelled => debug!("utterance cut short"),
        }
        Ok(())
    }

    async fn stop(&self) {
        self.cancel.notify_waiters();
    }
}
