//! Narration port.
//!
//! A [`Narrator`] speaks one utterance at a time. The session only cares
//! about when an utterance settles: finished, failed, or cancelled all count.

mod console;

pub use console::ConsoleNarrator;

use std::future::Future;

use tracing::warn;

use crate::error::NarrationError;

const MS_PER_WORD: f64 = 400.0;
const MIN_SPEECH_MS: u64 = 300;

/// Text-to-speech engine.
pub trait Narrator: Send + Sync + 'static {
    /// Speak `text` in `language` (a BCP 47 tag such as `uk-UA`) at `rate`
    /// (1.0 is normal speed). Resolves when speech ends or is stopped.
    fn speak(
        &self,
        text: &str,
        language: &str,
        rate: f32,
    ) -> impl Future<Output = Result<(), NarrationError>> + Send;

    /// Stop whatever is being spoken. Idempotent.
    fn stop(&self) -> impl Future<Output = ()> + Send;
}

/// Rough reading time of `text` at `rate`.
pub fn estimate_speech_ms(text: &str, rate: f32) -> u64 {
    let words = text.split_whitespace().count() as f64;
    let rate = if rate.is_finite() && rate > 0.0 {
        f64::from(rate)
    } else {
        1.0
    };
    ((words * MS_PER_WORD / rate) as u64).max(MIN_SPEECH_MS)
}

/// Narrator with no speech engine. Every utterance settles at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    async fn speak(
        &self,
        _text: &str,
        _language: &str,
        _rate: f32,
    ) -> Result<(), NarrationError> {
        Ok(())
    }

    async fn stop(&self) {}
}

/// Tries `primary` first and falls back to `secondary` when it fails.
#[derive(Debug, Clone, Default)]
pub struct FallbackNarrator<P, S> {
    primary: P,
    secondary: S,
}

impl<P: Narrator, S: Narrator> FallbackNarrator<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: Narrator, S: Narrator> Narrator for FallbackNarrator<P, S> {
    async fn speak(&self, text: &str, language: &str, rate: f32) -> Result<(), NarrationError> {
        match self.primary.speak(text, language, rate).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "primary speech engine failed, falling back");
                self.secondary.speak(text, language, rate).await
            }
        }
    }

    async fn stop(&self) {
        self.primary.stop().await;
        self.secondary.stop().await;
    }
}
