//! Speech synthesis trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::AudioClip;

/// Converts text into a complete, playable audio clip
///
/// Implementations:
/// - `GoogleTranslateTts`: Google Translate TTS endpoint (MP3)
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` spoken in `language`. Empty text and unsupported
    /// languages are `Error::Synthesis`.
    async fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip>;

    /// Whether `language` is accepted
    fn supports_language(&self, language: &str) -> bool;

    /// Get synthesizer name for logging
    fn name(&self) -> &str;
}
