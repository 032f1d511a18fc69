//! Text-to-speech through the Google Translate TTS endpoint
//!
//! The endpoint accepts at most ~100 characters per request, so text is split
//! into segments (sentence punctuation first, then whitespace) and the MP3
//! frames of every segment are concatenated into one clip.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::SpeechConfig;
use crate::error::{Error, Result};
use crate::providers::speech::SpeechSynthesizer;
use crate::types::AudioClip;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Language codes the endpoint speaks, with display names
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("am", "Amharic"),
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("bn", "Bengali"),
    ("bs", "Bosnian"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("eu", "Basque"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("fr-CA", "French (Canada)"),
    ("gl", "Galician"),
    ("gu", "Gujarati"),
    ("ha", "Hausa"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("iw", "Hebrew"),
    ("ja", "Japanese"),
    ("jw", "Javanese"),
    ("km", "Khmer"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("la", "Latin"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("ml", "Malayalam"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("my", "Myanmar (Burmese)"),
    ("ne", "Nepali"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pa", "Punjabi (Gurmukhi)"),
    ("pl", "Polish"),
    ("pt", "Portuguese (Brazil)"),
    ("pt-PT", "Portuguese (Portugal)"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("si", "Sinhala"),
    ("sk", "Slovak"),
    ("sq", "Albanian"),
    ("sr", "Serbian"),
    ("su", "Sundanese"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("th", "Thai"),
    ("tl", "Filipino"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
    ("yue", "Cantonese"),
    ("zh", "Chinese (Simplified)"),
    ("zh-CN", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Mandarin/Taiwan)"),
];

/// Canonical form of a supported language code (case-insensitive, `_` or `-`)
pub fn supported_language(code: &str) -> Option<&'static str> {
    let wanted = code.trim().replace('_', "-");
    SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, _)| *code)
        .find(|code| code.eq_ignore_ascii_case(&wanted))
}

fn is_sentence_break(c: char) -> bool {
    matches!(
        c,
        '.' | '!' | '?' | ';' | ':' | ',' | '\n' | '\u{3002}' | '\u{FF01}' | '\u{FF1F}' | '\u{FF0C}'
    )
}

/// Split text into segments of at most `max_chars` characters
pub fn split_segments(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut segments = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        let cut = match rest.char_indices().nth(max_chars) {
            Some((idx, _)) => idx,
            None => {
                segments.push(rest.to_string());
                break;
            }
        };
        let window = &rest[..cut];

        let split_at = window
            .char_indices()
            .filter(|(_, c)| is_sentence_break(*c))
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .or_else(|| {
                window
                    .char_indices()
                    .filter(|(i, c)| *i > 0 && c.is_whitespace())
                    .last()
                    .map(|(i, _)| i)
            })
            .unwrap_or(cut);

        let (head, tail) = rest.split_at(split_at);
        let head = head.trim();
        if !head.is_empty() {
            segments.push(head.to_string());
        }
        rest = tail.trim_start();
    }

    segments
}

/// Google Translate TTS client
pub struct GoogleTranslateTts {
    client: Client,
    config: SpeechConfig,
}

impl GoogleTranslateTts {
    /// Create a new TTS client
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/translate_tts", self.config.base_url.trim_end_matches('/'))
    }

    async fn fetch_segment(
        &self,
        segment: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<bytes::Bytes> {
        let speed = if self.config.slow { "0.24" } else { "1" };
        let textlen = segment.chars().count().to_string();
        let total = total.to_string();
        let idx_str = idx.to_string();

        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("ie", "UTF-8"),
                ("q", segment),
                ("tl", language),
                ("total", total.as_str()),
                ("idx", idx_str.as_str()),
                ("textlen", textlen.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", speed),
            ])
            .send()
            .await
            .map_err(|e| Error::synthesis(format!("TTS request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::synthesis(format!(
                "TTS endpoint rejected segment {} ({}): {}",
                idx,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::synthesis(format!("Failed to read TTS audio: {}", e)))?;

        if audio.is_empty() {
            return Err(Error::synthesis(format!(
                "TTS endpoint returned no audio for segment {}",
                idx
            )));
        }
        Ok(audio)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip> {
        if text.trim().is_empty() {
            return Err(Error::synthesis("no text to speak"));
        }
        let language = supported_language(language).ok_or_else(|| {
            Error::synthesis(format!("unsupported language code '{}'", language))
        })?;

        let segments = split_segments(text, self.config.max_segment_chars);
        tracing::info!(
            "Synthesizing {} chars of '{}' speech in {} segment(s)",
            text.chars().count(),
            language,
            segments.len()
        );

        let mut audio = Vec::new();
        for (idx, segment) in segments.iter().enumerate() {
            let bytes = self
                .fetch_segment(segment, language, idx, segments.len())
                .await?;
            audio.extend_from_slice(&bytes);
        }

        tracing::debug!("Synthesized {} bytes of audio", audio.len());
        Ok(AudioClip::new(language, audio))
    }

    fn supports_language(&self, language: &str) -> bool {
        supported_language(language).is_some()
    }

    fn name(&self) -> &str {
        "google-translate-tts"
    }
}
