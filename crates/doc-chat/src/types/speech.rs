//! Synthesized audio

use base64::Engine;
use bytes::Bytes;

/// MIME type of synthesized audio
pub const AUDIO_MIME: &str = "audio/mpeg";

/// Download name of synthesized audio
pub const AUDIO_FILENAME: &str = "speech.mp3";

/// Complete MP3 stream, buffered in memory
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Language the text was spoken in
    pub language: String,
    /// MP3 bytes
    pub data: Bytes,
}

impl AudioClip {
    pub fn new(language: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            language: language.into(),
            data: data.into(),
        }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Standard base64 of the audio bytes
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// `data:` URL playable by an `<audio>` element
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", AUDIO_MIME, self.to_base64())
    }

    /// HTML anchor that downloads the clip as `speech.mp3`
    pub fn download_link(&self) -> String {
        format!(
            r#"<a href="{}" download="{}">Download Audio</a>"#,
            self.data_url(),
            AUDIO_FILENAME
        )
    }
}
