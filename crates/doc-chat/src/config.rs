//! Configuration for doc-chat

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "DOC_CHAT_CONFIG";

/// Environment variables checked (in order) for the Gemini API key
pub const API_KEY_ENVS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Generation API configuration
    pub llm: LlmConfig,
    /// PDF extraction configuration
    pub extraction: ExtractionConfig,
    /// DOCX to PDF converter configuration
    pub converter: ConverterConfig,
    /// Text-to-speech configuration
    pub speech: SpeechConfig,
    /// Session store configuration
    pub session: SessionConfig,
}

impl ChatConfig {
    /// Load configuration: optional TOML file from `DOC_CHAT_CONFIG`, then
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse a TOML document; missing sections fall back to defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply environment overrides using `lookup` as the variable source
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.llm.api_key.is_none() {
            self.llm.api_key = API_KEY_ENVS.iter().find_map(|key| non_empty(*key));
        }
        if let Some(host) = non_empty("DOC_CHAT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("DOC_CHAT_PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid DOC_CHAT_PORT value: {}", port),
            }
        }
        if let Some(model) = non_empty("GEMINI_MODEL") {
            self.llm.model = model;
        }
        if let Some(binary) = non_empty("DOC_CHAT_CONVERTER") {
            self.converter.binary = binary;
        }
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if self.session.preview_chars == 0 {
            return Err(Error::Config("session.preview_chars must be non-zero".to_string()));
        }
        if self.session.max_sessions == 0 {
            return Err(Error::Config("session.max_sessions must be non-zero".to_string()));
        }
        if self.llm.max_prompt_chars == 0 {
            return Err(Error::Config("llm.max_prompt_chars must be non-zero".to_string()));
        }
        if self.speech.max_segment_chars == 0 {
            return Err(Error::Config("speech.max_segment_chars must be non-zero".to_string()));
        }
        let timeouts = [
            ("llm.timeout_secs", self.llm.timeout_secs),
            ("extraction.timeout_secs", self.extraction.timeout_secs),
            ("converter.timeout_secs", self.converter.timeout_secs),
            ("speech.timeout_secs", self.speech.timeout_secs),
        ];
        for (name, secs) in timeouts {
            if secs == 0 {
                return Err(Error::Config(format!("{} must be non-zero", name)));
            }
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            enable_cors: false,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// API key; usually supplied through `GEMINI_API_KEY`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Temperature for generation (None = model default)
    pub temperature: Option<f32>,
    /// Output token cap (None = model default)
    pub max_output_tokens: Option<u32>,
    /// Largest prompt, in characters, sent to the API
    pub max_prompt_chars: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            temperature: None,
            max_output_tokens: None,
            // ~1M token window at roughly 3 characters per token
            max_prompt_chars: 3_000_000,
            timeout_secs: 120,
        }
    }
}

/// PDF extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Time allowed for the primary extractor before falling back to lopdf
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

/// DOCX to PDF converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// LibreOffice executable
    pub binary: String,
    /// Conversion timeout in seconds
    pub timeout_secs: u64,
    /// Directory under which per-call temp directories are created
    /// (None = system temp dir)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            binary: "soffice".to_string(),
            timeout_secs: 120,
            scratch_dir: None,
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// TTS endpoint base URL
    pub base_url: String,
    /// Language used when a request names none
    pub default_language: String,
    /// Longest text segment sent per request
    pub max_segment_chars: usize,
    /// Slower speech
    pub slow: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translate.google.com".to_string(),
            default_language: "en".to_string(),
            max_segment_chars: 100,
            slow: false,
            timeout_secs: 30,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Characters of extracted text shown in the preview
    pub preview_chars: usize,
    /// Idle time after which a session is dropped
    pub idle_ttl_secs: u64,
    /// Maximum live sessions (least recently used evicted first)
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preview_chars: 1500,
            idle_ttl_secs: 3600,
            max_sessions: 1000,
        }
    }
}
