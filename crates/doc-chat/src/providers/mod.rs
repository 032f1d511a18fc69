//! Provider abstractions for the external engines doc-chat delegates to
//!
//! Each engine (PDF extraction, DOCX conversion, text generation, speech)
//! sits behind a trait so the session orchestrator can run against real
//! backends or in-process fakes.

pub mod document;
pub mod gemini;
pub mod google_tts;
pub mod llm;
pub mod speech;

pub use document::{DocumentConverter, TextExtractor};
pub use gemini::GeminiClient;
pub use google_tts::GoogleTranslateTts;
pub use llm::LlmProvider;
pub use speech::SpeechSynthesizer;
