//! doc-chat server binary
//!
//! Run with: cargo run -p doc-chat --bin doc-chat-server

use doc_chat::{
    config::ChatConfig, ingestion::LibreOfficeConverter, providers::DocumentConverter,
    server::DocChatServer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_chat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                     PDF 📄 Chatbot 👾                     ║
║        Ask your PDFs, convert DOCX, hear the answers      ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let config = ChatConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Max prompt: {} chars", config.llm.max_prompt_chars);
    tracing::info!("  - Converter: {}", config.converter.binary);
    tracing::info!("  - Speech language: {}", config.speech.default_language);

    if config.llm.api_key.is_none() {
        tracing::warn!("No Gemini API key configured; questions will fail until one is set");
        tracing::warn!("  export GEMINI_API_KEY=<key>  (or GOOGLE_API_KEY)");
    }

    // Check LibreOffice
    tracing::info!("Checking LibreOffice ('{}')...", config.converter.binary);
    if LibreOfficeConverter::new(&config.converter).is_available().await {
        tracing::info!("LibreOffice is available");
    } else {
        tracing::warn!("LibreOffice not found; DOCX conversion will fail");
        tracing::warn!("  Install: apt install libreoffice-writer-nogui (or set converter.binary)");
    }

    // Create and start server
    let server = DocChatServer::new(config)?;

    println!("\nServer starting...");
    println!("  UI: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/pdf        - Upload a PDF");
    println!("  POST /api/pdf/query  - Ask about the PDF");
    println!("  POST /api/docx       - Convert DOCX to PDF");
    println!("  POST /api/query      - General chat");
    println!("  POST /api/speech     - Speak the last answer");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
