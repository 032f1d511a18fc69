//! Answer generation: prompt construction and query dispatch

pub mod dispatcher;
pub mod prompt;

pub use dispatcher::QueryDispatcher;
pub use prompt::PromptBuilder;
