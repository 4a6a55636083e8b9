//! Shared constants used across the application

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shown in the empty input box; submitting it verbatim is ignored.
pub const INPUT_PLACEHOLDER: &str = "Type your query here...";

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant named voltx. You can answer questions, provide explanations, and assist with various tasks. Your goal is to be as helpful and informative as possible. If you don't know the answer, it's okay to say you don't know.";
