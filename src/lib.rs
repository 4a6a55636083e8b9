//! voltx is a terminal assistant for chatting with remote LLM APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns configuration, the provider catalog, the completion
//!   client, transcripts and the chat session state machine.
//! - [`ui`] renders the chat window and runs its event loop.
//! - [`agent`] turns natural-language requests into confirmed shell
//!   commands.
//! - [`auth`] stores API keys in the system keyring and prompts for them.
//! - [`api`] defines the chat completion payloads.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod agent;
pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
