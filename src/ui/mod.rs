//! Terminal UI for the chat window.
//!
//! - [`chat_loop`]: terminal setup, the event loop and key routing.
//! - [`renderer`]: frame layout for the bars, chat pane and input box.
//! - [`markdown`]: assistant replies as styled lines.
//! - [`theme`]: colors and styles.
//!
//! State transitions live in [`crate::core::session`]; this layer only
//! draws that state and turns key presses into actions.

pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod theme;
