pub mod builtin_providers;
pub mod completion;
pub mod config;
pub mod constants;
pub mod message;
pub mod paths;
pub mod providers;
pub mod session;
pub mod transcript;
