pub mod data;
pub mod defaults;
pub mod io;

pub use data::{Config, UserProfile};
pub use io::ConfigError;

#[cfg(test)]
mod tests;
