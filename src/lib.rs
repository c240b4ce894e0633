// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod render;
pub mod types;

// Re-exports
pub use client::{CompletionProvider, EventStream, Palaver};
pub use error::{Error, Result};
pub use types::*;
