use serde::{Deserialize, Serialize};

/// An incremental chunk of generated text in a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextDelta {
    /// The text fragment to append to the response so far.
    pub text: String,
}

impl TextDelta {
    /// Create a new `TextDelta`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
