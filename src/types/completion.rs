use serde::{Deserialize, Serialize};

use crate::types::{Model, StopReason, Turn, Usage};

/// A completion returned by the service for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Completion {
    /// Unique identifier assigned by the service.
    pub id: String,

    /// The model that generated the completion.
    pub model: Model,

    /// The generated text.
    pub text: String,

    /// Why generation stopped, if the service reported it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,

    /// Token usage for this request.
    pub usage: Usage,
}

impl Completion {
    /// Create a new `Completion`.
    pub fn new(id: String, model: Model, text: String, usage: Usage) -> Self {
        Self {
            id,
            model,
            text,
            stop_reason: None,
            usage,
        }
    }

    /// Set the stop reason.
    pub fn with_stop_reason(mut self, stop_reason: StopReason) -> Self {
        self.stop_reason = Some(stop_reason);
        self
    }
}

impl From<Completion> for Turn {
    fn from(completion: Completion) -> Self {
        Turn::assistant(completion.text)
    }
}
