use serde::{Deserialize, Serialize};

use crate::types::Model;

/// First event on a completion stream, announcing the request's identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionStartEvent {
    /// Unique identifier assigned by the service.
    pub id: String,

    /// The model generating the completion.
    pub model: Model,
}

impl CompletionStartEvent {
    /// Create a new `CompletionStartEvent`.
    pub fn new(id: String, model: Model) -> Self {
        Self { id, model }
    }
}
