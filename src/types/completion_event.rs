use serde::{Deserialize, Serialize};

use crate::types::{CompletionStartEvent, CompletionStopEvent, TextDelta};

/// Events that arrive on a streaming completion response.
///
/// A well-formed stream is one `Start`, zero or more `Delta`s, then one
/// `Stop`. The concatenated delta text equals the text a non-streaming
/// request would have returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletionEvent {
    /// The service accepted the request and began generating.
    Start(CompletionStartEvent),

    /// An incremental chunk of generated text.
    Delta(TextDelta),

    /// Generation finished.
    Stop(CompletionStopEvent),
}
