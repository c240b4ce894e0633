use serde::{Deserialize, Serialize};

use crate::types::{StopReason, Usage};

/// Final event on a completion stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionStopEvent {
    /// Why generation stopped, if the service reported it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,

    /// Token usage for the whole request, if the service reported it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl CompletionStopEvent {
    /// Create a new `CompletionStopEvent`.
    pub fn new(stop_reason: Option<StopReason>, usage: Option<Usage>) -> Self {
        Self { stop_reason, usage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialization() {
        let json = json!({
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 4}
        });

        let event: CompletionStopEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.stop_reason, Some(StopReason::EndTurn));
        assert_eq!(event.usage, Some(Usage::new(12, 4)));
    }

    #[test]
    fn empty_stop_event() {
        let event: CompletionStopEvent = serde_json::from_value(json!({})).unwrap();
        assert_eq!(event, CompletionStopEvent::default());
    }
}
