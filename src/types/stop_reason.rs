use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why the service stopped generating.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished its turn naturally.
    EndTurn,

    /// Generation hit the request's max_tokens limit.
    MaxTokens,

    /// Generation hit one of the request's stop sequences.
    StopSequence,
}

impl StopReason {
    /// The wire spelling of this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::MaxTokens => "max_tokens",
            StopReason::StopSequence => "stop_sequence",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stop reason string is not recognized.
#[derive(Debug)]
pub struct StopReasonParseError {
    /// The string that failed to parse.
    pub invalid_value: String,
}

impl fmt::Display for StopReasonParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown stop reason: {}", self.invalid_value)
    }
}

impl std::error::Error for StopReasonParseError {}

impl FromStr for StopReason {
    type Err = StopReasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "end_turn" => Ok(StopReason::EndTurn),
            "max_tokens" => Ok(StopReason::MaxTokens),
            "stop_sequence" => Ok(StopReason::StopSequence),
            _ => Err(StopReasonParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}
