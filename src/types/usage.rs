use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Token usage reported for one completion request.
///
/// The service bills and rate-limits by token counts, so usage is reported
/// with every completion and accumulated per session.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    /// The number of input tokens consumed by the request context.
    pub input_tokens: i32,

    /// The number of output tokens generated.
    pub output_tokens: i32,
}

impl Usage {
    /// Create a new `Usage` with the given input and output tokens.
    pub fn new(input_tokens: i32, output_tokens: i32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            input_tokens: self.input_tokens.saturating_add(rhs.input_tokens),
            output_tokens: self.output_tokens.saturating_add(rhs.output_tokens),
        }
    }
}
