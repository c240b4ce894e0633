// Public modules
pub mod completion;
pub mod completion_event;
pub mod completion_request;
pub mod completion_start_event;
pub mod completion_stop_event;
pub mod model;
pub mod stop_reason;
pub mod text_delta;
pub mod turn;
pub mod usage;

// Re-exports
pub use completion::Completion;
pub use completion_event::CompletionEvent;
pub use completion_request::CompletionRequest;
pub use completion_start_event::CompletionStartEvent;
pub use completion_stop_event::CompletionStopEvent;
pub use model::{KnownModel, Model, UnknownModelError};
pub use stop_reason::{StopReason, StopReasonParseError};
pub use text_delta::TextDelta;
pub use turn::{Role, Turn};
pub use usage::Usage;
