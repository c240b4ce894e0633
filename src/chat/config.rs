//! Configuration for the chat application.
//!
//! CLI flags parse via `arrrg` into [`ChatArgs`], which resolves into a
//! [`ChatConfig`] with defaults filled in.

use arrrg_derive::CommandLine;

use crate::types::{KnownModel, Model};

const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Command-line arguments for the palaver-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: mistral-large-latest)", "MODEL")]
    pub model: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: 1024)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Context window, counted in turns.
    #[arrrg(optional, "Send only the most recent N turns (default: all)", "TURNS")]
    pub window: Option<usize>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Resolved settings for one chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model completing the conversation.
    pub model: Model,

    /// System prompt sent with every request, if set.
    pub system_prompt: Option<String>,

    /// Maximum tokens per response.
    pub max_tokens: u32,

    /// Whether output uses ANSI colors and styles.
    pub use_color: bool,

    /// Sampling temperature, if overridden.
    pub temperature: Option<f32>,

    /// Top-p nucleus sampling value, if overridden.
    pub top_p: Option<f32>,

    /// Stop sequences sent with every request.
    pub stop_sequences: Vec<String>,

    /// How many of the most recent turns to send as context.
    /// `None` sends the full transcript.
    pub context_window: Option<usize>,
}

impl ChatConfig {
    /// Creates a config with the stock defaults: mistral-large-latest,
    /// 1024 max tokens, color on, full-transcript context.
    pub fn new() -> Self {
        Self {
            model: Model::Known(KnownModel::MistralLargeLatest),
            system_prompt: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            use_color: true,
            temperature: None,
            top_p: None,
            stop_sequences: Vec::new(),
            context_window: None,
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the stop sequences.
    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = stop_sequences;
        self
    }

    /// Sets the context window, counted in turns.
    /// `None` sends the full transcript with every request.
    pub fn with_context_window(mut self, window: Option<usize>) -> Self {
        self.context_window = window;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        // Model names the service adds later still work from the CLI.
        let model = args
            .model
            .map(|s| s.parse::<Model>().unwrap_or(Model::Custom(s)))
            .unwrap_or(Model::Known(KnownModel::MistralLargeLatest));

        ChatConfig {
            model,
            system_prompt: args.system,
            max_tokens: args.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            use_color: !args.no_color,
            context_window: args.window,
            ..ChatConfig::new()
        }
    }
}
