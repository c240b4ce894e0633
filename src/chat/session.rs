//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns one
//! conversation transcript and drives the single-request-at-a-time
//! exchange with the completion provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;

use crate::chat::config::ChatConfig;
use crate::client::{CompletionProvider, Palaver};
use crate::error::Result;
use crate::render::Renderer;
use crate::types::{Completion, CompletionEvent, CompletionRequest, Model, Turn, Usage};

/// A chat session that manages conversation state and API interactions.
///
/// The session owns the transcript for its lifetime: turns are appended in
/// the order operations occur, and the transcript is dropped with the
/// session. One exchange is in flight at a time; a failed exchange leaves
/// the session usable for the next submission.
pub struct ChatSession<P: CompletionProvider = Palaver> {
    provider: P,
    config: ChatConfig,
    transcript: Vec<Turn>,
    usage_totals: Usage,
    last_turn_usage: Option<Usage>,
    request_count: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of turns in the transcript.
    pub turn_count: usize,
    /// The maximum tokens per response.
    pub max_tokens: u32,
    /// The system prompt, if any.
    pub system_prompt: Option<String>,
    /// The sampling temperature, if set.
    pub temperature: Option<f32>,
    /// The top-p value, if set.
    pub top_p: Option<f32>,
    /// The configured stop sequences.
    pub stop_sequences: Vec<String>,
    /// The context window in turns (None = full transcript).
    pub context_window: Option<usize>,
    /// Total input tokens across all requests.
    pub total_input_tokens: u64,
    /// Total output tokens across all requests.
    pub total_output_tokens: u64,
    /// Total number of API requests made.
    pub total_requests: u64,
    /// Input tokens for the last exchange, if available.
    pub last_turn_input_tokens: Option<u64>,
    /// Output tokens for the last exchange, if available.
    pub last_turn_output_tokens: Option<u64>,
}

impl<P: CompletionProvider> ChatSession<P> {
    /// Creates a new chat session with the given provider and configuration.
    pub fn new(provider: P, config: ChatConfig) -> Self {
        Self {
            provider,
            config,
            transcript: Vec::new(),
            usage_totals: Usage::new(0, 0),
            last_turn_usage: None,
            request_count: 0,
        }
    }

    /// Sends a user message and returns the assistant's reply.
    ///
    /// This method:
    /// 1. Appends the user turn to the transcript
    /// 2. Sends the context window of the transcript to the provider
    /// 3. Appends the completion as an assistant turn
    /// 4. Returns the assistant text for display
    ///
    /// ```no_run
    /// # use palaver::Palaver;
    /// # use palaver::chat::{ChatConfig, ChatSession};
    /// let client = Palaver::new(None).unwrap();
    /// let mut session = ChatSession::new(client, ChatConfig::default());
    /// let reply = tokio_test::block_on(async { session.submit("Hello").await.unwrap() });
    /// println!("{reply}");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails. The user turn that was
    /// already appended remains in the transcript; no assistant turn is
    /// added, and the next submission proceeds independently.
    pub async fn submit(&mut self, user_text: &str) -> Result<String> {
        self.transcript.push(Turn::user(user_text));

        let request = self.build_request()?;
        let completion = self.provider.complete(request).await?;
        self.record_usage(completion.usage);

        let Completion { text, .. } = completion;
        self.transcript.push(Turn::assistant(text.clone()));
        Ok(text)
    }

    /// Sends a user message and streams the reply through a renderer.
    ///
    /// Text deltas are rendered as they arrive. When the `interrupted` flag
    /// is raised mid-stream, the partial text accumulated so far becomes the
    /// assistant turn; an interrupt before any text arrives appends nothing.
    /// A stream error appends no assistant turn.
    pub async fn submit_streaming(
        &mut self,
        user_text: &str,
        renderer: &mut dyn Renderer,
        interrupted: Arc<AtomicBool>,
    ) -> Result<()> {
        self.transcript.push(Turn::user(user_text));

        let request = self.build_request()?.with_stream(true);
        let mut stream = self.provider.stream(request).await?;

        let mut accumulated = String::new();
        let mut was_interrupted = false;

        while let Some(event) = stream.next().await {
            if interrupted.load(Ordering::Relaxed) {
                was_interrupted = true;
                break;
            }
            match event? {
                CompletionEvent::Start(_) => {}
                CompletionEvent::Delta(delta) => {
                    renderer.print_text(&delta.text);
                    accumulated.push_str(&delta.text);
                }
                CompletionEvent::Stop(stop) => {
                    if let Some(usage) = stop.usage {
                        self.record_usage(usage);
                    }
                    break;
                }
            }
        }

        if was_interrupted {
            renderer.print_interrupted();
            if !accumulated.is_empty() {
                self.transcript.push(Turn::assistant(accumulated));
            }
            return Ok(());
        }

        renderer.finish_response();
        self.transcript.push(Turn::assistant(accumulated));
        Ok(())
    }

    /// Yields the transcript for display, oldest turn first.
    ///
    /// The returned iterator is finite and restartable: calling this any
    /// number of times without an intervening submission yields identical
    /// sequences.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.transcript.iter()
    }

    /// Returns the number of turns in the transcript.
    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Sets or clears the system prompt.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.config.system_prompt = prompt;
    }

    /// Returns the current system prompt, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.config.system_prompt.as_deref()
    }

    /// Sets the maximum tokens per response.
    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        self.config.max_tokens = max_tokens;
    }

    /// Sets the sampling temperature.
    pub fn set_temperature(&mut self, temperature: Option<f32>) {
        self.config.temperature = temperature;
    }

    /// Sets the top-p value.
    pub fn set_top_p(&mut self, top_p: Option<f32>) {
        self.config.top_p = top_p;
    }

    /// Adds a stop sequence to the persistent list.
    pub fn add_stop_sequence(&mut self, sequence: String) {
        if !self
            .config
            .stop_sequences
            .iter()
            .any(|existing| existing == &sequence)
        {
            self.config.stop_sequences.push(sequence);
        }
    }

    /// Clears all stop sequences.
    pub fn clear_stop_sequences(&mut self) {
        self.config.stop_sequences.clear();
    }

    /// Returns the configured stop sequences.
    pub fn stop_sequences(&self) -> &[String] {
        &self.config.stop_sequences
    }

    /// Sets the context window, counted in turns.
    /// `None` sends the full transcript with every request.
    pub fn set_context_window(&mut self, window: Option<usize>) {
        self.config.context_window = window;
    }

    /// Returns the configured context window, if any.
    pub fn context_window(&self) -> Option<usize> {
        self.config.context_window
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            turn_count: self.turn_count(),
            max_tokens: self.config.max_tokens,
            system_prompt: self.config.system_prompt.clone(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            stop_sequences: self.config.stop_sequences.clone(),
            context_window: self.config.context_window,
            total_input_tokens: tokens_to_u64(self.usage_totals.input_tokens),
            total_output_tokens: tokens_to_u64(self.usage_totals.output_tokens),
            total_requests: self.request_count,
            last_turn_input_tokens: self
                .last_turn_usage
                .map(|usage| tokens_to_u64(usage.input_tokens)),
            last_turn_output_tokens: self
                .last_turn_usage
                .map(|usage| tokens_to_u64(usage.output_tokens)),
        }
    }

    /// Builds a request from the configuration and the context window of
    /// the transcript.
    ///
    /// Sampling knobs go through the request builders so an out-of-range
    /// value fails here rather than reaching the wire.
    fn build_request(&self) -> Result<CompletionRequest> {
        let start = match self.config.context_window {
            Some(window) => self.transcript.len().saturating_sub(window),
            None => 0,
        };
        let messages = self.transcript[start..].to_vec();

        let mut request =
            CompletionRequest::new(self.config.max_tokens, messages, self.config.model.clone());
        if let Some(prompt) = &self.config.system_prompt {
            request = request.with_system(prompt.clone());
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature)?;
        }
        if let Some(top_p) = self.config.top_p {
            request = request.with_top_p(top_p)?;
        }
        if !self.config.stop_sequences.is_empty() {
            request = request.with_stop_sequences(self.config.stop_sequences.clone());
        }
        Ok(request)
    }

    fn record_usage(&mut self, usage: Usage) {
        self.last_turn_usage = Some(usage);
        self.usage_totals = self.usage_totals + usage;
        self.request_count = self.request_count.saturating_add(1);
    }
}

fn tokens_to_u64(value: i32) -> u64 {
    value.max(0) as u64
}
