use serde::{Deserialize, Serialize};

use crate::types::{Model, Turn};

/// Parameters for one completion request.
///
/// The request carries the conversation context (or a windowed subset of
/// it, chosen by the caller) together with sampling controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// The maximum number of tokens to generate before stopping.
    pub max_tokens: u32,

    /// The conversation context, oldest turn first.
    pub messages: Vec<Turn>,

    /// The model that will complete the conversation.
    pub model: Model,

    /// System prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Amount of randomness injected into the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Use nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Custom text sequences that will cause the model to stop generating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,

    /// Whether to incrementally stream the response using server-sent events.
    #[serde(default)]
    pub stream: bool,
}

impl CompletionRequest {
    /// Create a new `CompletionRequest` with required fields only.
    pub fn new(max_tokens: u32, messages: Vec<Turn>, model: Model) -> Self {
        Self {
            max_tokens,
            messages,
            model,
            system: None,
            temperature: None,
            top_p: None,
            stop_sequences: None,
            stream: false,
        }
    }

    /// Create a request for a single user message.
    pub fn simple(content: impl Into<String>, model: impl Into<Model>) -> Self {
        Self::new(1024, vec![Turn::user(content)], model.into())
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature field.
    pub fn with_temperature(mut self, temperature: f32) -> Result<Self, crate::Error> {
        validate_float_range(temperature, "temperature")?;
        self.temperature = Some(temperature);
        Ok(self)
    }

    /// Set the top_p field.
    pub fn with_top_p(mut self, top_p: f32) -> Result<Self, crate::Error> {
        validate_float_range(top_p, "top_p")?;
        self.top_p = Some(top_p);
        Ok(self)
    }

    /// Set the stop_sequences field.
    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = Some(stop_sequences);
        self
    }

    /// Set the stream field.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Validate a sampling value is a finite number in the 0.0-1.0 range.
#[inline]
fn validate_float_range(value: f32, field_name: &str) -> Result<(), crate::Error> {
    if (0.0..=1.0).contains(&value) && value.is_finite() {
        return Ok(());
    }

    if value.is_nan() {
        return Err(crate::Error::validation(
            format!("{field_name} cannot be NaN"),
            Some(field_name.to_string()),
        ));
    }

    Err(crate::Error::validation(
        format!("{field_name} must be between 0.0 and 1.0, got {value}"),
        Some(field_name.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;
    use serde_json::{json, to_value};

    #[test]
    fn minimal_request_serialization() {
        let request = CompletionRequest::new(
            256,
            vec![Turn::user("Hello")],
            Model::Known(KnownModel::MistralLargeLatest),
        );

        let json = to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "max_tokens": 256,
                "messages": [{"role": "user", "content": "Hello"}],
                "model": "mistral-large-latest",
                "stream": false
            })
        );
    }

    #[test]
    fn full_request_serialization() {
        let request = CompletionRequest::new(
            256,
            vec![Turn::user("Hello"), Turn::assistant("Hi"), Turn::user("?")],
            Model::Known(KnownModel::MistralSmallLatest),
        )
        .with_system("Be brief.")
        .with_temperature(0.7)
        .unwrap()
        .with_top_p(0.9)
        .unwrap()
        .with_stop_sequences(vec!["END".to_string()])
        .with_stream(true);

        let json = to_value(&request).unwrap();
        assert_eq!(json["system"], "Be brief.");
        assert_eq!(json["stream"], true);
        assert_eq!(json["stop_sequences"], json!(["END"]));
        assert_eq!(json["messages"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn temperature_out_of_range() {
        let request = CompletionRequest::simple("Hi", KnownModel::MistralSmallLatest);
        let err = request.with_temperature(1.5).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn top_p_rejects_nan() {
        let request = CompletionRequest::simple("Hi", KnownModel::MistralSmallLatest);
        assert!(request.with_top_p(f32::NAN).is_err());
    }

    #[test]
    fn stream_defaults_to_false_on_deserialization() {
        let json = json!({
            "max_tokens": 16,
            "messages": [{"role": "user", "content": "Hello"}],
            "model": "mistral-large-latest"
        });

        let request: CompletionRequest = serde_json::from_value(json).unwrap();
        assert!(!request.stream);
    }
}
