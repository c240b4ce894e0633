use std::env;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{Completion, CompletionEvent, CompletionRequest};

const DEFAULT_API_URL: &str = "https://api.palaver.chat/v1/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A boxed stream of completion events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<CompletionEvent>> + Send>>;

/// The source of completions for a chat session.
///
/// [`Palaver`] is the production implementation; tests substitute scripted
/// providers to exercise session behavior without a network.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send a request and wait for the whole completion.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;

    /// Send a request and stream the completion incrementally.
    async fn stream(&self, request: CompletionRequest) -> Result<EventStream>;
}

/// Client for the Palaver completion API.
#[derive(Debug, Clone)]
pub struct Palaver {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

/// Body shape the service uses for error responses.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

impl Palaver {
    /// Create a new Palaver client.
    ///
    /// The API key can be passed directly or read from the PALAVER_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with a custom base URL or timeout.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var("PALAVER_API_KEY").map_err(|_| {
                Error::authentication(
                    "API key not provided and PALAVER_API_KEY environment variable not set",
                )
            })?,
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout,
        })
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::authentication("API key contains invalid header characters"))?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);
        Ok(headers)
    }

    /// Turn a non-2xx response into the matching [`Error`] variant.
    async fn error_for_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        // The body may not be the documented error shape; fall back to raw text
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.error);
        let error_type = detail.as_ref().and_then(|d| d.error_type.clone());
        let param = detail.as_ref().and_then(|d| d.param.clone());
        let message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| body.clone());

        match status_code {
            400 => Error::bad_request(message, param),
            401 => Error::authentication(message),
            403 => Error::permission(message),
            404 => Error::not_found(message),
            408 => Error::timeout(message, None),
            429 => Error::rate_limit(message, retry_after),
            500 => Error::internal_server(message, request_id),
            502..=504 => Error::service_unavailable(message, retry_after),
            _ => Error::api(status_code, error_type, message, request_id),
        }
    }

    fn error_for_transport(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Send a request and wait for the whole completion.
    pub async fn send(&self, mut request: CompletionRequest) -> Result<Completion> {
        request.stream = false;
        let url = format!("{}completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.error_for_transport(e))?;

        if !response.status().is_success() {
            return Err(Self::error_for_response(response).await);
        }

        response.json::<Completion>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Send a request and stream the completion as server-sent events.
    pub async fn stream(&self, mut request: CompletionRequest) -> Result<EventStream> {
        request.stream = true;
        let url = format!("{}completions", self.base_url);

        let mut headers = self.default_headers()?;
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/event-stream"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.error_for_transport(e))?;

        if !response.status().is_success() {
            return Err(Self::error_for_response(response).await);
        }

        Ok(Box::pin(decode_sse(response.bytes_stream())))
    }
}

#[async_trait::async_trait]
impl CompletionProvider for Palaver {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        self.send(request).await
    }

    async fn stream(&self, request: CompletionRequest) -> Result<EventStream> {
        Palaver::stream(self, request).await
    }
}

/// Decode a byte stream of server-sent events into completion events.
fn decode_sse<S>(byte_stream: S) -> impl Stream<Item = Result<CompletionEvent>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + Unpin + 'static,
{
    let byte_stream = byte_stream.map(|chunk| {
        chunk.map_err(|e| {
            Error::streaming(format!("Error in HTTP stream: {}", e), Some(Box::new(e)))
        })
    });

    // Chunks split events at arbitrary byte offsets; accumulate until an
    // event delimiter appears.
    stream::unfold(
        (byte_stream, String::new()),
        move |(mut byte_stream, mut pending)| async move {
            loop {
                if let Some((event, rest)) = next_event(&pending) {
                    pending = rest;
                    return Some((event, (byte_stream, pending)));
                }

                match byte_stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => pending.push_str(&text),
                        Err(e) => {
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {}", e),
                                    Some(Box::new(e)),
                                )),
                                (byte_stream, pending),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        return Some((Err(e), (byte_stream, pending)));
                    }
                    None => {
                        if !pending.is_empty() {
                            if let Some((event, _)) = next_event(&pending) {
                                return Some((event, (byte_stream, pending)));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Pull one complete event off the front of the buffer, if there is one.
fn next_event(buffer: &str) -> Option<(Result<CompletionEvent>, String)> {
    let (event_text, rest) = buffer.split_once("\n\n")?;
    let rest = rest.to_string();

    let data = event_text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .last();

    match data {
        Some("[DONE]") => Some((Ok(CompletionEvent::Stop(Default::default())), rest)),
        Some(json_str) => match serde_json::from_str::<CompletionEvent>(json_str) {
            Ok(event) => Some((Ok(event), rest)),
            Err(e) => Some((
                Err(Error::serialization(
                    format!("Failed to parse event JSON: {}", e),
                    Some(Box::new(e)),
                )),
                rest,
            )),
        },
        // Comments and keep-alives carry no data; treat like end-of-stream
        None => Some((Ok(CompletionEvent::Stop(Default::default())), rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KnownModel, Model, StopReason, TextDelta};

    #[test]
    fn client_creation() {
        let client = Palaver::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = Palaver::with_options(
            Some("test-key".to_string()),
            Some("https://custom-api.example.com/".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, "https://custom-api.example.com/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn next_event_waits_for_delimiter() {
        let buffer = "data: {\"type\":\"delta\",\"text\":\"Hi\"}";
        assert!(next_event(buffer).is_none());
    }

    #[test]
    fn next_event_parses_delta() {
        let buffer = "data: {\"type\":\"delta\",\"text\":\"Hi\"}\n\nrest";
        let (event, rest) = next_event(buffer).unwrap();
        assert_eq!(event.unwrap(), CompletionEvent::Delta(TextDelta::new("Hi")));
        assert_eq!(rest, "rest");
    }

    #[test]
    fn next_event_handles_done_marker() {
        let buffer = "data: [DONE]\n\n";
        let (event, rest) = next_event(buffer).unwrap();
        assert_eq!(event.unwrap(), CompletionEvent::Stop(Default::default()));
        assert!(rest.is_empty());
    }

    #[test]
    fn next_event_reports_bad_json() {
        let buffer = "data: {not json}\n\n";
        let (event, _) = next_event(buffer).unwrap();
        assert!(event.is_err());
    }

    #[tokio::test]
    async fn decode_sse_yields_full_exchange() {
        let frames: Vec<std::result::Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from(
                "event: start\ndata: {\"type\":\"start\",\"id\":\"cmpl_1\",\"model\":\"mistral-small-latest\"}\n\n",
            )),
            Ok(Bytes::from(
                "data: {\"type\":\"delta\",\"text\":\"Hi \"}\n\ndata: {\"type\":\"de",
            )),
            Ok(Bytes::from("lta\",\"text\":\"there\"}\n\n")),
            Ok(Bytes::from(
                "data: {\"type\":\"stop\",\"stop_reason\":\"end_turn\",\"usage\":{\"input_tokens\":3,\"output_tokens\":2}}\n\n",
            )),
        ];
        let byte_stream = stream::iter(frames);

        let events: Vec<_> = decode_sse(byte_stream).collect().await;
        assert_eq!(events.len(), 4);

        match events[0].as_ref().unwrap() {
            CompletionEvent::Start(start) => {
                assert_eq!(start.id, "cmpl_1");
                assert_eq!(start.model, Model::Known(KnownModel::MistralSmallLatest));
            }
            other => panic!("expected start event, got {:?}", other),
        }
        assert_eq!(
            *events[1].as_ref().unwrap(),
            CompletionEvent::Delta(TextDelta::new("Hi "))
        );
        assert_eq!(
            *events[2].as_ref().unwrap(),
            CompletionEvent::Delta(TextDelta::new("there"))
        );
        match events[3].as_ref().unwrap() {
            CompletionEvent::Stop(stop) => {
                assert_eq!(stop.stop_reason, Some(StopReason::EndTurn));
            }
            other => panic!("expected stop event, got {:?}", other),
        }
    }
}
