//! Streaming client for OpenAI-compatible chat completion APIs
//!
//! Serves both OpenAI and Perplexity, which expose the same
//! `/chat/completions` contract with server-sent event streaming.

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use super::dispatch::{ChunkStream, CompletionBackend, Delta};
use super::models::{Backend, ModelName};
use super::sse::{SseDecoder, SseEvent};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai";
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Client for one OpenAI-compatible endpoint
pub struct OpenAiCompatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// One streamed `chat.completion.chunk`
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: ChoiceDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

impl OpenAiCompatClient {
    pub fn new(base_url: &str, api_key: String, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(format!("promptpad/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            max_tokens: None,
            temperature: None,
        })
    }

    /// Client for `model` on its default endpoint
    pub fn for_model(model: ModelName, api_key: String) -> Result<Self> {
        let base_url = match model.backend() {
            Backend::OpenAi => OPENAI_API_URL,
            Backend::Perplexity => PERPLEXITY_API_URL,
        };
        Self::new(base_url, api_key, model.api_model())
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Open a streamed completion for a single user message
    pub async fn stream_chat(&self, prompt: &str) -> Result<ChunkStream> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: true,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!("POST {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<ApiErrorBody>(&error_text) {
                anyhow::bail!(
                    "API error ({}{}): {}",
                    status,
                    body.error
                        .error_type
                        .map(|t| format!(", {}", t))
                        .unwrap_or_default(),
                    body.error.message
                );
            }
            anyhow::bail!("API error ({}): {}", status, error_text);
        }

        Ok(delta_stream(response.bytes_stream()))
    }
}

impl CompletionBackend for OpenAiCompatClient {
    async fn stream(&self, prompt: &str) -> Result<ChunkStream> {
        self.stream_chat(prompt).await
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

struct StreamState {
    body: ByteStream,
    decoder: SseDecoder,
    queue: VecDeque<Delta>,
    finished: bool,
}

impl StreamState {
    fn handle(&mut self, event: SseEvent) {
        if self.finished {
            return;
        }
        match event {
            SseEvent::Done => self.finished = true,
            SseEvent::Data(json) => match serde_json::from_str::<StreamChunk>(&json) {
                Ok(chunk) => {
                    for choice in chunk.choices {
                        self.queue.push_back(Delta {
                            text: choice.delta.content.unwrap_or_default(),
                            finish_reason: choice.finish_reason,
                        });
                    }
                }
                Err(e) => tracing::warn!("Failed to parse stream chunk: {}", e),
            },
        }
    }
}

/// Turn an SSE response body into a stream of text deltas
fn delta_stream<S>(body: S) -> ChunkStream
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    let state = StreamState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        queue: VecDeque::new(),
        finished: false,
    };

    let deltas = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(delta) = state.queue.pop_front() {
                return Some((Ok(delta), state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    for event in state.decoder.push(&bytes) {
                        state.handle(event);
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    let err = anyhow::Error::new(e).context("Response stream interrupted");
                    return Some((Err(err), state));
                }
                None => {
                    if let Some(event) = state.decoder.finish() {
                        state.handle(event);
                    }
                    state.finished = true;
                }
            }
        }
    });

    Box::pin(deltas)
}
