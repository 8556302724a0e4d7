use crate::types::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

// Conservative guard against the embedding model's token limit.
const MAX_EMBEDDING_CHARS: usize = 30_000;

/// The injected text-generation capability. Constructed once at process
/// start and shared by reference between the summarization and digest
/// components, which makes substituting a test double trivial.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt. Fails with `RateLimited`, `Timeout` or
    /// `InvalidResponse`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Produce an embedding vector for a piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// OpenAI-backed generator using the chat-completions and embeddings
/// endpoints.
pub struct OpenAiGenerator {
    http: Client,
    api_key: String,
    model: String,
    embedding_model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        let http = Client::builder()
            .user_agent("news-aggregator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_key: api_key.into(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn map_transport_error(e: reqwest::Error) -> PipelineError {
        if e.is_timeout() {
            PipelineError::Timeout
        } else {
            PipelineError::Http(e)
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        debug!("Requesting completion ({} prompt chars)", prompt.len());

        let request = ChatRequest {
            model: &self.model,
            max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PipelineError::RateLimited);
        }
        if !status.is_success() {
            return Err(PipelineError::InvalidResponse(format!(
                "completion endpoint returned HTTP {}",
                status
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(Self::map_transport_error)?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                PipelineError::InvalidResponse("completion returned no choices".to_string())
            })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let truncated: String = if text.chars().count() > MAX_EMBEDDING_CHARS {
            text.chars().take(MAX_EMBEDDING_CHARS).collect()
        } else {
            text.to_string()
        };

        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: &truncated,
        };

        let response = self
            .http
            .post(EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PipelineError::RateLimited);
        }
        if !status.is_success() {
            return Err(PipelineError::InvalidResponse(format!(
                "embedding endpoint returned HTTP {}",
                status
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(Self::map_transport_error)?;

        body.data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| {
                PipelineError::InvalidResponse("embedding returned no data".to_string())
            })
    }
}

/// Canned generator for tests and offline runs, with an optional artificial
/// delay to exercise pacing behavior.
pub struct MockGenerator {
    reply: String,
    delay: Duration,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            reply: "Mock generated text.".to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.reply.clone())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        // Deterministic toy vector: fold byte values into a fixed width.
        let mut vector = vec![0.0f32; 8];
        for (index, byte) in text.bytes().enumerate() {
            vector[index % 8] += f32::from(byte) / 255.0;
        }
        Ok(vector)
    }
}
