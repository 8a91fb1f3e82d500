//! Answer synthesis: prompt assembly and the hosted chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::document::{Answer, Chunk};
use crate::error::{RagError, Result};
use crate::hosted::ErrorResponse;

/// The default chat-completions endpoint (Groq's OpenAI-compatible API).
const DEFAULT_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// The default chat model.
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Temperature is kept at zero for factual question answering.
const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Upper bound on generated tokens per answer.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// The system prompt sent with every question.
const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions \
based on the provided context. If the context doesn't contain relevant \
information, say so.";

/// A hosted chat model that completes a prompt into answer text.
///
/// The seam between prompt assembly and the LLM provider; tests substitute
/// a canned implementation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for the given system and user messages.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// A [`ChatModel`] backed by an OpenAI-compatible chat-completions API,
/// Groq by default.
///
/// No automatic retry is performed; network failures, authentication
/// failures, and rate limits all surface as
/// [`RagError::ExternalServiceError`].
pub struct GroqChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GroqChatModel {
    /// Create a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ExternalServiceError`] if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ExternalServiceError {
                provider: "chat".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_CHAT_URL.into(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Create a new client using the `GROQ_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ExternalServiceError`] if the variable is unset.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| RagError::ExternalServiceError {
            provider: "chat".into(),
            message: "GROQ_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the chat model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the maximum number of generated tokens per answer.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl ChatModel for GroqChatModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        debug!(provider = "chat", model = %self.model, prompt_len = user.len(), "requesting completion");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "chat", error = %e, "request failed");
                RagError::ExternalServiceError {
                    provider: "chat".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "chat", %status, "API error");
            return Err(RagError::ExternalServiceError {
                provider: "chat".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "chat", error = %e, "failed to parse response");
            RagError::ExternalServiceError {
                provider: "chat".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat_response.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            RagError::ExternalServiceError {
                provider: "chat".into(),
                message: "API returned no choices".into(),
            }
        })
    }
}

/// Assembles a prompt from retrieved chunks and a question, and forwards it
/// to a [`ChatModel`].
pub struct AnswerSynthesizer {
    model: std::sync::Arc<dyn ChatModel>,
}

impl AnswerSynthesizer {
    /// Create a synthesizer backed by the given chat model.
    pub fn new(model: std::sync::Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Build the user prompt: context chunks in retrieved order, then the question.
    fn build_prompt(question: &str, context: &[Chunk]) -> String {
        let context_text =
            context.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n\n");
        format!("Context:\n{context_text}\n\nQuestion: {question}")
    }

    /// Generate an answer to `question` grounded in `context`.
    ///
    /// The model's output is returned verbatim in [`Answer::text`].
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::ExternalServiceError`] from the chat model.
    pub async fn synthesize(&self, question: &str, context: Vec<Chunk>) -> Result<Answer> {
        let prompt = Self::build_prompt(question, &context);
        let text = self.model.complete(SYSTEM_PROMPT, &prompt).await?;
        info!(context_chunks = context.len(), answer_len = text.len(), "synthesized answer");
        Ok(Answer { text, context })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        assert!(matches!(GroqChatModel::new(""), Err(RagError::ExternalServiceError { .. })));
    }

    #[test]
    fn prompt_keeps_chunks_in_retrieved_order() {
        let chunks: Vec<Chunk> = ["second hit", "first hit"]
            .iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                id: format!("d_{i}"),
                text: (*text).to_string(),
                ordinal: i,
                document_id: "d".to_string(),
                metadata: HashMap::new(),
            })
            .collect();

        let prompt = AnswerSynthesizer::build_prompt("what?", &chunks);
        let second = prompt.find("second hit").unwrap();
        let first = prompt.find("first hit").unwrap();
        assert!(second < first);
        assert!(prompt.ends_with("Question: what?"));
    }
}
