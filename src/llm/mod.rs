//! Text-completion collaborator
//!
//! Every prompt the service sends (translation, sentiment classification,
//! framework analysis) goes through [`CompletionProvider`]. The reply is
//! free text and is never schema-validated here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub mod openai;

pub use openai::OpenAiClient;

/// A single-turn prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Sampling temperature; `None` leaves the provider default
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Anything that turns a prompt into text
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the prompt and return the raw reply text
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
