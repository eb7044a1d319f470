mod client;
pub(crate) mod types;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::AiError;
use crate::traits::{ChatModel, Message, MessageRole};
use client::{OpenRouterClient, OPENROUTER_API_URL};
use types::{ChatRequest, WireMessage};

// =============================================================================
// OpenRouter Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenRouter {
    api_key: String,
    pub(crate) model: String,
    base_url: String,
    temperature: f32,
    app_name: Option<String>,
    site_url: Option<String>,
    http: reqwest::Client,
}

impl OpenRouter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENROUTER_API_URL.to_string(),
            temperature: 0.0,
            app_name: None,
            site_url: None,
            http: reqwest::Client::new(),
        }
    }

    /// Point the agent at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    fn client(&self) -> OpenRouterClient {
        let mut client =
            OpenRouterClient::new(&self.api_key, self.http.clone()).with_base_url(&self.base_url);
        if let Some(ref name) = self.app_name {
            client = client.with_app_name(name);
        }
        if let Some(ref url) = self.site_url {
            client = client.with_site_url(url);
        }
        client
    }

    /// Send a conversation and return the first choice's text.
    pub async fn send(&self, messages: Vec<Message>) -> Result<String, AiError> {
        let wire = messages.into_iter().map(|msg| match msg.role {
            MessageRole::System => WireMessage::system(msg.content),
            MessageRole::User => WireMessage::user(msg.content),
            MessageRole::Assistant => WireMessage::assistant(msg.content),
        });

        let request = ChatRequest::new(&self.model)
            .messages(wire)
            .temperature(self.temperature);

        let response = self.client().chat(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::EmptyResponse("OpenRouter".to_string()))
    }

    /// Simple chat completion with one system and one user message.
    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String, AiError> {
        self.send(vec![Message::system(system), Message::user(user)])
            .await
    }
}

// =============================================================================
// ChatModel Implementation
// =============================================================================

#[async_trait]
impl ChatModel for OpenRouter {
    async fn chat(&self, messages: Vec<Message>) -> Result<String> {
        Ok(self.send(messages).await?)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
