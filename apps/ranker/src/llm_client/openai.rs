//! Backend A: the hosted OpenAI chat-completions service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{execute_with_retry, http_client, ChatBackend, ChatMessage, Conversation, LlmError};
use crate::config::OpenAiConfig;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

/// Session against the OpenAI API. One HTTP client is reused for every call of a run.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    organization: Option<String>,
    model: String,
}

impl OpenAiBackend {
    pub const NAME: &'static str = "chatgpt";

    pub fn new(config: &OpenAiConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client()?,
            api_key: config.api_key.clone(),
            organization: config.organization.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(
        &self,
        conversation: &Conversation,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let body = OpenAiRequest {
            model: &self.model,
            messages: conversation.messages(),
            temperature,
        };

        let completion = execute_with_retry(Self::NAME, || {
            let request = self
                .client
                .post(OPENAI_API_URL)
                .bearer_auth(&self.api_key)
                .json(&body);
            match &self.organization {
                Some(org) => request.header("OpenAI-Organization", org),
                None => request,
            }
        })
        .await?;

        completion.into_text()
    }
}
