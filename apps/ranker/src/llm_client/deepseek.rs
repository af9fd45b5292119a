//! Backend B: DeepSeek's OpenAI-compatible endpoint, reached at a configurable base URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{execute_with_retry, http_client, ChatBackend, ChatMessage, Conversation, LlmError};
use crate::config::DeepSeekConfig;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Serialize)]
struct DeepSeekRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Clone)]
pub struct DeepSeekBackend {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl DeepSeekBackend {
    pub const NAME: &'static str = "deepseek";

    pub fn new(config: &DeepSeekConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client()?,
            api_key: config.api_key.clone(),
            endpoint: endpoint_for(&config.base_url),
            model: config.model.clone(),
        })
    }
}

fn endpoint_for(base_url: &str) -> String {
    format!("{}{CHAT_COMPLETIONS_PATH}", base_url.trim_end_matches('/'))
}

#[async_trait]
impl ChatBackend for DeepSeekBackend {
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
        let body = DeepSeekRequest {
            model: &self.model,
            messages: conversation.messages(),
            temperature,
            stream: false,
        };

        let completion = execute_with_retry(Self::NAME, || {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .header("Content-Type", "application/json")
                .json(&body)
        })
        .await?;

        completion.into_text()
    }
}
