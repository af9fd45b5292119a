/// LLM Client — the single point of entry for chat-completion calls.
///
/// Every backend implements `ChatBackend`. The orchestrator and the batch
/// ranker only ever see `&dyn ChatBackend`; which concrete backends take part
/// is decided once per run from configuration.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::AppError;

pub mod deepseek;
pub mod openai;
pub mod prompts;

pub use deepseek::DeepSeekBackend;
pub use openai::OpenAiBackend;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A system/user message pair sent as one chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub system: String,
    pub user: String,
}

impl Conversation {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    pub(crate) fn messages(&self) -> Vec<ChatMessage<'_>> {
        vec![
            ChatMessage {
                role: "system",
                content: &self.system,
            },
            ChatMessage {
                role: "user",
                content: &self.user,
            },
        ]
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Chat-completion response shape shared by both backends.
#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletion {
    /// Text of the first choice, if the model returned any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }

    pub fn into_text(self) -> Result<String, LlmError> {
        self.text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// The capability every ranking backend provides: send one conversation,
/// get the assistant's raw reply text back.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short identifier used in log lines and output file names.
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn send(&self, conversation: &Conversation, temperature: f32)
        -> Result<String, LlmError>;
}

/// The backends a run can be asked to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    Chatgpt,
    Deepseek,
}

/// Builds the selected backends in the given order. A selected backend whose
/// API key is not configured is a configuration error.
pub fn build_backends(
    config: &Config,
    kinds: &[BackendKind],
) -> Result<Vec<Box<dyn ChatBackend>>, AppError> {
    let mut backends: Vec<Box<dyn ChatBackend>> = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let backend: Box<dyn ChatBackend> = match kind {
            BackendKind::Chatgpt => {
                let settings = config.openai.as_ref().ok_or_else(|| {
                    AppError::Config("OPENAI_API_KEY is required for the chatgpt backend".into())
                })?;
                Box::new(OpenAiBackend::new(settings).map_err(|e| AppError::Config(e.to_string()))?)
            }
            BackendKind::Deepseek => {
                let settings = config.deepseek.as_ref().ok_or_else(|| {
                    AppError::Config("DEEPSEEK_API_KEY is required for the deepseek backend".into())
                })?;
                Box::new(
                    DeepSeekBackend::new(settings).map_err(|e| AppError::Config(e.to_string()))?,
                )
            }
        };
        info!(backend = backend.name(), model = backend.model(), "Backend initialized");
        backends.push(backend);
    }
    Ok(backends)
}

pub(crate) fn http_client() -> Result<reqwest::Client, LlmError> {
    let builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
    // Tests talk to a local canned server; ambient proxy settings must not intercept it.
    #[cfg(test)]
    let builder = builder.no_proxy();
    Ok(builder.build()?)
}

/// Sends a request built by `build`, retrying on 429 and 5xx with exponential
/// backoff. Any other status except 200 is returned as `LlmError::Api`
/// carrying the status code and the response body.
pub(crate) async fn execute_with_retry<F>(
    backend: &str,
    build: F,
) -> Result<ChatCompletion, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // 1s, 2s
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "{backend} call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("{backend} API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("{backend} API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let completion: ChatCompletion = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "{backend} call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        return Ok(completion);
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: MAX_RETRIES,
    }))
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Scripted backend: replies are consumed in order, and every prompt is recorded.
    pub struct ScriptedBackend {
        name: String,
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        pub fn new(name: &str, replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                name: name.to_string(),
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        fn name(&self) -> &str {
            &self.name
        }

        fn model(&self) -> &str {
            "scripted"
        }

        async fn send(
            &self,
            conversation: &Conversation,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(conversation.user.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }

    /// Lets a test keep a handle on the recorded prompts after handing the backend over.
    #[async_trait]
    impl ChatBackend for std::sync::Arc<ScriptedBackend> {
        fn name(&self) -> &str {
            self.as_ref().name()
        }

        fn model(&self) -> &str {
            self.as_ref().model()
        }

        async fn send(
            &self,
            conversation: &Conversation,
            temperature: f32,
        ) -> Result<String, LlmError> {
            self.as_ref().send(conversation, temperature).await
        }
    }
}
