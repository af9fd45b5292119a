use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";
const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Process configuration loaded once from the environment at startup.
/// Credentials are optional here; a backend selected for a run without its key
/// is rejected when the backends are built.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai: Option<OpenAiConfig>,
    pub deepseek: Option<DeepSeekConfig>,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub organization: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai = non_empty("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            organization: non_empty("OPENAI_ORGANIZATION"),
            model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        });

        let deepseek = match non_empty("DEEPSEEK_API_KEY") {
            Some(api_key) => {
                let base_url = non_empty("DEEPSEEK_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_DEEPSEEK_BASE_URL.to_string());
                reqwest::Url::parse(&base_url)
                    .with_context(|| format!("DEEPSEEK_BASE_URL '{base_url}' is not a valid URL"))?;
                Some(DeepSeekConfig {
                    api_key,
                    base_url,
                    model: non_empty("DEEPSEEK_MODEL")
                        .unwrap_or_else(|| DEFAULT_DEEPSEEK_MODEL.to_string()),
                })
            }
            None => None,
        };

        Ok(Config {
            openai,
            deepseek,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Knobs for the ranking stage.
#[derive(Debug, Clone)]
pub struct RankSettings {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub batch_size: usize,
    pub step: usize,
    pub temperature: f32,
    pub domain_delay: Duration,
    /// Add one full-size window aligned to the end of the list when the
    /// stride leaves trailing candidates with fewer judgments.
    pub cover_tail: bool,
}

impl Default for RankSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("resume_summaries_v2.json"),
            output_dir: PathBuf::from("."),
            batch_size: 5,
            step: 1,
            temperature: 0.3,
            domain_delay: Duration::from_secs(2),
            cover_tail: false,
        }
    }
}

/// Knobs for the summarize stage.
#[derive(Debug, Clone)]
pub struct SummarizeSettings {
    pub input: PathBuf,
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub sentence_count: usize,
    pub min_education_len: usize,
}

impl Default for SummarizeSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("resumes_with_demographics.json"),
            data_dir: PathBuf::from("data"),
            output: PathBuf::from("resume_summaries.json"),
            sentence_count: 5,
            min_education_len: 30,
        }
    }
}
