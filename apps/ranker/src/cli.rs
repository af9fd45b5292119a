use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::{Config, RankSettings, SummarizeSettings};
use crate::errors::AppError;
use crate::llm_client::{build_backends, BackendKind};
use crate::models::JobCatalog;
use crate::pipeline::Persisted;
use crate::{pipeline, summarize};

#[derive(Parser, Debug)]
#[command(
    name = "ranker",
    about = "Summarize resumes and collect LLM candidate rankings per job domain",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Turn resume PDFs (or their JSON excerpts) into short summaries
    Summarize(SummarizeArgs),
    /// Rank candidates per domain with each selected backend
    Rank(RankArgs),
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Candidate list with demographics
    #[arg(long, default_value = "resumes_with_demographics.json")]
    input: PathBuf,
    /// Root directory holding `<DOMAIN>/<file_name>` resume PDFs
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    #[arg(long, default_value = "resume_summaries.json")]
    output: PathBuf,
    /// Sentences kept by the summarizer
    #[arg(long, default_value_t = 5)]
    sentences: usize,
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Candidate summaries to rank
    #[arg(long, default_value = "resume_summaries_v2.json")]
    input: PathBuf,
    /// Directory for `{backend}_{DOMAIN}_global_ranking.json` files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Job catalog JSON replacing the built-in categories and profiles
    #[arg(long)]
    jobs: Option<PathBuf>,
    /// Backends to query, in order (repeatable)
    #[arg(long = "backend", value_enum, default_values_t = [BackendKind::Chatgpt, BackendKind::Deepseek])]
    backends: Vec<BackendKind>,
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: u64,
    /// Stride between window starts
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    step: u64,
    #[arg(long, default_value_t = 0.3)]
    temperature: f32,
    /// Pause between domains, in seconds
    #[arg(long, default_value_t = 2)]
    delay_secs: u64,
    /// Add an end-aligned window so trailing candidates are never left unranked
    #[arg(long)]
    cover_tail: bool,
}

impl From<SummarizeArgs> for SummarizeSettings {
    fn from(args: SummarizeArgs) -> Self {
        Self {
            input: args.input,
            data_dir: args.data_dir,
            output: args.output,
            sentence_count: args.sentences,
            ..Self::default()
        }
    }
}

impl RankArgs {
    fn settings(&self) -> RankSettings {
        RankSettings {
            input: self.input.clone(),
            output_dir: self.output_dir.clone(),
            batch_size: self.batch_size as usize,
            step: self.step as usize,
            temperature: self.temperature,
            domain_delay: Duration::from_secs(self.delay_secs),
            cover_tail: self.cover_tail,
        }
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<(), AppError> {
    match cli.command {
        Command::Summarize(args) => {
            let settings = SummarizeSettings::from(args);
            // PDF extraction is blocking work.
            tokio::task::spawn_blocking(move || summarize::run(&settings))
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("summarize task failed: {e}")))??;
            Ok(())
        }
        Command::Rank(args) => {
            let catalog = match &args.jobs {
                Some(path) => JobCatalog::load(path)?,
                None => JobCatalog::builtin()?,
            };
            let backends = build_backends(&config, &args.backends)?;
            let report = pipeline::run(&backends, &catalog, &args.settings()).await?;
            for domain in &report.domains {
                for backend in &domain.backends {
                    info!(
                        domain = %domain.domain,
                        candidates = domain.candidates,
                        mode = ?domain.mode,
                        backend = %backend.backend,
                        windows = ?backend.windows,
                        "{}",
                        describe(&backend.persisted)
                    );
                }
            }
            info!(
                "Ranked {} domain(s); {} skipped with no candidates",
                report.domains.len(),
                report.skipped_domains.len()
            );
            Ok(())
        }
    }
}

fn describe(persisted: &Persisted) -> String {
    match persisted {
        Persisted::Written(path) => format!("wrote {}", path.display()),
        Persisted::WriteFailed(path) => format!("failed to write {}", path.display()),
        Persisted::NoResponse(reason) => format!("no usable response ({reason}), nothing written"),
    }
}
