//! Per-window ranking flow: prompt → backend → parse → keep or discard.

use tracing::{debug, info, warn};

use crate::llm_client::prompts::HR_EVALUATOR_SYSTEM;
use crate::llm_client::{ChatBackend, Conversation, LlmError};
use crate::models::{BatchRanking, Candidate, JobProfile};
use crate::ranking::parser::{parse_ranking_response, ParseOutcome};
use crate::ranking::prompts::build_ranking_prompt;
use crate::ranking::windows::{uncovered, window_ranges};

/// Result of one ranking request.
#[derive(Debug)]
pub enum RequestOutcome {
    Ranked(BatchRanking),
    CallFailed(LlmError),
    Unusable(ParseOutcome),
}

/// Windowing parameters for one domain.
#[derive(Debug, Clone, Copy)]
pub struct WindowPlan {
    pub batch_size: usize,
    pub step: usize,
    pub cover_tail: bool,
    pub temperature: f32,
}

/// Counters reported after a windowed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub windows_sent: usize,
    pub windows_kept: usize,
    pub call_failures: usize,
    pub parse_failures: usize,
}

/// Sends one prompt for `candidates` and parses the reply.
/// Failures are logged here and returned as data.
pub async fn request_ranking(
    backend: &dyn ChatBackend,
    profile: &JobProfile,
    candidates: &[Candidate],
    temperature: f32,
) -> RequestOutcome {
    let prompt = build_ranking_prompt(&profile.job_description, &profile.requirements, candidates);
    let conversation = Conversation::new(HR_EVALUATOR_SYSTEM, prompt);

    debug!(
        backend = backend.name(),
        model = backend.model(),
        candidates = candidates.len(),
        "Sending ranking prompt"
    );

    let reply = match backend.send(&conversation, temperature).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(backend = backend.name(), "Ranking call failed: {e}");
            return RequestOutcome::CallFailed(e);
        }
    };

    match parse_ranking_response(&reply) {
        ParseOutcome::Parsed(ranking) => RequestOutcome::Ranked(ranking),
        outcome => {
            log_unusable(backend.name(), &outcome);
            RequestOutcome::Unusable(outcome)
        }
    }
}

fn log_unusable(backend: &str, outcome: &ParseOutcome) {
    match outcome {
        ParseOutcome::Empty => warn!(backend, "Empty response received"),
        ParseOutcome::MissingRanking { text } => {
            warn!(backend, "Response has no ranking; response text was: {text}")
        }
        ParseOutcome::Malformed { error, text } => {
            warn!(backend, "Error parsing response: {error}; response text was: {text}")
        }
        ParseOutcome::Parsed(_) => {}
    }
}

/// Ranks every window of `candidates` with `backend`, returning the rankings
/// that came back usable, in window order.
pub async fn rank_in_batches(
    backend: &dyn ChatBackend,
    profile: &JobProfile,
    candidates: &[Candidate],
    plan: WindowPlan,
) -> (Vec<BatchRanking>, BatchReport) {
    let ranges = window_ranges(candidates.len(), plan.batch_size, plan.step, plan.cover_tail);

    let missed = uncovered(candidates.len(), &ranges);
    if !missed.is_empty() {
        let names: Vec<&str> = missed
            .iter()
            .map(|&i| candidates[i].file_name.as_str())
            .collect();
        warn!(
            backend = backend.name(),
            "{} trailing candidate(s) fall outside every window and will not be ranked: {}",
            names.len(),
            names.join(", ")
        );
    }

    let mut report = BatchReport::default();
    let mut rankings = Vec::with_capacity(ranges.len());

    for (n, range) in ranges.into_iter().enumerate() {
        info!(
            backend = backend.name(),
            "Sending window {} (candidates {}..{})",
            n + 1,
            range.start,
            range.end
        );
        report.windows_sent += 1;

        match request_ranking(backend, profile, &candidates[range], plan.temperature).await {
            RequestOutcome::Ranked(ranking) => {
                report.windows_kept += 1;
                rankings.push(ranking);
            }
            RequestOutcome::CallFailed(_) => report.call_failures += 1,
            RequestOutcome::Unusable(_) => report.parse_failures += 1,
        }
    }

    (rankings, report)
}
