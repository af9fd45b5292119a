//! Run Orchestrator — ranks every configured domain with every selected backend.
//!
//! Flow per domain: group → job profile → (windowed rank + Borda merge | single prompt)
//!                  → persist `{backend}_{DOMAIN}_global_ranking.json` → pause.
//!
//! Only an unreadable candidate list stops the run. Backend, parse and write
//! failures are logged and recorded in the returned report.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::RankSettings;
use crate::errors::AppError;
use crate::llm_client::ChatBackend;
use crate::models::{group_by_domain, Candidate, JobCatalog, JobProfile};
use crate::ranking::{
    merge_batch_rankings, rank_in_batches, request_ranking, BatchReport, ParseOutcome,
    RequestOutcome, WindowPlan,
};
use crate::store::{ranking_path, read_candidates, write_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMode {
    Windowed,
    SingleShot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persisted {
    Written(PathBuf),
    WriteFailed(PathBuf),
    /// The backend produced no usable reply (call failure or blank text), so nothing was written.
    NoResponse(String),
}

#[derive(Debug, Clone)]
pub struct BackendRun {
    pub backend: String,
    pub persisted: Persisted,
    /// Window counters; `None` on the single-shot path.
    pub windows: Option<BatchReport>,
}

#[derive(Debug, Clone)]
pub struct DomainRun {
    pub domain: String,
    pub candidates: usize,
    pub mode: RankingMode,
    pub backends: Vec<BackendRun>,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub domains: Vec<DomainRun>,
    pub skipped_domains: Vec<String>,
}

/// Loads the candidate list from `settings.input` and ranks it.
pub async fn run(
    backends: &[Box<dyn ChatBackend>],
    catalog: &JobCatalog,
    settings: &RankSettings,
) -> Result<RunReport, AppError> {
    let candidates = read_candidates(&settings.input)?;
    if candidates.is_empty() {
        warn!("No candidate data found in {}", settings.input.display());
        return Ok(RunReport::default());
    }
    Ok(rank_domains(backends, catalog, settings, candidates).await)
}

pub async fn rank_domains(
    backends: &[Box<dyn ChatBackend>],
    catalog: &JobCatalog,
    settings: &RankSettings,
    candidates: Vec<Candidate>,
) -> RunReport {
    let mut groups = group_by_domain(candidates);
    let mut report = RunReport::default();

    for domain in &catalog.categories {
        info!("Processing domain: {domain}");
        let domain_candidates = match groups.remove(domain) {
            Some(group) if !group.is_empty() => group,
            _ => {
                info!("No candidates found for domain '{domain}'. Skipping.");
                report.skipped_domains.push(domain.clone());
                continue;
            }
        };

        let profile = catalog.profile_for(domain);
        let domain_run = rank_domain(backends, &profile, settings, domain, &domain_candidates).await;
        report.domains.push(domain_run);

        if !settings.domain_delay.is_zero() {
            tokio::time::sleep(settings.domain_delay).await;
        }
    }

    report
}

async fn rank_domain(
    backends: &[Box<dyn ChatBackend>],
    profile: &JobProfile,
    settings: &RankSettings,
    domain: &str,
    candidates: &[Candidate],
) -> DomainRun {
    let mode = if candidates.len() > settings.batch_size {
        RankingMode::Windowed
    } else {
        RankingMode::SingleShot
    };
    info!(
        "Domain '{domain}' has {} candidates. Using {}.",
        candidates.len(),
        match mode {
            RankingMode::Windowed => "batch ranking",
            RankingMode::SingleShot => "single prompt",
        }
    );

    let mut runs = Vec::with_capacity(backends.len());
    for backend in backends {
        let backend = backend.as_ref();
        let run = match mode {
            RankingMode::Windowed => rank_windowed(backend, profile, settings, domain, candidates).await,
            RankingMode::SingleShot => {
                rank_single_shot(backend, profile, settings, domain, candidates).await
            }
        };
        runs.push(run);
    }

    DomainRun {
        domain: domain.to_string(),
        candidates: candidates.len(),
        mode,
        backends: runs,
    }
}

async fn rank_windowed(
    backend: &dyn ChatBackend,
    profile: &JobProfile,
    settings: &RankSettings,
    domain: &str,
    candidates: &[Candidate],
) -> BackendRun {
    let plan = WindowPlan {
        batch_size: settings.batch_size,
        step: settings.step,
        cover_tail: settings.cover_tail,
        temperature: settings.temperature,
    };
    let (rankings, windows) = rank_in_batches(backend, profile, candidates, plan).await;
    info!(
        backend = backend.name(),
        domain,
        "Kept {}/{} windows ({} call failures, {} unusable replies)",
        windows.windows_kept,
        windows.windows_sent,
        windows.call_failures,
        windows.parse_failures
    );

    let global = merge_batch_rankings(&rankings);
    let path = ranking_path(&settings.output_dir, backend.name(), domain);

    BackendRun {
        backend: backend.name().to_string(),
        persisted: persist(path, &global),
        windows: Some(windows),
    }
}

async fn rank_single_shot(
    backend: &dyn ChatBackend,
    profile: &JobProfile,
    settings: &RankSettings,
    domain: &str,
    candidates: &[Candidate],
) -> BackendRun {
    let ranking = match request_ranking(backend, profile, candidates, settings.temperature).await {
        RequestOutcome::Ranked(ranking) => Ok(ranking),
        RequestOutcome::CallFailed(e) => Err(e.to_string()),
        RequestOutcome::Unusable(ParseOutcome::Empty) => Err("empty reply".to_string()),
        RequestOutcome::Unusable(outcome) => Ok(outcome.into_ranking_or_empty()),
    };

    let persisted = match ranking {
        Ok(ranking) => persist(ranking_path(&settings.output_dir, backend.name(), domain), &ranking),
        Err(reason) => Persisted::NoResponse(reason),
    };

    BackendRun {
        backend: backend.name().to_string(),
        persisted,
        windows: None,
    }
}

fn persist<T: serde::Serialize>(path: PathBuf, value: &T) -> Persisted {
    match write_json(&path, value) {
        Ok(()) => Persisted::Written(path),
        Err(e) => {
            error!("Error saving results: {e}");
            Persisted::WriteFailed(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::llm_client::mock::ScriptedBackend;
    use crate::llm_client::LlmError;
    use crate::models::{BatchRanking, GlobalRanking};

    fn candidates(domain: &str, n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate {
                file_name: format!("{}{i}.pdf", domain.to_lowercase()),
                domain: domain.to_string(),
                gender: "Female".to_string(),
                ethnicity: "Asian".to_string(),
                summary: Some(format!("summary {i}")),
                text_excerpt: None,
            })
            .collect()
    }

    fn catalog(categories: &[&str]) -> JobCatalog {
        JobCatalog {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            profiles: BTreeMap::new(),
        }
    }

    fn settings(dir: &std::path::Path) -> RankSettings {
        RankSettings {
            input: dir.join("in.json"),
            output_dir: dir.to_path_buf(),
            batch_size: 3,
            step: 1,
            temperature: 0.3,
            domain_delay: Duration::ZERO,
            cover_tail: false,
        }
    }

    fn reply(order: &[&str], notes: &[(&str, &str)]) -> Result<String, LlmError> {
        let justifications: BTreeMap<&str, &str> = notes.iter().copied().collect();
        Ok(serde_json::json!({ "ranking": order, "justifications": justifications }).to_string())
    }

    fn read<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> T {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_windowed_domain_merges_and_persists_per_backend() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        // 4 candidates, batch 3, step 1 → 2 windows.
        let first = ScriptedBackend::new(
            "alpha",
            vec![
                reply(&["sales0.pdf", "sales1.pdf", "sales2.pdf"], &[("sales0.pdf", "top")]),
                reply(&["sales3.pdf", "sales1.pdf", "sales2.pdf"], &[("sales0.pdf", "unused")]),
            ],
        );
        let second = ScriptedBackend::new(
            "beta",
            vec![
                Ok("not json at all".to_string()),
                reply(&["sales1.pdf", "sales2.pdf", "sales3.pdf"], &[]),
            ],
        );
        let backends: Vec<Box<dyn ChatBackend>> = vec![Box::new(first), Box::new(second)];

        let report = rank_domains(
            &backends,
            &catalog(&["SALES"]),
            &settings,
            candidates("Sales", 4),
        )
        .await;

        assert_eq!(report.domains.len(), 1);
        assert_eq!(report.domains[0].mode, RankingMode::Windowed);

        let alpha: GlobalRanking = read(&dir.path().join("alpha_SALES_global_ranking.json"));
        assert_eq!(alpha.score_of("sales1.pdf"), Some(4));
        assert_eq!(alpha.score_of("sales0.pdf"), Some(3));
        assert_eq!(alpha.score_of("sales3.pdf"), Some(3));
        assert_eq!(alpha.score_of("sales2.pdf"), Some(2));
        assert_eq!(alpha.ranking[0].0, "sales1.pdf");
        assert_eq!(alpha.justifications["sales0.pdf"], "top");

        // The malformed window contributes nothing.
        let beta: GlobalRanking = read(&dir.path().join("beta_SALES_global_ranking.json"));
        assert_eq!(beta.ranking.len(), 3);
        assert_eq!(beta.score_of("sales0.pdf"), None);
        let beta_windows = report.domains[0].backends[1].windows.clone().unwrap();
        assert_eq!(beta_windows.windows_kept, 1);
        assert_eq!(beta_windows.parse_failures, 1);
    }

    #[tokio::test]
    async fn test_small_domain_uses_single_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let backend = ScriptedBackend::new(
            "alpha",
            vec![reply(&["chef1.pdf", "chef0.pdf"], &[("chef1.pdf", "best")])],
        );
        let backends: Vec<Box<dyn ChatBackend>> = vec![Box::new(backend)];

        let report =
            rank_domains(&backends, &catalog(&["CHEF"]), &settings, candidates("Chef", 2)).await;

        assert_eq!(report.domains[0].mode, RankingMode::SingleShot);
        let stored: BatchRanking = read(&dir.path().join("alpha_CHEF_global_ranking.json"));
        assert_eq!(stored.ranking, vec!["chef1.pdf", "chef0.pdf"]);
        assert_eq!(stored.justification_for("chef1.pdf"), "best");
    }

    #[tokio::test]
    async fn test_single_prompt_parse_failure_stores_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let backend = ScriptedBackend::new("alpha", vec![Ok("I cannot rank people.".to_string())]);
        let backends: Vec<Box<dyn ChatBackend>> = vec![Box::new(backend)];

        rank_domains(&backends, &catalog(&["CHEF"]), &settings, candidates("Chef", 2)).await;

        let stored: BatchRanking = read(&dir.path().join("alpha_CHEF_global_ranking.json"));
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_single_prompt_call_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let backend = ScriptedBackend::new(
            "alpha",
            vec![Err(LlmError::Api {
                status: 401,
                message: "bad key".to_string(),
            })],
        );
        let backends: Vec<Box<dyn ChatBackend>> = vec![Box::new(backend)];

        let report =
            rank_domains(&backends, &catalog(&["CHEF"]), &settings, candidates("Chef", 2)).await;

        assert_eq!(
            report.domains[0].backends[0].persisted,
            Persisted::NoResponse("API error (status 401): bad key".to_string())
        );
        assert!(!dir.path().join("alpha_CHEF_global_ranking.json").exists());
    }

    #[tokio::test]
    async fn test_single_prompt_blank_reply_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let backend = ScriptedBackend::new("alpha", vec![Ok("  \n".to_string())]);
        let backends: Vec<Box<dyn ChatBackend>> = vec![Box::new(backend)];

        let report =
            rank_domains(&backends, &catalog(&["CHEF"]), &settings, candidates("Chef", 2)).await;

        assert_eq!(
            report.domains[0].backends[0].persisted,
            Persisted::NoResponse("empty reply".to_string())
        );
        assert!(!dir.path().join("alpha_CHEF_global_ranking.json").exists());
    }

    #[tokio::test]
    async fn test_empty_and_uncategorized_domains_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let backend = ScriptedBackend::new("alpha", vec![reply(&["arts0.pdf"], &[])]);
        let backends: Vec<Box<dyn ChatBackend>> = vec![Box::new(backend)];

        let mut input = candidates("Arts", 1);
        input.extend(candidates("Pilot", 2));
        let report =
            rank_domains(&backends, &catalog(&["ACCOUNTANT", "ARTS"]), &settings, input).await;

        assert_eq!(report.skipped_domains, vec!["ACCOUNTANT"]);
        assert_eq!(report.domains.len(), 1);
        assert_eq!(report.domains[0].domain, "ARTS");
        assert!(!dir.path().join("alpha_PILOT_global_ranking.json").exists());
    }

    #[tokio::test]
    async fn test_write_failure_does_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.output_dir = dir.path().join("missing");
        let backend = ScriptedBackend::new(
            "alpha",
            vec![reply(&["arts0.pdf"], &[]), reply(&["chef0.pdf"], &[])],
        );
        let backends: Vec<Box<dyn ChatBackend>> = vec![Box::new(backend)];

        let mut input = candidates("Arts", 1);
        input.extend(candidates("Chef", 1));
        let report = rank_domains(&backends, &catalog(&["ARTS", "CHEF"]), &settings, input).await;

        assert_eq!(report.domains.len(), 2);
        for domain in &report.domains {
            assert!(matches!(domain.backends[0].persisted, Persisted::WriteFailed(_)));
        }
    }

    #[tokio::test]
    async fn test_run_aborts_on_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        std::fs::write(&settings.input, "{ broken").unwrap();
        let backends: Vec<Box<dyn ChatBackend>> = Vec::new();

        let result = run(&backends, &catalog(&["SALES"]), &settings).await;
        assert!(matches!(result, Err(AppError::InputFormat { .. })));
    }

    #[tokio::test]
    async fn test_prompt_uses_catalog_profile_or_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let backend = Arc::new(ScriptedBackend::new(
            "alpha",
            vec![reply(&["chef0.pdf"], &[]), reply(&["pilot0.pdf"], &[])],
        ));
        let mut catalog = JobCatalog::builtin().unwrap();
        catalog.categories = vec!["CHEF".to_string(), "PILOT".to_string()];

        let mut input = candidates("Chef", 1);
        input.extend(candidates("Pilot", 1));
        let backends: Vec<Box<dyn ChatBackend>> = vec![Box::new(Arc::clone(&backend))];
        rank_domains(&backends, &catalog, &settings, input).await;

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("We are hiring a Creative Chef"));
        assert!(prompts[1].contains("Job Description:\nJob description for PILOT"));
    }
}
