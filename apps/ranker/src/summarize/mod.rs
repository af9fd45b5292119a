//! Summarize stage: resume PDF (or inline excerpt) → short TextRank summary
//! plus the Education section when one can be found.
//!
//! Document failures never reach the caller; they degrade to the excerpt, and
//! candidates with no text at all are skipped.

pub mod education;
pub mod extract;
pub mod textrank;

use tracing::{info, warn};

use crate::config::SummarizeSettings;
use crate::errors::AppError;
use crate::models::{Candidate, SummaryRecord};
use crate::store::{read_candidates, write_json};

use self::education::extract_education;
use self::extract::{resume_text, TextSource};
use self::textrank::summarize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummarizeReport {
    pub from_document: usize,
    pub from_excerpt: usize,
    pub skipped: usize,
}

/// Builds the summary record for one candidate, or `None` when there is no text to summarize.
pub fn summarize_candidate(
    candidate: &Candidate,
    settings: &SummarizeSettings,
) -> Option<(SummaryRecord, TextSource)> {
    let (full_text, source) = resume_text(&settings.data_dir, candidate)?;

    let mut summary = summarize(&full_text, settings.sentence_count);
    if let Some(education) = extract_education(&full_text, settings.min_education_len) {
        summary.push_str("\nEducation: ");
        summary.push_str(&education);
    }

    let record = SummaryRecord {
        file_name: candidate.file_name.clone(),
        domain: candidate.domain.clone(),
        gender: candidate.gender.clone(),
        ethnicity: candidate.ethnicity.clone(),
        summary,
    };
    Some((record, source))
}

pub fn summarize_all(
    candidates: &[Candidate],
    settings: &SummarizeSettings,
) -> (Vec<SummaryRecord>, SummarizeReport) {
    let mut report = SummarizeReport::default();
    let mut records = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        info!("Processing candidate: {}", candidate.file_name);
        match summarize_candidate(candidate, settings) {
            Some((record, source)) => {
                match source {
                    TextSource::Document => report.from_document += 1,
                    TextSource::Excerpt => report.from_excerpt += 1,
                }
                records.push(record);
            }
            None => {
                warn!(
                    "No text available for candidate {}. Skipping.",
                    candidate.file_name
                );
                report.skipped += 1;
            }
        }
    }

    (records, report)
}

/// Reads the candidate list, summarizes every candidate, writes the summaries.
/// Only an unreadable input list or an unwritable output file is an error.
pub fn run(settings: &SummarizeSettings) -> Result<SummarizeReport, AppError> {
    let candidates = read_candidates(&settings.input)?;
    let (records, report) = summarize_all(&candidates, settings);
    write_json(&settings.output, &records)?;
    info!(
        "Summarized {} candidates ({} from PDF, {} from excerpt, {} skipped)",
        records.len(),
        report.from_document,
        report.from_excerpt,
        report.skipped
    );
    Ok(report)
}
