use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::errors::AppError;
use crate::models::Candidate;

/// Reads a JSON array of candidate records.
pub fn read_candidates(path: &Path) -> Result<Vec<Candidate>, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|source| AppError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;
    let candidates: Vec<Candidate> =
        serde_json::from_str(&raw).map_err(|source| AppError::InputFormat {
            path: path.to_path_buf(),
            source,
        })?;
    info!("Loaded {} candidate records from {}", candidates.len(), path.display());
    Ok(candidates)
}

/// Serializes `value` with four-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(buf)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let bytes = to_pretty_json(value)?;
    std::fs::write(path, bytes).map_err(|source| AppError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Results saved to {}", path.display());
    Ok(())
}

/// `{output_dir}/{backend}_{DOMAIN}_global_ranking.json`
pub fn ranking_path(output_dir: &Path, backend: &str, domain: &str) -> PathBuf {
    output_dir.join(format!("{backend}_{}_global_ranking.json", domain.to_uppercase()))
}
