use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Curated catalog shipped with the binary. Replace at runtime with `--jobs`.
const BUILTIN_CATALOG: &str = include_str!("../../config/job_profiles.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    pub job_description: String,
    pub requirements: String,
}

impl JobProfile {
    /// Stand-in profile for a domain with no curated entry.
    pub fn placeholder(domain: &str) -> Self {
        Self {
            job_description: format!("Job description for {domain}"),
            requirements: format!("Requirements for {domain}"),
        }
    }
}

/// The domains to process, in order, and the job profile for each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCatalog {
    pub categories: Vec<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, JobProfile>,
}

impl JobCatalog {
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read job catalog {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    fn from_json(raw: &str) -> Result<Self, AppError> {
        let catalog: JobCatalog = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("invalid job catalog: {e}")))?;
        Ok(catalog.normalized())
    }

    /// Uppercases category names and profile keys so lookups match grouped domains.
    fn normalized(self) -> Self {
        Self {
            categories: self.categories.iter().map(|c| c.to_uppercase()).collect(),
            profiles: self
                .profiles
                .into_iter()
                .map(|(domain, profile)| (domain.to_uppercase(), profile))
                .collect(),
        }
    }

    pub fn profile_for(&self, domain: &str) -> JobProfile {
        self.profiles
            .get(&domain.to_uppercase())
            .cloned()
            .unwrap_or_else(|| JobProfile::placeholder(domain))
    }
}
