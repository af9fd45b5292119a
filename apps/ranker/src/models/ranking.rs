use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single model's ordering of one batch, most preferred first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRanking {
    #[serde(default)]
    pub ranking: Vec<String>,
    #[serde(default)]
    pub justifications: BTreeMap<String, String>,
}

impl BatchRanking {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }

    pub fn justification_for(&self, file_name: &str) -> &str {
        self.justifications
            .get(file_name)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Merged ranking for one domain and one backend.
///
/// `ranking` serializes as `[["file.pdf", 12], ...]`, highest score first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalRanking {
    pub ranking: Vec<(String, u32)>,
    pub justifications: BTreeMap<String, String>,
}

impl GlobalRanking {
    #[cfg(test)]
    pub fn score_of(&self, file_name: &str) -> Option<u32> {
        self.ranking
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, score)| *score)
    }
}
