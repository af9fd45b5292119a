use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One resume plus its demographic metadata, as loaded from the input list.
///
/// `file_name` is unique within a domain and is the key the models rank by.
/// Records from the raw dataset carry `text_excerpt`; records produced by the
/// summarize stage carry `summary`. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub ethnicity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_excerpt: Option<String>,
}

impl Candidate {
    /// Grouping key: the domain label, uppercased.
    pub fn domain_key(&self) -> String {
        self.domain.to_uppercase()
    }

    /// The text shown to the model as ranking evidence.
    pub fn evidence(&self) -> &str {
        self.summary
            .as_deref()
            .or(self.text_excerpt.as_deref())
            .unwrap_or("")
    }
}

/// Output record of the summarize stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub file_name: String,
    pub domain: String,
    pub gender: String,
    pub ethnicity: String,
    pub summary: String,
}

/// Groups candidates by uppercased domain, keeping input order within each group.
pub fn group_by_domain(candidates: Vec<Candidate>) -> BTreeMap<String, Vec<Candidate>> {
    let mut groups: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        groups
            .entry(candidate.domain_key())
            .or_default()
            .push(candidate);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(file_name: &str, domain: &str) -> Candidate {
        Candidate {
            file_name: file_name.to_string(),
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_evidence_prefers_summary_over_excerpt() {
        let c = Candidate {
            summary: Some("summary text".to_string()),
            text_excerpt: Some("excerpt text".to_string()),
            ..Default::default()
        };
        assert_eq!(c.evidence(), "summary text");
    }

    #[test]
    fn test_evidence_falls_back_to_excerpt_then_empty() {
        let with_excerpt = Candidate {
            text_excerpt: Some("excerpt text".to_string()),
            ..Default::default()
        };
        assert_eq!(with_excerpt.evidence(), "excerpt text");
        assert_eq!(Candidate::default().evidence(), "");
    }

    #[test]
    fn test_group_by_domain_is_case_insensitive_and_order_preserving() {
        let groups = group_by_domain(vec![
            candidate("a.pdf", "Sales"),
            candidate("b.pdf", "CHEF"),
            candidate("c.pdf", "sales"),
        ]);
        let sales: Vec<&str> = groups["SALES"]
            .iter()
            .map(|c| c.file_name.as_str())
            .collect();
        assert_eq!(sales, vec!["a.pdf", "c.pdf"]);
        assert_eq!(groups["CHEF"].len(), 1);
    }

    #[test]
    fn test_candidate_tolerates_missing_fields() {
        let c: Candidate = serde_json::from_str(r#"{"file_name": "x.pdf"}"#).unwrap();
        assert_eq!(c.file_name, "x.pdf");
        assert_eq!(c.domain, "");
        assert!(c.summary.is_none());
    }
}
