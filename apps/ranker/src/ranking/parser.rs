//! Response Parser — turns a model reply into a `BatchRanking` without ever failing the caller.
//!
//! Malformed replies are reported as a typed outcome so callers can log the
//! reason and tests can assert on it.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::BatchRanking;

/// What came out of one model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Decoded, with a non-empty `ranking`.
    Parsed(BatchRanking),
    /// The reply was blank.
    Empty,
    /// Valid JSON, but no usable `ranking` array.
    MissingRanking { text: String },
    /// The reply did not decode as a JSON object.
    Malformed { error: String, text: String },
}

impl ParseOutcome {
    #[cfg(test)]
    pub fn ranking(&self) -> Option<&BatchRanking> {
        match self {
            ParseOutcome::Parsed(ranking) => Some(ranking),
            _ => None,
        }
    }

    /// The parsed ranking, or an empty one for any failure.
    pub fn into_ranking_or_empty(self) -> BatchRanking {
        match self {
            ParseOutcome::Parsed(ranking) => ranking,
            _ => BatchRanking::default(),
        }
    }
}

/// Parses the assistant text into a ranking and justifications.
pub fn parse_ranking_response(raw: &str) -> ParseOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParseOutcome::Empty;
    }

    let text = strip_code_fence(trimmed);

    let value: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            return ParseOutcome::Malformed {
                error: e.to_string(),
                text,
            }
        }
    };

    let Some(object) = value.as_object() else {
        return ParseOutcome::Malformed {
            error: "expected a JSON object".to_string(),
            text,
        };
    };

    let ranking: Vec<String> = object
        .get("ranking")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    if ranking.is_empty() {
        return ParseOutcome::MissingRanking { text };
    }

    let justifications = object
        .get("justifications")
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .map(|(file_name, v)| (file_name.clone(), justification_text(v)))
                .collect()
        })
        .unwrap_or_else(BTreeMap::new);

    ParseOutcome::Parsed(BatchRanking {
        ranking,
        justifications,
    })
}

fn justification_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strips one outer code fence: a first line and a last line that start with ```.
fn strip_code_fence(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.first().is_some_and(|l| l.starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.starts_with("```")) {
        lines.pop();
    }
    lines.join("\n")
}
