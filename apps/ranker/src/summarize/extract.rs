use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Candidate;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("resume file not found: {0}")]
    NotFound(PathBuf),

    #[error("PDF extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("PDF extraction panicked (malformed PDF): {0}")]
    Panicked(PathBuf),

    #[error("no text extracted from {0}")]
    Blank(PathBuf),
}

/// Where a candidate's resume text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Document,
    Excerpt,
}

/// `{data_dir}/{DOMAIN}/{file_name}`
pub fn resume_path(data_dir: &Path, candidate: &Candidate) -> PathBuf {
    data_dir
        .join(candidate.domain_key())
        .join(&candidate.file_name)
}

/// Full text of the candidate's resume, falling back to the inline excerpt on
/// any document failure. `None` when neither yields text.
pub fn resume_text(data_dir: &Path, candidate: &Candidate) -> Option<(String, TextSource)> {
    let path = resume_path(data_dir, candidate);
    match extract_pdf_text(&path) {
        Ok(text) => return Some((text, TextSource::Document)),
        Err(DocumentError::NotFound(_)) => warn!(
            "Resume file not found for {} in domain {}. Using JSON excerpt.",
            candidate.file_name,
            candidate.domain_key()
        ),
        Err(e) => warn!("{e}. Using JSON excerpt."),
    }

    candidate
        .text_excerpt
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| (t.to_string(), TextSource::Excerpt))
}

/// Extracts the text of every page; blank output counts as a failure.
pub fn extract_pdf_text(path: &Path) -> Result<String, DocumentError> {
    if !path.is_file() {
        return Err(DocumentError::NotFound(path.to_path_buf()));
    }

    // pdf_extract can panic on malformed PDFs
    let owned = path.to_path_buf();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text(&owned)
    }));

    let text = match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(DocumentError::Extraction {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
        Err(_) => return Err(DocumentError::Panicked(path.to_path_buf())),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(DocumentError::Blank(path.to_path_buf()));
    }
    debug!("Extracted {} chars from {}", text.len(), path.display());
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(excerpt: Option<&str>) -> Candidate {
        Candidate {
            file_name: "1234.pdf".to_string(),
            domain: "Chef".to_string(),
            text_excerpt: excerpt.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_resume_path_uses_uppercased_domain() {
        let path = resume_path(Path::new("data"), &candidate(None));
        assert_eq!(path, Path::new("data").join("CHEF").join("1234.pdf"));
    }

    #[test]
    fn test_missing_document_falls_back_to_excerpt() {
        let dir = tempfile::tempdir().unwrap();
        let (text, source) = resume_text(dir.path(), &candidate(Some(" Line cook. "))).unwrap();
        assert_eq!(text, "Line cook.");
        assert_eq!(source, TextSource::Excerpt);
    }

    #[test]
    fn test_missing_document_and_excerpt_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resume_text(dir.path(), &candidate(None)).is_none());
        assert!(resume_text(dir.path(), &candidate(Some("   "))).is_none());
    }

    #[test]
    fn test_unreadable_pdf_falls_back_to_excerpt() {
        let dir = tempfile::tempdir().unwrap();
        let domain_dir = dir.path().join("CHEF");
        std::fs::create_dir_all(&domain_dir).unwrap();
        std::fs::write(domain_dir.join("1234.pdf"), b"this is not a pdf").unwrap();

        let (text, source) = resume_text(dir.path(), &candidate(Some("Pastry chef"))).unwrap();
        assert_eq!(text, "Pastry chef");
        assert_eq!(source, TextSource::Excerpt);
    }

    #[test]
    fn test_extract_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            extract_pdf_text(&dir.path().join("x.pdf")),
            Err(DocumentError::NotFound(_))
        ));
    }
}
