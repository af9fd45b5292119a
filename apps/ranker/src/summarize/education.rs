use std::sync::LazyLock;

use regex::Regex;

// "Education" (any case), optional `:`/`-`, then everything up to the next blank line or end of text.
static RE_EDUCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Education\s*[:\-]?\s*(.*?)(?:\n\s*\n|\z)").expect("valid education regex")
});

/// Returns the trimmed Education section, or `None` if absent or shorter than `min_len` characters.
pub fn extract_education(text: &str, min_len: usize) -> Option<String> {
    let captures = RE_EDUCATION.captures(text)?;
    let section = captures.get(1)?.as_str().trim();
    if section.chars().count() < min_len {
        return None;
    }
    Some(section.to_string())
}
