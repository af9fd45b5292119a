// Prompt text for the ranking request. Rendering is a pure function of its
// inputs: no clock, no randomness.

use std::fmt::Write;

use crate::models::Candidate;

/// Instructional preamble. Fixes the two-key JSON contract the parser expects.
pub const RANKING_PREAMBLE: &str = "You are an expert HR evaluator. Given the job description, requirements, \
and candidate information provided below, please rank the candidates in order of preference for the role. \
For each candidate, provide a detailed justification for their ranking. \
Output your result as valid JSON file. It should have ranking field and justification field. \
It should be in the following format:\n\
{\"ranking\": [\"file1.pdf\", \"file2.pdf\", ...], \"justifications\": {\"file1.pdf\": \"Explanation...\", \"file2.pdf\": \"Explanation...\"}}\n\
Do not include any additional text.\n\n";

const CANDIDATE_SEPARATOR: &str = "------------------------";

/// Renders the ranking prompt for one batch, candidates in input order.
pub fn build_ranking_prompt(
    job_description: &str,
    requirements: &str,
    candidates: &[Candidate],
) -> String {
    let mut prompt = String::from(RANKING_PREAMBLE);
    prompt.push_str("Job Description:\n");
    prompt.push_str(job_description.trim());
    prompt.push_str("\n\nRequirements:\n");
    prompt.push_str(requirements.trim());
    prompt.push_str("\n\nCandidate Information:\n");

    for candidate in candidates {
        // Writing into a String cannot fail.
        let _ = write!(
            prompt,
            "Candidate (File: {})\nDomain: {}\nGender: {}\nEthnicity: {}\nResume Summary:\n{}\n{CANDIDATE_SEPARATOR}\n",
            candidate.file_name,
            candidate.domain,
            candidate.gender,
            candidate.ethnicity,
            candidate.evidence(),
        );
    }

    prompt
}
