//! Extractive TextRank summarizer.
//!
//! Algorithm:
//! 1. Split text into sentences and each sentence into lowercase content words.
//! 2. Edge weight between two sentences = shared words / (ln|a| + ln|b|).
//! 3. Weighted PageRank (damping 0.85) until the scores move less than 1e-4.
//! 4. Keep the top N sentences, emitted in document order.

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

const DAMPING: f64 = 0.85;
const CONVERGENCE: f64 = 1e-4;
const MAX_ITERATIONS: usize = 100;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "or", "that", "the", "to", "was", "were", "will", "with", "this", "but",
    "they", "have", "had", "what", "when", "where", "who", "which", "you", "your", "we", "our",
    "can", "all", "there", "their", "been", "would", "could", "should", "may", "might", "must",
    "do", "does", "did", "if", "not", "no", "so", "up", "out", "just", "than", "then", "too",
    "i", "my", "me", "she", "her", "his", "him", "also", "into", "over", "such", "these", "those",
];

/// Returns up to `sentence_count` sentences of `text`, joined by single spaces.
pub fn summarize(text: &str, sentence_count: usize) -> String {
    let sentences = split_sentences(text);
    if sentence_count == 0 || sentences.is_empty() {
        return String::new();
    }
    if sentences.len() <= sentence_count {
        return sentences.join(" ");
    }

    let words: Vec<HashSet<String>> = sentences.iter().map(|s| content_words(s)).collect();
    let scores = rank_sentences(&words);

    let mut order: Vec<usize> = (0..sentences.len()).collect();
    // Stable: equal scores keep the earlier sentence.
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut chosen: Vec<usize> = order.into_iter().take(sentence_count).collect();
    chosen.sort_unstable();

    chosen
        .into_iter()
        .map(|i| sentences[i].as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Titles that end in a period but rarely end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "dr.", "mr.", "mrs.", "ms.", "prof.", "sr.", "jr.", "st.", "mt.", "inc.", "ltd.", "co.",
    "corp.", "no.", "vs.", "approx.", "dept.",
];

/// Splits each line into Unicode sentences (UAX #29), rejoining a sentence that
/// was cut after a known title abbreviation. Whitespace inside a sentence is collapsed.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    for line in text.lines() {
        let mut current = String::new();
        for segment in line.unicode_sentences() {
            current.push_str(segment);
            if !ends_with_abbreviation(&current) {
                push_sentence(&mut sentences, &current);
                current.clear();
            }
        }
        push_sentence(&mut sentences, &current);
    }

    sentences
}

fn ends_with_abbreviation(sentence: &str) -> bool {
    sentence
        .split_whitespace()
        .last()
        .is_some_and(|word| ABBREVIATIONS.contains(&word.to_lowercase().as_str()))
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().any(|c| c.is_alphanumeric()) {
        sentences.push(collapsed);
    }
}

fn content_words(sentence: &str) -> HashSet<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 2)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

fn similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    // ln(1) = 0, so single-word sentences need a floor on the denominator.
    let norm = (a.len() as f64).ln() + (b.len() as f64).ln();
    if a.is_empty() || b.is_empty() || norm <= 0.0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / norm
}

fn rank_sentences(words: &[HashSet<String>]) -> Vec<f64> {
    let n = words.len();
    let mut weights = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let w = similarity(&words[i], &words[j]);
            weights[i][j] = w;
            weights[j][i] = w;
        }
    }
    let out_sums: Vec<f64> = weights.iter().map(|row| row.iter().sum()).collect();

    let mut scores = vec![1.0 / n as f64; n];
    for _ in 0..MAX_ITERATIONS {
        let mut next = vec![(1.0 - DAMPING) / n as f64; n];
        for (i, slot) in next.iter_mut().enumerate() {
            let inbound: f64 = (0..n)
                .filter(|&j| out_sums[j] > 0.0)
                .map(|j| weights[j][i] / out_sums[j] * scores[j])
                .sum();
            *slot += DAMPING * inbound;
        }
        let delta: f64 = next
            .iter()
            .zip(&scores)
            .map(|(a, b)| (a - b).abs())
            .sum();
        scores = next;
        if delta < CONVERGENCE {
            break;
        }
    }
    scores
}
