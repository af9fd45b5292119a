//! Borda-style merge of overlapping batch rankings into one global ranking.
//!
//! Algorithm:
//! 1. For each batch ranking of length k, the candidate at index i earns (k - i) points.
//! 2. A candidate's justification comes from the batch where it had its lowest index;
//!    the first batch wins a tie.
//! 3. Final order is score descending; equal scores keep first-seen order.

use std::collections::{BTreeMap, HashMap};

use crate::models::{BatchRanking, GlobalRanking};

struct Tally {
    file_name: String,
    score: u32,
    best_position: usize,
    justification: String,
}

pub fn merge_batch_rankings(batches: &[BatchRanking]) -> GlobalRanking {
    let mut tallies: Vec<Tally> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for batch in batches {
        let k = batch.ranking.len();
        for (position, file_name) in batch.ranking.iter().enumerate() {
            let points = (k - position) as u32;
            let justification = batch.justification_for(file_name);

            match index.get(file_name.as_str()) {
                Some(&slot) => {
                    let tally = &mut tallies[slot];
                    tally.score += points;
                    if position < tally.best_position {
                        tally.best_position = position;
                        tally.justification = justification.to_string();
                    }
                }
                None => {
                    index.insert(file_name.as_str(), tallies.len());
                    tallies.push(Tally {
                        file_name: file_name.clone(),
                        score: points,
                        best_position: position,
                        justification: justification.to_string(),
                    });
                }
            }
        }
    }

    // Vec::sort_by is stable, so ties stay in first-seen order.
    tallies.sort_by(|a, b| b.score.cmp(&a.score));

    let justifications: BTreeMap<String, String> = tallies
        .iter()
        .map(|t| (t.file_name.clone(), t.justification.clone()))
        .collect();
    let ranking = tallies.into_iter().map(|t| (t.file_name, t.score)).collect();

    GlobalRanking {
        ranking,
        justifications,
    }
}
