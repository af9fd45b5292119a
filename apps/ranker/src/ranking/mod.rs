// Ranking stage: prompt building, reply parsing, windowing and Borda aggregation.
// All model calls go through llm_client::ChatBackend.

pub mod aggregate;
pub mod batch;
pub mod parser;
pub mod prompts;
pub mod windows;

pub use aggregate::merge_batch_rankings;
pub use batch::{rank_in_batches, request_ranking, BatchReport, RequestOutcome, WindowPlan};
pub use parser::ParseOutcome;
