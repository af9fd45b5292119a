pub mod candidate;
pub mod job;
pub mod ranking;

pub use candidate::{group_by_domain, Candidate, SummaryRecord};
pub use job::{JobCatalog, JobProfile};
pub use ranking::{BatchRanking, GlobalRanking};
