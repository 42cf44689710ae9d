pub mod bucket;
pub mod candidate;
pub mod types;

pub use bucket::Bucket;
pub use candidate::{CandidateRecord, ScoredCandidate};
pub use types::{BucketOutcome, SourceKind};
