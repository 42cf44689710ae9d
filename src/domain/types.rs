/// Source families carry different metadata quality, so score thresholds
/// are looked up per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Feed,
    Listing,
}

/// Per-bucket counters for one cycle, reported in the cycle summary log.
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketOutcome {
    pub sent: u32,
    pub stale: u32,
    pub low_score: u32,
    pub duplicate: u32,
    pub delivery_failures: u32,
    pub fetch_failures: u32,
}
