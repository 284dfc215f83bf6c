use serde::{Deserialize, Serialize};

/// Aggregate counts from the stats endpoint; absent keys count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub by_status: StatusCounts,
}

/// Per-status counts, lowercase keys on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub discharged: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub cancelled: u64,
}
