//! Run leaderboard
//!
//! Kept in memory for the lifetime of the process, top 10 runs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Maximum number of runs to keep
pub const MAX_RECORDS: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub score: u64,
    /// Stage the run ended on
    pub stage: u32,
    /// Total distance in meters
    pub distance: f32,
}

impl RunRecord {
    /// Board order: score, then stage reached, then distance
    fn cmp_rank(&self, other: &RunRecord) -> Ordering {
        self.score
            .cmp(&other.score)
            .then(self.stage.cmp(&other.stage))
            .then(self.distance.total_cmp(&other.distance))
    }

    /// Strictly better than `other`; equal runs keep their board order
    pub fn outranks(&self, other: &RunRecord) -> bool {
        self.cmp_rank(other) == Ordering::Greater
    }
}

/// Best runs, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunRecords {
    pub entries: Vec<RunRecord>,
}

impl RunRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board index the run would take, or None if it misses the board
    fn slot_for(&self, record: &RunRecord) -> Option<usize> {
        if record.score == 0 {
            return None;
        }
        match self.entries.iter().position(|e| record.outranks(e)) {
            Some(i) => Some(i),
            None if self.entries.len() < MAX_RECORDS => Some(self.entries.len()),
            None => None,
        }
    }

    pub fn qualifies(&self, record: &RunRecord) -> bool {
        self.slot_for(record).is_some()
    }

    /// Record a run; returns its 1-based rank or None if it didn't make the board
    pub fn add(&mut self, record: RunRecord) -> Option<usize> {
        let slot = self.slot_for(&record)?;
        self.entries.insert(slot, record);
        self.entries.truncate(MAX_RECORDS);
        Some(slot + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Furthest stage any recorded run reached
    pub fn best_stage(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.stage).max()
    }
}
