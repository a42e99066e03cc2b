//! Helpers for collecting statistics while evaluating a predictor.

use std::collections::*;

use bitvec::prelude::*;
use itertools::*;

use crate::branch::*;

/// Container for recording hit rates while driving a predictor over a trace.
pub struct PredictorStats {
    /// Per-branch statistics (indexed by program counter value).
    pub data: BTreeMap<usize, BranchData>,

    /// Number of correct predictions
    hits: usize,

    /// Number of predictions made
    lookups: usize,
}
impl PredictorStats {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            hits: 0,
            lookups: 0,
        }
    }

    /// Record the prediction made for one executed branch.
    pub fn record(&mut self, record: &BranchRecord, prediction: Outcome) {
        let hit = prediction == record.outcome;
        self.lookups += 1;
        if hit {
            self.hits += 1;
        }

        let data = self.data.entry(record.pc).or_insert_with(BranchData::new);
        data.occ += 1;
        if hit {
            data.hits += 1;
        }
        data.pat.push(record.outcome.into());
    }

    /// Return the global hit count.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Return the global miss count.
    pub fn misses(&self) -> usize {
        self.lookups - self.hits
    }

    /// Return the number of predictions recorded.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    /// Return the global hit rate.
    pub fn hit_rate(&self) -> f64 {
        self.hits as f64 / self.lookups as f64
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns up to 'n' branches sorted by how often they were executed.
    pub fn most_executed(&self, n: usize) -> Vec<(usize, &BranchData)> {
        self.data
            .iter()
            .sorted_by_key(|(_, d)| std::cmp::Reverse(d.occ))
            .take(n)
            .map(|(pc, d)| (*pc, d))
            .collect()
    }

    /// Returns up to 'n' branches with the worst hit rates.
    pub fn worst_predicted(&self, n: usize) -> Vec<(usize, &BranchData)> {
        self.data
            .iter()
            .sorted_by(|x, y| x.1.hit_rate().partial_cmp(&y.1.hit_rate()).unwrap())
            .take(n)
            .map(|(pc, d)| (*pc, d))
            .collect()
    }
}

impl Default for PredictorStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for per-branch statistics.
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: usize,

    /// Number of correct predictions for this branch.
    pub hits: usize,

    /// Record of all observed outcomes for this branch.
    pub pat: BitVec,
}
impl BranchData {
    pub fn new() -> Self {
        Self {
            occ: 0,
            hits: 0,
            pat: BitVec::new(),
        }
    }

    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        self.hits as f64 / self.occ as f64
    }

    /// Return the number of times this branch was taken.
    pub fn times_taken(&self) -> usize {
        self.pat.count_ones()
    }

    pub fn is_always_taken(&self) -> bool {
        self.pat.count_ones() == self.pat.len()
    }
}
