//! Synthetic branch traces for exercising predictors.
//!
//! There is no trace-capture client here; traces are generated from a
//! handful of archetypal branch behaviors (loop exits, biased branches,
//! strict alternation) with a seeded RNG so runs are reproducible.

use rand::distributions::{Bernoulli, Distribution};
use rand::prelude::*;

use crate::branch::*;

/// A generated sequence of branch records.
pub struct SyntheticTrace {
    records: Vec<BranchRecord>,
}
impl SyntheticTrace {
    /// Return the records in execution order.
    pub fn records(&self) -> &[BranchRecord] {
        &self.records
    }

    /// Return the number of records.
    pub fn num_entries(&self) -> usize {
        self.records.len()
    }
}

/// Builder for a [SyntheticTrace].
///
/// Each method appends the full outcome sequence for one static branch;
/// callers interleave behaviors by alternating calls.
pub struct TraceBuilder {
    records: Vec<BranchRecord>,
    rng: StdRng,
}
impl TraceBuilder {
    /// Create a builder with a fixed RNG seed.
    pub fn new(seed: u64) -> Self {
        Self {
            records: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A loop backedge: taken 'iters - 1' times, then not-taken once,
    /// repeated for 'trips' trips around the loop.
    pub fn loop_branch(&mut self, pc: usize, iters: usize, trips: usize) -> &mut Self {
        for _ in 0..trips {
            for i in 0..iters {
                let outcome = Outcome::from(i != iters - 1);
                self.records
                    .push(BranchRecord::new(pc, outcome, BranchKind::Conditional));
            }
        }
        self
    }

    /// A branch taken with probability 'p', executed 'occ' times.
    pub fn biased_branch(&mut self, pc: usize, p: f64, occ: usize) -> &mut Self {
        let dist = Bernoulli::new(p).unwrap();
        for _ in 0..occ {
            let outcome = Outcome::from(dist.sample(&mut self.rng));
            self.records
                .push(BranchRecord::new(pc, outcome, BranchKind::Conditional));
        }
        self
    }

    /// A branch that strictly alternates taken/not-taken, executed
    /// 'occ' times.
    pub fn alternating_branch(&mut self, pc: usize, occ: usize) -> &mut Self {
        for i in 0..occ {
            let outcome = Outcome::from(i % 2 == 0);
            self.records
                .push(BranchRecord::new(pc, outcome, BranchKind::Conditional));
        }
        self
    }

    /// An unconditional jump, executed 'occ' times.
    pub fn unconditional(&mut self, pc: usize, occ: usize) -> &mut Self {
        for _ in 0..occ {
            self.records
                .push(BranchRecord::new(pc, Outcome::T, BranchKind::Unconditional));
        }
        self
    }

    pub fn build(self) -> SyntheticTrace {
        SyntheticTrace {
            records: self.records,
        }
    }
}
