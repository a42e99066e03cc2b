//! A global-history perceptron branch-direction predictor.
//!
//! See "Neural Methods for Dynamic Branch Prediction"
//! (Jiménez and Lin, 2002) for the family of predictors this belongs to.
//!
//! The predictor keeps one [GlobalHistoryRegister] per hardware thread and a
//! single [WeightTable] shared by all threads. A prediction reads one weight
//! vector, forms a dot product against the thread's history bits, and then
//! *speculatively* shifts the predicted outcome into the history register.
//! The surrounding fetch pipeline carries the returned [PredictionRecord]
//! until the branch either resolves (committing a training step) or is
//! squashed (restoring the history register from the record's snapshot).

use crate::branch::Outcome;
use crate::error::PredictorError;
use crate::history::GlobalHistoryRegister;
use crate::predictor::{PredictorTable, WeightTable};

/// Output threshold for predicting a branch as taken.
///
/// Deliberately biased toward taken rather than centered at zero: a
/// zero-initialized table predicts every branch taken until training pushes
/// an entry's weights well below zero.
const TAKEN_THRESHOLD: i64 = -200;

/// Configuration for a [PerceptronPredictor].
///
/// The history width is not configured separately; it is derived from the
/// table size as `log2(predictor_size)`.
#[derive(Clone, Copy, Debug)]
pub struct PerceptronConfig {
    /// Number of hardware thread slots.
    pub num_threads: usize,

    /// Number of weight table entries (must be a power of two).
    pub predictor_size: usize,

    /// Low branch-address bits discarded when forming a table index.
    pub shift_amt: usize,
}
impl PerceptronConfig {
    /// Build a predictor, validating the configuration.
    pub fn build(self) -> Result<PerceptronPredictor, PredictorError> {
        PerceptronPredictor::new(self)
    }
}

/// Snapshot of predictor state captured when a prediction was made.
///
/// One record exists per in-flight branch. The fetch pipeline owns it from
/// prediction until the branch leaves the machine, then surrenders it to
/// exactly one of [PerceptronPredictor::rollback] or
/// [PerceptronPredictor::resolve]. Both take the record by value, so a
/// record cannot be consumed twice.
pub struct PredictionRecord {
    /// History register contents before the speculative update.
    history: usize,

    /// The weight vector read for this prediction.
    weights: Vec<i64>,

    /// The direction that was predicted.
    prediction: Outcome,
}
impl PredictionRecord {
    /// Return the pre-prediction history snapshot.
    pub fn history(&self) -> usize {
        self.history
    }

    /// Return the weight vector read at prediction time.
    pub fn weights(&self) -> &[i64] {
        &self.weights
    }

    /// Return the predicted direction.
    pub fn prediction(&self) -> Outcome {
        self.prediction
    }
}

/// A perceptron branch-direction predictor shared by some number of
/// hardware threads.
///
/// All operations are synchronous and non-blocking. Callers must present
/// the events for a single thread id in that thread's true speculative
/// order; no locking is performed here, and cross-thread interference in
/// the shared table is accepted.
pub struct PerceptronPredictor {
    /// Global history registers, indexed by thread id.
    ghr: Vec<GlobalHistoryRegister>,

    /// Weight table shared by all threads.
    table: WeightTable,

    /// History width in bits.
    history_bits: usize,
}

impl PerceptronPredictor {
    fn new(cfg: PerceptronConfig) -> Result<Self, PredictorError> {
        if !cfg.predictor_size.is_power_of_two() {
            return Err(PredictorError::InvalidPredictorSize(cfg.predictor_size));
        }

        let history_bits = cfg.predictor_size.ilog2() as usize;
        log::debug!(
            "perceptron predictor: {} entries, {} history bits, {} threads",
            cfg.predictor_size,
            history_bits,
            cfg.num_threads
        );

        Ok(Self {
            ghr: (0..cfg.num_threads)
                .map(|_| GlobalHistoryRegister::new(history_bits))
                .collect(),
            table: WeightTable::new(cfg.predictor_size, history_bits, cfg.shift_amt),
            history_bits,
        })
    }

    /// Return the history width in bits.
    pub fn history_bits(&self) -> usize {
        self.history_bits
    }

    /// Return a reference to a thread's history register.
    pub fn history(&self, tid: usize) -> &GlobalHistoryRegister {
        &self.ghr[tid]
    }

    /// Return a reference to the shared weight table.
    pub fn table(&self) -> &WeightTable {
        &self.table
    }

    /// Dot product of a weight vector against the bits of a history value.
    ///
    /// Weight index 0 pairs with the *oldest* bit in the history window
    /// (bit `H-1`), so the bit index runs opposite to the weight index.
    fn output(&self, weights: &[i64], history: usize) -> i64 {
        let mut output = 0;
        for (k, w) in weights.iter().enumerate() {
            let bit = (history >> (self.history_bits - 1 - k)) & 1;
            output += w * bit as i64;
        }
        output
    }

    /// Predict the direction of a conditional branch.
    ///
    /// Reads the weight vector selected by the branch address and the
    /// thread's current history, decides against [TAKEN_THRESHOLD], then
    /// speculatively shifts the prediction into the history register. The
    /// caller holds the returned record until the branch resolves or is
    /// squashed.
    pub fn predict(&mut self, tid: usize, addr: usize) -> (Outcome, PredictionRecord) {
        let history = self.ghr[tid].value();
        let weights = self.table.get_entry((addr, history));
        let output = self.output(weights, history);
        let prediction = Outcome::from(output >= TAKEN_THRESHOLD);

        let record = PredictionRecord {
            history,
            weights: weights.clone(),
            prediction,
        };
        self.ghr[tid].advance(prediction);
        (prediction, record)
    }

    /// Predict an instruction known to always branch.
    ///
    /// The table is not consulted: the prediction is forced taken and the
    /// record carries an all-ones weight vector as a stand-in for the lookup
    /// that never happened. History still advances speculatively.
    pub fn predict_unconditional(&mut self, tid: usize, _addr: usize) -> PredictionRecord {
        let record = PredictionRecord {
            history: self.ghr[tid].value(),
            weights: vec![1; self.history_bits],
            prediction: Outcome::T,
        };
        self.ghr[tid].advance(Outcome::T);
        record
    }

    /// Notification that the branch target buffer is refilling an entry.
    ///
    /// Clears bit 0 of the thread's live history register; nothing else is
    /// touched. The branch address is accepted for interface symmetry and
    /// currently unused.
    pub fn btb_refill(&mut self, tid: usize, _addr: usize) {
        self.ghr[tid].clear_latest();
    }

    /// Discard the speculative state for a squashed branch.
    ///
    /// The thread's history register is rebuilt from the record's snapshot
    /// with the now-known outcome shifted in. The weight table is not
    /// touched, and the record is consumed.
    pub fn rollback(&mut self, tid: usize, record: PredictionRecord, outcome: Outcome) {
        log::trace!(
            "rollback tid={} snapshot={:#x} outcome={:?}",
            tid,
            record.history,
            outcome
        );
        self.ghr[tid].restore(record.history, outcome);
    }

    /// Resolve a branch whose real outcome is now known.
    ///
    /// With `squashed` set this behaves exactly as [Self::rollback].
    /// Otherwise the entry that was read at prediction time (the index is
    /// recomputed from the record's history *snapshot*) is trained: each
    /// weight moves up by one where the recorded prediction agrees with the
    /// corresponding bit of the thread's live history register, and down by
    /// one where it disagrees. Weights are not clamped, and history is not
    /// mutated on this path.
    ///
    /// Note that the per-bit comparison reads the *live* register, which may
    /// have advanced past the snapshot under overlapping in-flight
    /// predictions, and that `taken` never enters the weight update; on this
    /// path it only matters that the branch was not squashed.
    pub fn resolve(
        &mut self,
        tid: usize,
        addr: usize,
        taken: Outcome,
        squashed: bool,
        record: PredictionRecord,
    ) {
        if squashed {
            self.rollback(tid, record, taken);
            return;
        }

        let prediction = record.prediction;
        let history_bits = self.history_bits;
        let live = self.ghr[tid].value();
        let weights = self.table.get_entry_mut((addr, record.history));
        for (k, w) in weights.iter_mut().enumerate() {
            let bit = (live >> (history_bits - 1 - k)) & 1;
            if prediction.bit() == bit {
                *w += 1;
            } else {
                *w -= 1;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prelude::*;

    fn build(num_threads: usize, predictor_size: usize, shift_amt: usize) -> PerceptronPredictor {
        PerceptronConfig {
            num_threads,
            predictor_size,
            shift_amt,
        }
        .build()
        .unwrap()
    }

    #[test]
    fn build_rejects_non_power_of_two_sizes() {
        for size in [0, 3, 12, 100, 4095] {
            let res = PerceptronConfig {
                num_threads: 1,
                predictor_size: size,
                shift_amt: 2,
            }
            .build();
            assert_eq!(res.err(), Some(PredictorError::InvalidPredictorSize(size)));
        }
    }

    #[test]
    fn derived_history_width() {
        let p = build(1, 4096, 2);
        assert_eq!(p.history_bits(), 12);
        assert_eq!(p.table().width(), 12);
        assert_eq!(p.history(0).len(), 12);
    }

    #[test]
    fn indices_stay_in_range_under_random_traffic() {
        let mut rng = StdRng::seed_from_u64(0x1234);
        let mut p = build(2, 64, 2);
        for _ in 0..10_000 {
            let tid = rng.gen_range(0..2);
            let addr: usize = rng.gen();
            let history = p.history(tid).value();
            assert!(p.table().get_index((addr, history)) < 64);

            let (_, record) = p.predict(tid, addr);
            assert!(p.table().get_index((addr, record.history())) < 64);
            p.resolve(tid, addr, Outcome::from(rng.gen::<bool>()), rng.gen(), record);
        }
    }

    #[test]
    fn zero_weights_predict_taken_everywhere() {
        let mut rng = StdRng::seed_from_u64(0xdead);
        let mut p = build(1, 256, 2);
        for _ in 0..1000 {
            let addr: usize = rng.gen();
            let (prediction, record) = p.predict(0, addr);
            assert_eq!(prediction, Outcome::T);
            // Drop the record via rollback so history keeps moving
            p.rollback(0, record, Outcome::from(rng.gen::<bool>()));
        }
    }

    #[test]
    fn unconditional_is_always_taken() {
        let mut p = build(1, 16, 2);
        let record = p.predict_unconditional(0, 0x4000);
        assert_eq!(record.prediction(), Outcome::T);
        assert_eq!(record.history(), 0);
        assert_eq!(record.weights(), &[1, 1, 1, 1]);

        // History advanced with taken
        assert_eq!(p.history(0).value(), 0b0001);
    }

    #[test]
    fn rollback_rebuilds_history_from_snapshot() {
        let mut p = build(2, 16, 2);
        let (_, oldest) = p.predict(0, 0x1000);
        p.resolve(0, 0x1000, Outcome::T, false, oldest);

        let (_, record) = p.predict(0, 0x1040);
        let snapshot = record.history();

        // Speculation past the snapshot on this thread, plus unrelated
        // traffic on another thread
        let (_, younger) = p.predict(0, 0x1080);
        for _ in 0..8 {
            let (_, r) = p.predict(1, 0x2000);
            p.resolve(1, 0x2000, Outcome::T, false, r);
        }

        p.rollback(0, younger, Outcome::N);
        p.rollback(0, record, Outcome::N);
        assert_eq!(p.history(0).value(), (snapshot << 1) & 0b1111);
    }

    #[test]
    fn resolve_trains_exactly_one_entry_and_leaves_history_alone() {
        let mut p = build(1, 8, 2);
        let addr = 0x40c0;
        let (_, record) = p.predict(0, addr);
        let trained_idx = p.table().get_index((addr, record.history()));
        let history_after_predict = p.history(0).value();

        p.resolve(0, addr, Outcome::T, false, record);

        assert_eq!(p.history(0).value(), history_after_predict);
        for idx in 0..8 {
            if idx == trained_idx {
                assert!(p.table().entry(idx).iter().any(|w| *w != 0));
            } else {
                assert!(p.table().entry(idx).iter().all(|w| *w == 0));
            }
        }
    }

    #[test]
    fn squashed_resolve_trains_nothing() {
        let mut p = build(1, 8, 2);
        let (_, record) = p.predict(0, 0x40c0);
        let snapshot = record.history();

        p.resolve(0, 0x40c0, Outcome::N, true, record);

        for idx in 0..8 {
            assert!(p.table().entry(idx).iter().all(|w| *w == 0));
        }
        assert_eq!(p.history(0).value(), (snapshot << 1) & 0b111);
    }

    #[test]
    fn history_aliases_the_same_branch_onto_different_entries() {
        // predictor_size = 4 gives a 2-bit history; (addr >> 2) = 0b01
        let mut p = build(1, 4, 2);
        let addr = 0b0100;

        let (prediction, first) = p.predict(0, addr);
        assert_eq!(p.table().get_index((addr, first.history())), 1);
        assert_eq!(prediction, Outcome::T);
        assert_eq!(p.history(0).value(), 0b01);

        let (_, second) = p.predict(0, addr);
        assert_eq!(p.table().get_index((addr, second.history())), 0);

        p.rollback(0, second, Outcome::T);
        p.rollback(0, first, Outcome::T);
    }

    #[test]
    fn training_arithmetic_on_a_two_bit_vector() {
        let mut p = build(1, 4, 2);
        let addr = 0b0100;

        // Index 1 is read: snapshot history is 00, weights [0, 0],
        // output 0 >= -200, so the prediction is taken and the live
        // history becomes 01.
        let (prediction, record) = p.predict(0, addr);
        assert_eq!(prediction, Outcome::T);
        assert_eq!(record.weights(), &[0, 0]);

        // Weight 0 pairs with live bit 1 (= 0): mismatch against the taken
        // prediction, so it decrements. Weight 1 pairs with live bit 0
        // (= 1): match, so it increments.
        p.resolve(0, addr, Outcome::T, false, record);
        assert_eq!(p.table().entry(1), &[-1, 1]);
    }

    #[test]
    fn trained_entry_can_flip_a_prediction_to_not_taken() {
        let mut p = build(1, 4, 0);
        let addr = 0b11;

        // Keep the live history at 11 so every weight pairs with a set bit,
        // and the snapshot keeps selecting index 0.
        for _ in 0..3 {
            let (_, r) = p.predict(0, addr);
            p.rollback(0, r, Outcome::T);
        }
        assert_eq!(p.history(0).value(), 0b11);

        // Repeated not-taken resolutions drive both weights downward
        for _ in 0..101 {
            let (_, record) = p.predict(0, addr);
            p.rollback(0, record, Outcome::T);
            let record = PredictionRecord {
                history: 0b11,
                weights: p.table().entry(0).to_vec(),
                prediction: Outcome::N,
            };
            p.resolve(0, addr, Outcome::N, false, record);
        }

        // Both weights sit at -101; output -202 < -200
        assert_eq!(p.table().entry(0), &[-101, -101]);
        let (prediction, record) = p.predict(0, addr);
        assert_eq!(prediction, Outcome::N);
        p.rollback(0, record, Outcome::N);
    }

    #[test]
    fn btb_refill_clears_only_the_latest_bit() {
        let mut p = build(1, 16, 2);
        for _ in 0..4 {
            let (_, r) = p.predict(0, 0x1000);
            p.resolve(0, 0x1000, Outcome::T, false, r);
        }
        let before = p.history(0).value();
        assert_eq!(before & 1, 1);

        p.btb_refill(0, 0x1000);
        assert_eq!(p.history(0).value(), before & !1);
    }
}
