//! The perceptron weight table.

use crate::predictor::PredictorTable;

/// A table of integer weight vectors, one weight per global history bit.
///
/// Entries are addressed by hashing a branch address against the global
/// history value that was live when the table is consulted, so the same
/// static branch can land on different entries as history evolves (and
/// distinct branches can alias onto one entry). Weights are deliberately
/// unclamped; training moves them by one without bound.
pub struct WeightTable {
    /// Weight vectors
    data: Vec<Vec<i64>>,

    /// Number of entries
    size: usize,

    /// Length of each weight vector (the history width, in bits)
    width: usize,

    /// Low address bits discarded before hashing
    shift_amt: usize,
}
impl WeightTable {
    /// Create a zero-initialized table. The entry count must be a power
    /// of two.
    pub fn new(size: usize, width: usize, shift_amt: usize) -> Self {
        assert!(size.is_power_of_two());
        Self {
            data: vec![vec![0; width]; size],
            size,
            width,
            shift_amt,
        }
    }

    /// Return the length of each weight vector.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return a weight vector by raw table index.
    pub fn entry(&self, idx: usize) -> &[i64] {
        &self.data[idx]
    }
}

impl PredictorTable for WeightTable {
    /// A branch address paired with a global history value.
    type Input = (usize, usize);
    type Entry = Vec<i64>;

    fn size(&self) -> usize {
        self.size
    }

    fn get_index(&self, (addr, history): (usize, usize)) -> usize {
        let idx = ((addr >> self.shift_amt) ^ history) & self.index_mask();
        debug_assert!(idx < self.size);
        idx
    }

    fn get_entry(&self, input: (usize, usize)) -> &Vec<i64> {
        &self.data[self.get_index(input)]
    }

    fn get_entry_mut(&mut self, input: (usize, usize)) -> &mut Vec<i64> {
        let idx = self.get_index(input);
        &mut self.data[idx]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_hashes_address_against_history() {
        let table = WeightTable::new(16, 4, 2);
        assert_eq!(table.get_index((0b0100, 0b0000)), 0b0001);
        assert_eq!(table.get_index((0b0100, 0b0001)), 0b0000);
        assert_eq!(table.get_index((0b1100, 0b1010)), 0b1001);
    }

    #[test]
    fn index_is_masked_to_table_size() {
        let table = WeightTable::new(8, 3, 0);
        for addr in 0..1024usize {
            for history in 0..8usize {
                assert!(table.get_index((addr, history)) < 8);
            }
        }
    }

    #[test]
    fn entries_start_at_zero() {
        let table = WeightTable::new(4, 2, 2);
        for idx in 0..4 {
            assert_eq!(table.entry(idx), &[0, 0]);
        }
    }
}
