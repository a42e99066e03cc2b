//! Global branch history tracking.

use crate::branch::Outcome;

/// A bounded shift register of recent branch outcomes.
///
/// Bit 0 always holds the most-recently-observed outcome; older outcomes
/// occupy the higher bits, and anything shifted past the configured width is
/// discarded. One register exists per hardware thread.
pub struct GlobalHistoryRegister {
    value: usize,
    len: usize,
}

// NOTE: Printed with the most-recent outcome as the rightmost character,
// matching the bit order of [GlobalHistoryRegister::value].
impl std::fmt::Display for GlobalHistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:0width$b}", self.value, width = self.len)
    }
}

impl GlobalHistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        assert!(len < usize::BITS as usize);
        Self { value: 0, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the register contents as an unsigned value.
    pub fn value(&self) -> usize {
        self.value
    }

    /// Extract a single history bit (bit 0 is the most recent outcome).
    pub fn bit(&self, idx: usize) -> usize {
        (self.value >> idx) & 1
    }

    fn mask(&self) -> usize {
        (1 << self.len) - 1
    }

    /// Shift the register left by one bit and record a new outcome in bit 0.
    pub fn advance(&mut self, outcome: Outcome) {
        self.value = ((self.value << 1) | outcome.bit()) & self.mask();
    }

    /// Replace the register with a snapshot taken before a speculative
    /// [GlobalHistoryRegister::advance], replaying the outcome that is now
    /// known to be correct.
    pub fn restore(&mut self, snapshot: usize, outcome: Outcome) {
        self.value = ((snapshot << 1) | outcome.bit()) & self.mask();
    }

    /// Clear bit 0 without shifting the rest of the register.
    pub fn clear_latest(&mut self) {
        self.value &= self.mask() & !1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn advance_shifts_and_masks() {
        let mut ghr = GlobalHistoryRegister::new(3);
        ghr.advance(Outcome::T);
        assert_eq!(ghr.value(), 0b001);
        ghr.advance(Outcome::T);
        ghr.advance(Outcome::N);
        assert_eq!(ghr.value(), 0b110);

        // The oldest outcome falls off the top
        ghr.advance(Outcome::T);
        assert_eq!(ghr.value(), 0b101);
    }

    #[test]
    fn restore_replays_known_outcome() {
        let mut ghr = GlobalHistoryRegister::new(4);
        ghr.advance(Outcome::T);
        ghr.advance(Outcome::T);
        let snapshot = ghr.value();

        // Speculative updates that turn out to be wrong
        ghr.advance(Outcome::N);
        ghr.advance(Outcome::N);

        ghr.restore(snapshot, Outcome::T);
        assert_eq!(ghr.value(), 0b0111);
    }

    #[test]
    fn clear_latest_only_touches_bit_zero() {
        let mut ghr = GlobalHistoryRegister::new(4);
        for _ in 0..4 {
            ghr.advance(Outcome::T);
        }
        assert_eq!(ghr.value(), 0b1111);
        ghr.clear_latest();
        assert_eq!(ghr.value(), 0b1110);

        // Idempotent on an already-clear bit
        ghr.clear_latest();
        assert_eq!(ghr.value(), 0b1110);
    }

    #[test]
    fn display_matches_bit_order() {
        let mut ghr = GlobalHistoryRegister::new(4);
        ghr.advance(Outcome::T);
        ghr.advance(Outcome::N);
        assert_eq!(format!("{}", ghr), "0010");
    }
}
