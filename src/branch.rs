//! Types for representing branches and branch outcomes.

/// A branch outcome.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N,
    /// Taken
    T,
}
impl Outcome {
    /// Return this outcome as a single history bit.
    pub fn bit(self) -> usize {
        match self {
            Self::N => 0,
            Self::T => 1,
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        match x {
            true => Self::T,
            false => Self::N,
        }
    }
}
impl Into<bool> for Outcome {
    fn into(self) -> bool {
        match self {
            Self::T => true,
            Self::N => false,
        }
    }
}

/// The kinds of control-flow instruction visible to a direction predictor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchKind {
    /// A conditional branch whose direction must be predicted.
    Conditional,
    /// An instruction that always redirects the instruction stream.
    Unconditional,
}

/// A record of one executed branch instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: usize,

    /// The outcome evaluated for this branch
    pub outcome: Outcome,

    /// The type/kind of branch
    pub kind: BranchKind,
}
impl BranchRecord {
    pub fn new(pc: usize, outcome: Outcome, kind: BranchKind) -> Self {
        Self { pc, outcome, kind }
    }

    /// Returns 'true' if this is a conditional instruction.
    pub fn is_conditional(&self) -> bool {
        self.kind == BranchKind::Conditional
    }
}
