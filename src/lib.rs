//! A perceptron branch-direction predictor core.
//!
//! The predictor in [predictor::perceptron] is the heart of the crate: a
//! shared weight table plus per-thread global history registers, driven by
//! an external fetch pipeline through predict / rollback / resolve calls.
//! The rest of the crate is scaffolding for exercising it: synthetic traces
//! in [trace] and hit-rate accounting in [stats].

pub mod branch;
pub mod error;
pub mod history;
pub mod predictor;
pub mod stats;
pub mod trace;

pub use branch::*;
pub use error::*;
pub use history::*;
pub use predictor::*;
pub use stats::*;
pub use trace::*;
