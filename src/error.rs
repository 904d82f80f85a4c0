//! # Error — Core Engine Error Kinds
//!
//! The teacher crate this engine is descended from propagates everything
//! through `anyhow::Error`, built with `anyhow::anyhow!`/`.context(...)` at
//! the point of failure rather than a `thiserror`-derived enum (no
//! `thiserror` dependency appears anywhere in its own `Cargo.toml`). This
//! module keeps that same hand-rolled shape, but gives the *library* engine
//! (as opposed to the CLI binary) a small `Error` enum so a caller embedding
//! `BatchGcdEngine` can match on kind instead of parsing a message string.
//! It converts to `anyhow::Error` for free via the blanket `From` impl
//! `anyhow` provides for any `std::error::Error`.

use std::fmt;

/// Which phase of the algorithm an error originated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Product-tree construction.
    A,
    /// Remainder-tree descent.
    B,
    /// Per-leaf finalization.
    C,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::A => write!(f, "A (product tree)"),
            Phase::B => write!(f, "B (remainder tree)"),
            Phase::C => write!(f, "C (finalize)"),
        }
    }
}

/// Fatal run-aborting errors, per spec §7. There is no retry policy and no
/// partial success: any of these terminates the whole run.
#[derive(Debug)]
pub enum Error {
    /// §7.1 — the input vector was empty. Caught before Part A starts.
    EmptyInput,
    /// §7.1 — an input modulus failed the shape check (must be > 1).
    InvalidModulus { index: usize, reason: String },
    /// §7.2 — a level-store I/O operation failed, or an entry the scheduler
    /// guaranteed would exist was missing on read.
    Store {
        phase: Phase,
        level: usize,
        slot: usize,
        detail: String,
    },
    /// §7.3 — Part C found `R_{0,i}` not divisible by `N_i`, or the
    /// resulting `G_i` failed the post-condition `G_i == 0 || !N_i % G_i`.
    /// This indicates a bug in the engine, not a data anomaly.
    InvariantViolation {
        phase: Phase,
        level: usize,
        slot: usize,
        detail: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "no moduli supplied (n = 0)"),
            Error::InvalidModulus { index, reason } => {
                write!(f, "modulus at index {} is invalid: {}", index, reason)
            }
            Error::Store {
                phase,
                level,
                slot,
                detail,
            } => write!(
                f,
                "phase {} store error at (level {}, slot {}): {}",
                phase, level, slot, detail
            ),
            Error::InvariantViolation {
                phase,
                level,
                slot,
                detail,
            } => write!(
                f,
                "phase {} core-invariant violation at (level {}, slot {}): {} — this is a bug, not bad input",
                phase, level, slot, detail
            ),
        }
    }
}

impl std::error::Error for Error {}
