//! # Product-Tree Builder — Part A
//!
//! Builds levels `0..=h` of the product tree from the leaf vector and
//! persists every level to the [`LevelStore`]. Grounded on the
//! `rayon::join`/`par_iter` fork-join shape `factorial.rs`/`primorial.rs`
//! use for their parallel-test phase, adapted here to a parallel-multiply
//! phase with a barrier between tree levels (spec §5: level-synchronous
//! scheduling is acceptable and simpler than a dataflow scheduler).

use crate::bignum::Bignum;
use crate::error::{Error, Phase};
use crate::progress::Progress;
use crate::store::{Kind, LevelStore};
use rayon::prelude::*;
use std::sync::atomic::Ordering;

/// Number of slots at level `k`, given `n` leaves.
pub fn level_len(n: usize, k: usize) -> usize {
    let mut len = n;
    for _ in 0..k {
        len = len.div_ceil(2);
    }
    len
}

/// Tree height `h = ceil(log2(n))` for `n >= 1`.
pub fn height(n: usize) -> usize {
    debug_assert!(n >= 1);
    if n == 1 {
        return 0;
    }
    let mut h = 0;
    let mut len = n;
    while len > 1 {
        len = len.div_ceil(2);
        h += 1;
    }
    h
}

/// Build the product tree from `leaves`, writing every level to `store`.
/// Returns the tree height `h`. `leaves` is consumed: Part A persists level
/// 0 and does not need to retain the in-memory vector afterward (spec §4.3).
/// `progress`, if given, has its `nodes_built` counter incremented once per
/// node written — level 0's leaves included.
pub fn build(leaves: Vec<Bignum>, store: &LevelStore, progress: Option<&Progress>) -> Result<usize, Error> {
    let n = leaves.len();
    if n == 0 {
        return Err(Error::EmptyInput);
    }

    // Level 0: persist the leaves as-is.
    leaves.par_iter().enumerate().try_for_each(|(i, leaf)| {
        store.put(Phase::A, Kind::Product, 0, i, leaf)?;
        if let Some(p) = progress {
            p.nodes_built.fetch_add(1, Ordering::Relaxed);
        }
        Ok::<(), Error>(())
    })?;

    let h = height(n);
    let mut prev_len = n;
    for k in 1..=h {
        let this_len = level_len(n, k);
        (0..this_len).into_par_iter().try_for_each(|i| -> Result<(), Error> {
            let left_idx = 2 * i;
            let right_idx = 2 * i + 1;
            let left = store.get(Phase::A, Kind::Product, k - 1, left_idx)?;
            let value = if right_idx < prev_len {
                let right = store.get(Phase::A, Kind::Product, k - 1, right_idx)?;
                left.checked_mul(&right)
            } else {
                // Odd tail: promote unchanged, never multiply by 1.
                left
            };
            store.put(Phase::A, Kind::Product, k, i, &value)?;
            if let Some(p) = progress {
                p.nodes_built.fetch_add(1, Ordering::Relaxed);
            }
            Ok(())
        })?;
        prev_len = this_len;
    }

    Ok(h)
}
