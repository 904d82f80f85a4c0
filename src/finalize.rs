//! # Finalizer — Part C
//!
//! For each leaf `i`, reloads `N_i` from the store (Part A did not retain
//! leaves in memory), computes `T_i = R_{0,i} / N_i` via exact division, and
//! `G_i = gcd(T_i, N_i)`. Both the division and the resulting `G_i` are
//! checked against the invariants spec §4.5/§8/§9 require; any violation is
//! a core bug, surfaced as `Error::InvariantViolation`, never handed on to
//! the classifier.

use crate::bignum::Bignum;
use crate::error::{Error, Phase};
use crate::store::{Kind, LevelStore};
use rayon::prelude::*;

/// `G_i` for one leaf, ready to hand to the external classifier.
pub type GcdResult = Bignum;

/// Compute `G_i` for every leaf `0..n`, given the leaf remainders produced
/// by Part B. Output is in input order (spec §5 ordering guarantee).
pub fn finalize(n: usize, remainders: &[Bignum], store: &LevelStore) -> Result<Vec<GcdResult>, Error> {
    debug_assert_eq!(remainders.len(), n);

    (0..n)
        .into_par_iter()
        .map(|i| {
            let n_i = store.get(Phase::C, Kind::Product, 0, i)?;
            let r_i = &remainders[i];

            let t_i = r_i.checked_div_exact(&n_i).ok_or_else(|| Error::InvariantViolation {
                phase: Phase::C,
                level: 0,
                slot: i,
                detail: format!(
                    "N_{i} does not divide R_0,{i}: N_{i}={n_i}, R_0,{i}={r_i}"
                ),
            })?;

            let g_i = t_i.gcd(&n_i);

            // Sanity check (spec §4.5, §9 Open Question b): G_i == 0, or
            // G_i not dividing N_i, must never happen in a correct run.
            if g_i.is_zero() || !g_i.divides(&n_i) {
                return Err(Error::InvariantViolation {
                    phase: Phase::C,
                    level: 0,
                    slot: i,
                    detail: format!("G_{i}={g_i} is zero or does not divide N_{i}={n_i}"),
                });
            }

            Ok(g_i)
        })
        .collect()
}
