//! # Classify — Interprets the G Vector (External to the Core, Spec §6/§4.5)
//!
//! The core hands back `G: Vec<Bignum>` and nothing else; interpreting each
//! `G_i` against its `N_i` — compromised, duplicate, clean, or (defensively)
//! anomaly — and writing the `compromised.csv`/`duplicates.csv` reports is
//! the classifier's job, same `csv`+`serde` pairing as [`crate::input`].

use crate::bignum::Bignum;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct CompromisedRow<'a> {
    id: &'a str,
    modulus: String,
    factor_p: String,
    factor_q: String,
}

#[derive(Serialize)]
struct DuplicateRow<'a> {
    id: &'a str,
    modulus: String,
    group: usize,
}

/// Tallies produced by [`classify`], for the CLI's summary line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub clean: usize,
    pub compromised: usize,
    pub duplicates: usize,
}

/// Partition `g` against `ids`/`moduli` and write `compromised.csv` and
/// `duplicates.csv` under `out_dir`. Returns tallies for the CLI to report.
///
/// Per spec §4.5:
/// - `G_i == 1` → clean, counted but not written.
/// - `1 < G_i < N_i` and `G_i | N_i` → compromised; factors are `G_i` and
///   `N_i / G_i`.
/// - `G_i == N_i` → duplicate; grouped with every other index sharing the
///   same modulus value.
/// - `G_i == 0` or `!(G_i | N_i)` → can only arise if the engine itself
///   already failed with an invariant violation, so a successful run never
///   reaches this branch; handled defensively (logged, not silently
///   dropped) in case a caller feeds `classify` a `G` vector from elsewhere.
pub fn classify(ids: &[String], moduli: &[Bignum], g: &[Bignum], out_dir: &Path) -> Result<Summary> {
    assert_eq!(ids.len(), moduli.len());
    assert_eq!(ids.len(), g.len());

    std::fs::create_dir_all(out_dir)?;

    let mut summary = Summary::default();
    let mut compromised_writer = csv::Writer::from_path(out_dir.join("compromised.csv"))?;
    let mut duplicate_writer = csv::Writer::from_path(out_dir.join("duplicates.csv"))?;

    // Group duplicate indices by modulus value so a cluster of size k is
    // reported together, not just as pairwise findings.
    let mut duplicate_groups: Vec<(Bignum, Vec<usize>)> = Vec::new();

    for i in 0..ids.len() {
        let n_i = &moduli[i];
        let g_i = &g[i];

        if g_i.is_one() {
            summary.clean += 1;
        } else if g_i == n_i {
            match duplicate_groups.iter_mut().find(|(m, _)| m == n_i) {
                Some((_, idxs)) => idxs.push(i),
                None => duplicate_groups.push((n_i.clone(), vec![i])),
            }
        } else if g_i.divides(n_i) && !g_i.is_zero() {
            let factor_q = n_i.checked_div_exact(g_i).expect("g_i divides n_i by the branch condition");
            compromised_writer.serialize(CompromisedRow {
                id: &ids[i],
                modulus: n_i.to_string(),
                factor_p: g_i.to_string(),
                factor_q: factor_q.to_string(),
            })?;
            summary.compromised += 1;
        } else {
            tracing::error!(
                id = %ids[i],
                modulus = %n_i,
                g = %g_i,
                "anomalous G_i: zero or non-dividing — this should be unreachable from a successful engine run"
            );
        }
    }

    for (group_idx, (modulus, idxs)) in duplicate_groups.iter().enumerate() {
        for &i in idxs {
            duplicate_writer.serialize(DuplicateRow {
                id: &ids[i],
                modulus: modulus.to_string(),
                group: group_idx,
            })?;
            summary.duplicates += 1;
        }
    }

    compromised_writer.flush()?;
    duplicate_writer.flush()?;

    Ok(summary)
}
