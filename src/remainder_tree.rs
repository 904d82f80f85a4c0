//! # Remainder-Tree Descender — Part B
//!
//! Descends from `R_{h,0} = level_h[0]` down to the leaf remainders
//! `R_{0,i}`, for every slot `i` computing `R_{k-1,i} = R_{k,p} mod
//! (level_{k-1}[i])^2` where `p = i / 2` — squaring the **child**
//! product-tree node, never the parent (spec §9: this is the one place the
//! algorithm, not the teacher's style, dictates the shape of the code;
//! squaring every node instead would inflate the work quadratically).
//!
//! Uses the same rayon intra-level-parallel / inter-level-barrier shape as
//! [`crate::product_tree`].

use crate::bignum::Bignum;
use crate::error::{Error, Phase};
use crate::product_tree::level_len;
use crate::progress::Progress;
use crate::store::{Kind, LevelStore};
use rayon::prelude::*;
use std::sync::atomic::Ordering;

/// Configuration for how Part B manages memory: remainders at a level wider
/// than `spill_threshold` are written through the store rather than held in
/// a `Vec` (spec §4.4 — correctness does not depend on this choice).
#[derive(Clone, Copy, Debug)]
pub struct DescentConfig {
    pub spill_threshold: usize,
}

impl Default for DescentConfig {
    fn default() -> Self {
        DescentConfig { spill_threshold: usize::MAX }
    }
}

/// The previous level's remainders, either still resident (narrow levels) or
/// released back to the store after being written (levels past
/// `spill_threshold`). Keeping this as an enum — rather than always holding a
/// `Vec` — is what actually bounds Part B's peak memory: a spilled level's
/// values are never carried forward, only its `(level, slot)` coordinates
/// are, and each child re-reads its single parent from disk on the next
/// iteration.
enum Current {
    Memory(Vec<Bignum>),
    Disk { level: usize },
}

impl Current {
    fn get(&self, store: &LevelStore, i: usize) -> Result<Bignum, Error> {
        match self {
            Current::Memory(v) => Ok(v[i].clone()),
            Current::Disk { level } => store.get(Phase::B, Kind::Remainder, *level, i),
        }
    }
}

/// Run the descent for `n` leaves over a product tree of height `h` already
/// persisted in `store`. Returns the leaf remainder vector `R_{0,0..n}` in
/// index order. `progress`, if given, has its `levels_descended` counter
/// incremented once per level consumed.
pub fn descend(
    n: usize,
    h: usize,
    store: &LevelStore,
    cfg: DescentConfig,
    progress: Option<&Progress>,
) -> Result<Vec<Bignum>, Error> {
    debug_assert!(n >= 1);

    // R_{h,0} = level_h[0] = Z. The root is never spilled: it lives only in
    // `current` until the first iteration consumes it.
    let mut current = Current::Memory(vec![store.get(Phase::B, Kind::Product, h, 0)?]);

    for k in (1..=h).rev() {
        let this_len = level_len(n, k - 1);
        let spill = this_len > cfg.spill_threshold;

        let next: Vec<Bignum> = (0..this_len)
            .into_par_iter()
            .map(|i| -> Result<Bignum, Error> {
                let parent = i / 2;
                let r_parent = current.get(store, parent)?;
                let child = store.get(Phase::A, Kind::Product, k - 1, i)?;
                let m = child.squared();
                let r = r_parent.rem(&m);
                if spill {
                    store.put(Phase::B, Kind::Remainder, k - 1, i, &r)?;
                }
                Ok(r)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // The level just consumed has now been read by exactly its
        // children above; if it was on disk, reclaim it (spec §3 "Level
        // store entries" lifecycle, §4.4).
        if let Current::Disk { level } = current {
            for p in 0..level_len(n, level) {
                store.drop_entry(Kind::Remainder, level, p);
            }
        }

        current = if spill {
            // Don't carry the values forward — only their (level, slot)
            // coordinates. The next iteration re-reads each one, once, from
            // its single child.
            Current::Disk { level: k - 1 }
        } else {
            Current::Memory(next)
        };

        if let Some(p) = progress {
            p.levels_descended.fetch_add(1, Ordering::Relaxed);
        }
    }

    match current {
        Current::Memory(v) => Ok(v),
        Current::Disk { level } => {
            let len = level_len(n, level);
            let result: Result<Vec<Bignum>, Error> =
                (0..len).into_par_iter().map(|i| store.get(Phase::B, Kind::Remainder, level, i)).collect();
            let result = result?;
            for p in 0..len {
                store.drop_entry(Kind::Remainder, level, p);
            }
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product_tree;

    fn run(vals: &[u64]) -> Vec<Bignum> {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path()).unwrap();
        let leaves: Vec<Bignum> = vals.iter().map(|&v| Bignum::from_u64(v)).collect();
        let h = product_tree::build(leaves, &store, None).unwrap();
        descend(vals.len(), h, &store, DescentConfig::default(), None).unwrap()
    }

    #[test]
    fn single_leaf_remainder_is_itself() {
        let r = run(&[7]);
        assert_eq!(r, vec![Bignum::from_u64(7)]);
    }

    #[test]
    fn pair_remainder_matches_z_mod_n_squared() {
        let r = run(&[15, 35]);
        // Z = 525. R_{0,0} = 525 mod 15^2 = 525 mod 225 = 75.
        assert_eq!(r[0], Bignum::from_u64(75));
        // R_{0,1} = 525 mod 35^2 = 525 mod 1225 = 525.
        assert_eq!(r[1], Bignum::from_u64(525));
    }

    #[test]
    fn leaf_invariant_r_congruent_to_z_mod_n_squared() {
        let vals = [2u64, 3, 5, 7, 11, 13];
        let r = run(&vals);
        let z: u128 = vals.iter().map(|&v| v as u128).product();
        for (i, &n) in vals.iter().enumerate() {
            let n2 = (n as u128) * (n as u128);
            let expected = (z % n2) as u64;
            assert_eq!(r[i], Bignum::from_u64(expected), "leaf {}", i);
        }
    }

    #[test]
    fn odd_n_matches_even_n_shape() {
        // Correctness must not depend on whether n is a power of two.
        for n in 1..=11usize {
            let vals: Vec<u64> = (2..2 + n as u64).collect();
            let r = run(&vals);
            let z: u128 = vals.iter().map(|&v| v as u128).product();
            for (i, &nv) in vals.iter().enumerate() {
                let n2 = (nv as u128) * (nv as u128);
                let expected = (z % n2) as u64;
                assert_eq!(r[i], Bignum::from_u64(expected), "n={}, leaf {}", n, i);
            }
        }
    }

    #[test]
    fn spilling_to_store_matches_in_memory_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path()).unwrap();
        let vals: Vec<u64> = (2..50).collect();
        let leaves: Vec<Bignum> = vals.iter().map(|&v| Bignum::from_u64(v)).collect();
        let h = product_tree::build(leaves, &store, None).unwrap();
        let spilled = descend(vals.len(), h, &store, DescentConfig { spill_threshold: 2 }, None).unwrap();

        let dir2 = tempfile::tempdir().unwrap();
        let store2 = LevelStore::new(dir2.path()).unwrap();
        let leaves2: Vec<Bignum> = vals.iter().map(|&v| Bignum::from_u64(v)).collect();
        let h2 = product_tree::build(leaves2, &store2, None).unwrap();
        let unspilled = descend(vals.len(), h2, &store2, DescentConfig::default(), None).unwrap();

        assert_eq!(spilled, unspilled);
    }

    #[test]
    fn spilled_entries_are_reclaimed_as_descent_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path()).unwrap();
        let vals: Vec<u64> = (2..40).collect();
        let leaves: Vec<Bignum> = vals.iter().map(|&v| Bignum::from_u64(v)).collect();
        let h = product_tree::build(leaves, &store, None).unwrap();
        descend(vals.len(), h, &store, DescentConfig { spill_threshold: 1 }, None).unwrap();
        // By the time descent finishes, no remainder-tree scratch entries
        // should remain on disk.
        assert_eq!(store.file_count(Kind::Remainder), 0);
    }

    #[test]
    fn product_tree_level_zero_survives_descent() {
        // Part C needs to reload leaves after Part B runs.
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path()).unwrap();
        let vals: Vec<u64> = vec![15, 35, 21];
        let leaves: Vec<Bignum> = vals.iter().map(|&v| Bignum::from_u64(v)).collect();
        let h = product_tree::build(leaves, &store, None).unwrap();
        descend(vals.len(), h, &store, DescentConfig { spill_threshold: 0 }, None).unwrap();
        for (i, &v) in vals.iter().enumerate() {
            assert_eq!(store.get(Phase::C, Kind::Product, 0, i).unwrap(), Bignum::from_u64(v));
        }
    }

    #[test]
    fn progress_counts_one_per_level_descended() {
        let dir = tempfile::tempdir().unwrap();
        let store = LevelStore::new(dir.path()).unwrap();
        let vals: Vec<u64> = (2..10).collect(); // n=8, h=3
        let leaves: Vec<Bignum> = vals.iter().map(|&v| Bignum::from_u64(v)).collect();
        let h = product_tree::build(leaves, &store, None).unwrap();
        let progress = Progress::new();
        descend(vals.len(), h, &store, DescentConfig::default(), Some(&progress)).unwrap();
        assert_eq!(progress.levels_descended.load(Ordering::Relaxed), h as u64);
    }
}
