//! # Engine — Orchestrates Parts A, B, C Behind One Entry Point
//!
//! `BatchGcdEngine::run` is the sole entry point the CLI (or any embedding
//! caller) uses. Worker-pool sizing is grounded on
//! `cli.rs::configure_rayon` in the teacher crate, generalized from "size
//! the process-global rayon pool once at startup" to "build a pool scoped
//! to this one run", via `rayon::ThreadPool::install` — so a library caller
//! embedding this engine inside a larger application doesn't clobber that
//! application's own global pool.

use crate::bignum::Bignum;
use crate::error::Error;
use crate::finalize::{self, GcdResult};
use crate::product_tree;
use crate::progress::Progress;
use crate::remainder_tree::{self, DescentConfig};
use crate::store::LevelStore;
use std::path::PathBuf;

/// Operational knobs spec §6 names: worker count, spill threshold, working
/// directory.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// `None` lets rayon pick (all logical cores), matching the teacher's
    /// `--threads` default.
    pub workers: Option<usize>,
    /// Directory the level store is rooted at. Assumed empty at start;
    /// never cleaned up afterward (spec §6).
    pub working_dir: PathBuf,
    /// Remainder-tree levels wider than this spill to disk instead of
    /// staying resident (spec §4.4). `usize::MAX` disables spilling.
    pub spill_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            workers: None,
            working_dir: PathBuf::from(".batchgcd"),
            spill_threshold: usize::MAX,
        }
    }
}

/// The disk-backed product/remainder-tree batch-GCD engine.
pub struct BatchGcdEngine {
    config: EngineConfig,
}

impl BatchGcdEngine {
    pub fn new(config: EngineConfig) -> Self {
        BatchGcdEngine { config }
    }

    /// Run the full pipeline over `leaves`, returning `G_i` for each input
    /// in the same order. `leaves` must be non-empty and every modulus must
    /// be `> 1` (spec §7.1); both are checked before Part A starts.
    pub fn run(&self, leaves: Vec<Bignum>) -> Result<Vec<GcdResult>, anyhow::Error> {
        self.run_with_progress(leaves, None)
    }

    /// Same as [`run`], but `progress`, if given, has its counters
    /// incremented live as Parts A and B make progress, for a caller
    /// driving a background status reporter (e.g. the CLI).
    pub fn run_with_progress(
        &self,
        leaves: Vec<Bignum>,
        progress: Option<&Progress>,
    ) -> Result<Vec<GcdResult>, anyhow::Error> {
        let n = leaves.len();
        if n == 0 {
            return Err(Error::EmptyInput.into());
        }
        for (i, leaf) in leaves.iter().enumerate() {
            if leaf.is_zero() || leaf.is_one() {
                return Err(Error::InvalidModulus {
                    index: i,
                    reason: format!("modulus must be > 1, got {leaf}"),
                }
                .into());
            }
        }

        let store = LevelStore::new(&self.config.working_dir)?;

        let pool = {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(w) = self.config.workers {
                builder = builder.num_threads(w);
            }
            builder.build()?
        };

        let descent_cfg = DescentConfig {
            spill_threshold: self.config.spill_threshold,
        };

        pool.install(|| -> Result<Vec<GcdResult>, anyhow::Error> {
            let h = {
                let _span = tracing::info_span!("product_tree", n, phase = "A").entered();
                product_tree::build(leaves, &store, progress)?
            };
            tracing::info!(n, h, "product tree built");

            let remainders = {
                let _span = tracing::info_span!("remainder_tree", n, h, phase = "B").entered();
                remainder_tree::descend(n, h, &store, descent_cfg, progress)?
            };
            tracing::info!(n, "remainder tree descended");

            let g = {
                let _span = tracing::info_span!("finalize", n, phase = "C").entered();
                finalize::finalize(n, &remainders, &store)?
            };
            tracing::info!(n, "finalization complete");

            Ok(g)
        })
    }
}
