//! # Level Store — Disk-Backed Product/Remainder Tree Node Storage
//!
//! One file per `(kind, level, slot)` entry under a configured working
//! directory. Grounded on `checkpoint.rs`'s atomic write-then-rename pattern
//! in the teacher crate, generalized from "one checkpoint file, rewritten
//! many times" to "many node files, each written exactly once". Naming is
//! derived purely from the key tuple, so a worker writing a slot and a later
//! reader of that slot need no shared in-memory index (spec §4.2).
//!
//! `Kind` separates the product tree from the remainder tree's spilled
//! scratch values: both trees share the same `(level, slot)` shape, so
//! without a namespace tag a spilled remainder entry at level `k` would
//! silently overwrite the product-tree node at that same `(level, slot)` —
//! including, fatally, level 0, which Part C must still be able to reload.

use crate::bignum::Bignum;
use crate::error::{Error, Phase};
use std::fs;
use std::path::{Path, PathBuf};

/// Which logical tree an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// Product-tree nodes, written once in Part A and reloaded by Part B
    /// (for squaring) and Part C (level 0 leaves).
    Product,
    /// Remainder-tree values spilled to disk by Part B when a level exceeds
    /// the configured memory budget.
    Remainder,
}

impl Kind {
    fn tag(self) -> &'static str {
        match self {
            Kind::Product => "p",
            Kind::Remainder => "r",
        }
    }
}

/// Disk-backed store for tree-node values, keyed by `(kind, level, slot)`.
pub struct LevelStore {
    root: PathBuf,
}

impl LevelStore {
    /// Open (creating if absent) a store rooted at `working_dir`. The
    /// directory is assumed empty at start, per spec §6 — the store neither
    /// scans for nor cleans up stale entries from a previous run.
    pub fn new(working_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = working_dir.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(LevelStore { root })
    }

    fn final_path(&self, kind: Kind, level: usize, slot: usize) -> PathBuf {
        self.root.join(format!("{}-{level}-{slot}.bin", kind.tag()))
    }

    fn tmp_path(&self, kind: Kind, level: usize, slot: usize) -> PathBuf {
        self.root.join(format!("{}-{level}-{slot}.tmp", kind.tag()))
    }

    /// Durably persist `value` at `(kind, level, slot)`. Writes to a temp
    /// file then renames into place, so a concurrent reader either sees the
    /// complete value under its final name or nothing at all — never a
    /// partial write (spec §4.2, §9 Open Question a).
    pub fn put(&self, phase: Phase, kind: Kind, level: usize, slot: usize, value: &Bignum) -> Result<(), Error> {
        let tmp = self.tmp_path(kind, level, slot);
        let final_path = self.final_path(kind, level, slot);
        fs::write(&tmp, value.to_bytes()).map_err(|e| Error::Store {
            phase,
            level,
            slot,
            detail: format!("write {}: {}", tmp.display(), e),
        })?;
        fs::rename(&tmp, &final_path).map_err(|e| Error::Store {
            phase,
            level,
            slot,
            detail: format!("rename {} -> {}: {}", tmp.display(), final_path.display(), e),
        })?;
        Ok(())
    }

    /// Load the value at `(kind, level, slot)`. Callers only ever call this
    /// after the scheduler's level barrier guarantees the entry was written;
    /// a missing entry at that point is a scheduler bug, not a transient
    /// condition, so this never retries (spec §4.2, §6 error surface).
    pub fn get(&self, phase: Phase, kind: Kind, level: usize, slot: usize) -> Result<Bignum, Error> {
        let path = self.final_path(kind, level, slot);
        let bytes = fs::read(&path).map_err(|e| Error::Store {
            phase,
            level,
            slot,
            detail: format!("read {}: {}", path.display(), e),
        })?;
        Ok(Bignum::from_bytes(&bytes))
    }

    /// Release the storage for `(kind, level, slot)`. Best-effort: a missing
    /// file is not an error (the entry may already have been dropped, or
    /// never existed if this level had an odd tail), matching
    /// `checkpoint::clear`'s `let _ = fs::remove_file(...)` posture.
    pub fn drop_entry(&self, kind: Kind, level: usize, slot: usize) {
        let path = self.final_path(kind, level, slot);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to drop store entry");
            }
        }
    }

    /// Number of entries of a given kind currently on disk. Used by tests to
    /// confirm that dropped levels were actually reclaimed.
    #[cfg(test)]
    pub fn file_count(&self, kind: Kind) -> usize {
        let prefix = format!("{}-", kind.tag());
        fs::read_dir(&self.root)
            .map(|rd| {
                rd.filter_map(Result::ok)
                    .filter(|e| {
                        let name = e.file_name();
                        let name = name.to_string_lossy();
                        name.starts_with(&prefix) && name.ends_with(".bin")
                    })
                    .count()
            })
            .unwrap_or(0)
    }
}
