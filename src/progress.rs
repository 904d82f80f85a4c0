//! # Progress — Background Phase Reporter for the CLI
//!
//! Trimmed down from the teacher's `progress.rs`: the core engine already
//! logs phase boundaries via `tracing` spans, so this reporter only tracks
//! the two counters a long product/remainder-tree build benefits from
//! between those boundaries — nodes built in Part A and levels descended in
//! Part B — and prints them to stderr on a timer. Same atomics-plus-Mutex
//! shape as the teacher, same 30-second cadence.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub struct Progress {
    pub nodes_built: AtomicU64,
    pub levels_descended: AtomicU64,
    start: Instant,
    shutdown: AtomicBool,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            nodes_built: AtomicU64::new(0),
            levels_descended: AtomicU64::new(0),
            start: Instant::now(),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Spawn the background reporter thread. The handle is expected to be
    /// joined after `stop()` so the final status line is not lost mid-print.
    pub fn start_reporter(self: &Arc<Self>) -> thread::JoinHandle<()> {
        let progress = Arc::clone(self);
        thread::spawn(move || loop {
            thread::sleep(Duration::from_secs(30));
            if progress.shutdown.load(Ordering::Relaxed) {
                break;
            }
            progress.print_status();
        })
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let built = self.nodes_built.load(Ordering::Relaxed);
        let descended = self.levels_descended.load(Ordering::Relaxed);
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        eprintln!(
            "[{:02}:{:02}:{:02}] nodes built: {} | levels descended: {}",
            h, m, s, built, descended
        );
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
