//! Process-wide statistics registry (§5): a single counter map, updated
//! lock-free per event, reset at query start. The label-setting core
//! (`crate::algo::search`) increments these on every relaxation/settle/stall;
//! the runner folds them into each query's report at the end.
//!
//! Per §5's guidance ("implementations may prefer per-thread accumulation
//! folded at query end"), each counter lives behind a plain `AtomicU64` --
//! cheap enough for the few counters this core needs that a single shared
//! instance is fine for the thread-pool query-parallel case too, since
//! increments never need to observe each other's ordering.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Stats {
    pub relaxations: AtomicU64,
    pub settles: AtomicU64,
    pub pushes: AtomicU64,
    pub dominated_drops: AtomicU64,
    pub target_stalls: AtomicU64,
    pub charger_visits: AtomicU64,
}

impl Stats {
    pub const fn new() -> Self {
        Stats {
            relaxations: AtomicU64::new(0),
            settles: AtomicU64::new(0),
            pushes: AtomicU64::new(0),
            dominated_drops: AtomicU64::new(0),
            target_stalls: AtomicU64::new(0),
            charger_visits: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn inc_relaxations(&self) {
        self.relaxations.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_settles(&self) {
        self.settles.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_pushes(&self) {
        self.pushes.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_dominated_drops(&self) {
        self.dominated_drops.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_target_stalls(&self) {
        self.target_stalls.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_charger_visits(&self) {
        self.charger_visits.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset every counter to zero -- called once per query, per §5
    /// ("reset at query start").
    pub fn reset(&self) {
        self.relaxations.store(0, Ordering::Relaxed);
        self.settles.store(0, Ordering::Relaxed);
        self.pushes.store(0, Ordering::Relaxed);
        self.dominated_drops.store(0, Ordering::Relaxed);
        self.target_stalls.store(0, Ordering::Relaxed);
        self.charger_visits.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            relaxations: self.relaxations.load(Ordering::Relaxed),
            settles: self.settles.load(Ordering::Relaxed),
            pushes: self.pushes.load(Ordering::Relaxed),
            dominated_drops: self.dominated_drops.load(Ordering::Relaxed),
            target_stalls: self.target_stalls.load(Ordering::Relaxed),
            charger_visits: self.charger_visits.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct StatsSnapshot {
    pub relaxations: u64,
    pub settles: u64,
    pub pushes: u64,
    pub dominated_drops: u64,
    pub target_stalls: u64,
    pub charger_visits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_all_counters() {
        let stats = Stats::new();
        stats.inc_relaxations();
        stats.inc_settles();
        stats.reset();
        let snap = stats.snapshot();
        assert_eq!(snap.relaxations, 0);
        assert_eq!(snap.settles, 0);
    }

    #[test]
    fn increments_are_visible_in_snapshot() {
        let stats = Stats::new();
        stats.inc_pushes();
        stats.inc_pushes();
        assert_eq!(stats.snapshot().pushes, 2);
    }
}
