use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Hands out slot indices `0..total` exactly once each.
#[derive(Debug)]
pub(super) struct SlotCounter {
    total: u64,
    next: AtomicU64,
}

impl SlotCounter {
    pub(super) const fn new(total: u64) -> Self {
        Self {
            total,
            next: AtomicU64::new(0),
        }
    }

    /// Claims the next unclaimed slot, or `None` once every slot is taken.
    pub(super) fn claim(&self) -> Option<u64> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < self.total).then(|| current.saturating_add(1))
            })
            .ok()
    }

    pub(super) fn claimed(&self) -> u64 {
        self.next.load(Ordering::Acquire).min(self.total)
    }
}

/// Counts requests currently in flight and remembers the highest count seen.
#[derive(Debug, Default)]
pub(super) struct InflightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InflightGauge {
    pub(super) fn acquire(&self) -> InflightGuard<'_> {
        let now = self
            .current
            .fetch_add(1, Ordering::AcqRel)
            .saturating_add(1);
        self.peak.fetch_max(now, Ordering::AcqRel);
        InflightGuard { gauge: self }
    }

    pub(super) fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

pub(super) struct InflightGuard<'gauge> {
    gauge: &'gauge InflightGauge,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::AcqRel);
    }
}
