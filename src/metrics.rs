use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Operational counters
#[derive(Clone)]
pub struct Metrics {
    pub entities_created: Arc<AtomicU64>,
    pub entities_updated: Arc<AtomicU64>,
    pub entities_deleted: Arc<AtomicU64>,
    pub searches: Arc<AtomicU64>,
    pub amenity_links: Arc<AtomicU64>,
    pub rate_limited: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            entities_created: Arc::new(AtomicU64::new(0)),
            entities_updated: Arc::new(AtomicU64::new(0)),
            entities_deleted: Arc::new(AtomicU64::new(0)),
            searches: Arc::new(AtomicU64::new(0)),
            amenity_links: Arc::new(AtomicU64::new(0)),
            rate_limited: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_created(&self) {
        self.entities_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_updated(&self) {
        self.entities_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_deleted(&self) {
        self.entities_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_searches(&self) {
        self.searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_amenity_links(&self) {
        self.amenity_links.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entities_created: self.entities_created.load(Ordering::Relaxed),
            entities_updated: self.entities_updated.load(Ordering::Relaxed),
            entities_deleted: self.entities_deleted.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            amenity_links: self.amenity_links.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub entities_created: u64,
    pub entities_updated: u64,
    pub entities_deleted: u64,
    pub searches: u64,
    pub amenity_links: u64,
    pub rate_limited: u64,
    pub uptime_seconds: u64,
}
