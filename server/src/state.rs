use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::catalog::RegionCatalog;
use crate::store::VisitedStore;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RegionCatalog>,
    pub store: Arc<VisitedStore>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    add_requests_total: AtomicU64,
    areas_added_total: AtomicU64,
    duplicate_rejections_total: AtomicU64,
    invalid_requests_total: AtomicU64,
    persist_failures_total: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservabilitySnapshot {
    pub add_requests_total: u64,
    pub areas_added_total: u64,
    pub duplicate_rejections_total: u64,
    pub invalid_requests_total: u64,
    pub persist_failures_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            add_requests_total: self.add_requests_total.load(Ordering::Relaxed),
            areas_added_total: self.areas_added_total.load(Ordering::Relaxed),
            duplicate_rejections_total: self.duplicate_rejections_total.load(Ordering::Relaxed),
            invalid_requests_total: self.invalid_requests_total.load(Ordering::Relaxed),
            persist_failures_total: self.persist_failures_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_add_request(&self) {
        self.add_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_area_added(&self) {
        self.areas_added_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate_rejection(&self) {
        self.duplicate_rejections_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_request(&self) {
        self.invalid_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_failure(&self) {
        self.persist_failures_total.fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(catalog: RegionCatalog, store: VisitedStore) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store: Arc::new(store),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}
