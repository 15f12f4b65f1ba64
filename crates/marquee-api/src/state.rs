//! Application State
//!
//! Centralizes access to the job store and the catalog.

use std::sync::Arc;

use marquee_catalog::CatalogStore;
use marquee_queue::JobStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    jobs: Arc<dyn JobStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(jobs: Arc<dyn JobStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { jobs, catalog }
    }

    /// Get job store (cloned Arc for sharing)
    pub fn jobs(&self) -> Arc<dyn JobStore> {
        self.jobs.clone()
    }

    /// Get catalog store (cloned Arc for sharing)
    pub fn catalog(&self) -> Arc<dyn CatalogStore> {
        self.catalog.clone()
    }
}
