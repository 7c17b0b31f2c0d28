use std::sync::Arc;

use crate::{
    config::Config,
    services::{providers::ListProvider, rate_governor::RateGovernor, ComparisonService},
};

/// Shared application state
///
/// Holds the process-wide comparison service; its rate governor is shared by every
/// request so concurrent comparisons never oversubscribe the catalog.
#[derive(Clone)]
pub struct AppState {
    pub comparison: Arc<ComparisonService>,
}

impl AppState {
    pub fn new(comparison: ComparisonService) -> Self {
        Self {
            comparison: Arc::new(comparison),
        }
    }

    /// Wires the comparison service from configuration and a catalog provider
    pub fn from_config(config: &Config, provider: Arc<dyn ListProvider>) -> Self {
        let governor = Arc::new(RateGovernor::from_config(config));
        Self::new(ComparisonService::from_config(config, provider, governor))
    }
}
