//! Application state for assignment service.

use std::sync::Arc;

use common::config::AppConfig;
use common::errors::AppResult;

use crate::allocation::AllocationService;
use crate::lookup::LookupService;
use crate::service::AssignmentService;
use crate::store::{self, AssignmentStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn AssignmentStore>,
    pub allocation: AllocationService,
    pub lookup: LookupService,
}

impl AppState {
    /// Creates application state over an already built store.
    pub fn new(config: AppConfig, store: Arc<dyn AssignmentStore>) -> Self {
        Self {
            allocation: AllocationService::new(store.clone()),
            lookup: LookupService::new(store.clone()),
            store,
            config,
        }
    }

    /// Connects the configured store and creates application state.
    pub async fn connect(config: AppConfig) -> AppResult<Self> {
        let store = store::connect(&config).await?;
        Ok(Self::new(config, store))
    }

    /// Per-request service over the shared components.
    pub fn assignment_service(&self) -> AssignmentService {
        AssignmentService::new(
            self.allocation.clone(),
            self.lookup.clone(),
            self.config.max_request_quantity,
        )
    }
}
