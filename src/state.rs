//! Shared application state for all routes.

use crate::service::MissionService;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: MissionService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        AppState {
            service: MissionService::new(store),
        }
    }
}
