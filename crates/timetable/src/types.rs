use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::db::SqliteStore;
use crate::planner::Planner;
use crate::render::ViewRenderer;

pub type ServerPlanner = Planner<SqliteStore, ViewRenderer>;

/// State shared by every request handler.
pub struct AppState {
    /// Single owner of the selection; each action completes (snapshot write
    /// included) before the next one starts
    planner: Mutex<ServerPlanner>,

    /// Set when the catalog could not be loaded at startup
    pub catalog_error: Option<String>,
}

impl AppState {
    pub fn new(planner: ServerPlanner, catalog_error: Option<String>) -> Self {
        Self {
            planner: Mutex::new(planner),
            catalog_error,
        }
    }

    /// Locks the planner. A panic in a previous handler does not leave the
    /// selection unusable, so poisoning is ignored.
    pub fn planner(&self) -> MutexGuard<'_, ServerPlanner> {
        self.planner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
