use std::time::{Instant, SystemTime};

use crate::db::{Database, StoreError};
use crate::response::AppError;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db: Database,
    expose_error_details: bool,
}

impl AppState {
    pub fn new(db: Database, expose_error_details: bool) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db,
            expose_error_details,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    /// Store failure that carries the underlying error text in the 500 body,
    /// but only when `EXPOSE_ERROR_DETAILS` is on. Missing rows stay 404.
    pub fn detailed_store_error(&self, err: StoreError) -> AppError {
        if self.expose_error_details && !err.is_row_not_found() {
            AppError::StoreExposed(err)
        } else {
            AppError::from(err)
        }
    }
}
