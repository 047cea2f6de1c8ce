use crate::activity::ActivityState;
use crate::config::Config;
use crate::db::{self, StoreError};
use crate::storage::Storage;
use rusqlite::Connection;
use std::path::PathBuf;

/// Shared application state, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub storage: Storage,
    pub fonts_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub activity: ActivityState,
}

impl AppState {
    pub fn new(config: &Config, activity: ActivityState) -> Self {
        Self {
            db_path: config.database_path.clone(),
            storage: Storage::new(config.storage_dir.clone()),
            fonts_dir: config.fonts_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
            activity,
        }
    }

    pub fn connect(&self) -> Result<Connection, StoreError> {
        db::connect(&self.db_path)
    }
}
