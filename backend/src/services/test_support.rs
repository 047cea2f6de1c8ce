//! Fixtures for handler tests: a migrated database in a temp directory and
//! signed-in users of each role.

use crate::activity::{ActivityEvent, ActivityState};
use crate::auth::password::hash_password;
use crate::config::Config;
use crate::db::{self, documents, profiles, sessions};
use crate::state::AppState;
use common::model::document::Document;
use common::model::profile::Profile;
use common::model::role::Role;
use std::io::Write;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub const PASSWORD: &str = "password123";

pub struct TestEnv {
    pub state: AppState,
    /// Activity events the handlers emitted.
    pub activity_rx: mpsc::Receiver<ActivityEvent>,
    _dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("test.sqlite"),
            storage_dir: dir.path().join("storage"),
            fonts_dir: dir.path().join("fonts"),
            open_browser: false,
            ..Config::default()
        };
        db::initialize(&config.database_path).unwrap();
        let (activity, activity_rx) = ActivityState::channel(64);
        Self {
            state: AppState::new(&config, activity),
            activity_rx,
            _dir: dir,
        }
    }

    /// Creates a user with `PASSWORD` and a live session; returns the profile
    /// and its bearer token.
    pub fn user(&self, email: &str, role: Role) -> (Profile, String) {
        let conn = self.state.connect().unwrap();
        let profile = profiles::insert(&conn, email, email, role, &hash_password(PASSWORD)).unwrap();
        let token = sessions::create(&conn, &profile.id).unwrap();
        (profile, token)
    }

    /// Stores a small PDF for `provider`, status `UPLOADED`.
    pub fn document(&self, provider: &Profile) -> Document {
        let conn = self.state.connect().unwrap();
        let doc = documents::fixtures::document(&conn, &provider.id);
        let mut file = self.state.storage.create(&doc.storage_path).unwrap();
        file.write_all(b"%PDF-1.4\n1 0 obj << /Type /Page >> endobj\n%%EOF").unwrap();
        doc
    }

    /// A document already handed to `coder`.
    pub fn assigned_document(&self, provider: &Profile, coder: &Profile) -> Document {
        let doc = self.document(provider);
        let conn = self.state.connect().unwrap();
        documents::assign(&conn, &doc.id, &coder.id).unwrap();
        documents::find(&conn, &doc.id).unwrap().unwrap()
    }

    pub fn actions(&mut self) -> Vec<&'static str> {
        let mut actions = Vec::new();
        while let Ok(event) = self.activity_rx.try_recv() {
            actions.push(event.action);
        }
        actions
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Builds the full API around `$state` for `actix_web::test`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(crate::services::configure),
        )
        .await
    };
}

pub(crate) use test_app;
