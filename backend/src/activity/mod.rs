//! Records state-changing operations in the `admin_logs` table.
//!
//! Handlers never write the log themselves. They push an `ActivityEvent` into
//! an MPSC channel through `ActivityState::record`, and `start_activity_writer`,
//! spawned once in `main.rs`, drains the channel into the database. A full or
//! closed channel drops the event with a warning; the request still succeeds.

use crate::db::{self, admin_logs};
use log::{error, warn};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Action names stored in `admin_logs.action`.
pub mod actions {
    pub const SIGN_IN: &str = "SIGN_IN";
    pub const USER_CREATED: &str = "USER_CREATED";
    pub const PASSWORD_CHANGED: &str = "PASSWORD_CHANGED";
    pub const USER_ACTIVATION: &str = "USER_ACTIVATION";
    pub const DOCUMENT_UPLOADED: &str = "DOCUMENT_UPLOADED";
    pub const DOCUMENT_ASSIGNED: &str = "DOCUMENT_ASSIGNED";
    pub const STATUS_CHANGED: &str = "STATUS_CHANGED";
    pub const AUDIT_SUBMITTED: &str = "AUDIT_SUBMITTED";
    pub const AUDIT_REVIEWED: &str = "AUDIT_REVIEWED";
    pub const QUERY_RAISED: &str = "QUERY_RAISED";
    pub const QUERY_ANSWERED: &str = "QUERY_ANSWERED";
}

/// Handle shared with every worker through `AppState`.
#[derive(Clone)]
pub struct ActivityState {
    pub tx: mpsc::Sender<ActivityEvent>,
}

#[derive(Debug)]
pub struct ActivityEvent {
    pub(crate) actor_id: Option<String>,
    pub(crate) action: &'static str,
    pub(crate) details: String,
}

impl ActivityState {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ActivityEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn record(&self, actor_id: Option<&str>, action: &'static str, details: impl Into<String>) {
        let event = ActivityEvent {
            actor_id: actor_id.map(str::to_string),
            action,
            details: details.into(),
        };
        if let Err(e) = self.tx.try_send(event) {
            warn!("Dropping activity event: {}", e);
        }
    }
}

/// Writes every received event to `admin_logs` until all senders are gone.
pub async fn start_activity_writer(db_path: PathBuf, mut rx: mpsc::Receiver<ActivityEvent>) {
    while let Some(event) = rx.recv().await {
        let result = db::connect(&db_path).and_then(|conn| {
            admin_logs::insert(
                &conn,
                event.actor_id.as_deref(),
                event.action,
                &event.details,
            )
        });
        if let Err(e) = result {
            error!("Could not write activity {}: {}", event.action, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;

    #[tokio::test]
    async fn writer_drains_events_into_admin_logs() {
        let (_dir, path, conn) = temp_database();
        let (state, rx) = ActivityState::channel(8);
        let writer = tokio::spawn(start_activity_writer(path.clone(), rx));

        state.record(Some("admin-1"), actions::USER_CREATED, "coder@clinic.test");
        state.record(None, actions::SIGN_IN, "system");
        drop(state);
        writer.await.unwrap();

        let logs = admin_logs::recent(&conn, 10).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, actions::SIGN_IN);
        assert_eq!(logs[1].actor_id.as_deref(), Some("admin-1"));
        assert_eq!(logs[1].details, "coder@clinic.test");
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (state, _rx) = ActivityState::channel(1);
        state.record(None, actions::SIGN_IN, "first");
        state.record(None, actions::SIGN_IN, "second");
    }
}
