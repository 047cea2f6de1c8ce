use serde::{Deserialize, Serialize};

/// One row of the activity log shown to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminLog {
    pub id: i64,
    /// Profile that performed the action, `None` for system actions.
    pub actor_id: Option<String>,
    pub action: String,
    pub details: String,
    pub created_at: String,
}
