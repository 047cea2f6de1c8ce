//! Records exchanged between the backend and the frontend.
//!
//! Enum wire values are the upper-case strings stored in the database
//! (`"UPLOADED"`, `"ADMIN"`, ...).

pub mod admin_log;
pub mod audit;
pub mod document;
pub mod page_code;
pub mod profile;
pub mod query;
pub mod role;
