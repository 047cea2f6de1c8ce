//! One component per routed page.

pub mod activity;
pub mod audit;
pub mod coding;
pub mod coding_queue;
pub mod documents;
pub mod login;
pub mod queries;
pub mod upload;
pub mod users;
