//! Types and pure logic shared by the `backend` server and the `frontend` SPA.
//!
//! - `codes`: medical code format validation and the autocomplete index.
//! - `model`: the records exchanged over the HTTP API.
//! - `requests`: request payloads for the HTTP API.
//! - `routes`: the role-gated page table used by the frontend router.
//! - `auth`: session payloads and the mock sign-in directory.

pub mod auth;
pub mod codes;
pub mod model;
pub mod requests;
pub mod routes;
