//! HTTP API, one sub-module per resource. Each exposes `configure_routes`
//! returning its Actix `Scope`.

pub mod admin;
pub mod audits;
pub mod auth;
pub mod codes;
pub mod documents;
pub mod functions;
pub mod page_codes;
pub mod profiles;
pub mod queries;

#[cfg(test)]
pub(crate) mod test_support;

use actix_web::web;

/// Registers every API scope. Shared by `main.rs` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::configure_routes())
        .service(codes::configure_routes())
        .service(functions::configure_routes())
        .service(profiles::configure_routes())
        .service(admin::configure_routes())
        .service(documents::configure_routes())
        .service(page_codes::configure_routes())
        .service(audits::configure_routes())
        .service(queries::configure_routes());
}
