mod access;
mod activity;
mod auth;
mod config;
mod db;
mod error;
mod services;
mod state;
mod storage;

use crate::activity::ActivityState;
use crate::config::Config;
use crate::state::AppState;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info};
use mime_guess::from_path;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

const ACTIVITY_QUEUE: usize = 256;
const JSON_LIMIT: usize = 2 * 1024 * 1024;

/// Serves the embedded frontend build. Unknown paths get `index.html` so the
/// SPA can route them itself.
async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

fn invalid_config(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(invalid_config)?;
    let url = config.url();

    let conn = db::initialize(&config.database_path)
        .map_err(|e| invalid_config(format!("cannot open {}: {}", config.database_path.display(), e)))?;
    info!(
        "Database {} at schema version {}",
        config.database_path.display(),
        db::current_version(&conn)
    );
    if let Some((email, password)) = &config.bootstrap_admin {
        match auth::bootstrap_admin(&conn, email, password) {
            Ok(Some(admin)) => info!("Created bootstrap administrator {}", admin.email),
            Ok(None) => {}
            Err(e) => error!("Could not create bootstrap administrator: {}", e),
        }
    }
    drop(conn);

    // Activity log writer
    let (activity, rx) = ActivityState::channel(ACTIVITY_QUEUE);
    tokio::spawn(activity::start_activity_writer(config.database_path.clone(), rx));

    let state = AppState::new(&config, activity);

    if config.open_browser {
        let browser_url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            if let Err(e) = webbrowser::open(&browser_url) {
                log::warn!("Could not open a browser: {}", e);
            }
        });
    }

    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure)
            .default_service(web::route().to(serve_embedded))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
