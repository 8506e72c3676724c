//! HTTP API server
//!
//! A thin actix-web adapter over `NoteStore`: handlers validate input, call
//! the store, and translate its answers into status codes. The store is built
//! in `main` and shared with every worker through `web::Data`.

use actix_cors::Cors;
use actix_web::{error, middleware::Logger, web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use tracing::info;

use notes_core::{Config, NoteStore};

mod docs;
mod health;
mod notes;

/// Run the server until interrupted
pub async fn run(store: NoteStore, config: &Config, host: &str, port: u16) -> Result<()> {
    let store = web::Data::new(store);
    let origins = config.cors_origins.clone();
    let any_origin = config.allows_any_origin();

    match store.data_file() {
        Some(path) => info!("Persisting notes to {}", path.display()),
        None => info!("No data file configured, notes are kept in memory only"),
    }
    info!("Listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins, any_origin))
            .wrap(Logger::default())
            .app_data(store.clone())
            .configure(configure)
    })
    .bind((host, port))
    .with_context(|| format!("Failed to bind {}:{}", host, port))?
    .run()
    .await
    .context("HTTP server failed")
}

/// Register extractor settings and all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
        unprocessable(err.to_string(), err, req)
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, req| {
        unprocessable(err.to_string(), err, req)
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        unprocessable(err.to_string(), err, req)
    }));

    health::config(cfg);
    docs::config(cfg);
    notes::config(cfg);
}

fn cors(origins: &[String], any_origin: bool) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if any_origin {
        return cors.allow_any_origin();
    }
    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

/// `{"detail": ...}` body used by every error response
pub(crate) fn detail(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "detail": message.into() })
}

/// Malformed request input becomes a 422 with the extractor's message
fn unprocessable<E>(message: String, err: E, _req: &HttpRequest) -> error::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response = HttpResponse::UnprocessableEntity().json(detail(message));
    error::InternalError::from_response(err, response).into()
}
