//! Liveness and service description endpoints

use actix_web::{web, HttpResponse, Responder};

use super::docs::{DOCS_PATH, OPENAPI_PATH};

pub const APP_NAME: &str = "Notes API";
pub const DESCRIPTION: &str = "A REST API for managing notes with full CRUD operations";

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(health_check)));
    cfg.service(web::resource("/info").route(web::get().to(api_info)));
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Healthy",
        "app_name": APP_NAME,
        "version": VERSION,
        "status": "running"
    }))
}

async fn api_info() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "name": APP_NAME,
        "version": VERSION,
        "description": DESCRIPTION,
        "endpoints": {
            "notes": "/notes",
            "search": "/notes/search",
            "health": "/",
            "docs": DOCS_PATH,
            "openapi": OPENAPI_PATH
        }
    }))
}
