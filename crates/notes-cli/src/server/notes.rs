//! Notes REST API
//!
//! CRUD, pagination and search over the shared `NoteStore`. Input is
//! validated here so the store only sees well-formed requests; a missing
//! note is a 404, a failed snapshot write a 500.

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::error;
use utoipa::IntoParams;

use notes_core::{NewNote, Note, NotePage, NotePatch, NoteStore, StoreError};

use super::detail;

/// Largest page a client may ask for
const MAX_PER_PAGE: u64 = 100;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notes")
            .route("", web::post().to(create_note))
            .route("/", web::post().to(create_note))
            .route("", web::get().to(list_notes))
            .route("/", web::get().to(list_notes))
            .route("/search", web::get().to(search_notes))
            .route("/{note_id}", web::get().to(get_note))
            .route("/{note_id}", web::put().to(update_note))
            .route("/{note_id}", web::delete().to(delete_note)),
    );
}

// --- Create ---

#[utoipa::path(post, path = "/notes/", tag = "notes",
    request_body = NewNote,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 422, description = "Invalid input"),
        (status = 500, description = "Snapshot write failed")))]
pub(super) async fn create_note(
    store: web::Data<NoteStore>,
    body: web::Json<NewNote>,
) -> impl Responder {
    let input = body.into_inner();
    if let Err(e) = input.validate() {
        return HttpResponse::UnprocessableEntity().json(detail(e.to_string()));
    }

    match store.create(input) {
        Ok(note) => HttpResponse::Created().json(note),
        Err(e) => store_failure("create note", e),
    }
}

// --- List ---

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(super) struct ListQuery {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    #[param(minimum = 1, default = 1)]
    page: u64,
    /// Notes per page, 1 to 100
    #[serde(default = "default_per_page")]
    #[param(minimum = 1, maximum = 100, default = 10)]
    per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    10
}

#[utoipa::path(get, path = "/notes/", tag = "notes",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of notes, newest first", body = NotePage),
        (status = 422, description = "Paging out of range")))]
pub(super) async fn list_notes(
    store: web::Data<NoteStore>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    let ListQuery { page, per_page } = query.into_inner();

    if page < 1 {
        return HttpResponse::UnprocessableEntity().json(detail("page must be at least 1"));
    }
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return HttpResponse::UnprocessableEntity().json(detail(format!(
            "per_page must be between 1 and {}",
            MAX_PER_PAGE
        )));
    }

    let page = usize::try_from(page).unwrap_or(usize::MAX);
    let per_page = usize::try_from(per_page).unwrap_or(usize::MAX);
    let skip = (page - 1).saturating_mul(per_page);

    let (notes, total) = store.list(skip, per_page);
    HttpResponse::Ok().json(NotePage {
        notes,
        total,
        page,
        per_page,
    })
}

// --- Search ---

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(super) struct SearchQuery {
    /// Case-insensitive substring of the title or content
    q: Option<String>,
}

#[utoipa::path(get, path = "/notes/search", tag = "notes",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching notes, newest first", body = Vec<Note>),
        (status = 422, description = "Missing or empty query")))]
pub(super) async fn search_notes(
    store: web::Data<NoteStore>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let q = match query.into_inner().q {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return HttpResponse::UnprocessableEntity()
                .json(detail("query parameter 'q' must not be empty"))
        }
    };

    HttpResponse::Ok().json(store.search(&q))
}

// --- Single note ---

#[utoipa::path(get, path = "/notes/{note_id}", tag = "notes",
    params(("note_id" = u64, Path, description = "Note id")),
    responses(
        (status = 200, description = "The note", body = Note),
        (status = 404, description = "Note not found")))]
pub(super) async fn get_note(
    store: web::Data<NoteStore>,
    path: web::Path<u64>,
) -> impl Responder {
    match store.get(path.into_inner()) {
        Some(note) => HttpResponse::Ok().json(note),
        None => not_found(),
    }
}

#[utoipa::path(put, path = "/notes/{note_id}", tag = "notes",
    params(("note_id" = u64, Path, description = "Note id")),
    request_body = NotePatch,
    responses(
        (status = 200, description = "The updated note", body = Note),
        (status = 404, description = "Note not found"),
        (status = 422, description = "Invalid input"),
        (status = 500, description = "Snapshot write failed")))]
pub(super) async fn update_note(
    store: web::Data<NoteStore>,
    path: web::Path<u64>,
    body: web::Json<NotePatch>,
) -> impl Responder {
    let patch = body.into_inner();
    if let Err(e) = patch.validate() {
        return HttpResponse::UnprocessableEntity().json(detail(e.to_string()));
    }

    match store.update(path.into_inner(), patch) {
        Ok(Some(note)) => HttpResponse::Ok().json(note),
        Ok(None) => not_found(),
        Err(e) => store_failure("update note", e),
    }
}

#[utoipa::path(delete, path = "/notes/{note_id}", tag = "notes",
    params(("note_id" = u64, Path, description = "Note id")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Snapshot write failed")))]
pub(super) async fn delete_note(
    store: web::Data<NoteStore>,
    path: web::Path<u64>,
) -> impl Responder {
    match store.delete(path.into_inner()) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found(),
        Err(e) => store_failure("delete note", e),
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(detail("Note not found"))
}

fn store_failure(action: &str, err: StoreError) -> HttpResponse {
    match err {
        StoreError::Validation(e) => {
            HttpResponse::UnprocessableEntity().json(detail(e.to_string()))
        }
        e @ (StoreError::IdsExhausted | StoreError::Storage(_)) => {
            error!("Failed to {}: {}", action, e);
            HttpResponse::InternalServerError()
                .json(detail(format!("Failed to {}: {}", action, e)))
        }
    }
}
