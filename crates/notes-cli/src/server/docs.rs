//! OpenAPI document at `/openapi.json`, Swagger UI at `/docs/`

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use notes_core::{NewNote, Note, NotePage, NotePatch};

use super::health::{APP_NAME, DESCRIPTION};
use super::notes;

pub const OPENAPI_PATH: &str = "/openapi.json";
pub const DOCS_PATH: &str = "/docs/";

#[derive(OpenApi)]
#[openapi(
    paths(
        notes::create_note,
        notes::list_notes,
        notes::search_notes,
        notes::get_note,
        notes::update_note,
        notes::delete_note,
    ),
    components(schemas(Note, NewNote, NotePatch, NotePage)),
    tags((name = "notes", description = "Note management"))
)]
struct ApiDoc;

/// The generated document, with name and description filled in
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = APP_NAME.to_string();
    doc.info.description = Some(DESCRIPTION.to_string());
    doc
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(SwaggerUi::new("/docs/{_:.*}").url(OPENAPI_PATH, openapi()));
}
