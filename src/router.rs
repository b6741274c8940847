//! Route table and the title extraction shared by the page routes.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use log::warn;

use crate::errors::WikiError;
use crate::handlers;
use crate::types::{AppState, Title};

/// Length of every page route prefix (`/view/`, `/edit/`, `/save/`)
pub const PREFIX_LEN: usize = "/view/".len();

/// Title taken from the request path after the route prefix.
///
/// The remainder of the path is validated as-is, without percent-decoding,
/// so anything other than letters and digits is rejected with a 404 before a
/// handler runs.
#[derive(Debug, Clone)]
pub struct PageTitle(pub Title);

#[async_trait]
impl<S> FromRequestParts<S> for PageTitle
where
    S: Send + Sync,
{
    type Rejection = WikiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path();
        let raw = path.get(PREFIX_LEN..).unwrap_or_default();
        Title::parse(raw).map(PageTitle).inspect_err(|e| {
            warn!("{} (path '{}')", e, path);
        })
    }
}

/// Build the wiki router.
///
/// - `GET /view/<title>`
/// - `GET /edit/<title>`
/// - `POST /save/<title>`
/// - `GET /top/`
///
/// The bare prefixes are routed too so an empty title is rejected by the
/// title check rather than by the router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/view/", get(handlers::view_page))
        .route("/view/*title", get(handlers::view_page))
        .route("/edit/", get(handlers::edit_page))
        .route("/edit/*title", get(handlers::edit_page))
        .route("/save/", post(handlers::save_page))
        .route("/save/*title", post(handlers::save_page))
        .route("/top/", get(handlers::list_pages))
        .with_state(state)
}
