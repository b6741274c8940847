use std::convert::Infallible;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use log::{debug, error, info, warn};

use crate::components::TemplateName;
use crate::errors::WikiError;
use crate::router::PageTitle;
use crate::types::{AppState, Page, Title};
use crate::utils::form_value;

/// Name of the form field carrying the page content
const BODY_FIELD: &str = "body";

/// Raw `body` value posted by the edit page.
///
/// Looked up in a urlencoded or multipart request body first, then in the
/// query string. The first value wins, and anything unreadable counts as an
/// empty body, so this never rejects a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody(pub Vec<u8>);

#[async_trait]
impl<S> FromRequest<S> for FormBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().map(str::to_owned);
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let from_body = if content_type.starts_with("application/x-www-form-urlencoded") {
            match Bytes::from_request(req, state).await {
                Ok(bytes) => form_value(&bytes, BODY_FIELD),
                Err(e) => {
                    warn!("Could not read form body: {}", e);
                    None
                }
            }
        } else if content_type.starts_with("multipart/form-data") {
            multipart_value(req, state).await
        } else {
            debug!("Ignoring request body with content type '{}'", content_type);
            None
        };

        let body = from_body
            .or_else(|| query.and_then(|q| form_value(q.as_bytes(), BODY_FIELD)))
            .unwrap_or_default();
        Ok(FormBody(body))
    }
}

/// First non-file `body` part of a multipart form
async fn multipart_value<S>(req: Request, state: &S) -> Option<Vec<u8>>
where
    S: Send + Sync,
{
    let mut multipart = Multipart::from_request(req, state)
        .await
        .inspect_err(|e| warn!("Could not read multipart form: {}", e))
        .ok()?;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(BODY_FIELD) || field.file_name().is_some() {
                    continue;
                }
                return match field.bytes().await {
                    Ok(bytes) => Some(bytes.to_vec()),
                    Err(e) => {
                        warn!("Could not read multipart field '{}': {}", BODY_FIELD, e);
                        None
                    }
                };
            }
            Ok(None) => return None,
            Err(e) => {
                warn!("Malformed multipart form: {}", e);
                return None;
            }
        }
    }
}

/// Show a page, or send the client to its edit form when it does not exist yet
pub async fn view_page(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
) -> Result<Response, WikiError> {
    match state.store.load(&title) {
        Ok(page) => render_page(&state, TemplateName::View, &page),
        Err(WikiError::PageNotFound(_)) => {
            info!("Page '{}' does not exist, redirecting to edit", title);
            Ok(redirect(&edit_path(&title)))
        }
        Err(e) => Err(e),
    }
}

/// Edit form for an existing page, or a blank one for a new page
pub async fn edit_page(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
) -> Result<Response, WikiError> {
    let page = match state.store.load(&title) {
        Ok(page) => page,
        Err(WikiError::PageNotFound(_)) => {
            debug!("Page '{}' does not exist, editing blank page", title);
            Page::blank(title)
        }
        Err(e) => return Err(e),
    };
    render_page(&state, TemplateName::Edit, &page)
}

/// Store the posted body and send the client back to the page.
///
/// Failures are logged by the store that detects them.
pub async fn save_page(
    State(state): State<AppState>,
    PageTitle(title): PageTitle,
    FormBody(body): FormBody,
) -> Result<Response, WikiError> {
    let page = Page::new(title, body);
    state.store.save(&page)?;

    info!("Saved page '{}'", page.title);
    Ok(redirect(&view_path(&page.title)))
}

/// List every stored page.
///
/// An empty store still renders the listing; a failed directory scan is a 500,
/// logged by the store.
pub async fn list_pages(State(state): State<AppState>) -> Result<Response, WikiError> {
    let titles = state.store.list()?;

    if titles.is_empty() {
        warn!("No page files found");
    } else {
        debug!("Listing {} pages", titles.len());
    }

    let html = state.templates.render_listing(&titles).inspect_err(|e| {
        error!("Rendering page listing failed: {}", e);
    })?;
    Ok(Html(html).into_response())
}

fn render_page(state: &AppState, name: TemplateName, page: &Page) -> Result<Response, WikiError> {
    match state.templates.render_page(name, page) {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            error!("Rendering '{}' for page '{}' failed: {}", name.as_str(), page.title, e);
            Err(e)
        }
    }
}

fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn view_path(title: &Title) -> String {
    format!("/view/{}", title)
}

pub fn edit_path(title: &Title) -> String {
    format!("/edit/{}", title)
}
