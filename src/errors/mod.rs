use std::{fmt, io};
use axum::{http::StatusCode, response::{IntoResponse, Response}};

/// Custom error types for the wiki application
#[derive(Debug)]
pub enum WikiError {
    Io(io::Error),
    /// Path segment failed title validation
    InvalidTitle(String),
    /// Page could not be read, for whatever reason
    PageNotFound(String),
    Persistence(io::Error),
    Render(String),
    TemplateParse { name: String, reason: String },
    ListingScan(io::Error),
}

impl From<io::Error> for WikiError {
    fn from(err: io::Error) -> Self {
        WikiError::Io(err)
    }
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::Io(e) => write!(f, "I/O error: {}", e),
            WikiError::InvalidTitle(t) => write!(f, "Invalid Page Title: {:?}", t),
            WikiError::PageNotFound(t) => write!(f, "Page not found: {}", t),
            WikiError::Persistence(e) => write!(f, "{}", e),
            WikiError::Render(e) => write!(f, "Render error: {}", e),
            WikiError::TemplateParse { name, reason } => {
                write!(f, "Template '{}' failed to parse: {}", name, reason)
            }
            WikiError::ListingScan(e) => write!(f, "Failed to scan page directory: {}", e),
        }
    }
}

impl std::error::Error for WikiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WikiError::Io(e) | WikiError::Persistence(e) | WikiError::ListingScan(e) => Some(e),
            _ => None,
        }
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            WikiError::InvalidTitle(_) => StatusCode::NOT_FOUND.into_response(),
            WikiError::PageNotFound(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
            // Save failures hand the raw error text back to the client
            WikiError::Persistence(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_title_is_bare_404() {
        let resp = WikiError::InvalidTitle("../etc".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn persistence_failure_is_500() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only file system");
        let resp = WikiError::Persistence(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn render_and_scan_failures_are_500() {
        let render = WikiError::Render("missing field".into()).into_response();
        assert_eq!(render.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let scan = WikiError::ListingScan(io::Error::from(io::ErrorKind::NotFound)).into_response();
        assert_eq!(scan.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn template_parse_message_names_template() {
        let err = WikiError::TemplateParse {
            name: "view".into(),
            reason: "unterminated tag".into(),
        };
        assert_eq!(err.to_string(), "Template 'view' failed to parse: unterminated tag");
    }
}
