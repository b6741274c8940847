use std::fmt;
use std::sync::Arc;

use crate::components::Templates;
use crate::errors::WikiError;
use crate::services::PageStore;
use crate::utils::{is_valid_title, PAGE_EXTENSION};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PageStore>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(store: Arc<dyn PageStore>, templates: Templates) -> Self {
        Self { store, templates: Arc::new(templates) }
    }
}

/// A validated page title, safe to use verbatim as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Title(String);

impl Title {
    /// Validate `candidate` and wrap it
    pub fn parse(candidate: &str) -> Result<Self, WikiError> {
        if is_valid_title(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(WikiError::InvalidTitle(candidate.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the backing file, `<title>.txt`
    pub fn file_name(&self) -> String {
        format!("{}{}", self.0, PAGE_EXTENSION)
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A wiki page: a title and its raw content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: Title, body: impl Into<Vec<u8>>) -> Self {
        Self { title, body: body.into() }
    }

    /// A page with no content yet
    pub fn blank(title: Title) -> Self {
        Self { title, body: Vec::new() }
    }
}
