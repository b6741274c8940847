//! tinywiki - a small wiki server keeping one text file per page
//!
//! Pages are addressed by alphanumeric titles, stored as `<title>.txt` in a
//! storage root, and rendered through three HTML templates.

pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod router;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use components::{Template, TemplateName, Templates};
pub use config::Config;
pub use errors::WikiError;
pub use handlers::FormBody;
pub use logger::Logger;
pub use router::{build_router, PageTitle};
pub use services::{FileStore, MemoryStore, PageStore};
pub use types::{AppState, Page, Title};

pub use utils::{escape_html, is_valid_title};
