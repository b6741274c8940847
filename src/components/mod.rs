pub mod templates;

pub use templates::{Template, TemplateName, Templates};
