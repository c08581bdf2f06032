//! PDF manipulation module

pub mod annotations;
pub mod catalog;
pub mod fonts;
pub mod template;

// Re-export commonly used items
pub use annotations::{resolve_annotation, Annotation};
pub use catalog::{document_title, form_text_fields, FormTextField};
pub use template::{build_template, FieldPlacement, Template, TemplateOptions};
