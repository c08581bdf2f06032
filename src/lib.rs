//! Sera App template tools
//!
//! Builds the PDF form template used by the Sera App and audits a generated
//! template for the fields the app depends on:
//! - Lay out and write the template (five text inputs, four image placeholders)
//! - List every page's annotations with name, type and position
//! - Check that the required `Image_1`..`Image_4` fields are present
//!
//! # Example
//!
//! ```no_run
//! use sera_template::pdf::{build_template, TemplateOptions};
//! use sera_template::audit::audit;
//!
//! let template = build_template(&TemplateOptions::default())
//!     .expect("Failed to build template");
//! let report = audit(&template.path).expect("Failed to audit template");
//!
//! println!("{report}");
//! ```

pub mod audit;
pub mod error;
pub mod fields;
pub mod layout;
pub mod pdf;

// Re-export commonly used items
pub use error::{AnnotationError, Error, Result};
