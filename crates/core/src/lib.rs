//! Certificate design domain logic.
//!
//! Styles, design records, category validation, prompt construction,
//! generated-code cleanup, fallback templates, and the [`generator`] service
//! that ties them together behind the [`generator::TextGenerator`] seam.

pub mod cleaning;
pub mod design;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod prompt;
pub mod script;
pub mod style;
