//! Design request/record types and category validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::style::Style;

/// Message returned whenever a category is missing or blank.
pub const CATEGORY_REQUIRED_MSG: &str = "Category is required and must be a non-empty string";

/// Number of designs in every successful response.
pub const DESIGN_COUNT: usize = Style::ALL.len();

/// A validated request for one batch of designs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignRequest {
    category: String,
}

impl DesignRequest {
    /// Build a request from raw user input, trimming it.
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let category = validate_category(raw)?;
        Ok(Self {
            category: category.to_string(),
        })
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

/// One generated certificate design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignRecord {
    /// Lowercase style slug, unique within a batch.
    pub id: String,
    /// Human label, `"<Style> Design"`.
    pub name: String,
    pub style: Style,
    /// Canvas drawing script body. Expects `ctx` and `canvas` bindings.
    pub code: String,
}

impl DesignRecord {
    pub fn new(style: Style, code: String) -> Self {
        Self {
            id: style.id().to_string(),
            name: format!("{} Design", style.label()),
            style,
            code,
        }
    }
}

/// Validate a category: it must contain something other than whitespace.
///
/// Returns the trimmed category on success.
pub fn validate_category(raw: &str) -> Result<&str, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(CATEGORY_REQUIRED_MSG.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn category_is_trimmed() {
        assert_eq!(validate_category("  Machine Learning \n").unwrap(), "Machine Learning");
    }

    #[test]
    fn empty_category_rejected() {
        assert_matches!(validate_category(""), Err(CoreError::Validation(msg)) if msg == CATEGORY_REQUIRED_MSG);
    }

    #[test]
    fn whitespace_category_rejected() {
        assert_matches!(validate_category(" \t\n "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn request_keeps_trimmed_category() {
        let req = DesignRequest::new("  Rust  ").unwrap();
        assert_eq!(req.category(), "Rust");
    }

    #[test]
    fn record_fields_derive_from_style() {
        let record = DesignRecord::new(Style::Professional, "ctx.fillRect(0, 0, 1, 1);".into());
        assert_eq!(record.id, "professional");
        assert_eq!(record.name, "Professional Design");
        assert_eq!(record.style, Style::Professional);
    }

    #[test]
    fn record_serializes_with_label_style() {
        let record = DesignRecord::new(Style::Classic, "x".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "classic");
        assert_eq!(json["name"], "Classic Design");
        assert_eq!(json["style"], "Classic");
        assert_eq!(json["code"], "x");
    }
}
