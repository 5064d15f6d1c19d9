//! The fixed set of certificate design styles.

use serde::{Deserialize, Serialize};

/// One of the five design aesthetics. Declaration order is the order in
/// which designs are generated and returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    Classic,
    Modern,
    Elegant,
    Professional,
    Creative,
}

impl Style {
    /// All styles in generation order.
    pub const ALL: [Style; 5] = [
        Style::Classic,
        Style::Modern,
        Style::Elegant,
        Style::Professional,
        Style::Creative,
    ];

    /// Capitalized display label, e.g. `"Classic"`.
    pub fn label(self) -> &'static str {
        match self {
            Style::Classic => "Classic",
            Style::Modern => "Modern",
            Style::Elegant => "Elegant",
            Style::Professional => "Professional",
            Style::Creative => "Creative",
        }
    }

    /// Lowercase slug used as the design record id, e.g. `"classic"`.
    pub fn id(self) -> &'static str {
        match self {
            Style::Classic => "classic",
            Style::Modern => "modern",
            Style::Elegant => "elegant",
            Style::Professional => "professional",
            Style::Creative => "creative",
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_lowercase_labels() {
        for style in Style::ALL {
            assert_eq!(style.id(), style.label().to_lowercase());
        }
    }

    #[test]
    fn generation_order_is_fixed() {
        let ids: Vec<_> = Style::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(
            ids,
            ["classic", "modern", "elegant", "professional", "creative"]
        );
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Style::Professional).unwrap();
        assert_eq!(json, "\"Professional\"");
    }
}
