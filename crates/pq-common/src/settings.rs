//! Settings records threaded through the lexer, parser, and inspections.

use crate::locale::DEFAULT_LOCALE;

/// Settings shared by every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonSettings {
    /// Locale identifier used to pick the message catalog, e.g. `en-US`.
    pub locale: String,
}

impl Default for CommonSettings {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// Settings for the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexSettings {
    pub common: CommonSettings,
    /// The line separator documents are split on.
    pub separator: String,
}

impl Default for LexSettings {
    fn default() -> Self {
        Self {
            common: CommonSettings::default(),
            separator: "\n".to_string(),
        }
    }
}

/// How the parser resolves the bracket ambiguity (`[` may open a record,
/// a field selector, or a field projection).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisambiguationBehavior {
    /// Try the readings in a fixed order and keep the first that parses.
    #[default]
    Strict,
    /// Try every reading against a copied state and keep the one that
    /// consumed the most tokens without error.
    Thorough,
}

/// Settings for the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSettings {
    pub common: CommonSettings,
    pub disambiguation_behavior: DisambiguationBehavior,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ParseSettings::default();
        assert_eq!(settings.common.locale, "en-US");
        assert_eq!(
            settings.disambiguation_behavior,
            DisambiguationBehavior::Strict
        );
        assert_eq!(LexSettings::default().separator, "\n");
    }
}
