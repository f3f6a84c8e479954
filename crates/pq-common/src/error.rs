use std::fmt;

use serde::Serialize;

use crate::locale::LocaleCatalog;

/// Non-recoverable programming-mistake signals.
///
/// These indicate a broken internal invariant or an unclassified failure,
/// never a problem with the source text being processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CommonError {
    /// An internal invariant did not hold.
    Invariant {
        message: String,
        details: Option<String>,
    },
    /// A failure that could not be classified further.
    Unknown { inner: String },
}

impl CommonError {
    /// Shorthand for an invariant violation without extra details.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
            details: None,
        }
    }

    /// Render the user-facing message through the given catalog.
    pub fn message(&self, catalog: &LocaleCatalog) -> String {
        match self {
            Self::Invariant { message, details } => {
                let mut out = catalog.format("error_common_invariantError", &[("reason", message)]);
                if let Some(details) = details {
                    out.push_str(": ");
                    out.push_str(details);
                }
                out
            }
            Self::Unknown { inner } => {
                catalog.format("error_common_unknown", &[("error", inner)])
            }
        }
    }
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message(&LocaleCatalog::en_us()))
    }
}

impl std::error::Error for CommonError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_display() {
        let err = CommonError::invariant("child count mismatch");
        assert_eq!(
            err.to_string(),
            "invariant violated: child count mismatch"
        );
    }

    #[test]
    fn invariant_display_with_details() {
        let err = CommonError::Invariant {
            message: "child count mismatch".into(),
            details: Some("node 3".into()),
        };
        assert_eq!(
            err.to_string(),
            "invariant violated: child count mismatch: node 3"
        );
    }

    #[test]
    fn unknown_display() {
        let err = CommonError::Unknown {
            inner: "boom".into(),
        };
        assert_eq!(err.to_string(), "unknown error: boom");
    }
}
