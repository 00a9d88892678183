//! Error types for assembly parsing and flattening.

use thiserror::Error;

/// Errors that can occur while loading an assembly document.
///
/// Recoverable problems (missing referents, depth cap, truncation, malformed
/// placement lines) are not errors; they are logged and skipped so a damaged
/// model still loads as far as it can.
#[derive(Debug, Error)]
pub enum LdrawError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document contains no `0 FILE` section at all.
    #[error("no sections in document: {context}")]
    NoSections {
        /// The document path or a description of the input.
        context: String,
    },

    /// The document flattened to zero parts.
    #[error("assembly '{name}' flattened to zero parts")]
    EmptyAssembly {
        /// The main model name.
        name: String,
    },
}

impl LdrawError {
    /// Create a no-sections error.
    pub fn no_sections(context: impl Into<String>) -> Self {
        Self::NoSections {
            context: context.into(),
        }
    }

    /// Create an empty-assembly error.
    pub fn empty_assembly(name: impl Into<String>) -> Self {
        Self::EmptyAssembly { name: name.into() }
    }
}

/// Result type for assembly operations.
pub type Result<T> = std::result::Result<T, LdrawError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LdrawError::empty_assembly("robot.mpd");
        assert!(err.to_string().contains("robot.mpd"));

        let err = LdrawError::no_sections("inline document");
        assert!(err.to_string().contains("inline"));
    }
}
