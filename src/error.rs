//! Error types for compilation, rendering, and configuration.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// TemplateError
// ============================================================================

/// Errors raised while compiling or rendering components.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// An asset marker was opened but never closed with `#}`.
    ///
    /// Aborts compilation of the component; the author must fix the source.
    #[error("{file}:{line}: unterminated `{{#{marker} ...#}}` marker")]
    UnterminatedMarker {
        file: String,
        line: usize,
        marker: &'static str,
    },

    /// No registered component folder contains a source file for this name.
    #[error("component `{0}` not found in any registered folder")]
    UnknownComponent(String),

    /// A component rendered itself, directly or through its children.
    #[error("component cycle: {0}")]
    Cycle(String),

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

// ============================================================================
// ConfigError
// ============================================================================

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unterminated_marker_display() {
        let err = TemplateError::UnterminatedMarker {
            file: "Card.html".to_string(),
            line: 2,
            marker: "css",
        };
        let display = format!("{err}");
        assert!(display.contains("Card.html:2"));
        assert!(display.contains("{#css"));
    }

    #[test]
    fn test_unknown_component_display() {
        let err = TemplateError::UnknownComponent("Sidebar".to_string());
        assert!(format!("{err}").contains("`Sidebar`"));
    }
}
