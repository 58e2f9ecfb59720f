use crate::error::{ErrorKind, Result, TranspileError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text written once per indentation level
    pub indent_unit: String,
    /// Module pulled in with a wildcard import at the top of every file
    pub runtime_module: String,
    /// Name of the synthetic class wrapping the top-level script
    pub wrapper_class: String,
    pub wrapper_base: String,
    /// Method receiving every top-level statement
    pub initializer_name: String,
    /// A blank line is inserted once more lines than this pass at one depth
    pub blank_line_threshold: usize,
    pub emit_debug_comments: bool,
    /// Fail on unbalanced blocks instead of writing an error marker
    pub strict_blocks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_unit: "    ".to_string(),
            runtime_module: "qsa".to_string(),
            wrapper_class: "FormInternalObj".to_string(),
            wrapper_base: "FormDBWidget".to_string(),
            initializer_name: "_class_init".to_string(),
            blank_line_threshold: 4,
            emit_debug_comments: true,
            strict_blocks: false,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        if config.wrapper_class.is_empty() || config.initializer_name.is_empty() {
            return Err(TranspileError::new(
                ErrorKind::Config,
                "wrapper_class and initializer_name must not be empty",
            ));
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{"indent_unit": "\t", "strict_blocks": true}"#)
            .expect("valid config");

        assert_eq!(config.indent_unit, "\t");
        assert!(config.strict_blocks);
        assert_eq!(config.runtime_module, "qsa");
        assert_eq!(config.blank_line_threshold, 4);
    }

    #[test]
    fn test_rejects_empty_wrapper_name() {
        let err = Config::from_json(r#"{"wrapper_class": ""}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = Config::from_json("{indent_unit").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);
    }
}
