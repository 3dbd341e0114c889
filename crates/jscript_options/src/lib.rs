//! jscript_options: compiler options.
//!
//! Options are plain data loaded from JSON. Missing keys take their
//! defaults, so `{}` is a valid permissive configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default limit on statement and expression nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: u32 = 100;

/// Options threaded through scanning, parsing and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Strict mode. Permissive mode downgrades several errors to warnings.
    pub strict: bool,
    /// Name reported in diagnostics.
    pub source_name: String,
    /// Line number of the first source line.
    pub start_line: u32,
    /// Parser recursion guard.
    pub max_nesting_depth: u32,
    /// Extra names treated as global builtins.
    pub predefined_globals: Vec<String>,
    pub warn_on_legacy_octal: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            strict: false,
            source_name: String::new(),
            start_line: 1,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            predefined_globals: Vec::new(),
            warn_on_legacy_octal: true,
        }
    }
}

impl CompilerOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Check values serde cannot rule out on its own.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.start_line == 0 {
            return Err(OptionsError::Invalid {
                option: "startLine",
                reason: "lines are numbered from 1",
            });
        }
        if self.max_nesting_depth == 0 {
            return Err(OptionsError::Invalid {
                option: "maxNestingDepth",
                reason: "must allow at least one level",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value for '{option}': {reason}")]
    Invalid { option: &'static str, reason: &'static str },
}

impl OptionsError {
    pub fn message_key(&self) -> &'static str {
        match self {
            OptionsError::Json(_) => "options.invalid_json",
            OptionsError::Io(_) => "options.io",
            OptionsError::Invalid { .. } => "options.invalid_value",
        }
    }
}

/// Parse options from a JSON string.
pub fn parse_options(content: &str) -> Result<CompilerOptions, OptionsError> {
    let options: CompilerOptions = serde_json::from_str(content)?;
    options.validate()?;
    Ok(options)
}

/// Parse options from a JSON file.
pub fn parse_options_file(path: impl AsRef<Path>) -> Result<CompilerOptions, OptionsError> {
    let content = std::fs::read_to_string(path)?;
    parse_options(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let options = parse_options("{}").unwrap();
        assert_eq!(options, CompilerOptions::default());
        assert!(!options.strict);
        assert_eq!(options.start_line, 1);
        assert_eq!(options.max_nesting_depth, 100);
        assert!(options.warn_on_legacy_octal);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{
            "strict": true,
            "sourceName": "page.js",
            "startLine": 40,
            "maxNestingDepth": 64,
            "predefinedGlobals": ["window", "document"],
            "warnOnLegacyOctal": false
        }"#;
        let options = parse_options(json).unwrap();
        assert!(options.strict);
        assert_eq!(options.source_name, "page.js");
        assert_eq!(options.start_line, 40);
        assert_eq!(options.max_nesting_depth, 64);
        assert_eq!(options.predefined_globals, vec!["window", "document"]);
        assert!(!options.warn_on_legacy_octal);
    }

    #[test]
    fn test_serialize_round_trip() {
        let options = CompilerOptions::strict().with_source_name("a.js");
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"sourceName\":\"a.js\""));
        assert_eq!(parse_options(&json).unwrap(), options);
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_options("{ strict: }").unwrap_err();
        assert!(matches!(err, OptionsError::Json(_)));
        assert_eq!(err.message_key(), "options.invalid_json");
    }

    #[test]
    fn test_wrong_type() {
        assert!(matches!(parse_options(r#"{"startLine": "one"}"#), Err(OptionsError::Json(_))));
    }

    #[test]
    fn test_zero_values_rejected() {
        let err = parse_options(r#"{"startLine": 0}"#).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for 'startLine': lines are numbered from 1");
        assert!(matches!(
            parse_options(r#"{"maxNestingDepth": 0}"#),
            Err(OptionsError::Invalid { option: "maxNestingDepth", .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_options_file("/nonexistent/jscript-options.json").unwrap_err();
        assert_eq!(err.message_key(), "options.io");
    }
}
