//! Error type hierarchy for the qsapy transpiler
//!
//! Structural problems (malformed XML, nodes missing a required child,
//! unbalanced blocks) are reported as `TranspileError`. Constructs that can
//! merely not be translated are kept as warnings in an `ErrorCollection` while
//! the output carries a comment marker at their position.

mod conversions;

pub use conversions::IntoTranspileError;

use colored::*;
use std::fmt;

/// Error context providing additional information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Serialized XML of the offending node
    pub node: Option<String>,
    pub note: Option<String>,
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            node: None,
            note: None,
            help: None,
        }
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Main error type for the transpiler
#[derive(Debug, Clone)]
pub struct TranspileError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: ErrorContext,
}

impl TranspileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.context.node = Some(node.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.context.note = Some(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }
}

/// Categories of errors that can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Input errors
    XmlSyntax,
    EmptyDocument,

    // Structural invariant violations
    MalformedNode,
    EmptyExpression,
    BlockMismatch,

    // Recoverable, reported as warnings
    Untranslated,

    // Environment
    Config,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::XmlSyntax => "XML syntax error",
            ErrorKind::EmptyDocument => "empty document",
            ErrorKind::MalformedNode => "malformed node",
            ErrorKind::EmptyExpression => "empty expression",
            ErrorKind::BlockMismatch => "block mismatch",
            ErrorKind::Untranslated => "untranslated construct",
            ErrorKind::Config => "configuration error",
            ErrorKind::Io => "I/O error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TranspileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;

        if let Some(node) = &self.context.node {
            write!(f, "\nnode: {}", node)?;
        }

        if let Some(note) = &self.context.note {
            write!(f, "\nnote: {}", note)?;
        }

        if let Some(help) = &self.context.help {
            write!(f, "\nhelp: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for TranspileError {}

/// Format an error for terminal output
pub struct ErrorFormatter<'a> {
    error: &'a TranspileError,
    filename: Option<&'a str>,
    use_color: bool,
}

impl<'a> ErrorFormatter<'a> {
    pub fn new(error: &'a TranspileError) -> Self {
        Self {
            error,
            filename: None,
            use_color: true,
        }
    }

    pub fn with_filename(mut self, filename: &'a str) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn format(&self) -> String {
        let mut output = String::new();

        if let Some(filename) = self.filename {
            output.push_str(&if self.use_color {
                filename.bold().to_string()
            } else {
                filename.to_string()
            });
            output.push_str(": ");
        }

        let error_kind = self.error.kind.to_string();
        let error_label = if self.use_color {
            error_kind.red().bold().to_string()
        } else {
            error_kind
        };

        output.push_str(&format!("{}: {}\n", error_label, self.error.message));

        if let Some(node) = &self.error.context.node {
            output.push_str(&self.node_snippet(node));
        }

        if let Some(note) = &self.error.context.note {
            let note_label = if self.use_color {
                "note".blue().bold()
            } else {
                "note".into()
            };
            output.push_str(&format!("\n{}: {}", note_label, note));
        }

        if let Some(help) = &self.error.context.help {
            let help_label = if self.use_color {
                "help".green().bold()
            } else {
                "help".into()
            };
            output.push_str(&format!("\n{}: {}", help_label, help));
        }

        output
    }

    fn node_snippet(&self, node: &str) -> String {
        const MAX_SNIPPET: usize = 160;

        let mut shown: String = node.chars().take(MAX_SNIPPET).collect();
        if node.chars().count() > MAX_SNIPPET {
            shown.push_str("...");
        }

        let separator = if self.use_color {
            "|".blue().to_string()
        } else {
            "|".to_string()
        };

        format!("  {} {}", separator, shown)
    }
}

/// Result type for transpiler operations
pub type Result<T> = std::result::Result<T, TranspileError>;

/// Collection of errors for reporting multiple issues
#[derive(Debug)]
pub struct ErrorCollection {
    errors: Vec<TranspileError>,
    warnings: Vec<TranspileError>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: TranspileError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: TranspileError) {
        self.warnings.push(warning);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn errors(&self) -> &[TranspileError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[TranspileError] {
        &self.warnings
    }
}

impl Default for ErrorCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "error: {}", error)?;
        }

        for warning in &self.warnings {
            writeln!(f, "warning: {}", warning)?;
        }

        if !self.is_empty() {
            write!(
                f,
                "\n{} error(s), {} warning(s)",
                self.error_count(),
                self.warning_count()
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_node_and_help() {
        let error = TranspileError::new(ErrorKind::MalformedNode, "With needs a target")
            .with_node("<With/>")
            .with_help("wrap the body in a Source element");

        let text = error.to_string();
        assert!(text.starts_with("malformed node: With needs a target"));
        assert!(text.contains("node: <With/>"));
        assert!(text.contains("help: wrap the body"));
    }

    #[test]
    fn test_formatter_without_color() {
        let error = TranspileError::new(ErrorKind::BlockMismatch, "expected block-if")
            .with_note("found block-while");
        let formatted = ErrorFormatter::new(&error)
            .with_filename("form.xml")
            .with_color(false)
            .format();

        assert_eq!(
            formatted,
            "form.xml: block mismatch: expected block-if\n\nnote: found block-while"
        );
    }

    #[test]
    fn test_collection_counts() {
        let mut collection = ErrorCollection::new();
        assert!(collection.is_empty());

        collection.add_warning(TranspileError::new(ErrorKind::Untranslated, "Foo"));
        collection.add_error(TranspileError::new(ErrorKind::Io, "disk full"));

        assert!(collection.has_errors());
        assert!(collection.has_warnings());
        assert_eq!(collection.warning_count(), 1);
        assert!(collection.to_string().ends_with("1 error(s), 1 warning(s)"));
    }
}
