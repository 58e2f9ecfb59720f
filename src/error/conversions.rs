//! Conversions from library errors into TranspileError

use super::{ErrorKind, TranspileError};

impl From<std::io::Error> for TranspileError {
    fn from(err: std::io::Error) -> Self {
        TranspileError::new(ErrorKind::Io, err.to_string())
    }
}

impl From<quick_xml::Error> for TranspileError {
    fn from(err: quick_xml::Error) -> Self {
        TranspileError::new(ErrorKind::XmlSyntax, err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for TranspileError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        TranspileError::new(ErrorKind::XmlSyntax, err.to_string())
    }
}

impl From<serde_json::Error> for TranspileError {
    fn from(err: serde_json::Error) -> Self {
        TranspileError::new(ErrorKind::Config, err.to_string())
    }
}

/// Helper trait for converting String messages to TranspileError
pub trait IntoTranspileError {
    fn into_malformed_node(self, node: String) -> TranspileError;
    fn into_untranslated(self) -> TranspileError;
}

impl IntoTranspileError for String {
    fn into_malformed_node(self, node: String) -> TranspileError {
        TranspileError::new(ErrorKind::MalformedNode, self).with_node(node)
    }

    fn into_untranslated(self) -> TranspileError {
        TranspileError::new(ErrorKind::Untranslated, self)
    }
}
