//! Error assertion utilities for more precise error testing

use qsapy::error::{ErrorKind, TranspileError};

/// Assert that an error has a specific kind
pub fn assert_error_kind(error: &TranspileError, expected_kind: ErrorKind) {
    if error.kind != expected_kind {
        panic!(
            "Expected error kind {:?}, but got {:?}: {}",
            expected_kind, error.kind, error
        );
    }
}

/// Assert that an error message contains a substring
pub fn assert_error_contains(error: &TranspileError, substring: &str) {
    if !error.message.contains(substring) {
        panic!(
            "Expected error message to contain '{}', but got: '{}'",
            substring, error.message
        );
    }
}

/// Assert that the error carries the serialized node it was raised for
pub fn assert_error_node(error: &TranspileError, tag: &str) {
    match &error.context.node {
        Some(node) if node.starts_with(&format!("<{}", tag)) => {}
        Some(node) => panic!("Expected error node <{}>, but got {}", tag, node),
        None => panic!("Expected error to carry a <{}> node, but it has none", tag),
    }
}

/// Assert that transpiling fails with the given kind and return the error
pub fn expect_error(
    result: Result<qsapy::TranspileOutput, TranspileError>,
    kind: ErrorKind,
) -> TranspileError {
    match result {
        Ok(output) => panic!(
            "Expected {:?} error, but transpilation succeeded:\n{}",
            kind, output.python
        ),
        Err(error) => {
            assert_error_kind(&error, kind);
            error
        }
    }
}
