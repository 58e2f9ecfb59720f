//! Emission events produced by the visitors and consumed by the writer.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Event {
    /// A complete statement line
    Line(String),
    /// A line to emit right after the statement currently being built
    #[serde(rename = "line+1")]
    LineAfter(String),
    /// Opens an indented block; the payload is the block id
    Begin(String),
    /// Closes the block opened with the same id
    End(String),
    /// Fragment of an expression under construction
    Expr(String),
    /// Diagnostic annotation
    Debug(String),
    /// `break` surfaced to an enclosing switch
    Break(String),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Line(_) => "line",
            Event::LineAfter(_) => "line+1",
            Event::Begin(_) => "begin",
            Event::End(_) => "end",
            Event::Expr(_) => "expr",
            Event::Debug(_) => "debug",
            Event::Break(_) => "break",
        }
    }

    pub fn data(&self) -> &str {
        match self {
            Event::Line(data)
            | Event::LineAfter(data)
            | Event::Begin(data)
            | Event::End(data)
            | Event::Expr(data)
            | Event::Debug(data)
            | Event::Break(data) => data,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.data())
    }
}

/// Check that `Begin`/`End` events nest like a stack with matching ids.
///
/// Returns the index of the first offending event.
pub fn check_balanced(events: &[Event]) -> Result<(), usize> {
    let mut stack: Vec<&str> = Vec::new();
    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Begin(id) => stack.push(id),
            Event::End(id) => match stack.pop() {
                Some(open) if open == id => {}
                _ => return Err(index),
            },
            _ => {}
        }
    }
    if stack.is_empty() {
        Ok(())
    } else {
        Err(events.len())
    }
}
