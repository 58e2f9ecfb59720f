//! Module envelope: the synthetic wrapper class and the file preamble.

use super::{GenOptions, Transpiler};
use crate::ast::{Ast, NodeId};
use crate::config::Config;
use crate::error::{ErrorKind, Result, TranspileError};
use crate::events::Event;

/// Rebuild the tree under a synthetic root:
///
/// ```text
/// Source
/// ├─ Class*                        top-level classes, hoisted
/// └─ Class <wrapper_class>
///    └─ Source
///       ├─ Function <initializer>  every other top-level statement
///       └─ Function*               top-level functions
/// ```
///
/// Returns the id of the new root.
pub fn wrap_module(ast: &mut Ast, config: &Config) -> Result<NodeId> {
    let Some(root) = ast.root() else {
        return Err(TranspileError::new(ErrorKind::EmptyDocument, "no root node to wrap"));
    };
    let top_level = ast.children(root).to_vec();

    let envelope = ast.new_node("Source");
    let mut classes = Vec::new();
    let mut functions = Vec::new();
    let mut statements = Vec::new();
    for node in top_level {
        match ast.tag(node) {
            "Class" => classes.push(node),
            "Function" if ast.attr(node, "name").is_some() => functions.push(node),
            _ => statements.push(node),
        }
    }

    for class in classes {
        ast.append_child(envelope, class);
    }

    let wrapper = ast.add_child(
        envelope,
        "Class",
        &[
            ("name", config.wrapper_class.as_str()),
            ("extends", config.wrapper_base.as_str()),
        ],
    );
    let wrapper_body = ast.add_child(wrapper, "Source", &[]);

    let initializer = ast.add_child(
        wrapper_body,
        "Function",
        &[("name", config.initializer_name.as_str())],
    );
    let initializer_body = ast.add_child(initializer, "Source", &[]);
    for statement in statements {
        ast.set_attr(statement, "constructor", "1");
        ast.append_child(initializer_body, statement);
    }

    for function in functions {
        ast.append_child(wrapper_body, function);
    }

    ast.set_root(envelope);
    Ok(envelope)
}

impl<'a> Transpiler<'a> {
    /// Events for a whole output file around the wrapped module
    pub fn generate_file(&mut self, envelope: NodeId) -> Result<Vec<Event>> {
        let mut events = vec![
            Event::Line("# -*- coding: utf-8 -*-".to_string()),
            Event::Line(format!("from {} import *", self.config.runtime_module)),
            Event::Line(String::new()),
            Event::Line("# /** @file */".to_string()),
            Event::Line(String::new()),
        ];
        events.extend(self.generate(envelope, GenOptions::default())?);
        events.push(Event::Line(String::new()));
        events.push(Event::Line("form = None".to_string()));
        Ok(events)
    }
}
