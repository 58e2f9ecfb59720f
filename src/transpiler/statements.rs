//! Statement visitors: blocks, declarations and control flow.
//!
//! Constructs Python lacks (do-while, switch, C-style for) are lowered to
//! `while`/`if` chains driven by synthetic flags named from `NameCounter`.

use super::{GenOptions, Transpiler};
use crate::ast::query::AstQuery;
use crate::ast::NodeId;
use crate::error::{ErrorKind, Result, TranspileError};
use crate::events::Event;
use crate::names::id_translate;
use crate::xml::node_to_string;

/// Receiver methods that a `with` block resolves against its target
const WITH_MEMBERS: &[&str] = &[
    "setValueBuffer",
    "valueBuffer",
    "valueBufferCopy",
    "setNull",
    "isNull",
    "select",
    "selectRow",
    "first",
    "next",
    "prev",
    "last",
    "commitBuffer",
    "refreshBuffer",
    "setModeAccess",
    "modeAccess",
    "size",
    "setFilter",
    "setMainFilter",
    "mainFilter",
    "primaryKey",
    "editBuffer",
    "child",
    "cursor",
    "setTabOrder",
    "connect",
    "disconnect",
    "close",
    "iface",
    "form",
    "transaction",
    "commit",
    "rollback",
    "setActivatedCheckIntegrity",
    "setActivatedCommitActions",
    "setForwardOnly",
];

impl<'a> Transpiler<'a> {
    pub(super) fn visit_source(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let child_opts = GenOptions::statement().with_break_mode(opts.break_mode);
        let mut emitted = 0usize;

        for &child in ast.children(id) {
            let mut deferred: Vec<String> = Vec::new();
            for event in self.generate(child, child_opts)? {
                match event {
                    Event::LineAfter(text) => deferred.push(text),
                    Event::Line(text) => {
                        out.push(Event::Line(text));
                        emitted += 1 + deferred.len();
                        out.extend(deferred.drain(..).map(Event::Line));
                    }
                    Event::Break(text) => {
                        emitted += 1 + deferred.len();
                        out.extend(deferred.drain(..).map(Event::Line));
                        out.push(Event::Break(text));
                    }
                    other => out.push(other),
                }
            }
            emitted += deferred.len();
            out.extend(deferred.into_iter().map(Event::Line));
        }

        if emitted == 0 && opts.include_pass {
            out.push(Event::Line("pass".to_string()));
        }
        Ok(())
    }

    /// Emit `Begin`, the generated body (if any) and `End` for one block
    fn block(
        &mut self,
        block_id: &str,
        source: Option<NodeId>,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        out.push(Event::Begin(block_id.to_string()));
        if let Some(source) = source {
            out.extend(self.generate(source, opts)?);
        }
        out.push(Event::End(block_id.to_string()));
        Ok(())
    }

    fn source_child(&self, id: NodeId) -> Option<NodeId> {
        AstQuery::first_child(self.ast, id, "Source")
    }

    pub(super) fn visit_class(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let Some(name) = self.attr(id, "name") else {
            return Err(self.malformed(id, "Class without a name"));
        };
        let extends = self.attr(id, "extends").unwrap_or("object");

        out.push(Event::Line(format!("# /** @class_declaration {} */", name)));
        out.push(Event::Line(format!("class {}({}):", name, extends)));
        let source = self.source_child(id);
        self.block(&format!("block-class-{}", name), source, GenOptions::default(), out)
    }

    pub(super) fn visit_function(
        &mut self,
        id: NodeId,
        anonymous: bool,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let grandparent = AstQuery::grandparent(ast, id);
        let enclosing_class = grandparent.filter(|&node| ast.tag(node) == "Class");

        let mut name = if anonymous {
            format!("anon_fn{}", self.names.next_anon_fn())
        } else {
            match self.attr(id, "name") {
                Some(name) => id_translate(name),
                None => return Err(self.malformed(id, "Function without a name")),
            }
        };
        if let Some(class) = enclosing_class {
            if ast.attr(class, "name") == Some(name.as_str()) {
                name = "__init__".to_string();
            }
        }

        let mut arguments = Vec::new();
        let without_self = self.attr(id, "withoutself").is_some();
        if !without_self && (grandparent.is_none() || enclosing_class.is_some()) {
            arguments.push("self".to_string());
        }
        if let Some(list) = AstQuery::first_child(ast, id, "Arguments") {
            for &arg in ast.children(list) {
                let parts = self.expr_parts(arg, GenOptions::default(), out)?;
                match parts.as_slice() {
                    [] => {}
                    [single] => arguments.push(format!("{}=None", single)),
                    _ => arguments.push(parts.concat()),
                }
            }
        }

        out.push(Event::Line(format!("def {}({}):", name, arguments.join(", "))));
        let source = self.source_child(id);
        self.block(&format!("block-def-{}", name), source, GenOptions::default(), out)?;

        if anonymous {
            out.push(Event::Expr(name));
        }
        Ok(())
    }

    pub(super) fn visit_declaration_block(
        &mut self,
        id: NodeId,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let on_self = self.attr(id, "constructor").is_some();
        let opts = GenOptions {
            force_value: true,
            ..GenOptions::default()
        };

        for &child in ast.children(id) {
            let mut parts = self.expr_parts(child, opts, out)?;
            let Some(target) = parts.first_mut() else {
                return Err(TranspileError::new(
                    ErrorKind::EmptyExpression,
                    "declaration produced no expression",
                )
                .with_node(node_to_string(ast, child)));
            };
            if on_self {
                *target = format!("self.{}", target);
            }
            out.push(Event::Line(parts.join(" ")));
        }
        Ok(())
    }

    pub(super) fn visit_variable(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let Some(name) = self.attr(id, "name") else {
            return Err(self.malformed(id, "Variable without a name"));
        };
        out.push(Event::Expr(id_translate(name)));

        let mut value = Vec::new();
        for &child in ast.children(id) {
            value.extend(self.expr_parts(child, GenOptions::default(), out)?);
        }

        if !value.is_empty() {
            out.push(Event::Expr("=".to_string()));
            out.push(Event::Expr(value.join(" ")));
        } else if opts.force_value {
            let default = match self.attr(id, "type") {
                Some("String") => "\"\"",
                Some("Number") => "0",
                Some("Boolean") => "False",
                Some("Array") => "Array()",
                _ => "None",
            };
            out.push(Event::Expr("=".to_string()));
            out.push(Event::Expr(default.to_string()));
        }
        Ok(())
    }

    /// Transparent containers: `Value`, `Condition`, `Arguments` and friends
    pub(super) fn visit_value(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        for &child in ast.children(id) {
            out.extend(self.generate(child, opts)?);
        }
        Ok(())
    }

    pub(super) fn visit_instruction(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let children = ast.children(id);
        // `i++;` alone is a statement, `x = i++;` is not
        let child_opts = if children.len() == 1 {
            GenOptions {
                plusplus_as_instruction: opts.plusplus_as_instruction,
                ..GenOptions::default()
            }
        } else {
            GenOptions::default()
        };

        let mut parts = Vec::new();
        for &child in children {
            parts.extend(self.expr_parts(child, child_opts, out)?);
        }
        if !parts.is_empty() {
            out.push(Event::Line(parts.join(" ")));
        }
        Ok(())
    }

    pub(super) fn visit_flow(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let mut parts = Vec::new();
        for &child in ast.children(id) {
            parts.extend(self.expr_parts(child, GenOptions::default(), out)?);
        }
        let value = parts.join(" ");

        match self.attr(id, "type").unwrap_or("") {
            "RETURN" if value.is_empty() => out.push(Event::Line("return".to_string())),
            "RETURN" => out.push(Event::Line(format!("return {}", value))),
            "BREAK" if opts.break_mode => out.push(Event::Break("break".to_string())),
            "BREAK" => out.push(Event::Line("break".to_string())),
            "CONTINUE" => out.push(Event::Line("continue".to_string())),
            "THROW" => out.push(Event::Line(format!("raise Exception({})", value))),
            other => {
                self.untranslated(out, format!("Unknown flow instruction {}", other), Some(id));
                let line = format!("{} {}", other.to_lowercase(), value);
                out.push(Event::Line(line.trim_end().to_string()));
            }
        }
        Ok(())
    }

    /// Fragments of an expression used in a statement header. Deferred
    /// updates cannot run after the header, so they are reported and emitted
    /// before the statement.
    fn header_parts(&mut self, node: NodeId, out: &mut Vec<Event>) -> Result<Vec<String>> {
        let mut parts = Vec::new();
        for event in self.generate(node, GenOptions::default())? {
            match event {
                Event::Expr(fragment) => parts.push(fragment),
                Event::LineAfter(text) => {
                    let message = format!("Update moved before the statement: {}", text);
                    self.untranslated(out, message, None);
                    out.push(Event::Line(text));
                }
                other => out.push(other),
            }
        }
        Ok(parts)
    }

    /// Text of a condition, `False` (with a diagnostic) when there is none
    fn condition(
        &mut self,
        node: Option<NodeId>,
        owner: NodeId,
        out: &mut Vec<Event>,
    ) -> Result<String> {
        let Some(node) = node else {
            self.untranslated(out, "Missing condition".to_string(), Some(owner));
            return Ok("False".to_string());
        };

        let parts = self.header_parts(node, out)?;
        if parts.is_empty() {
            self.untranslated(out, "Empty condition".to_string(), Some(node));
            return Ok("False".to_string());
        }
        Ok(parts.join(" "))
    }

    pub(super) fn visit_if(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let condition = AstQuery::first_child(ast, id, "Condition");
        let condition = self.condition(condition, id, out)?;
        let body_opts = GenOptions::default().with_break_mode(opts.break_mode);

        out.push(Event::Line(format!("if {}:", condition)));
        let source = self.source_child(id);
        self.block("block-if", source, body_opts, out)?;

        if let Some(&else_source) = AstQuery::find_path(ast, id, "Else/Source").first() {
            out.push(Event::Line("else:".to_string()));
            self.block("block-else", Some(else_source), body_opts, out)?;
        }
        Ok(())
    }

    pub(super) fn visit_while(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let condition = AstQuery::first_child(self.ast, id, "Condition");
        let condition = self.condition(condition, id, out)?;

        out.push(Event::Line(format!("while {}:", condition)));
        let source = self.source_child(id);
        self.block("block-while", source, GenOptions::default(), out)
    }

    pub(super) fn visit_do_while(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let flag = format!("s{}_dowhile_1stloop", self.names.next_do_while());
        let condition = AstQuery::first_child(self.ast, id, "Condition");
        let condition = self.condition(condition, id, out)?;

        out.push(Event::Line(format!("{} = True", flag)));
        out.push(Event::Line(format!("while {} or ({}):", flag, condition)));
        out.push(Event::Begin("block-dowhile".to_string()));
        out.push(Event::Line(format!("{} = False", flag)));
        if let Some(source) = self.source_child(id) {
            out.extend(self.generate(source, GenOptions::default().with_pass(false))?);
        }
        out.push(Event::End("block-dowhile".to_string()));
        Ok(())
    }

    /// One `Line` per child of a for-loop clause (initializer or increment)
    fn clause_lines(&mut self, clause: Option<NodeId>, out: &mut Vec<Event>) -> Result<()> {
        let Some(clause) = clause else {
            return Ok(());
        };
        let ast = self.ast;
        for &child in ast.children(clause) {
            let parts = self.expr_parts(child, GenOptions::statement(), out)?;
            if !parts.is_empty() {
                out.push(Event::Line(parts.join(" ")));
            }
        }
        Ok(())
    }

    pub(super) fn visit_for(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let flag = format!("s{}_for_1stloop", self.names.next_for());

        self.clause_lines(AstQuery::first_child(ast, id, "ForInitialize"), out)?;
        let compare = AstQuery::first_child(ast, id, "ForCompare")
            .filter(|&compare| !ast.children(compare).is_empty());

        out.push(Event::Line(format!("{} = True", flag)));
        out.push(Event::Line("while True:".to_string()));
        out.push(Event::Begin("block-for".to_string()));

        out.push(Event::Line(format!("if not {}:", flag)));
        out.push(Event::Begin("block-for-next".to_string()));
        self.clause_lines(AstQuery::first_child(ast, id, "ForIncrement"), out)?;
        out.push(Event::End("block-for-next".to_string()));
        out.push(Event::Line(format!("{} = False", flag)));

        if compare.is_some() {
            let condition = self.condition(compare, id, out)?;
            out.push(Event::Line("try:".to_string()));
            out.push(Event::Begin("block-for-check".to_string()));
            out.push(Event::Line(format!("if not ({}):", condition)));
            out.push(Event::Begin("block-for-exit".to_string()));
            out.push(Event::Line("break".to_string()));
            out.push(Event::End("block-for-exit".to_string()));
            out.push(Event::End("block-for-check".to_string()));
            out.push(Event::Line("except Exception:".to_string()));
            out.push(Event::Begin("block-for-check-error".to_string()));
            out.push(Event::Line("break".to_string()));
            out.push(Event::End("block-for-check-error".to_string()));
        }

        if let Some(source) = self.source_child(id) {
            out.extend(self.generate(source, GenOptions::default().with_pass(false))?);
        }
        out.push(Event::End("block-for".to_string()));
        Ok(())
    }

    pub(super) fn visit_for_in(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let mut parts = Vec::new();
        for &child in ast.children(id) {
            if ast.tag(child) == "Source" {
                continue;
            }
            parts.push(self.header_parts(child, out)?.join(" "));
        }
        let [element, collection] = parts.as_slice() else {
            return Err(self.malformed(id, "ForIn needs a loop variable and a collection"));
        };

        out.push(Event::Line(format!("for {} in {}:", element, collection)));
        let source = self.source_child(id);
        self.block("block-for-in", source, GenOptions::default(), out)
    }

    pub(super) fn visit_switch(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let n = self.names.next_switch();
        let when = format!("s{}_when", n);
        let do_work = format!("s{}_do_work", n);
        let work_done = format!("s{}_work_done", n);

        let value = AstQuery::first_child(ast, id, "Condition");
        let value = self.condition(value, id, out)?;
        out.push(Event::Line(format!("{} = {}", when, value)));
        out.push(Event::Line(format!("{}, {} = False, False", do_work, work_done)));

        for case in AstQuery::find_children(ast, id, "Case") {
            let Some(&matcher) = ast.children(case).iter().find(|&&c| ast.tag(c) != "Source") else {
                return Err(self.malformed(case, "Case without a value"));
            };
            let matcher = self.header_parts(matcher, out)?.join(" ");

            out.push(Event::Line(format!("if {} == {}:", when, matcher)));
            out.push(Event::Begin("block-case-match".to_string()));
            out.push(Event::Line(format!("{}, {} = True, True", do_work, work_done)));
            out.push(Event::End("block-case-match".to_string()));

            out.push(Event::Line(format!("if {}:", do_work)));
            self.case_body("block-case", case, &do_work, out)?;
        }

        for default in AstQuery::find_children(ast, id, "CaseDefault") {
            out.push(Event::Line(format!("if not {}:", work_done)));
            self.case_body("block-case-default", default, &do_work, out)?;
        }
        Ok(())
    }

    /// Case body in break mode; each surfaced `break` clears the work flag
    fn case_body(
        &mut self,
        block_id: &str,
        case: NodeId,
        do_work: &str,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        out.push(Event::Begin(block_id.to_string()));
        if let Some(source) = self.source_child(case) {
            let opts = GenOptions::default().with_break_mode(true);
            for event in self.generate(source, opts)? {
                match event {
                    Event::Break(_) => {
                        out.push(Event::Line(format!("{} = False  # break", do_work)))
                    }
                    other => out.push(other),
                }
            }
        }
        out.push(Event::End(block_id.to_string()));
        Ok(())
    }

    pub(super) fn visit_try_catch(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let sources: Vec<NodeId> = AstQuery::find_children(ast, id, "Source").collect();
        let Some(&try_source) = sources.first() else {
            return Err(self.malformed(id, "TryCatch without a try block"));
        };
        let body_opts = GenOptions::default().with_break_mode(opts.break_mode);

        out.push(Event::Line("try:".to_string()));
        self.block("block-try", Some(try_source), body_opts, out)?;

        out.push(Event::Line("except Exception:".to_string()));
        out.push(Event::Begin("block-except".to_string()));
        let identifier =
            AstQuery::first_child(ast, id, "Identifier").and_then(|ident| ast.attr(ident, "name"));
        if let Some(name) = identifier {
            out.push(Event::Line(format!("{} = traceback.format_exc()", id_translate(name))));
        }
        if let Some(&catch_source) = sources.get(1) {
            out.extend(self.generate(catch_source, body_opts.with_pass(identifier.is_none()))?);
        }
        out.push(Event::End("block-except".to_string()));
        Ok(())
    }

    pub(super) fn visit_with(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let &[target, source] = ast.children(id) else {
            return Err(self.malformed(id, "With needs a target and a body"));
        };
        if ast.tag(source) != "Source" {
            return Err(self.malformed(id, "With body is not a Source"));
        }

        let receiver = format!("w{}_obj", self.names.next_with());
        let target = self.expr_text(target, GenOptions::default(), out)?;
        out.push(Event::Line(format!("{} = {}", receiver, target)));

        for event in self.generate(source, opts)? {
            match event {
                Event::Line(text) => out.push(Event::Line(rewrite_with_receiver(&text, &receiver))),
                other => out.push(other),
            }
        }
        Ok(())
    }
}

/// Prefix every call to a known receiver method in `line` with `receiver.`.
///
/// Calls already qualified with a `.` are left alone. Matching is textual, so
/// `myfirst(` is rewritten too.
pub fn rewrite_with_receiver(line: &str, receiver: &str) -> String {
    let mut result = String::with_capacity(line.len() + receiver.len());
    let mut rest = line;
    let mut previous: Option<char> = None;

    while let Some(ch) = rest.chars().next() {
        if previous != Some('.') {
            let member = WITH_MEMBERS
                .iter()
                .filter(|member| {
                    rest.strip_prefix(**member)
                        .is_some_and(|after| after.starts_with('('))
                })
                .max_by_key(|member| member.len());
            if let Some(member) = member {
                result.push_str(receiver);
                result.push('.');
                result.push_str(member);
                rest = &rest[member.len()..];
                previous = member.chars().last();
                continue;
            }
        }

        result.push(ch);
        rest = &rest[ch.len_utf8()..];
        previous = Some(ch);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_prefixes_known_calls() {
        assert_eq!(
            rewrite_with_receiver("setValueBuffer(\"a\", 1)", "w1_obj"),
            "w1_obj.setValueBuffer(\"a\", 1)"
        );
        assert_eq!(
            rewrite_with_receiver("x = valueBuffer(\"a\") + size()", "w1_obj"),
            "x = w1_obj.valueBuffer(\"a\") + w1_obj.size()"
        );
    }

    #[test]
    fn test_with_skips_qualified_calls() {
        assert_eq!(
            rewrite_with_receiver("self.cursor().first()", "w2_obj"),
            "self.cursor().first()"
        );
        let once = rewrite_with_receiver("commitBuffer()", "w3_obj");
        assert_eq!(rewrite_with_receiver(&once, "w3_obj"), once);
    }

    #[test]
    fn test_with_keeps_substring_heuristic() {
        assert_eq!(rewrite_with_receiver("myfirst()", "w1_obj"), "myw1_obj.first()");
        assert_eq!(rewrite_with_receiver("first", "w1_obj"), "first");
    }
}
