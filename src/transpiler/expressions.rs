//! Expression visitors: literals, identifiers, operators, calls, literals of
//! arrays and dictionaries, and `new`.

use super::utils::normalize_number;
use super::{GenOptions, Transpiler};
use crate::ast::query::AstQuery;
use crate::ast::NodeId;
use crate::error::Result;
use crate::events::Event;
use crate::names::id_translate;

impl<'a> Transpiler<'a> {
    pub(super) fn visit_identifier(&mut self, id: NodeId, out: &mut Vec<Event>) {
        match self.attr(id, "name") {
            Some(name) => out.push(Event::Expr(id_translate(name))),
            None => {
                self.untranslated(out, "Identifier without a name".to_string(), Some(id));
                out.push(Event::Expr("None".to_string()));
            }
        }
    }

    pub(super) fn visit_constant(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ctype = self.attr(id, "type");
        let value = self.attr(id, "value");

        match (ctype, value) {
            (Some("String"), value) => {
                let delim = self.attr(id, "delim").unwrap_or("\"");
                out.push(Event::Expr(format!("{}{}{}", delim, value.unwrap_or(""), delim)));
            }
            (Some("Number"), Some(value)) => out.push(Event::Expr(normalize_number(value))),
            (_, Some(value)) => out.push(Event::Expr(id_translate(value))),
            (_, None) => {
                let ast = self.ast;
                for &child in ast.children(id) {
                    match ast.tag(child) {
                        "CallArguments" => {
                            let items = self.call_arguments(child, out)?;
                            out.push(Event::Expr(format!("Array([{}])", items.join(", "))));
                        }
                        "list_constant" => out.push(Event::Expr("Array()".to_string())),
                        _ => out.extend(self.generate(child, opts)?),
                    }
                }
            }
        }
        Ok(())
    }

    /// Generate every child of an argument list. Arguments that produce no
    /// fragment are replaced by `unknownarg`.
    pub(super) fn call_arguments(
        &mut self,
        list: NodeId,
        out: &mut Vec<Event>,
    ) -> Result<Vec<String>> {
        let ast = self.ast;
        let mut arguments = Vec::new();
        for (n, &arg) in ast.children(list).iter().enumerate() {
            let parts = self.expr_parts(arg, GenOptions::default(), out)?;
            if parts.is_empty() {
                arguments.push("unknownarg".to_string());
                self.untranslated(out, format!("Argument {} not understood", n), Some(arg));
            } else {
                arguments.push(parts.join(" "));
            }
        }
        Ok(arguments)
    }

    pub(super) fn visit_regexp(&mut self, id: NodeId, out: &mut Vec<Event>) {
        let ast = self.ast;
        let body = self
            .attr(id, "value")
            .unwrap_or_else(|| ast.node(id).text.as_str());

        if has_unmatched_class(body) {
            self.untranslated(
                out,
                "Regular expression with an unmatched character class".to_string(),
                Some(id),
            );
        }

        let mut args = vec![raw_python_string(body)];
        let flags: Vec<&str> = self
            .attr(id, "flags")
            .unwrap_or("")
            .chars()
            .filter_map(|flag| match flag {
                'i' => Some("re.IGNORECASE"),
                'm' => Some("re.MULTILINE"),
                's' => Some("re.DOTALL"),
                _ => None,
            })
            .collect();
        if !flags.is_empty() {
            args.push(flags.join(" | "));
        }

        out.push(Event::Expr(format!("re.compile({})", args.join(", "))));
    }

    /// Binary expressions. A `+` next to a string literal turns the whole
    /// expression into a `ustr(...)` call so operands are coerced to text.
    pub(super) fn visit_expression(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let children = ast.children(id);

        let has_plus = children
            .iter()
            .any(|&c| ast.tag(c) == "OpMath" && ast.attr(c, "type") == Some("PLUS"));
        let has_string = children
            .iter()
            .any(|&c| ast.tag(c) == "Constant" && ast.attr(c, "type") == Some("String"));

        if has_plus && has_string {
            let mut operands: Vec<Vec<String>> = vec![Vec::new()];
            for &child in children {
                if ast.tag(child) == "OpMath" && ast.attr(child, "type") == Some("PLUS") {
                    operands.push(Vec::new());
                    continue;
                }
                let parts = self.expr_parts(child, GenOptions::isolated(), out)?;
                if let Some(current) = operands.last_mut() {
                    current.extend(parts);
                }
            }
            let operands: Vec<String> = operands.iter().map(|parts| parts.join(" ")).collect();
            out.push(Event::Expr(format!("ustr({})", operands.join(", "))));
            return Ok(());
        }

        let mut parts = Vec::new();
        for &child in children {
            parts.extend(self.expr_parts(child, GenOptions::isolated(), out)?);
        }
        let text = parts.join(" ");
        if opts.isolate && parts.len() > 1 {
            out.push(Event::Expr(format!("({})", text)));
        } else {
            out.push(Event::Expr(text));
        }
        Ok(())
    }

    pub(super) fn visit_parentheses(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let mut parts = Vec::new();
        for &child in ast.children(id) {
            parts.extend(self.expr_parts(child, GenOptions::default(), out)?);
        }
        out.push(Event::Expr(format!("({})", parts.join(" "))));
        Ok(())
    }

    pub(super) fn visit_ternary(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let &[condition, then_value, else_value] = self.ast.children(id) else {
            return Err(self.malformed(id, "OpTernary needs a condition and two values"));
        };

        let condition = self.expr_text(condition, GenOptions::isolated(), out)?;
        let then_value = self.expr_text(then_value, GenOptions::isolated(), out)?;
        let else_value = self.expr_text(else_value, GenOptions::isolated(), out)?;
        out.push(Event::Expr(format!(
            "({} if {} else {})",
            then_value, condition, else_value
        )));
        Ok(())
    }

    /// Operators are leaf nodes placed between their operands
    pub(super) fn visit_operator(&mut self, id: NodeId, out: &mut Vec<Event>) {
        let tag = self.ast.tag(id);
        let ctype = self.attr(id, "type").unwrap_or("");
        match operator_symbol(tag, ctype) {
            Some(symbol) => out.push(Event::Expr(symbol.to_string())),
            None => {
                self.untranslated(out, format!("Unknown operator {}.{}", tag, ctype), None);
                out.push(Event::Expr(format!("{}.{}", tag, ctype)));
            }
        }
    }

    pub(super) fn visit_unary(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let mut operand = Vec::new();
        for &child in ast.children(id) {
            operand.extend(self.expr_parts(child, GenOptions::isolated(), out)?);
        }
        let operand = operand.join(" ");

        let text = match self.attr(id, "type").unwrap_or("") {
            "LNOT" => format!("not {}", operand),
            "MINUS" => format!("-{}", operand),
            "PLUS" => format!("+{}", operand),
            "BNOT" => format!("~{}", operand),
            other => {
                self.untranslated(out, format!("Unknown unary operator {}", other), None);
                format!("{} {}", other, operand)
            }
        };
        out.push(Event::Expr(text));
        Ok(())
    }

    /// `++`/`--`. Inside an expression the update becomes its own statement:
    /// after the statement for postfix, before it for prefix.
    pub(super) fn visit_update(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        prefix: bool,
        out: &mut Vec<Event>,
    ) -> Result<()> {
        let ast = self.ast;
        let mut target = Vec::new();
        for &child in ast.children(id) {
            target.extend(self.expr_parts(child, GenOptions::default(), out)?);
        }
        if target.is_empty() {
            return Err(self.malformed(id, "increment without a target"));
        }
        let target = target.join(" ");

        let operator = match self.attr(id, "type") {
            Some("MINUSMINUS") => "-=",
            Some("PLUSPLUS") => "+=",
            other => {
                self.untranslated(out, format!("Unknown update {:?}", other), Some(id));
                "+="
            }
        };
        let update = format!("{} {} 1", target, operator);

        if opts.plusplus_as_instruction {
            out.push(Event::Expr(update));
        } else if prefix {
            out.push(Event::Line(update));
            out.push(Event::Expr(target));
        } else {
            out.push(Event::Expr(target));
            out.push(Event::LineAfter(update));
        }
        Ok(())
    }

    pub(super) fn visit_function_call(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let name = match self.attr(id, "name") {
            Some(name) if !name.is_empty() => id_translate(name),
            _ => {
                self.untranslated(out, "Call without a function name".to_string(), Some(id));
                "unknownfn".to_string()
            }
        };

        let arguments = match AstQuery::first_child(self.ast, id, "CallArguments") {
            Some(list) => self.call_arguments(list, out)?,
            None => Vec::new(),
        };
        let receiver = if self.calls_module_function(id, &name) {
            "self."
        } else {
            ""
        };
        out.push(Event::Expr(format!("{}{}({})", receiver, name, arguments.join(", "))));
        Ok(())
    }

    /// Whether `id` is an unqualified call to a function declared at the top
    /// of the module. Those functions become methods of the wrapper class, so
    /// the call needs `self`.
    fn calls_module_function(&self, id: NodeId, name: &str) -> bool {
        let ast = self.ast;
        let qualified = ast.parent(id).is_some_and(|parent| {
            ast.tag(parent) == "Member" && ast.children(parent).first() != Some(&id)
        });
        if qualified {
            return false;
        }

        let wrapper_class = self.config.wrapper_class.as_str();
        let Some(wrapper) = AstQuery::ancestors(ast, id).find(|&node| {
            ast.tag(node) == "Class" && ast.attr(node, "name") == Some(wrapper_class)
        }) else {
            return false;
        };
        AstQuery::find_path(ast, wrapper, "Source/Function")
            .into_iter()
            .filter_map(|function| ast.attr(function, "name"))
            .any(|declared| id_translate(declared) == name)
    }

    pub(super) fn visit_array_member(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let Some((&target, indexes)) = ast.children(id).split_first() else {
            return Err(self.malformed(id, "ArrayMember without a target"));
        };

        let mut text = self.expr_text(target, GenOptions::default(), out)?;
        for &index in indexes {
            let index = self.expr_text(index, GenOptions::default(), out)?;
            text.push('[');
            text.push_str(&index);
            text.push(']');
        }
        out.push(Event::Expr(text));
        Ok(())
    }

    pub(super) fn visit_dict_object(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let mut items = Vec::new();
        for &child in ast.children(id) {
            let item = self.expr_text(child, GenOptions::default(), out)?;
            if !item.is_empty() {
                items.push(item);
            }
        }
        out.push(Event::Expr(format!("{{{}}}", items.join(", "))));
        Ok(())
    }

    pub(super) fn visit_dict_elem(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let &[key, value] = ast.children(id) else {
            return Err(self.malformed(id, "DictElem needs a key and a value"));
        };

        let key = if ast.tag(key) == "Identifier" {
            format!("\"{}\"", ast.attr(key, "name").unwrap_or(""))
        } else {
            self.expr_text(key, GenOptions::default(), out)?
        };
        let value = self.expr_text(value, GenOptions::default(), out)?;
        out.push(Event::Expr(format!("{}: {}", key, value)));
        Ok(())
    }

    pub(super) fn visit_new(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let Some(&class) = ast.children(id).first() else {
            return Err(self.malformed(id, "New without a class"));
        };

        let mut text = self.expr_text(class, GenOptions::default(), out)?;
        if ast.tag(class) == "Identifier" {
            text.push_str("()");
        }
        out.push(Event::Expr(text));
        Ok(())
    }
}

fn operator_symbol(tag: &str, ctype: &str) -> Option<&'static str> {
    let symbol = match (tag, ctype) {
        ("OpMath", "PLUS") => "+",
        ("OpMath", "MINUS") => "-",
        ("OpMath", "TIMES") => "*",
        ("OpMath", "DIVIDE") => "/",
        ("OpMath", "MOD") => "%",
        ("OpMath", "AND") => "&",
        ("OpMath", "OR") => "|",
        ("OpMath", "XOR") => "^",
        ("OpMath", "LSHIFT") => "<<",
        ("OpMath", "RSHIFT") | ("OpMath", "URSHIFT") => ">>",
        ("Compare", "GT") => ">",
        ("Compare", "LT") => "<",
        ("Compare", "GE") => ">=",
        ("Compare", "LE") => "<=",
        ("Compare", "EQ") | ("Compare", "EQQ") => "==",
        ("Compare", "NE") | ("Compare", "NEQ") => "!=",
        ("Compare", "IN") => "in",
        ("OpLogic", "LAND") | ("LogicOp", "LAND") => "and",
        ("OpLogic", "LOR") | ("LogicOp", "LOR") => "or",
        ("OpUpdate", "EQUALS") => "=",
        ("OpUpdate", "PLUSEQUAL") => "+=",
        ("OpUpdate", "MINUSEQUAL") => "-=",
        ("OpUpdate", "TIMESEQUAL") => "*=",
        ("OpUpdate", "DIVEQUAL") => "/=",
        ("OpUpdate", "MODEQUAL") => "%=",
        ("OpUpdate", "ANDEQUAL") => "&=",
        ("OpUpdate", "OREQUAL") => "|=",
        ("OpUpdate", "XOREQUAL") => "^=",
        ("OpUpdate", "LSHIFTEQUAL") => "<<=",
        ("OpUpdate", "RSHIFTEQUAL") => ">>=",
        _ => return None,
    };
    Some(symbol)
}

/// True when a `[` opens a character class that is never closed
fn has_unmatched_class(pattern: &str) -> bool {
    let mut in_class = false;
    let mut escaped = false;
    for ch in pattern.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            _ => {}
        }
    }
    in_class
}

fn raw_python_string(body: &str) -> String {
    if !body.contains('"') {
        format!("r\"{}\"", body)
    } else if !body.contains('\'') {
        format!("r'{}'", body)
    } else {
        format!("r\"\"\"{}\"\"\"", body)
    }
}
