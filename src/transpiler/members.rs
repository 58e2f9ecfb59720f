//! Member chain lowering.
//!
//! A `Member` node is a dotted chain such as `cursor.valueBuffer("x").left(3)`.
//! Each child produces one segment. QSA string and array idioms are rewritten
//! into their Python spelling by an ordered rule list: the first rule with a
//! matching segment wins and only that segment (plus, for `arg`, its
//! consecutive siblings) is replaced.

use nonempty::NonEmpty;

use super::utils::call_args;
use super::{GenOptions, Transpiler};
use crate::ast::query::AstQuery;
use crate::ast::NodeId;
use crate::error::Result;
use crate::events::Event;
use crate::trace_println;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRule {
    Length,
    IsEmpty,
    Left,
    Right,
    Mid,
    CharAt,
    CharCodeAt,
    Substring,
    Substr,
    Arg,
    Join,
    Push,
    Shift,
    Unshift,
    Concat,
    ToString,
    Trim,
    ToFixed,
    Match,
    Replace,
    Split,
    AttributeValue,
    FromCharCode,
}

/// Priority order. Changing it changes the output of chains that match
/// more than one rule.
pub const MEMBER_RULES: &[MemberRule] = &[
    MemberRule::Length,
    MemberRule::IsEmpty,
    MemberRule::Left,
    MemberRule::Right,
    MemberRule::Mid,
    MemberRule::CharAt,
    MemberRule::CharCodeAt,
    MemberRule::Substring,
    MemberRule::Substr,
    MemberRule::Arg,
    MemberRule::Join,
    MemberRule::Push,
    MemberRule::Shift,
    MemberRule::Unshift,
    MemberRule::Concat,
    MemberRule::ToString,
    MemberRule::Trim,
    MemberRule::ToFixed,
    MemberRule::Match,
    MemberRule::Replace,
    MemberRule::Split,
    MemberRule::AttributeValue,
    MemberRule::FromCharCode,
];

impl MemberRule {
    /// QSA method or property name
    pub fn name(self) -> &'static str {
        match self {
            MemberRule::Length => "length",
            MemberRule::IsEmpty => "isEmpty",
            MemberRule::Left => "left",
            MemberRule::Right => "right",
            MemberRule::Mid => "mid",
            MemberRule::CharAt => "charAt",
            MemberRule::CharCodeAt => "charCodeAt",
            MemberRule::Substring => "substring",
            MemberRule::Substr => "substr",
            MemberRule::Arg => "arg",
            MemberRule::Join => "join",
            MemberRule::Push => "push",
            MemberRule::Shift => "shift",
            MemberRule::Unshift => "unshift",
            MemberRule::Concat => "concat",
            MemberRule::ToString => "toString",
            MemberRule::Trim => "trim",
            MemberRule::ToFixed => "toFixed",
            MemberRule::Match => "match",
            MemberRule::Replace => "replace",
            MemberRule::Split => "split",
            MemberRule::AttributeValue => "attributeValue",
            MemberRule::FromCharCode => "fromCharCode",
        }
    }

    /// Whether `segment` triggers this rule when it follows `receiver`
    pub fn matches(self, segment: &str, receiver: &str) -> bool {
        let name = self.name();
        let named = segment == name
            || segment
                .strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('('));
        if !named {
            return false;
        }

        match self {
            MemberRule::Split => call_args(segment, name)
                .first()
                .is_some_and(|pattern| pattern.contains("re.compile")),
            MemberRule::FromCharCode => receiver == "String",
            _ => true,
        }
    }

    /// Rewrite the segment at `at`. Returns the new head segment and the
    /// number of segments it replaces.
    fn apply(self, receiver: &str, segments: &[String], at: usize) -> (String, usize) {
        let args = call_args(&segments[at], self.name());
        let arg = |n: usize| args.get(n).cloned().unwrap_or_default();

        let text = match self {
            MemberRule::Length => format!("len({})", receiver),
            MemberRule::IsEmpty => format!("({} == \"\")", receiver),
            MemberRule::Left => format!("{}[0:{}]", receiver, arg(0)),
            MemberRule::Right => format!("{}[len({}) - ({}):]", receiver, receiver, arg(0)),
            MemberRule::Mid => match args.len() {
                0 | 1 => format!("{}[{}:]", receiver, arg(0)),
                _ => format!("{}[{}:{} + {}]", receiver, arg(0), arg(0), arg(1)),
            },
            MemberRule::CharAt => format!("{}[{}]", receiver, arg(0)),
            MemberRule::CharCodeAt => format!("ord({}[{}])", receiver, arg(0)),
            MemberRule::Substring => match args.len() {
                0 | 1 => format!("{}[{}:]", receiver, arg(0)),
                _ => format!("{}[{}:{}]", receiver, arg(0), arg(1)),
            },
            MemberRule::Substr => match args.len() {
                0 | 1 => format!("{}[{}:]", receiver, arg(0)),
                _ => format!("{}[{}:{} + {}]", receiver, arg(0), arg(0), arg(1)),
            },
            MemberRule::Arg => return rewrite_arg_calls(receiver, segments, at),
            MemberRule::Join => {
                let separator = if args.is_empty() { "\",\"".to_string() } else { arg(0) };
                format!("{}.join({})", separator, receiver)
            }
            MemberRule::Push => match args.len() {
                1 => format!("{}.append({})", receiver, arg(0)),
                _ => format!("{}.extend([{}])", receiver, args.join(", ")),
            },
            MemberRule::Shift => format!("{}.pop(0)", receiver),
            MemberRule::Unshift => format!("{}.insert(0, {})", receiver, arg(0)),
            MemberRule::Concat => {
                let mut operands = vec![receiver.to_string()];
                operands.extend(args.iter().cloned());
                format!("({})", operands.join(" + "))
            }
            MemberRule::ToString => format!("str({})", receiver),
            MemberRule::Trim => format!("{}.strip()", receiver),
            MemberRule::ToFixed => {
                let digits = if args.is_empty() { "0".to_string() } else { arg(0) };
                if digits.bytes().all(|b| b.is_ascii_digit()) {
                    format!("format({}, \".{}f\")", receiver, digits)
                } else {
                    format!("format({}, \".\" + str({}) + \"f\")", receiver, digits)
                }
            }
            MemberRule::Match => {
                let pattern = arg(0);
                if pattern.contains("re.compile") {
                    format!("{}.search({})", pattern, receiver)
                } else {
                    format!("re.search({}, {})", pattern, receiver)
                }
            }
            MemberRule::Replace => {
                let (pattern, replacement) = (arg(0), arg(1));
                if pattern.contains("re.compile") {
                    format!("{}.sub({}, {})", pattern, replacement, receiver)
                } else {
                    format!("{}.replace({}, {}, 1)", receiver, pattern, replacement)
                }
            }
            MemberRule::Split => format!("{}.split({})", arg(0), receiver),
            MemberRule::AttributeValue => {
                format!("{}.attributes().namedItem({}).nodeValue()", receiver, arg(0))
            }
            MemberRule::FromCharCode => format!("chr({})", arg(0)),
        };
        (text, 1)
    }
}

/// `"%1 de %2".arg(a).arg(b)` becomes a chain of `str.replace` calls, one per
/// consecutive `arg` segment.
fn rewrite_arg_calls(receiver: &str, segments: &[String], at: usize) -> (String, usize) {
    let values: Vec<String> = segments[at..]
        .iter()
        .take_while(|segment| MemberRule::Arg.matches(segment, receiver))
        .map(|segment| call_args(segment, "arg").join(", "))
        .collect();

    let mut placeholders = if is_string_literal(receiver) {
        placeholder_numbers(receiver)
    } else {
        Vec::new()
    };
    while placeholders.len() < values.len() {
        let next = placeholders.last().map_or(1, |last| last.saturating_add(1));
        placeholders.push(next);
    }

    let mut text = receiver.to_string();
    for (number, value) in placeholders.iter().zip(&values) {
        text.push_str(&format!(".replace(\"%{}\", str({}))", number, value));
    }
    (text, values.len())
}

fn is_string_literal(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')))
}

/// Distinct `%N` placeholders of a literal, ascending
fn placeholder_numbers(literal: &str) -> Vec<u32> {
    let mut numbers: Vec<u32> = literal
        .split('%')
        .skip(1)
        .filter_map(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

/// Apply the first matching rule to a chain. The returned chain starts with
/// the rewritten expression followed by the untouched trailing segments.
pub fn rewrite_chain(chain: NonEmpty<String>) -> (NonEmpty<String>, Option<MemberRule>) {
    let segments: Vec<String> = chain.into();

    for &rule in MEMBER_RULES {
        let found = (1..segments.len()).find(|&at| {
            let receiver = segments[..at].join(".");
            rule.matches(&segments[at], &receiver)
        });
        let Some(at) = found else {
            continue;
        };

        let receiver = segments[..at].join(".");
        let (head, consumed) = rule.apply(&receiver, &segments, at);
        let tail = segments[at + consumed..].to_vec();
        return (NonEmpty { head, tail }, Some(rule));
    }

    let rebuilt = match NonEmpty::from_vec(segments) {
        Some(chain) => chain,
        None => NonEmpty::new(String::new()),
    };
    (rebuilt, None)
}

/// `self.iface.__method(...)`: a call to the parent class implementation
pub fn is_superclass_call(chain: &NonEmpty<String>) -> bool {
    chain.len() >= 3 && chain[0] == "self" && chain[1] == "iface" && chain[2].starts_with("__")
}

/// Rewrite `self.iface.__m(args)` inside function `fn_name` into
/// `super(Class, self.iface).m(args)`.
///
/// Functions are named `<class>_<method>`, so the class is recovered by
/// stripping `_<m>` from the function name, or else by taking its first
/// non-empty underscore separated part.
pub fn rewrite_superclass_call(chain: NonEmpty<String>, fn_name: &str) -> NonEmpty<String> {
    let segments: Vec<String> = chain.into();
    let call = segments[2].trim_start_matches('_').to_string();
    let method = call.split('(').next().unwrap_or_default();

    let class = fn_name
        .strip_suffix(&format!("_{}", method))
        .filter(|class| !class.is_empty())
        .unwrap_or_else(|| {
            fn_name
                .split('_')
                .find(|part| !part.is_empty())
                .unwrap_or(fn_name)
        });

    let head = format!("super({}, self.iface)", class);
    let mut tail = vec![call];
    tail.extend(segments[3..].iter().cloned());
    NonEmpty { head, tail }
}

impl<'a> Transpiler<'a> {
    pub(super) fn visit_member(&mut self, id: NodeId, out: &mut Vec<Event>) -> Result<()> {
        let ast = self.ast;
        let mut segments = Vec::with_capacity(ast.children(id).len());
        for &child in ast.children(id) {
            segments.push(self.expr_text(child, GenOptions::default(), out)?);
        }
        let Some(mut chain) = NonEmpty::from_vec(segments) else {
            return Err(self.malformed(id, "Member without segments"));
        };

        if is_superclass_call(&chain) {
            let function = AstQuery::enclosing(ast, id, "Function");
            match function.and_then(|function| ast.attr(function, "name")) {
                Some(fn_name) => chain = rewrite_superclass_call(chain, fn_name),
                None => self.untranslated(
                    out,
                    "Superclass call outside of a function".to_string(),
                    Some(id),
                ),
            }
        }

        let (chain, rule) = rewrite_chain(chain);
        let text = Vec::from(chain).join(".");
        if let Some(rule) = rule {
            trace_println!("member rule '{}' -> {}", rule.name(), text);
        }
        out.push(Event::Expr(text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(segments: &[&str]) -> NonEmpty<String> {
        NonEmpty::from_vec(segments.iter().map(|s| s.to_string()).collect()).expect("segments")
    }

    fn lower(segments: &[&str]) -> String {
        let (rewritten, _) = rewrite_chain(chain(segments));
        Vec::from(rewritten).join(".")
    }

    #[test]
    fn test_string_slicing() {
        assert_eq!(lower(&["nombre", "left(3)"]), "nombre[0:3]");
        assert_eq!(lower(&["nombre", "right(2)"]), "nombre[len(nombre) - (2):]");
        assert_eq!(lower(&["s", "mid(i, 2)"]), "s[i:i + 2]");
        assert_eq!(lower(&["s", "mid(4)"]), "s[4:]");
        assert_eq!(lower(&["s", "substring(1, 3)"]), "s[1:3]");
        assert_eq!(lower(&["s", "substr(1, 3)"]), "s[1:1 + 3]");
        assert_eq!(lower(&["s", "charCodeAt(0)"]), "ord(s[0])");
    }

    #[test]
    fn test_length_and_trailing_segments() {
        assert_eq!(lower(&["self", "lista", "length"]), "len(self.lista)");
        assert_eq!(lower(&["s", "trim()", "upper()"]), "s.strip().upper()");
    }

    #[test]
    fn test_head_segment_is_never_rewritten() {
        assert_eq!(lower(&["length"]), "length");
        let (_, rule) = rewrite_chain(chain(&["left(1)", "x"]));
        assert_eq!(rule, None);
    }

    #[test]
    fn test_rule_priority_follows_list_order() {
        // left is listed before mid, so it wins even though mid comes first in the chain
        let (rewritten, rule) = rewrite_chain(chain(&["s", "mid(1, 2)", "left(1)"]));
        assert_eq!(rule, Some(MemberRule::Left));
        assert_eq!(Vec::from(rewritten).join("."), "s.mid(1, 2)[0:1]");

        for _ in 0..3 {
            assert_eq!(lower(&["s", "mid(1, 2)", "left(1)"]), "s.mid(1, 2)[0:1]");
        }
    }

    #[test]
    fn test_prefix_without_paren_does_not_match() {
        assert_eq!(lower(&["self", "leftPanel"]), "self.leftPanel");
        assert_eq!(lower(&["self", "middle()"]), "self.middle()");
    }

    #[test]
    fn test_arg_consumes_consecutive_segments() {
        assert_eq!(
            lower(&["\"%1 de %2\"", "arg(a)", "arg(b)"]),
            "\"%1 de %2\".replace(\"%1\", str(a)).replace(\"%2\", str(b))"
        );
        assert_eq!(
            lower(&["msg", "arg(x)"]),
            "msg.replace(\"%1\", str(x))"
        );
    }

    #[test]
    fn test_arg_numbering_saturates_at_largest_placeholder() {
        let rewritten = lower(&["\"%4294967295\"", "arg(a)", "arg(b)"]);
        assert_eq!(
            rewritten,
            "\"%4294967295\".replace(\"%4294967295\", str(a)).replace(\"%4294967295\", str(b))"
        );
    }

    #[test]
    fn test_array_idioms() {
        assert_eq!(lower(&["lista", "push(x)"]), "lista.append(x)");
        assert_eq!(lower(&["lista", "push(x, y)"]), "lista.extend([x, y])");
        assert_eq!(lower(&["lista", "join()"]), "\",\".join(lista)");
        assert_eq!(lower(&["lista", "join(\";\")"]), "\";\".join(lista)");
        assert_eq!(lower(&["lista", "shift()"]), "lista.pop(0)");
        assert_eq!(lower(&["lista", "unshift(0)"]), "lista.insert(0, 0)");
    }

    #[test]
    fn test_regex_idioms() {
        assert_eq!(
            lower(&["s", "replace(re.compile(r\"a\"), \"b\")"]),
            "re.compile(r\"a\").sub(\"b\", s)"
        );
        assert_eq!(lower(&["s", "replace(\"a\", \"b\")"]), "s.replace(\"a\", \"b\", 1)");
        assert_eq!(
            lower(&["s", "split(re.compile(r\",\"))"]),
            "re.compile(r\",\").split(s)"
        );
        assert_eq!(lower(&["s", "split(\",\")"]), "s.split(\",\")");
        assert_eq!(lower(&["s", "match(p)"]), "re.search(p, s)");
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(lower(&["total", "toFixed(2)"]), "format(total, \".2f\")");
        assert_eq!(
            lower(&["total", "toFixed(n)"]),
            "format(total, \".\" + str(n) + \"f\")"
        );
    }

    #[test]
    fn test_from_char_code_needs_string_receiver() {
        assert_eq!(lower(&["String", "fromCharCode(65)"]), "chr(65)");
        assert_eq!(lower(&["obj", "fromCharCode(65)"]), "obj.fromCharCode(65)");
    }

    #[test]
    fn test_superclass_call() {
        let call = chain(&["self", "iface", "__init(x)"]);
        assert!(is_superclass_call(&call));

        let rewritten = rewrite_superclass_call(call, "oficial_init");
        assert_eq!(
            Vec::from(rewritten).join("."),
            "super(oficial, self.iface).init(x)"
        );

        let rewritten =
            rewrite_superclass_call(chain(&["self", "iface", "__validate()"]), "head_init");
        assert_eq!(
            Vec::from(rewritten).join("."),
            "super(head, self.iface).validate()"
        );
    }
}
