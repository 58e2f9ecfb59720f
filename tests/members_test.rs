//! Member chain rewriting from XML input

mod common;

use common::{code_lines, python};

fn ident(name: &str) -> String {
    format!(r#"<Identifier name="{}"/>"#, name)
}

fn call(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        return format!(r#"<FunctionCall name="{}"/>"#, name);
    }
    format!(
        r#"<FunctionCall name="{}"><CallArguments>{}</CallArguments></FunctionCall>"#,
        name,
        args.concat()
    )
}

fn number(value: &str) -> String {
    format!(r#"<Constant type="Number" value="{}"/>"#, value)
}

fn string(value: &str) -> String {
    format!(r#"<Constant type="String" value="{}"/>"#, value)
}

fn member(segments: &[String]) -> String {
    format!("<Instruction><Member>{}</Member></Instruction>", segments.concat())
}

#[test]
fn test_length_property() {
    let lines = code_lines(&member(&[ident("this"), ident("lista"), ident("length")]));
    assert!(lines.contains(&"len(self.lista)".to_string()), "{:?}", lines);
}

#[test]
fn test_left_and_mid() {
    let lines = code_lines(&format!(
        "{}{}",
        member(&[ident("codigo"), call("left", &[number("2")])]),
        member(&[ident("codigo"), call("mid", &[number("1"), number("2")])])
    ));
    assert!(lines.contains(&"codigo[0:2]".to_string()), "{:?}", lines);
    assert!(lines.contains(&"codigo[1:1 + 2]".to_string()), "{:?}", lines);
}

#[test]
fn test_first_rule_in_priority_order_wins() {
    let xml = member(&[
        ident("s"),
        call("mid", &[number("1"), number("2")]),
        call("left", &[number("1")]),
    ]);

    let first = code_lines(&xml);
    assert!(first.contains(&"s.mid(1, 2)[0:1]".to_string()), "{:?}", first);
    for _ in 0..3 {
        assert_eq!(code_lines(&xml), first);
    }
}

#[test]
fn test_arg_chain_on_literal() {
    let lines = code_lines(&member(&[
        r#"<Constant type="String" value="%1 de %2"/>"#.to_string(),
        call("arg", &[ident("a")]),
        call("arg", &[ident("b")]),
    ]));
    assert!(
        lines.contains(&r#""%1 de %2".replace("%1", str(a)).replace("%2", str(b))"#.to_string()),
        "{:?}",
        lines
    );
}

#[test]
fn test_push_and_join() {
    let lines = code_lines(&format!(
        "{}{}",
        member(&[ident("lista"), call("push", &[ident("x")])]),
        member(&[ident("lista"), call("join", &[string(";")])])
    ));
    assert!(lines.contains(&"lista.append(x)".to_string()), "{:?}", lines);
    assert!(lines.contains(&r#"";".join(lista)"#.to_string()), "{:?}", lines);
}

#[test]
fn test_regex_replace_and_plain_replace() {
    let pattern = r#"<RegExp value="\s+" flags="g"/>"#.to_string();
    let lines = code_lines(&format!(
        "{}{}",
        member(&[ident("s"), call("replace", &[pattern, string(" ")])]),
        member(&[ident("s"), call("replace", &[string(" "), string("")])])
    ));
    assert!(
        lines.contains(&r#"re.compile(r"\s+").sub(" ", s)"#.to_string()),
        "{:?}",
        lines
    );
    assert!(lines.contains(&r#"s.replace(" ", "", 1)"#.to_string()), "{:?}", lines);
}

#[test]
fn test_renamed_methods_are_not_rules() {
    let lines = code_lines(&member(&[ident("nombre"), call("toUpperCase", &[])]));
    assert!(lines.contains(&"nombre.upper()".to_string()), "{:?}", lines);
}

#[test]
fn test_superclass_private_call() {
    let output = python(&format!(
        r#"<Function name="oficial_init"><Source>{}</Source></Function>"#,
        member(&[ident("this"), ident("iface"), call("__init", &[])])
    ));
    assert!(output.contains("super(oficial, self.iface).init()"), "{}", output);
}

#[test]
fn test_superclass_call_outside_function_is_kept() {
    let output = python(&format!(
        r#"<Class name="base"><Source>{}</Source></Class>"#,
        member(&[ident("this"), ident("iface"), call("__valida", &[])])
    ));
    assert!(output.contains("    self.iface.__valida()\n"), "{}", output);
    assert!(output.contains("# DEBUG:: Superclass call outside of a function"), "{}", output);
}
