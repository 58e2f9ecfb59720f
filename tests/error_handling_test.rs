//! Recoverable diagnostics versus hard errors

mod common;

use common::error_assertions::{assert_error_contains, assert_error_node, expect_error};
use common::{program, transpile, transpile_with};
use qsapy::config::Config;
use qsapy::error::{ErrorFormatter, ErrorKind};

#[test]
fn test_unknown_tag_keeps_siblings() {
    let output = transpile(&program(concat!(
        r#"<Instruction><FunctionCall name="antes"/></Instruction>"#,
        r#"<Frobnicate foo="1"/>"#,
        r#"<Instruction><FunctionCall name="despues"/></Instruction>"#,
    )))
    .expect("unknown tags never fail");

    let python = &output.python;
    let before = python.find("antes()").expect("first sibling");
    let marker = python.find("# DEBUG:: * not-known-seq * <Frobnicate").expect("marker");
    let after = python.find("despues()").expect("second sibling");
    assert!(before < marker && marker < after, "{}", python);
    assert!(python.ends_with("form = None\n"));

    assert_eq!(output.diagnostics.warning_count(), 1);
    assert_eq!(output.diagnostics.warnings()[0].kind, ErrorKind::Untranslated);
}

#[test]
fn test_miscased_tag_warning_suggests_registered_tag() {
    let output = transpile(&program(r#"<instruction><Identifier name="x"/></instruction>"#))
        .expect("transpile");

    let warning = &output.diagnostics.warnings()[0];
    assert_eq!(warning.message, "no visitor for tag 'instruction'");
    assert_eq!(
        warning.context.help.as_deref(),
        Some("tags are case sensitive, did you mean 'Instruction'?")
    );
}

#[test]
fn test_debug_comments_can_be_disabled() {
    let config = Config {
        emit_debug_comments: false,
        ..Config::default()
    };
    let output = transpile_with(&program("<Frobnicate/>"), &config).expect("transpile");

    assert!(!output.python.contains("# DEBUG::"), "{}", output.python);
    assert!(output.python.contains("def _class_init(self):\n        pass\n"));
    assert!(output.diagnostics.has_warnings());
}

#[test]
fn test_with_requires_target_and_body() {
    let err = expect_error(
        transpile(&program(r#"<With><Identifier name="cursor"/></With>"#)),
        ErrorKind::MalformedNode,
    );
    assert_error_contains(&err, "With needs a target and a body");
    assert_error_node(&err, "With");
}

#[test]
fn test_try_without_block_is_an_error() {
    let err = expect_error(
        transpile(&program(r#"<TryCatch><Identifier name="e"/></TryCatch>"#)),
        ErrorKind::MalformedNode,
    );
    assert_error_node(&err, "TryCatch");
}

#[test]
fn test_ternary_needs_three_operands() {
    let err = expect_error(
        transpile(&program(
            r#"<Instruction><OpTernary><Identifier name="a"/></OpTernary></Instruction>"#,
        )),
        ErrorKind::MalformedNode,
    );
    assert_error_contains(&err, "OpTernary");
}

#[test]
fn test_malformed_xml() {
    expect_error(transpile("<Source><If></Source>"), ErrorKind::XmlSyntax);
    expect_error(transpile("<Source/><Source/>"), ErrorKind::XmlSyntax);
}

#[test]
fn test_document_without_root() {
    expect_error(transpile(""), ErrorKind::EmptyDocument);
    expect_error(transpile("<!-- nothing here -->"), ErrorKind::EmptyDocument);
}

#[test]
fn test_formatter_shows_node_snippet() {
    let err = expect_error(
        transpile(&program(r#"<With><Identifier name="cursor"/></With>"#)),
        ErrorKind::MalformedNode,
    );
    let text = ErrorFormatter::new(&err)
        .with_filename("flfactppal.xml")
        .with_color(false)
        .format();

    assert!(text.starts_with("flfactppal.xml: malformed node: With needs a target and a body"));
    assert!(text.contains("  | <With"), "{}", text);
}

#[test]
fn test_config_from_json_changes_output() {
    let config = Config::from_json(
        r#"{"runtime_module": "pineboolib.qsa", "wrapper_class": "FormInternalObj", "indent_unit": "  "}"#,
    )
    .expect("config");
    let output = transpile_with(&program(""), &config).expect("transpile");

    assert!(output.python.contains("from pineboolib.qsa import *"));
    assert!(output.python.contains("\n  def _class_init(self):\n    pass\n"), "{}", output.python);
}

#[test]
fn test_invalid_config() {
    let err = Config::from_json(r#"{"initializer_name": ""}"#).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);

    let err = Config::from_json("{not json").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Config);
}
