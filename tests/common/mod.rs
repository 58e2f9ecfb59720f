#![allow(dead_code)]

pub mod error_assertions;
pub mod snapshot_utils;

use qsapy::config::Config;
use qsapy::error::TranspileError;
use qsapy::transpiler::{transpile_str, TranspileOutput};

/// Wrap top-level statements in the `Source` root the parser produces
pub fn program(body: &str) -> String {
    format!("<Source>{}</Source>", body)
}

/// Full pipeline with the default configuration
pub fn transpile(xml: &str) -> Result<TranspileOutput, TranspileError> {
    transpile_str(xml, &Config::default())
}

pub fn transpile_with(xml: &str, config: &Config) -> Result<TranspileOutput, TranspileError> {
    transpile_str(xml, config)
}

/// Python text of a program built from top-level statements
pub fn python(body: &str) -> String {
    match transpile(&program(body)) {
        Ok(output) => output.python,
        Err(err) => panic!("transpilation failed: {}", err),
    }
}

/// Non-empty output lines with indentation removed
pub fn code_lines(body: &str) -> Vec<String> {
    python(body)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Assert that `expected` appears in `lines` as a contiguous run
pub fn assert_lines_in_order(lines: &[String], expected: &[&str]) {
    let found = lines
        .windows(expected.len())
        .any(|window| window.iter().zip(expected).all(|(line, want)| line == want));
    if !found {
        panic!(
            "\n=== EXPECTED LINES NOT FOUND ===\n--- Expected ---\n{}\n--- Actual ---\n{}",
            expected.join("\n"),
            lines.join("\n")
        );
    }
}
