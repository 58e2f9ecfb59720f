//! Traversal context shared by the visitors.

/// Per-call generation flags, copied down the recursion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenOptions {
    /// Wrap a compound expression in parentheses
    pub isolate: bool,
    /// `break` is reported as an event instead of a line (inside a switch)
    pub break_mode: bool,
    /// Emit `pass` from a Source that produced no line
    pub include_pass: bool,
    /// Declarations without an initializer get a typed default value
    pub force_value: bool,
    /// `i++` used as a whole statement
    pub plusplus_as_instruction: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            isolate: false,
            break_mode: false,
            include_pass: true,
            force_value: false,
            plusplus_as_instruction: false,
        }
    }
}

impl GenOptions {
    pub fn isolated() -> Self {
        Self {
            isolate: true,
            ..Self::default()
        }
    }

    pub fn statement() -> Self {
        Self {
            plusplus_as_instruction: true,
            ..Self::default()
        }
    }

    pub fn with_break_mode(mut self, break_mode: bool) -> Self {
        self.break_mode = break_mode;
        self
    }

    pub fn with_pass(mut self, include_pass: bool) -> Self {
        self.include_pass = include_pass;
        self
    }
}

/// Monotonic counters for synthetic names, one per construct.
///
/// Owned by a single `Transpiler`, so two files never share state.
#[derive(Debug, Default, Clone)]
pub struct NameCounter {
    switch: usize,
    do_while: usize,
    for_loop: usize,
    with_block: usize,
    anon_fn: usize,
}

impl NameCounter {
    pub fn next_switch(&mut self) -> usize {
        self.switch += 1;
        self.switch
    }

    pub fn next_do_while(&mut self) -> usize {
        self.do_while += 1;
        self.do_while
    }

    pub fn next_for(&mut self) -> usize {
        self.for_loop += 1;
        self.for_loop
    }

    pub fn next_with(&mut self) -> usize {
        self.with_block += 1;
        self.with_block
    }

    pub fn next_anon_fn(&mut self) -> usize {
        self.anon_fn += 1;
        self.anon_fn
    }
}

/// Split a call argument list on top-level commas.
///
/// Commas nested in brackets or string literals stay inside their argument.
pub fn split_args(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in text.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let last = current.trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last.to_string());
    }
    args
}

/// Arguments of a call segment such as `mid(1, 2)`, given the callee name
pub fn call_args(segment: &str, name: &str) -> Vec<String> {
    segment
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .map(split_args)
        .unwrap_or_default()
}

/// Decimal integers lose their leading zeros, everything else is kept
pub fn normalize_number(value: &str) -> String {
    if value.len() > 1 && value.bytes().all(|b| b.is_ascii_digit()) {
        let trimmed = value.trim_start_matches('0');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args_respects_nesting() {
        assert_eq!(split_args("a, f(b, c), [1, 2]"), vec!["a", "f(b, c)", "[1, 2]"]);
        assert_eq!(split_args(r#""x, y", 'z'"#), vec![r#""x, y""#, "'z'"]);
        assert!(split_args("").is_empty());
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn test_call_args() {
        assert_eq!(call_args("mid(i + 1, 2)", "mid"), vec!["i + 1", "2"]);
        assert_eq!(call_args("shift()", "shift"), Vec::<String>::new());
        assert_eq!(call_args("length", "length"), Vec::<String>::new());
    }

    #[test]
    fn test_normalize_number() {
        assert_eq!(normalize_number("007"), "7");
        assert_eq!(normalize_number("000"), "0");
        assert_eq!(normalize_number("0"), "0");
        assert_eq!(normalize_number("0.5"), "0.5");
        assert_eq!(normalize_number("0x1F"), "0x1F");
    }

    #[test]
    fn test_counters_are_independent() {
        let mut names = NameCounter::default();
        assert_eq!(names.next_switch(), 1);
        assert_eq!(names.next_switch(), 2);
        assert_eq!(names.next_do_while(), 1);
        assert_eq!(names.next_for(), 1);
    }
}
