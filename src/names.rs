//! Identifier normalization from QSA vocabulary to Python vocabulary.

/// Python keywords that are valid QSA identifiers. `True`, `False` and `None`
/// are left out: they are the targets of the literal mapping below.
const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "exec", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "print", "raise", "return", "try", "while",
    "with", "yield",
];

/// Map a QSA identifier to its Python spelling
pub fn id_translate(name: &str) -> String {
    if PYTHON_KEYWORDS.contains(&name) {
        return format!("{}_", name);
    }

    let translated = match name {
        "true" => "True",
        "false" => "False",
        "null" | "undefined" | "unknown" => "None",
        "this" => "self",
        "startsWith" => "startswith",
        "endsWith" => "endswith",
        "lastIndexOf" | "findRev" => "rfind",
        "toLowerCase" => "lower",
        "toUpperCase" => "upper",
        "File" => "qsatype.File",
        "Dir" => "qsatype.Dir",
        other => other,
    };
    translated.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_and_receiver() {
        assert_eq!(id_translate("this"), "self");
        assert_eq!(id_translate("true"), "True");
        assert_eq!(id_translate("false"), "False");
        assert_eq!(id_translate("null"), "None");
        assert_eq!(id_translate("undefined"), "None");
    }

    #[test]
    fn test_keywords_get_suffix() {
        assert_eq!(id_translate("from"), "from_");
        assert_eq!(id_translate("print"), "print_");
        assert_eq!(id_translate("lambda"), "lambda_");
    }

    #[test]
    fn test_renamed_methods() {
        assert_eq!(id_translate("startsWith"), "startswith");
        assert_eq!(id_translate("lastIndexOf"), "rfind");
        assert_eq!(id_translate("toUpperCase"), "upper");
        assert_eq!(id_translate("File"), "qsatype.File");
    }

    #[test]
    fn test_plain_names_unchanged() {
        assert_eq!(id_translate("cursor"), "cursor");
        assert_eq!(id_translate("codCliente"), "codCliente");
    }
}
