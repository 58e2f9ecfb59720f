//! Tag to visitor selection.

/// Visitor selected for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Source,
    Class,
    Function,
    FunctionAnon,
    FunctionCall,
    If,
    While,
    DoWhile,
    For,
    ForIn,
    Switch,
    TryCatch,
    With,
    DeclarationBlock,
    Variable,
    Value,
    Instruction,
    InstructionFlow,
    Member,
    ArrayMember,
    Identifier,
    Constant,
    RegExp,
    Expression,
    Parentheses,
    OpMath,
    OpUpdate,
    Compare,
    OpLogic,
    OpUnary,
    OpTernary,
    Postfix,
    Prefix,
    New,
    DictObject,
    DictElem,
    /// Fallback for any tag nobody registered
    Unknown,
}

struct Registration {
    kind: NodeKind,
    name: &'static str,
    aliases: &'static [&'static str],
}

impl Registration {
    fn accepts(&self, tag: &str) -> bool {
        self.name == tag || self.aliases.contains(&tag)
    }
}

macro_rules! register {
    ($kind:ident) => {
        Registration {
            kind: NodeKind::$kind,
            name: stringify!($kind),
            aliases: &[],
        }
    };
    ($kind:ident, [$($alias:literal),* $(,)?]) => {
        Registration {
            kind: NodeKind::$kind,
            name: stringify!($kind),
            aliases: &[$($alias),*],
        }
    };
}

/// Searched in order; the first registration accepting the tag wins
const REGISTRY: &[Registration] = &[
    register!(Source),
    register!(Class),
    register!(Function),
    register!(FunctionAnon),
    register!(FunctionCall),
    register!(If),
    register!(While),
    register!(DoWhile),
    register!(For),
    register!(ForIn),
    register!(Switch),
    register!(TryCatch),
    register!(With),
    register!(DeclarationBlock),
    register!(Variable),
    register!(
        Value,
        [
            "Condition",
            "Else",
            "Arguments",
            "CallArguments",
            "ForInitialize",
            "ForCompare",
            "ForIncrement",
        ]
    ),
    register!(Instruction, ["InstructionCall", "InstructionUpdate"]),
    register!(InstructionFlow),
    register!(Member),
    register!(ArrayMember),
    register!(Identifier),
    register!(Constant),
    register!(RegExp, ["regexbody"]),
    register!(Expression, ["base_expression", "math_expression"]),
    register!(Parentheses),
    register!(OpMath),
    register!(OpUpdate),
    register!(Compare),
    register!(OpLogic, ["LogicOp"]),
    register!(OpUnary),
    register!(OpTernary),
    register!(Postfix),
    register!(Prefix),
    register!(New),
    register!(DictObject),
    register!(DictElem),
];

impl NodeKind {
    /// Select the visitor for a tag. Never fails: unregistered tags map to
    /// `Unknown`.
    pub fn for_tag(tag: &str) -> NodeKind {
        REGISTRY
            .iter()
            .find(|registration| registration.accepts(tag))
            .map(|registration| registration.kind)
            .unwrap_or(NodeKind::Unknown)
    }

    /// Every tag accepted by some visitor
    pub fn known_tags() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().flat_map(|registration| {
            std::iter::once(registration.name).chain(registration.aliases.iter().copied())
        })
    }

    /// Registered tag that differs from `tag` only in letter case
    pub fn suggest(tag: &str) -> Option<&'static str> {
        Self::known_tags().find(|known| known.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_names() {
        assert_eq!(NodeKind::for_tag("If"), NodeKind::If);
        assert_eq!(NodeKind::for_tag("Member"), NodeKind::Member);
        assert_eq!(NodeKind::for_tag("DoWhile"), NodeKind::DoWhile);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(NodeKind::for_tag("base_expression"), NodeKind::Expression);
        assert_eq!(NodeKind::for_tag("InstructionUpdate"), NodeKind::Instruction);
        assert_eq!(NodeKind::for_tag("regexbody"), NodeKind::RegExp);
        assert_eq!(NodeKind::for_tag("ForCompare"), NodeKind::Value);
    }

    #[test]
    fn test_fallback_is_total() {
        assert_eq!(NodeKind::for_tag("Frobnicate"), NodeKind::Unknown);
        assert_eq!(NodeKind::for_tag(""), NodeKind::Unknown);
        assert_eq!(NodeKind::for_tag("if"), NodeKind::Unknown);
    }

    #[test]
    fn test_every_known_tag_resolves() {
        for tag in NodeKind::known_tags() {
            assert_ne!(NodeKind::for_tag(tag), NodeKind::Unknown, "{}", tag);
        }
    }

    #[test]
    fn test_suggest_ignores_case() {
        assert_eq!(NodeKind::suggest("if"), Some("If"));
        assert_eq!(NodeKind::suggest("callarguments"), Some("CallArguments"));
        assert_eq!(NodeKind::suggest("Frobnicate"), None);
    }
}
