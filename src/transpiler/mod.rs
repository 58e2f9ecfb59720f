//! Python generation from the QSA syntax tree.
//!
//! Every visitor appends emission events to an output buffer. Parents
//! generate a child into its own buffer, keep the expression fragments they
//! need and forward everything else, so structural events flow up unchanged.

mod dispatch;
mod expressions;
pub mod members;
mod statements;
pub mod template;
mod utils;

pub use dispatch::NodeKind;
pub use statements::rewrite_with_receiver;
pub use utils::{call_args, normalize_number, split_args, GenOptions, NameCounter};

use crate::ast::query::AstQuery;
use crate::ast::{Ast, NodeId};
use crate::config::Config;
use crate::debug_println;
use crate::error::{ErrorCollection, IntoTranspileError, Result, TranspileError};
use crate::events::Event;
use crate::writer::EmissionWriter;
use crate::xml::{self, node_to_string};

pub struct Transpiler<'a> {
    ast: &'a Ast,
    config: &'a Config,
    names: NameCounter,
    diagnostics: ErrorCollection,
}

impl<'a> Transpiler<'a> {
    pub fn new(ast: &'a Ast, config: &'a Config) -> Self {
        Self {
            ast,
            config,
            names: NameCounter::default(),
            diagnostics: ErrorCollection::new(),
        }
    }

    /// Generate the events for one node, picking the visitor by tag
    pub fn generate(&mut self, id: NodeId, opts: GenOptions) -> Result<Vec<Event>> {
        let mut out = Vec::new();
        match NodeKind::for_tag(self.ast.tag(id)) {
            NodeKind::Source => self.visit_source(id, opts, &mut out)?,
            NodeKind::Class => self.visit_class(id, &mut out)?,
            NodeKind::Function => self.visit_function(id, false, &mut out)?,
            NodeKind::FunctionAnon => self.visit_function(id, true, &mut out)?,
            NodeKind::FunctionCall => self.visit_function_call(id, &mut out)?,
            NodeKind::If => self.visit_if(id, opts, &mut out)?,
            NodeKind::While => self.visit_while(id, &mut out)?,
            NodeKind::DoWhile => self.visit_do_while(id, &mut out)?,
            NodeKind::For => self.visit_for(id, &mut out)?,
            NodeKind::ForIn => self.visit_for_in(id, &mut out)?,
            NodeKind::Switch => self.visit_switch(id, &mut out)?,
            NodeKind::TryCatch => self.visit_try_catch(id, opts, &mut out)?,
            NodeKind::With => self.visit_with(id, opts, &mut out)?,
            NodeKind::DeclarationBlock => self.visit_declaration_block(id, &mut out)?,
            NodeKind::Variable => self.visit_variable(id, opts, &mut out)?,
            NodeKind::Value => self.visit_value(id, opts, &mut out)?,
            NodeKind::Instruction => self.visit_instruction(id, opts, &mut out)?,
            NodeKind::InstructionFlow => self.visit_flow(id, opts, &mut out)?,
            NodeKind::Member => self.visit_member(id, &mut out)?,
            NodeKind::ArrayMember => self.visit_array_member(id, &mut out)?,
            NodeKind::Identifier => self.visit_identifier(id, &mut out),
            NodeKind::Constant => self.visit_constant(id, opts, &mut out)?,
            NodeKind::RegExp => self.visit_regexp(id, &mut out),
            NodeKind::Expression => self.visit_expression(id, opts, &mut out)?,
            NodeKind::Parentheses => self.visit_parentheses(id, &mut out)?,
            NodeKind::OpMath
            | NodeKind::OpUpdate
            | NodeKind::Compare
            | NodeKind::OpLogic => self.visit_operator(id, &mut out),
            NodeKind::OpUnary => self.visit_unary(id, &mut out)?,
            NodeKind::OpTernary => self.visit_ternary(id, &mut out)?,
            NodeKind::Postfix => self.visit_update(id, opts, false, &mut out)?,
            NodeKind::Prefix => self.visit_update(id, opts, true, &mut out)?,
            NodeKind::New => self.visit_new(id, &mut out)?,
            NodeKind::DictObject => self.visit_dict_object(id, &mut out)?,
            NodeKind::DictElem => self.visit_dict_elem(id, &mut out)?,
            NodeKind::Unknown => self.visit_unknown(id, &mut out),
        }
        Ok(out)
    }

    /// Generate a child and split its output: expression fragments are
    /// returned, every other event is forwarded to `out`.
    pub(crate) fn expr_parts(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<Vec<String>> {
        let mut parts = Vec::new();
        for event in self.generate(id, opts)? {
            match event {
                Event::Expr(fragment) => parts.push(fragment),
                other => out.push(other),
            }
        }
        Ok(parts)
    }

    /// Like `expr_parts`, joined with single spaces
    pub(crate) fn expr_text(
        &mut self,
        id: NodeId,
        opts: GenOptions,
        out: &mut Vec<Event>,
    ) -> Result<String> {
        Ok(self.expr_parts(id, opts, out)?.join(" "))
    }

    /// Report a construct that could not be translated. The output keeps a
    /// comment marker and the run continues.
    pub(crate) fn untranslated(
        &mut self,
        out: &mut Vec<Event>,
        message: String,
        node: Option<NodeId>,
    ) {
        out.push(Event::Debug(message.clone()));
        let mut warning = message.into_untranslated();
        if let Some(id) = node {
            let xml = node_to_string(self.ast, id);
            out.push(Event::Debug(xml.clone()));
            warning = warning.with_node(xml);
        }
        self.diagnostics.add_warning(warning);
    }

    /// Tags without a visitor keep their position in the output as a
    /// comment and generation continues with the siblings.
    fn visit_unknown(&mut self, id: NodeId, out: &mut Vec<Event>) {
        let tag = self.ast.tag(id);
        let xml = node_to_string(self.ast, id);
        debug_println!("no visitor for <{}> at {}", tag, id);

        out.push(Event::Debug(format!("* not-known-seq * {}", xml)));
        let mut warning = format!("no visitor for tag '{}'", tag)
            .into_untranslated()
            .with_node(xml);
        if let Some(known) = NodeKind::suggest(tag) {
            warning = warning.with_help(format!(
                "tags are case sensitive, did you mean '{}'?",
                known
            ));
        }
        self.diagnostics.add_warning(warning);
    }

    /// Error for a node that breaks a structural requirement
    pub(crate) fn malformed(&self, id: NodeId, message: impl Into<String>) -> TranspileError {
        let message: String = message.into();
        message.into_malformed_node(node_to_string(self.ast, id))
    }

    pub(crate) fn attr(&self, id: NodeId, name: &str) -> Option<&'a str> {
        self.ast.attr(id, name)
    }

    pub fn diagnostics(&self) -> &ErrorCollection {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> ErrorCollection {
        self.diagnostics
    }
}

/// Result of transpiling one document
#[derive(Debug)]
pub struct TranspileOutput {
    pub python: String,
    pub events: Vec<Event>,
    /// Constructs that could not be translated, as warnings
    pub diagnostics: ErrorCollection,
}

/// Run the whole pipeline on an already loaded tree
pub fn transpile_ast(mut ast: Ast, config: &Config) -> Result<TranspileOutput> {
    let envelope = template::wrap_module(&mut ast, config)?;
    debug_println!(
        "transpiling {} nodes",
        AstQuery::subtree_size(&ast, envelope)
    );

    let mut transpiler = Transpiler::new(&ast, config);
    let events = transpiler.generate_file(envelope)?;
    let diagnostics = transpiler.into_diagnostics();

    let mut writer = EmissionWriter::new(config);
    writer.write_all(&events)?;
    let python = writer.finish()?;

    Ok(TranspileOutput {
        python,
        events,
        diagnostics,
    })
}

/// Parse an XML syntax tree and transpile it
pub fn transpile_str(xml_source: &str, config: &Config) -> Result<TranspileOutput> {
    let ast = xml::parse_document(xml_source)?;
    transpile_ast(ast, config)
}
