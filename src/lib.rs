pub mod ast;
pub mod config;
pub mod debug;
pub mod error;
pub mod events;
pub mod names;
pub mod transpiler;
pub mod writer;
pub mod xml;

pub use ast::{Ast, Node, NodeId};
pub use config::Config;
pub use error::{ErrorCollection, ErrorFormatter, ErrorKind, Result, TranspileError};
pub use events::Event;
pub use transpiler::{transpile_ast, transpile_str, TranspileOutput, Transpiler};
pub use writer::EmissionWriter;
