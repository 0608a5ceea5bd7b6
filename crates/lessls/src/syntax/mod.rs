//
// syntax/mod.rs
//
// LESS parsing: lexer, arena tree and tolerant parser
//

mod lexer;
mod parser;
mod tree;

pub use parser::parse;
pub use tree::{Node, NodeId, NodeKind, SyntaxTree, TextPosition, TextRange};

/// Failure to produce a syntax tree at all.
///
/// Malformed statements are recovered from during parsing; only input that
/// cannot be tokenized surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unterminated block comment starting at offset {offset}")]
    UnterminatedComment { offset: usize },
}
