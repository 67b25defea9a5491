//! ADQL lexer and recursive-descent parser producing a positioned AST (§3
//! C7). The parser performs no name resolution: `ast::TableRef`,
//! `ast::Expr::ColumnRef` and `ast::Expr::FunctionCall` carry `Cell`-backed
//! resolution links that the checker fills in during a later pass.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::AdqlVersion;
pub use parser::parse_query;
