//! Dialect-specific SQL translation (§4.9 C9): a visitor over an
//! already-checked [`adql_parser::ast::Query`], the pluggable [`Dialect`]
//! trait each SQL target implements, and the UDF translation-pattern glue
//! that picks a call's SQL rendering.

mod dialect;
pub mod dialects;
mod scope;
mod translator;
mod udf;

pub use dialect::{Dialect, RowLimitPlan};
pub use translator::translate;
pub use udf::{translate_call, UdfTranslator};
