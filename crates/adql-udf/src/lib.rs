//! User-defined function signature parsing, the translation-pattern
//! mini-language, and the registry that ties declared UDFs together (§3 C4).

pub mod keywords;
pub mod pattern;
pub mod registry;
pub mod signature;

pub use pattern::Pattern;
pub use registry::FunctionRegistry;
pub use signature::{FunctionDef, Param};
