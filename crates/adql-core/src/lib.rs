//! Shared error kernel, source positions and identifier normalization rules
//! used by every crate in the ADQL toolchain.

pub mod error;
pub mod identifier;
pub mod position;

pub use error::{AdqlError, AdqlResult};
pub use identifier::Identifier;
pub use position::TextPosition;
