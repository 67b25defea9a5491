//! Catalog metadata model (schemas, tables, columns, foreign keys,
//! coordinate systems) and the ADQL type system (§3 C2/C3).

pub mod catalog;
pub mod column;
pub mod coosys;
pub mod foreign_key;
pub mod ids;
pub mod schema;
pub mod table;
pub mod types;

pub use catalog::Catalog;
pub use column::{Column, ColumnFlags};
pub use coosys::Coosys;
pub use foreign_key::ForeignKey;
pub use ids::{ColumnId, CoosysId, ForeignKeyId, SchemaId, TableId};
pub use schema::Schema;
pub use table::{Table, TableKind};
pub use types::{Datatype, DatatypeKind};
