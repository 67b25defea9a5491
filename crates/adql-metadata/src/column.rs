use adql_core::Identifier;
use adql_helpers::IndexSet;

use crate::ids::{ColumnId, CoosysId, ForeignKeyId, TableId};
use crate::types::Datatype;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnFlags {
    pub principal: bool,
    pub indexed: bool,
    pub std: bool,
    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub id: ColumnId,
    pub identifier: Identifier,
    pub table: TableId,
    pub datatype: Option<Datatype>,
    pub unit: Option<String>,
    pub ucd: Option<String>,
    pub utype: Option<String>,
    pub description: Option<String>,
    pub flags: ColumnFlags,
    pub coosys: Option<CoosysId>,
    pub(crate) fk_as_source: IndexSet<ForeignKeyId>,
    pub(crate) fk_as_target: IndexSet<ForeignKeyId>,
}

impl Column {
    pub fn fk_as_source(&self) -> impl Iterator<Item = ForeignKeyId> + '_ {
        self.fk_as_source.iter().copied()
    }

    pub fn fk_as_target(&self) -> impl Iterator<Item = ForeignKeyId> + '_ {
        self.fk_as_target.iter().copied()
    }

    /// Datatype predicates default permissively (as `UNKNOWN`) when no
    /// datatype metadata is available, per §3's permissive-`UNKNOWN` rule.
    pub fn is_string(&self) -> bool {
        self.datatype.map(|d| d.is_string()).unwrap_or(true)
    }

    pub fn is_numeric(&self) -> bool {
        self.datatype.map(|d| d.is_numeric()).unwrap_or(true)
    }

    pub fn is_geometry(&self) -> bool {
        self.datatype.map(|d| d.is_geometry()).unwrap_or(true)
    }
}
