use adql_core::Identifier;
use adql_helpers::IndexSet;

use crate::ids::{SchemaId, TableId};

#[derive(Debug, Clone)]
pub struct Schema {
    pub id: SchemaId,
    pub identifier: Identifier,
    pub title: Option<String>,
    pub description: Option<String>,
    pub utype: Option<String>,
    /// Position of this schema within the catalog; preserved for
    /// deterministic listing, mirroring the source's explicit ordering
    /// index rather than relying on map iteration order alone.
    pub order_index: usize,
    pub(crate) tables: IndexSet<TableId>,
}

impl Schema {
    pub fn tables(&self) -> impl Iterator<Item = TableId> + '_ {
        self.tables.iter().copied()
    }
}
