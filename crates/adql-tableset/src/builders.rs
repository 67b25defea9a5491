use adql_metadata::{ColumnFlags, Datatype, TableKind};

/// Intermediate, not-yet-inserted representation of a `<column>` element.
#[derive(Debug, Default)]
pub(crate) struct ColumnBuilder {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub ucd: Option<String>,
    pub utype: Option<String>,
    pub datatype: Option<Datatype>,
    pub flags: ColumnFlags,
}

/// Intermediate representation of a `<foreignKey>` element. Resolution of
/// `target_table` against the catalog happens after every table is known.
#[derive(Debug, Default)]
pub(crate) struct ForeignKeyBuilder {
    pub target_table: Option<String>,
    pub description: Option<String>,
    pub utype: Option<String>,
    pub mapping: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub(crate) struct TableBuilder {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub utype: Option<String>,
    pub kind: TableKind,
    pub columns: Vec<ColumnBuilder>,
    pub foreign_keys: Vec<ForeignKeyBuilder>,
}

#[derive(Debug, Default)]
pub(crate) struct SchemaBuilder {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub utype: Option<String>,
    pub tables: Vec<TableBuilder>,
}
