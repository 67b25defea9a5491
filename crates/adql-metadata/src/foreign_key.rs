use adql_helpers::IndexMap;

use crate::ids::{ForeignKeyId, TableId};

#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub id: ForeignKeyId,
    pub from_table: TableId,
    pub target_table: TableId,
    pub description: Option<String>,
    pub utype: Option<String>,
    /// Source column ADQL name -> target column ADQL name, insertion order
    /// preserved (it is significant for `USING`-style translation output).
    pub mapping: IndexMap<String, String>,
}
