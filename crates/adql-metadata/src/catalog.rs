use adql_core::{AdqlError, AdqlResult, Identifier};
use adql_helpers::{IndexMap, IndexSet};

use crate::column::{Column, ColumnFlags};
use crate::coosys::Coosys;
use crate::foreign_key::ForeignKey;
use crate::ids::{ColumnId, CoosysId, ForeignKeyId, SchemaId, TableId};
use crate::schema::Schema;
use crate::table::{simplify_schema_prefix, Table, TableKind};
use crate::types::Datatype;

/// The read-mostly metadata catalog: schemas, tables, columns, foreign keys
/// and coordinate systems stored as arenas keyed by stable integer ids
/// (§9). Built once (by the TableSet ingester or directly by the host),
/// then shared immutably across query checks.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    schemas: IndexMap<SchemaId, Schema>,
    tables: IndexMap<TableId, Table>,
    columns: IndexMap<ColumnId, Column>,
    foreign_keys: IndexMap<ForeignKeyId, ForeignKey>,
    coosys: IndexMap<CoosysId, Coosys>,
    next_schema: u32,
    next_table: u32,
    next_column: u32,
    next_fk: u32,
    next_coosys: u32,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    // -- schemas ---------------------------------------------------------

    pub fn add_schema(
        &mut self,
        identifier: Identifier,
        title: Option<String>,
        description: Option<String>,
        utype: Option<String>,
    ) -> SchemaId {
        let id = SchemaId(self.next_schema);
        self.next_schema += 1;
        let order_index = self.schemas.len();
        self.schemas.insert(
            id,
            Schema {
                id,
                identifier,
                title,
                description,
                utype,
                order_index,
                tables: IndexSet::default(),
            },
        );
        id
    }

    pub fn schema(&self, id: SchemaId) -> Option<&Schema> {
        self.schemas.get(&id)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn find_schema(&self, name: &str) -> Vec<SchemaId> {
        self.schemas
            .values()
            .filter(|s| s.identifier.matches(name))
            .map(|s| s.id)
            .collect()
    }

    // -- tables -----------------------------------------------------------

    /// Adds a table, applying schema-prefix simplification (§4.2) to
    /// `raw_name` before normalizing it into an `Identifier`.
    pub fn add_table(
        &mut self,
        schema: Option<SchemaId>,
        raw_name: &str,
        kind: TableKind,
        title: Option<String>,
        description: Option<String>,
        utype: Option<String>,
    ) -> AdqlResult<TableId> {
        let simplified = match schema.and_then(|s| self.schemas.get(&s)) {
            Some(schema) => simplify_schema_prefix(raw_name, &schema.identifier),
            None => raw_name.to_string(),
        };
        let identifier = Identifier::normalize(&simplified)?;

        let id = TableId(self.next_table);
        self.next_table += 1;
        let order_index = self.tables.len();
        self.tables.insert(
            id,
            Table {
                id,
                identifier,
                raw_name: raw_name.to_string(),
                schema,
                kind,
                title,
                description,
                utype,
                order_index,
                columns: IndexMap::default(),
                foreign_keys_as_source: Vec::new(),
            },
        );
        if let Some(schema_id) = schema {
            if let Some(schema) = self.schemas.get_mut(&schema_id) {
                schema.tables.insert(id);
            }
        }
        Ok(id)
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Tables whose ADQL name matches `name` per the identifier matching
    /// rule (§3); used by the checker for unqualified FROM-item resolution.
    pub fn find_tables(&self, name: &str) -> Vec<TableId> {
        self.tables
            .values()
            .filter(|t| t.identifier.matches(name))
            .map(|t| t.id)
            .collect()
    }

    pub fn find_table_in_schema(&self, schema: SchemaId, name: &str) -> Option<TableId> {
        self.tables
            .values()
            .find(|t| t.schema == Some(schema) && t.identifier.matches(name))
            .map(|t| t.id)
    }

    // -- columns ------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn add_column(
        &mut self,
        table: TableId,
        identifier: Identifier,
        datatype: Option<Datatype>,
        unit: Option<String>,
        ucd: Option<String>,
        utype: Option<String>,
        description: Option<String>,
        flags: ColumnFlags,
        coosys: Option<CoosysId>,
    ) -> AdqlResult<ColumnId> {
        if !self.tables.contains_key(&table) {
            return Err(AdqlError::invalid_metadata(format!(
                "cannot add column \"{}\" to unknown table {table}",
                identifier.adql_name()
            )));
        }
        let id = ColumnId(self.next_column);
        self.next_column += 1;
        let key = identifier.adql_name().to_string();
        self.columns.insert(
            id,
            Column {
                id,
                identifier,
                table,
                datatype,
                unit,
                ucd,
                utype,
                description,
                flags,
                coosys,
                fk_as_source: IndexSet::default(),
                fk_as_target: IndexSet::default(),
            },
        );
        let table = self.tables.get_mut(&table).expect("checked above");
        table.columns.insert(key, id);
        Ok(id)
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(&id)
    }

    /// Idempotently re-parents an existing column to `new_table`, removing
    /// it from its previous owner first (§4.2).
    pub fn reattach_column(&mut self, column: ColumnId, new_table: TableId) -> AdqlResult<()> {
        if !self.tables.contains_key(&new_table) {
            return Err(AdqlError::invalid_metadata(format!(
                "cannot attach column {column} to unknown table {new_table}"
            )));
        }
        let (old_table, key) = {
            let col = self
                .columns
                .get(&column)
                .ok_or_else(|| AdqlError::invalid_metadata(format!("unknown column {column}")))?;
            (col.table, col.identifier.adql_name().to_string())
        };
        if let Some(old) = self.tables.get_mut(&old_table) {
            old.columns.shift_remove(&key);
        }
        self.columns.get_mut(&column).expect("checked above").table = new_table;
        self.tables.get_mut(&new_table).expect("checked above").columns.insert(key, column);
        Ok(())
    }

    /// Removes a column from its owning table, and cascades to every
    /// foreign key that references it (§8: "removing a column removes it
    /// from every foreign key's source or target set").
    pub fn remove_column(&mut self, column: ColumnId) -> AdqlResult<()> {
        let col = self
            .columns
            .get(&column)
            .ok_or_else(|| AdqlError::invalid_metadata(format!("unknown column {column}")))?
            .clone();

        for fk in col.fk_as_source().chain(col.fk_as_target()).collect::<Vec<_>>() {
            self.remove_foreign_key(fk);
        }

        if let Some(table) = self.tables.get_mut(&col.table) {
            table.columns.shift_remove(col.identifier.adql_name());
        }
        self.columns.shift_remove(&column);
        Ok(())
    }

    fn remove_foreign_key(&mut self, fk: ForeignKeyId) {
        let Some(key) = self.foreign_keys.shift_remove(&fk) else {
            return;
        };
        if let Some(table) = self.tables.get_mut(&key.from_table) {
            table.foreign_keys_as_source.retain(|k| *k != fk);
        }
        for col in self.columns.values_mut() {
            col.fk_as_source.shift_remove(&fk);
            col.fk_as_target.shift_remove(&fk);
        }
    }

    // -- foreign keys ---------------------------------------------------

    /// Adds a foreign key, validating the invariants of §3/§4.2: both
    /// tables exist, the mapping is non-empty, and every source/target
    /// column name resolves within its respective table. Applies the
    /// mapping column-by-column and rolls back everything already applied
    /// if a later column fails to resolve (§9's "transaction with explicit
    /// rollback").
    pub fn add_foreign_key(
        &mut self,
        from_table: TableId,
        target_table: TableId,
        description: Option<String>,
        utype: Option<String>,
        mapping: Vec<(String, String)>,
    ) -> AdqlResult<ForeignKeyId> {
        if !self.tables.contains_key(&from_table) {
            return Err(AdqlError::invalid_metadata("foreign key source table does not exist"));
        }
        if !self.tables.contains_key(&target_table) {
            return Err(AdqlError::invalid_metadata("foreign key target table does not exist"));
        }
        if mapping.is_empty() {
            return Err(AdqlError::invalid_metadata("foreign key mapping must not be empty"));
        }

        let id = ForeignKeyId(self.next_fk);
        let mut applied: Vec<(ColumnId, ColumnId)> = Vec::new();

        for (source_name, target_name) in &mapping {
            let resolved = self
                .column_in_table(from_table, source_name)
                .zip(self.column_in_table(target_table, target_name));
            let Some((source_col, target_col)) = resolved else {
                for (s, t) in &applied {
                    self.columns.get_mut(s).unwrap().fk_as_source.shift_remove(&id);
                    self.columns.get_mut(t).unwrap().fk_as_target.shift_remove(&id);
                }
                return Err(AdqlError::invalid_metadata(format!(
                    "foreign key {id}: column \"{source_name}\" -> \"{target_name}\" does not exist in its table"
                )));
            };
            self.columns.get_mut(&source_col).unwrap().fk_as_source.insert(id);
            self.columns.get_mut(&target_col).unwrap().fk_as_target.insert(id);
            applied.push((source_col, target_col));
        }

        self.next_fk += 1;
        let mut ordered_mapping = IndexMap::default();
        for (s, t) in mapping {
            ordered_mapping.insert(s, t);
        }
        self.foreign_keys.insert(
            id,
            ForeignKey {
                id,
                from_table,
                target_table,
                description,
                utype,
                mapping: ordered_mapping,
            },
        );
        self.tables.get_mut(&from_table).unwrap().foreign_keys_as_source.push(id);
        Ok(id)
    }

    pub fn foreign_key(&self, id: ForeignKeyId) -> Option<&ForeignKey> {
        self.foreign_keys.get(&id)
    }

    fn column_in_table(&self, table: TableId, name: &str) -> Option<ColumnId> {
        let table = self.tables.get(&table)?;
        table.columns.get(name).copied()
    }

    // -- coordinate systems -----------------------------------------------

    pub fn add_coosys(
        &mut self,
        vo_id: String,
        system: String,
        equinox: Option<String>,
        epoch: Option<String>,
    ) -> AdqlResult<CoosysId> {
        if vo_id.trim().is_empty() {
            return Err(AdqlError::invalid_metadata("coosys id must not be empty"));
        }
        if system.trim().is_empty() {
            return Err(AdqlError::invalid_metadata("coosys system must not be empty"));
        }
        let id = CoosysId(self.next_coosys);
        self.next_coosys += 1;
        self.coosys.insert(
            id,
            Coosys {
                id,
                vo_id,
                system,
                equinox,
                epoch,
            },
        );
        Ok(id)
    }

    pub fn coosys(&self, id: CoosysId) -> Option<&Coosys> {
        self.coosys.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Identifier {
        Identifier::normalize(s).unwrap()
    }

    #[test]
    fn table_belongs_to_its_schema() {
        let mut cat = Catalog::new();
        let schema = cat.add_schema(ident("public"), None, None, None);
        let table = cat
            .add_table(Some(schema), "public.foo", TableKind::Table, None, None, None)
            .unwrap();
        assert_eq!(cat.table(table).unwrap().identifier.adql_name(), "foo");
        assert_eq!(cat.table(table).unwrap().schema, Some(schema));
        assert!(cat.schema(schema).unwrap().tables().any(|t| t == table));
    }

    #[test]
    fn column_back_references_its_table() {
        let mut cat = Catalog::new();
        let table = cat.add_table(None, "foo", TableKind::Table, None, None, None).unwrap();
        let col = cat
            .add_column(table, ident("colI"), None, None, None, None, None, ColumnFlags::default(), None)
            .unwrap();
        assert_eq!(cat.column(col).unwrap().table, table);
        assert_eq!(cat.table(table).unwrap().column_count(), 1);
    }

    #[test]
    fn foreign_key_requires_existing_columns() {
        let mut cat = Catalog::new();
        let t1 = cat.add_table(None, "a", TableKind::Table, None, None, None).unwrap();
        let t2 = cat.add_table(None, "b", TableKind::Table, None, None, None).unwrap();
        cat.add_column(t1, ident("id"), None, None, None, None, None, ColumnFlags::default(), None)
            .unwrap();
        cat.add_column(t2, ident("id"), None, None, None, None, None, ColumnFlags::default(), None)
            .unwrap();

        let ok = cat.add_foreign_key(t1, t2, None, None, vec![("id".into(), "id".into())]);
        assert!(ok.is_ok());

        let bad = cat.add_foreign_key(t1, t2, None, None, vec![("missing".into(), "id".into())]);
        assert!(bad.is_err());
    }

    #[test]
    fn foreign_key_partial_failure_rolls_back() {
        let mut cat = Catalog::new();
        let t1 = cat.add_table(None, "a", TableKind::Table, None, None, None).unwrap();
        let t2 = cat.add_table(None, "b", TableKind::Table, None, None, None).unwrap();
        let a_id = cat
            .add_column(t1, ident("id"), None, None, None, None, None, ColumnFlags::default(), None)
            .unwrap();
        cat.add_column(t2, ident("id"), None, None, None, None, None, ColumnFlags::default(), None)
            .unwrap();

        let mapping = vec![("id".into(), "id".into()), ("nope".into(), "id".into())];
        let err = cat.add_foreign_key(t1, t2, None, None, mapping);
        assert!(err.is_err());
        // first mapping entry's column must not have been left with a
        // dangling fk_as_source reference after the rollback.
        assert!(cat.column(a_id).unwrap().fk_as_source().next().is_none());
    }

    #[test]
    fn removing_column_cascades_to_foreign_keys() {
        let mut cat = Catalog::new();
        let t1 = cat.add_table(None, "a", TableKind::Table, None, None, None).unwrap();
        let t2 = cat.add_table(None, "b", TableKind::Table, None, None, None).unwrap();
        let a_id = cat
            .add_column(t1, ident("id"), None, None, None, None, None, ColumnFlags::default(), None)
            .unwrap();
        let b_id = cat
            .add_column(t2, ident("id"), None, None, None, None, None, ColumnFlags::default(), None)
            .unwrap();
        let fk = cat.add_foreign_key(t1, t2, None, None, vec![("id".into(), "id".into())]).unwrap();

        cat.remove_column(a_id).unwrap();
        assert!(cat.foreign_key(fk).is_none());
        assert!(cat.column(b_id).unwrap().fk_as_target().next().is_none());
    }
}
