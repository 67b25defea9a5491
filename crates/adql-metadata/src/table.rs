use adql_core::Identifier;
use adql_helpers::IndexMap;

use crate::ids::{ColumnId, ForeignKeyId, SchemaId, TableId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableKind {
    /// A row of a query's SELECT list as seen from the outside (used for
    /// subquery/CTE output "tables" built by the checker, not the ingester).
    Output,
    #[default]
    Table,
    View,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub id: TableId,
    pub identifier: Identifier,
    /// The pre-simplification input, kept so schema-prefix simplification
    /// can be re-run if the table is re-attached to a different schema.
    pub raw_name: String,
    pub schema: Option<SchemaId>,
    pub kind: TableKind,
    pub title: Option<String>,
    pub description: Option<String>,
    pub utype: Option<String>,
    pub order_index: usize,
    /// Columns keyed by ADQL name, insertion order preserved.
    pub(crate) columns: IndexMap<String, ColumnId>,
    pub(crate) foreign_keys_as_source: Vec<ForeignKeyId>,
}

impl Table {
    pub fn columns(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.columns.values().copied()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn foreign_keys_as_source(&self) -> impl Iterator<Item = ForeignKeyId> + '_ {
        self.foreign_keys_as_source.iter().copied()
    }
}

/// Schema-prefix simplification (§4.2): given the table's `raw_name` and an
/// attached schema's identifier, returns the simplified ADQL name with the
/// schema prefix stripped when it matches.
pub(crate) fn simplify_schema_prefix(raw_name: &str, schema: &Identifier) -> String {
    if schema.case_sensitive() {
        // Compared against the schema's own raw (denormalized, still
        // quoted) text, exact bytes -- not the decoded canonical name.
        let prefix = format!("{}.", schema.denormalize());
        if let Some(rest) = raw_name.strip_prefix(&prefix) {
            return rest.to_string();
        }
        return raw_name.to_string();
    }

    let ci_prefix = format!("{}.", schema.adql_name());
    if let Some(rest) = strip_prefix_ignore_ascii_case(raw_name, &ci_prefix) {
        return rest.to_string();
    }

    let lower_prefix = format!("{}.", schema.adql_name().to_lowercase());
    if let Some(rest) = strip_prefix_ignore_ascii_case(&raw_name.to_lowercase(), &lower_prefix) {
        // The case-insensitive match was performed on the lowercased raw
        // name; re-slice the *original* name by byte length so casing in
        // the table part of the identifier is preserved.
        let cut = raw_name.len() - rest.len();
        return raw_name[cut..].to_string();
    }

    raw_name.to_string()
}

fn strip_prefix_ignore_ascii_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() < prefix.len() {
        return None;
    }
    let (head, tail) = s.split_at(prefix.len());
    if head.eq_ignore_ascii_case(prefix) {
        Some(tail)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, cs: bool) -> Identifier {
        Identifier::new(name, cs).unwrap()
    }

    #[test]
    fn strips_case_insensitive_schema_prefix() {
        let schema = ident("public", false);
        assert_eq!(simplify_schema_prefix("PUBLIC.foo", &schema), "foo");
        assert_eq!(simplify_schema_prefix("public.foo", &schema), "foo");
    }

    #[test]
    fn keeps_name_when_prefix_does_not_match() {
        let schema = ident("public", false);
        assert_eq!(simplify_schema_prefix("other.foo", &schema), "other.foo");
        assert_eq!(simplify_schema_prefix("foo", &schema), "foo");
    }

    #[test]
    fn case_sensitive_schema_requires_exact_bytes() {
        let schema = Identifier::normalize("\"Public\"").unwrap();
        assert_eq!(simplify_schema_prefix("\"Public\".foo", &schema), "foo");
        assert_eq!(simplify_schema_prefix("Public.foo", &schema), "Public.foo");
        assert_eq!(simplify_schema_prefix("PUBLIC.foo", &schema), "PUBLIC.foo");
    }
}
