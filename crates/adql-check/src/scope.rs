use adql_core::Identifier;
use adql_metadata::{ColumnId, Datatype, DatatypeKind};
use adql_parser::ast::RawIdentifier;

/// A single column visible within a FROM scope: either a real catalog
/// column (base table), or a synthesized one exposed by a subquery/CTE
/// output list or by NATURAL JOIN/USING column unification (§4.8).
#[derive(Debug, Clone)]
pub(crate) struct VisibleColumn {
    /// `None` for a NATURAL JOIN/USING "usual column" (§9's glossary entry):
    /// exposed without a table qualifier.
    pub table_label: Option<Identifier>,
    pub identifier: Identifier,
    pub datatype: Datatype,
    /// Present when this column is a direct pass-through of a real catalog
    /// column (used so outer queries can still treat it as fully resolved).
    pub column_id: Option<ColumnId>,
    /// Set on the original table-qualified copies of a NATURAL JOIN/USING
    /// common column: still reachable as `a.id`/`b.id`, but skipped when
    /// resolving the bare, unqualified name so it lands on the single
    /// synthesized usual column instead of going ambiguous.
    pub hidden_unqualified: bool,
}

impl VisibleColumn {
    pub fn new(table_label: Option<Identifier>, identifier: Identifier, datatype: Datatype, column_id: Option<ColumnId>) -> Self {
        VisibleColumn {
            table_label,
            identifier,
            datatype,
            column_id,
            hidden_unqualified: false,
        }
    }
}

/// The flat set of columns visible while resolving names within one FROM
/// clause (§4.8's "collect the set of visible columns").
#[derive(Debug, Clone, Default)]
pub(crate) struct FromScope {
    pub columns: Vec<VisibleColumn>,
}

pub(crate) enum ColumnLookup<'a> {
    Found(&'a VisibleColumn),
    NotFound,
    Ambiguous(Vec<String>),
}

impl FromScope {
    pub fn push(&mut self, column: VisibleColumn) {
        self.columns.push(column);
    }

    pub fn extend(&mut self, other: FromScope) {
        self.columns.extend(other.columns);
    }

    /// Resolves a (optionally table-qualified) column reference against
    /// this scope under the matching rule of §4.8.
    pub fn resolve(&self, table: Option<&RawIdentifier>, name: &RawIdentifier) -> ColumnLookup<'_> {
        let matches: Vec<&VisibleColumn> = self
            .columns
            .iter()
            .filter(|c| match (table, &c.table_label) {
                (Some(t), Some(label)) => matches_ref(label, t),
                (Some(_), None) => false,
                (None, _) => !c.hidden_unqualified,
            })
            .filter(|c| matches_ref(&c.identifier, name))
            .collect();

        match matches.as_slice() {
            [] => ColumnLookup::NotFound,
            [single] => ColumnLookup::Found(single),
            many => {
                let candidates = many
                    .iter()
                    .map(|c| match &c.table_label {
                        Some(label) => format!("{}.{}", label.denormalize(), c.identifier.denormalize()),
                        None => c.identifier.denormalize(),
                    })
                    .collect();
                ColumnLookup::Ambiguous(candidates)
            }
        }
    }
}

/// Matches a parsed reference token against a stored identifier per the
/// delimited/undelimited case rule shared by table and column resolution
/// (§4.8).
pub(crate) fn matches_ref(stored: &Identifier, token: &RawIdentifier) -> bool {
    if token.case_sensitive {
        stored.matches_quoted_reference(&token.text)
    } else {
        stored.matches_unquoted_reference(&token.text)
    }
}

/// Symmetric name equality used to detect NATURAL JOIN common columns: exact
/// byte comparison if either side is case-sensitive, case-insensitive
/// otherwise.
pub(crate) fn same_identifier(a: &Identifier, b: &Identifier) -> bool {
    if a.case_sensitive() || b.case_sensitive() {
        a.adql_name() == b.adql_name()
    } else {
        a.adql_name().eq_ignore_ascii_case(b.adql_name())
    }
}

/// The permissive default datatype used when a column or expression could
/// not be resolved, so the rest of the tree can still be checked without
/// cascading spurious type errors from the first failure.
pub(crate) fn unknown_datatype() -> Datatype {
    Datatype::new(DatatypeKind::Unknown)
}
