use adql_core::Identifier;
use adql_parser::ast::RawIdentifier;

/// A column visible while rendering one FROM clause: either a real
/// catalog column pass-through (table/subquery/CTE item) or a synthesized
/// *usual column* produced by NATURAL JOIN/USING unification (mirrors
/// `adql_check`'s own from-scope; the translator walks the already-checked
/// tree independently rather than threading the checker's private scope
/// through, so it rebuilds the same shape here).
#[derive(Debug, Clone)]
pub(crate) struct ScopeColumn {
    /// `None` for a usual column: rendered without a table qualifier.
    pub table_label: Option<Identifier>,
    pub identifier: Identifier,
    /// Set on the original table-qualified copies of a usual column: still
    /// reachable as `a.id`, but skipped by unqualified lookup so the bare
    /// name resolves to the single synthesized entry instead.
    pub hidden_unqualified: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    pub columns: Vec<ScopeColumn>,
}

impl Scope {
    pub fn push(&mut self, column: ScopeColumn) {
        self.columns.push(column);
    }

    pub fn extend(&mut self, other: Scope) {
        self.columns.extend(other.columns);
    }

    /// Finds the single column a (optionally table-qualified) reference
    /// names. The tree has already been checked, so a unique match is
    /// assumed to exist; ambiguity/absence here means the translator and
    /// checker have drifted out of sync rather than a user error.
    pub fn resolve(&self, table: Option<&RawIdentifier>, name: &RawIdentifier) -> Option<&ScopeColumn> {
        self.columns
            .iter()
            .filter(|c| match (table, &c.table_label) {
                (Some(t), Some(label)) => matches_ref(label, t),
                (Some(_), None) => false,
                (None, _) => !c.hidden_unqualified,
            })
            .find(|c| matches_ref(&c.identifier, name))
    }
}

pub(crate) fn matches_ref(stored: &Identifier, token: &RawIdentifier) -> bool {
    if token.case_sensitive {
        stored.matches_quoted_reference(&token.text)
    } else {
        stored.matches_unquoted_reference(&token.text)
    }
}

pub(crate) fn same_identifier(a: &Identifier, b: &Identifier) -> bool {
    if a.case_sensitive() || b.case_sensitive() {
        a.adql_name() == b.adql_name()
    } else {
        a.adql_name().eq_ignore_ascii_case(b.adql_name())
    }
}

/// The common-column set for a NATURAL JOIN: every left column whose name
/// also appears on the right, left side wins, in left-to-right order.
pub(crate) fn natural_usual_columns(left: &Scope, right: &Scope) -> Vec<ScopeColumn> {
    let mut usual = Vec::new();
    for l in &left.columns {
        if usual.iter().any(|u: &ScopeColumn| same_identifier(&u.identifier, &l.identifier)) {
            continue;
        }
        if right.columns.iter().any(|r| same_identifier(&r.identifier, &l.identifier)) {
            usual.push(ScopeColumn {
                table_label: None,
                identifier: l.identifier.clone(),
                hidden_unqualified: false,
            });
        }
    }
    usual
}

/// Hides the qualified originals of `usual` from unqualified lookup and
/// appends the synthesized unqualified entries on top of the concatenated
/// left/right scope.
pub(crate) fn merge_with_usual_columns(mut left: Scope, mut right: Scope, usual: Vec<ScopeColumn>) -> Scope {
    for col in &usual {
        for c in left.columns.iter_mut().chain(right.columns.iter_mut()) {
            if same_identifier(&c.identifier, &col.identifier) {
                c.hidden_unqualified = true;
            }
        }
    }
    let mut combined = left;
    combined.extend(right);
    for col in usual {
        combined.push(col);
    }
    combined
}

/// Re-labels every column of `scope` under a new (or absent) table
/// qualifier, used when a subquery/CTE is mounted as a FROM item under an
/// alias.
pub(crate) fn relabel(scope: Scope, label: Option<Identifier>) -> Scope {
    let mut out = Scope::default();
    for col in scope.columns {
        out.push(ScopeColumn {
            table_label: label.clone(),
            identifier: col.identifier,
            hidden_unqualified: false,
        });
    }
    out
}
