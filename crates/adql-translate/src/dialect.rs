use adql_core::Identifier;
use adql_metadata::{Datatype, DatatypeKind};
use adql_parser::ast::GeometryFunctionKind;
use adql_stcs::Region;

use adql_core::AdqlResult;

/// How a query's row-count limiting (ADQL `TOP`) and row-skipping (ADQL 2.1
/// `OFFSET`) clauses are rendered for one dialect (§4.9's `translate_offset`
/// hook, generalised to also cover `TOP` since the two interact on SQL
/// Server).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowLimitPlan {
    /// Text spliced directly after `SELECT` (and before `DISTINCT`/the
    /// select list), e.g. SQL Server's `TOP 10`. Empty for dialects that
    /// express limiting as a trailing clause instead.
    pub select_prefix: Option<String>,
    /// An `ORDER BY` clause to synthesize when the query has none of its
    /// own, for dialects (SQL Server) whose `OFFSET`/`FETCH` syntax requires
    /// one. Does not include the `ORDER BY` keyword.
    pub synthesized_order_by: Option<String>,
    /// Trailing clause appended after `ORDER BY`, e.g. `LIMIT 10 OFFSET 5`
    /// or `OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY`. `None` when both `TOP`
    /// and `OFFSET` are absent, or `OFFSET 0` was optimised away entirely.
    pub trailing: Option<String>,
}

/// Per-dialect rendering hooks for the checked-AST visitor in
/// [`crate::translator`] (§4.9 C9). A `Dialect` never sees source positions
/// or raw identifiers directly -- the visitor has already resolved names to
/// metadata before calling into these hooks, so failures here carry no
/// position (§7's `Translation` kind).
pub trait Dialect {
    fn name(&self) -> &'static str;

    /// Quotes `name` for output, applying `case_sensitive` to decide
    /// whether quoting is needed at all (generic/SQL Server: `"x"`,
    /// MySQL: `` `x` ``).
    fn quote(&self, name: &str, case_sensitive: bool) -> String;

    /// Escapes a string literal's contents (without the surrounding
    /// quotes); the default doubles embedded `'`, which covers every
    /// dialect in this translator.
    fn translate_string_constant(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Renders `||`-concatenation of already-translated operand SQL.
    fn translate_concat(&self, args: &[String]) -> String {
        args.join(" || ")
    }

    /// Overrides the call-site SQL for a built-in math/string/aggregate
    /// function; `None` falls back to the default `NAME(args...)` call
    /// syntax applied by the visitor.
    fn translate_math_fn(&self, _name: &str, _args: &[String]) -> Option<String> {
        None
    }

    /// Overrides the call-site SQL for a geometry function; `None` falls
    /// back to the default ADQL-like `NAME(args...)` serialization (correct
    /// for a target whose SQL dialect itself understands ADQL geometry,
    /// generally untrue -- every shipped dialect except the bare
    /// fallback overrides this for every kind it can express).
    fn translate_geometry_fn(&self, _kind: GeometryFunctionKind, _args: &[String]) -> Option<String> {
        None
    }

    /// Whether `JOIN ... USING (cols)` is available; when `false` the
    /// visitor rewrites NATURAL/USING joins into an explicit `ON`
    /// conjunction (§4.9's NATURAL JOIN/USING translation; SQL Server).
    fn supports_using(&self) -> bool {
        true
    }

    /// Whether a CTE item's output columns must be listed explicitly:
    /// `"label"(col1, col2, ...)` rather than bare `"label"`.
    fn requires_cte_column_list(&self) -> bool {
        false
    }

    fn convert_type_to_db(&self, datatype: Datatype) -> String {
        default_type_name(datatype)
    }

    fn translate_offset(&self, top: Option<u64>, offset: Option<u64>, order_by_present: bool) -> RowLimitPlan {
        let _ = order_by_present;
        let mut trailing_parts = Vec::new();
        if let Some(n) = top {
            trailing_parts.push(format!("LIMIT {n}"));
        }
        if let Some(n) = offset {
            if n > 0 {
                trailing_parts.push(format!("OFFSET {n}"));
            }
        }
        RowLimitPlan {
            select_prefix: None,
            synthesized_order_by: None,
            trailing: (!trailing_parts.is_empty()).then(|| trailing_parts.join(" ")),
        }
    }

    /// Result-ingestion hooks (§4.9's geometry round-trip): parse a
    /// database-native geometry value back into a [`Region`], or render a
    /// [`Region`] as a database-native literal for query parameters. Only
    /// PgSphere implements these; every other dialect has no native
    /// geometry storage format to round-trip through, so the default
    /// fails with [`adql_core::AdqlError::translation`].
    fn translate_geometry_from_db(&self, value: &str) -> AdqlResult<Region> {
        Err(adql_core::AdqlError::translation(format!(
            "{} has no native geometry type to parse \"{value}\" from",
            self.name()
        )))
    }

    fn translate_geometry_to_db(&self, region: &Region) -> AdqlResult<String> {
        let _ = region;
        Err(adql_core::AdqlError::translation(format!("{} has no native geometry type to render a region as", self.name())))
    }
}

/// Quotes an [`Identifier`] using a dialect's [`Dialect::quote`] hook.
pub fn quote_identifier(dialect: &dyn Dialect, identifier: &Identifier) -> String {
    dialect.quote(identifier.db_name(), identifier.case_sensitive())
}

fn default_type_name(datatype: Datatype) -> String {
    let base = match datatype.kind {
        DatatypeKind::Char => "CHAR",
        DatatypeKind::Varchar => "VARCHAR",
        DatatypeKind::Clob => "CLOB",
        DatatypeKind::Timestamp => "TIMESTAMP",
        DatatypeKind::Smallint => "SMALLINT",
        DatatypeKind::Integer => "INTEGER",
        DatatypeKind::Bigint => "BIGINT",
        DatatypeKind::Real => "REAL",
        DatatypeKind::Double => "DOUBLE PRECISION",
        DatatypeKind::Binary => "BINARY",
        DatatypeKind::Varbinary => "VARBINARY",
        DatatypeKind::Blob => "BLOB",
        DatatypeKind::Point => "POINT",
        DatatypeKind::Region => "REGION",
        DatatypeKind::Unknown | DatatypeKind::UnknownNumeric => "VARCHAR",
    };
    match datatype.length {
        Some(n) if Datatype::accepts_length(datatype.kind) => format!("{base}({n})"),
        _ => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;
    impl Dialect for Stub {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn quote(&self, name: &str, case_sensitive: bool) -> String {
            if case_sensitive {
                format!("\"{name}\"")
            } else {
                name.to_string()
            }
        }
    }

    #[test]
    fn default_offset_only_trailing_when_nonzero() {
        let plan = Stub.translate_offset(None, Some(0), false);
        assert_eq!(plan.trailing, None);
        let plan = Stub.translate_offset(Some(10), Some(5), false);
        assert_eq!(plan.trailing.unwrap(), "LIMIT 10 OFFSET 5");
    }

    #[test]
    fn default_type_name_maps_double_to_double_precision() {
        assert_eq!(default_type_name(Datatype::new(DatatypeKind::Double)), "DOUBLE PRECISION");
        assert_eq!(default_type_name(Datatype::with_length(DatatypeKind::Varchar, 20)), "VARCHAR(20)");
    }
}
