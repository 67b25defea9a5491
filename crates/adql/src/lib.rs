//! Top-level facade tying the ADQL toolchain together: parse (C7) → check
//! (C8) → translate (C9), against a catalog built either by hand or from
//! IVOA VODataService XML (C6).
//!
//! Most callers only need [`translate_adql`]; the individual phases and
//! their crates remain available for hosts that want to inspect the AST or
//! the check report directly.

pub use adql_check::{check, CheckReport, CheckerConfig, RegionArgumentPolicy, UdfPolicy, UnknownTypePolicy};
pub use adql_core::{AdqlError, AdqlResult};
pub use adql_metadata::{Catalog, Column, ColumnFlags, Coosys, ForeignKey, Schema, Table, TableKind};
pub use adql_metadata::{ColumnId, CoosysId, Datatype, DatatypeKind, ForeignKeyId, SchemaId, TableId};
pub use adql_parser::{ast, parse_query, AdqlVersion};
pub use adql_stcs::{CoordinateSystem, Flavor, Frame, RefPos, Region};
pub use adql_tableset::ingest_tableset;
pub use adql_translate::dialects;
pub use adql_translate::{translate, Dialect, RowLimitPlan, UdfTranslator};
pub use adql_udf::{FunctionDef, FunctionRegistry, Param, Pattern};

/// Parses, checks, and translates one ADQL query in a single call. Returns
/// the checker's errors (if any) rather than the SQL when the query fails
/// validation; a syntax failure short-circuits before checking ever runs.
pub fn translate_adql(
    catalog: &Catalog,
    registry: &FunctionRegistry,
    source: &str,
    version: AdqlVersion,
    config: &CheckerConfig,
    dialect: &dyn Dialect,
    udf_translator: Option<&dyn UdfTranslator>,
) -> AdqlResult<Result<String, CheckReport>> {
    let query = parse_query(source, version)?;
    let report = check(catalog, registry, &query, config);
    if !report.is_ok() {
        return Ok(Err(report));
    }
    translate(catalog, registry, &query, dialect, udf_translator).map(Ok)
}

#[cfg(test)]
mod tests {
    use adql_core::Identifier;

    use super::*;
    use crate::dialects::GenericDialect;

    #[test]
    fn translates_a_trivial_select_end_to_end() {
        let mut catalog = Catalog::new();
        let table = catalog.add_table(None, "mytable", TableKind::Table, None, None, None).unwrap();
        catalog
            .add_column(
                table,
                Identifier::normalize("ra").unwrap(),
                Some(Datatype::new(DatatypeKind::Double)),
                None,
                None,
                None,
                None,
                ColumnFlags::default(),
                None,
            )
            .unwrap();
        let registry = FunctionRegistry::new();

        let outcome = translate_adql(
            &catalog,
            &registry,
            "SELECT ra FROM mytable",
            AdqlVersion::V2_1,
            &CheckerConfig::default(),
            &GenericDialect,
            None,
        )
        .unwrap();

        assert_eq!(outcome.unwrap(), "SELECT mytable.ra FROM mytable AS \"mytable\"");
    }

    #[test]
    fn surfaces_check_errors_instead_of_translating() {
        let catalog = Catalog::new();
        let registry = FunctionRegistry::new();

        let outcome = translate_adql(
            &catalog,
            &registry,
            "SELECT ra FROM mytable",
            AdqlVersion::V2_1,
            &CheckerConfig::default(),
            &GenericDialect,
            None,
        )
        .unwrap();

        let report = outcome.unwrap_err();
        assert!(!report.is_ok());
    }
}
