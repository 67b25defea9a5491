use adql::dialects::GenericDialect;
use adql::{AdqlVersion, Catalog, CheckerConfig, ColumnFlags, Datatype, DatatypeKind, FunctionDef, FunctionRegistry, TableKind};
use adql_core::Identifier;

fn add_column(catalog: &mut Catalog, table: adql::TableId, name: &str, kind: DatatypeKind) {
    catalog
        .add_column(
            table,
            Identifier::normalize(name).unwrap(),
            Some(Datatype::new(kind)),
            None,
            None,
            None,
            None,
            ColumnFlags::default(),
            None,
        )
        .unwrap();
}

fn foo_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    let schema = catalog.add_schema(Identifier::normalize("public").unwrap(), None, None, None);
    let table = catalog.add_table(Some(schema), "foo", TableKind::Table, None, None, None).unwrap();
    add_column(&mut catalog, table, "colS", DatatypeKind::Varchar);
    add_column(&mut catalog, table, "colI", DatatypeKind::Integer);
    add_column(&mut catalog, table, "colG", DatatypeKind::Point);
    catalog
}

fn run(catalog: &Catalog, registry: &FunctionRegistry, sql: &str, config: &CheckerConfig) -> Result<String, Vec<String>> {
    adql::translate_adql(catalog, registry, sql, AdqlVersion::V2_1, config, &GenericDialect, None)
        .expect("parses")
        .map_err(|report| report.errors().iter().map(ToString::to_string).collect())
}

#[test]
fn numeric_arithmetic_on_an_integer_column_passes() {
    let catalog = foo_catalog();
    let registry = FunctionRegistry::new();
    assert!(run(&catalog, &registry, "SELECT colI * 3 FROM foo", &CheckerConfig::default()).is_ok());
}

#[test]
fn numeric_arithmetic_on_a_string_column_fails_with_the_literal_message() {
    let catalog = foo_catalog();
    let registry = FunctionRegistry::new();
    let errors = run(&catalog, &registry, "SELECT colS * 3 FROM foo", &CheckerConfig::default()).unwrap_err();
    assert!(errors.iter().any(|e| e.contains("A numeric value was expected instead of \"colS\"")), "{errors:?}");
}

#[test]
fn udf_resolves_against_a_string_argument_but_not_a_numeric_one() {
    let catalog = foo_catalog();
    let mut registry = FunctionRegistry::new();
    registry.insert(FunctionDef::parse("toto(str VARCHAR) -> VARCHAR").unwrap());

    let errors = run(&catalog, &registry, "SELECT toto(123) FROM foo", &CheckerConfig::default()).unwrap_err();
    assert!(
        errors.iter().any(|e| e.contains("No UDF has been defined or found with the signature: toto(NUMERIC)")),
        "{errors:?}"
    );

    assert!(run(&catalog, &registry, "SELECT toto('x') FROM foo", &CheckerConfig::default()).is_ok());
}

#[test]
fn geometry_allow_list_rejects_functions_outside_it() {
    let catalog = foo_catalog();
    let registry = FunctionRegistry::new();
    let config = CheckerConfig {
        allowed_geometry_functions: Some(vec!["CONTAINS".into(), "POINT".into(), "CIRCLE".into()]),
        ..CheckerConfig::default()
    };

    assert!(run(
        &catalog,
        &registry,
        "SELECT 1 FROM foo WHERE CONTAINS(POINT('', 1, 2), CIRCLE('', 1, 2, 3)) = 1",
        &config
    )
    .is_ok());

    let errors = run(
        &catalog,
        &registry,
        "SELECT 1 FROM foo WHERE INTERSECTS(POINT('', 1, 2), CIRCLE('', 1, 2, 3)) = 1",
        &config,
    )
    .unwrap_err();
    assert!(
        errors.iter().any(|e| e.contains("The geometrical function \"INTERSECTS\" is not available in this implementation!")),
        "{errors:?}"
    );
}

#[test]
fn case_sensitive_table_name_rejects_a_lowercase_reference() {
    let mut catalog = Catalog::new();
    let table = catalog.add_table(None, "\"CS_ADQLTable\"", TableKind::Table, None, None, None).unwrap();
    add_column(&mut catalog, table, "id", DatatypeKind::Integer);
    let registry = FunctionRegistry::new();

    assert!(run(&catalog, &registry, "SELECT * FROM cs_adqltable", &CheckerConfig::default()).is_err());
    assert!(run(&catalog, &registry, "SELECT * FROM CS_ADQLTable", &CheckerConfig::default()).is_ok());
}

#[test]
fn natural_join_renders_usual_columns_unqualified() {
    let mut catalog = Catalog::new();
    let a = catalog.add_table(None, "aTable", TableKind::Table, None, None, None).unwrap();
    for (name, kind) in [("id", DatatypeKind::Integer), ("name", DatatypeKind::Varchar), ("aColumn", DatatypeKind::Double)] {
        add_column(&mut catalog, a, name, kind);
    }
    let b = catalog.add_table(None, "anotherTable", TableKind::Table, None, None, None).unwrap();
    for (name, kind) in [("id", DatatypeKind::Integer), ("name", DatatypeKind::Varchar), ("anotherColumn", DatatypeKind::Double)] {
        add_column(&mut catalog, b, name, kind);
    }
    let registry = FunctionRegistry::new();

    let sql = run(
        &catalog,
        &registry,
        "SELECT id, name, aColumn, anotherColumn FROM aTable A NATURAL JOIN anotherTable B",
        &CheckerConfig::default(),
    )
    .unwrap();

    assert!(sql.contains("aTable AS \"a\" NATURAL INNER JOIN anotherTable AS \"b\""), "{sql}");
    assert!(sql.starts_with("SELECT id, name, a.aColumn, b.anotherColumn"), "{sql}");
}

#[test]
fn translation_pattern_takes_the_else_branch_for_a_missing_fourth_argument() {
    let mut registry = FunctionRegistry::new();
    registry.insert(
        FunctionDef::parse("anyFunction(a VARCHAR, b INTEGER, c DOUBLE) -> VARCHAR")
            .unwrap()
            .with_translation_pattern("anyFunction($1$2?{, $2*10}{}$4?{, $4+10}{, 0})"),
    );

    let sql = run(
        &foo_catalog(),
        &registry,
        "SELECT anyFunction('Blabla', 123, 1.23) FROM foo",
        &CheckerConfig::default(),
    )
    .unwrap();

    assert!(sql.contains("anyFunction('Blabla', 123*10, 0)"), "{sql}");
}
