use adql_parser::ast::{AdqlVersion, Expr, FromItem, JoinCondition, JoinKind};
use adql_parser::parse_query;

#[test]
fn full_clause_set_parses() {
    let sql = "SELECT TOP 10 ra, dec AS declination \
               FROM cat.stars AS s \
               LEFT OUTER JOIN cat.photometry AS p ON s.id = p.star_id \
               WHERE ra BETWEEN 10 AND 20 \
               GROUP BY ra \
               HAVING COUNT(dec) > 1 \
               ORDER BY ra DESC";
    let query = parse_query(sql, AdqlVersion::V2_0).unwrap();

    assert_eq!(query.top, Some(10));
    assert_eq!(query.select_list.len(), 2);
    assert_eq!(query.select_list[1].alias.as_ref().unwrap().text, "declination");
    assert!(query.where_clause.is_some());
    assert_eq!(query.group_by.len(), 1);
    assert!(query.having.is_some());
    assert_eq!(query.order_by.len(), 1);
    assert!(query.order_by[0].descending);

    match query.from.item {
        FromItem::Join { kind, condition, .. } => {
            assert_eq!(kind, JoinKind::LeftOuter);
            assert!(matches!(condition, JoinCondition::On(_)));
        }
        other => panic!("expected a Join FROM item, got {other:?}"),
    }
}

#[test]
fn subquery_in_from_with_alias() {
    let sql = "SELECT x FROM (SELECT ra AS x FROM stars) AS inner_q";
    let query = parse_query(sql, AdqlVersion::V2_0).unwrap();
    match query.from.item {
        FromItem::Subquery { alias, .. } => assert_eq!(alias.text, "inner_q"),
        other => panic!("expected a Subquery FROM item, got {other:?}"),
    }
}

#[test]
fn nested_ctes_with_offset_require_v21() {
    let sql = "WITH bright AS (SELECT ra, dec FROM stars WHERE mag < 5) \
               SELECT ra, dec FROM bright ORDER BY ra OFFSET 5";
    let query = parse_query(sql, AdqlVersion::V2_1).unwrap();
    assert_eq!(query.with.len(), 1);
    assert_eq!(query.with[0].label.text, "bright");
    assert_eq!(query.offset, Some(5));

    let err = parse_query(sql, AdqlVersion::V2_0).unwrap_err();
    assert!(err.to_string().contains("WITH") || err.to_string().contains("unexpected"));
}

#[test]
fn delimited_identifiers_keep_case_sensitivity_marker() {
    let query = parse_query("SELECT \"Ra\" FROM \"Stars\"", AdqlVersion::V2_0).unwrap();
    match &query.select_list[0].expr {
        Expr::ColumnRef { name, .. } => {
            assert!(name.case_sensitive);
            assert_eq!(name.text, "\"Ra\"");
        }
        other => panic!("expected a ColumnRef, got {other:?}"),
    }
}

#[test]
fn predicate_combinators_parse() {
    let sql = "SELECT ra FROM stars \
               WHERE (ra > 1 AND dec < 2) OR ra IS NULL OR name LIKE 'abc%' \
               OR ra NOT IN (1, 2, 3) OR NOT EXISTS (SELECT 1 FROM other)";
    let query = parse_query(sql, AdqlVersion::V2_0).unwrap();
    assert!(query.where_clause.is_some());
}

#[test]
fn bare_comma_in_from_list_is_rejected() {
    // The FROM clause is a single table reference, optionally built up by
    // JOIN; a bare comma (no JOIN keyword) is a syntax error rather than an
    // implicit cross join.
    assert!(parse_query("SELECT * FROM a, b", AdqlVersion::V2_0).is_err());
}

#[test]
fn geometry_function_with_natural_join_translation_precursor() {
    let sql = "SELECT POINT('ICRS', ra, dec) FROM a NATURAL JOIN b";
    let query = parse_query(sql, AdqlVersion::V2_0).unwrap();
    match query.from.item {
        FromItem::Join { condition: JoinCondition::Natural, .. } => {}
        other => panic!("expected a NATURAL Join, got {other:?}"),
    }
}
