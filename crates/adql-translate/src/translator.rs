use adql_core::{AdqlError, AdqlResult, Identifier};
use adql_metadata::{Catalog, Datatype, DatatypeKind, Table};
use adql_parser::ast::{
    ArithmeticOp, ComparisonOp, Expr, FromItem, GeometryFunctionKind, JoinCondition, JoinKind, OrderItem, Query, RawIdentifier, SelectItem, SetQuantifier,
    TableRef,
};
use adql_udf::FunctionRegistry;

use crate::dialect::Dialect;
use crate::scope::{matches_ref, merge_with_usual_columns, natural_usual_columns, relabel, same_identifier, Scope, ScopeColumn};
use crate::udf::{translate_call, UdfTranslator};

/// Renders a checked query as one dialect's SQL text (§4.9 C9). `query` must
/// already have passed `adql_check::check` successfully: every identifier
/// this visitor touches is expected to carry a resolved link, and it fails
/// fast (no accumulation) if one doesn't, since re-validating here would
/// duplicate the checker's work.
pub fn translate(catalog: &Catalog, registry: &FunctionRegistry, query: &Query, dialect: &dyn Dialect, udf_translator: Option<&dyn UdfTranslator>) -> AdqlResult<String> {
    let translator = Translator { catalog, registry, dialect, udf_translator };
    let (sql, _) = translator.translate_query(query, &[], &[])?;
    Ok(sql)
}

struct Translator<'a> {
    catalog: &'a Catalog,
    registry: &'a FunctionRegistry,
    dialect: &'a dyn Dialect,
    udf_translator: Option<&'a dyn UdfTranslator>,
}

impl<'a> Translator<'a> {
    /// Translates one query (top-level, CTE body, FROM subquery or
    /// correlated EXISTS body), returning its SQL plus the scope it exposes
    /// to an enclosing query when mounted as a FROM item (§4.8's "subquery
    /// output columns", recomputed here rather than reusing the checker's).
    fn translate_query(&self, query: &Query, outer_ctes: &[(Identifier, Scope)], outer_scopes: &[&Scope]) -> AdqlResult<(String, Scope)> {
        let mut ctes: Vec<(Identifier, Scope)> = outer_ctes.to_vec();
        let mut with_parts = Vec::new();
        for cte in &query.with {
            let (sub_sql, sub_scope) = self.translate_query(&cte.query, &ctes, &[])?;
            let label = Identifier::new(cte.label.text.clone(), cte.label.case_sensitive)?;
            let quoted_label = self.dialect.quote(&label.adql_name().to_lowercase(), true);
            let column_list = if self.dialect.requires_cte_column_list() {
                let cols = sub_scope.columns.iter().map(|c| c.identifier.denormalize()).collect::<Vec<_>>().join(", ");
                format!("({cols})")
            } else {
                String::new()
            };
            with_parts.push(format!("{quoted_label}{column_list} AS ({sub_sql})"));
            ctes.push((label, sub_scope));
        }

        let (from_sql, own_scope) = self.translate_from_item(&query.from.item, &ctes)?;
        let mut scopes: Vec<&Scope> = outer_scopes.to_vec();
        scopes.push(&own_scope);

        let mut sql = String::new();
        if !with_parts.is_empty() {
            sql.push_str("WITH ");
            sql.push_str(&with_parts.join(", "));
            sql.push(' ');
        }
        sql.push_str("SELECT ");

        let order_by_present = !query.order_by.is_empty();
        let plan = self.dialect.translate_offset(query.top, query.offset, order_by_present);
        if let Some(prefix) = &plan.select_prefix {
            sql.push_str(prefix);
            sql.push(' ');
        }
        if let Some(quantifier) = query.set_quantifier {
            sql.push_str(match quantifier {
                SetQuantifier::Distinct => "DISTINCT ",
                SetQuantifier::All => "ALL ",
            });
        }

        if query.select_all {
            sql.push('*');
        } else {
            let items = query
                .select_list
                .iter()
                .map(|item| self.translate_select_item(item, &ctes, &scopes))
                .collect::<AdqlResult<Vec<_>>>()?;
            sql.push_str(&items.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&from_sql);

        if let Some(where_clause) = &query.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&self.translate_expr(where_clause, &ctes, &scopes)?);
        }
        if !query.group_by.is_empty() {
            let items = query.group_by.iter().map(|e| self.translate_expr(e, &ctes, &scopes)).collect::<AdqlResult<Vec<_>>>()?;
            sql.push_str(" GROUP BY ");
            sql.push_str(&items.join(", "));
        }
        if let Some(having) = &query.having {
            sql.push_str(" HAVING ");
            sql.push_str(&self.translate_expr(having, &ctes, &scopes)?);
        }

        let mut order_by_sql = Vec::with_capacity(query.order_by.len());
        for item in &query.order_by {
            order_by_sql.push(self.translate_order_item(item, query, &ctes, &scopes)?);
        }
        if order_by_sql.is_empty() {
            if let Some(synthesized) = &plan.synthesized_order_by {
                order_by_sql.push(synthesized.clone());
            }
        }
        if !order_by_sql.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_by_sql.join(", "));
        }
        if let Some(trailing) = &plan.trailing {
            sql.push(' ');
            sql.push_str(trailing);
        }

        let output_scope = self.build_output_scope(query, &own_scope);
        Ok((sql, output_scope))
    }

    /// The columns `query` exposes when used as a FROM item by an
    /// enclosing query: a `SELECT *` passes its own scope through
    /// untouched; otherwise each select-list item contributes its alias
    /// (or, for a bare column reference, its own name).
    fn build_output_scope(&self, query: &Query, own_scope: &Scope) -> Scope {
        if query.select_all {
            return own_scope.clone();
        }
        let mut output = Scope::default();
        for item in &query.select_list {
            let label = match &item.alias {
                Some(alias) => Identifier::new(alias.text.clone(), alias.case_sensitive).ok(),
                None => match &item.expr {
                    Expr::ColumnRef { name, .. } => Identifier::new(name.text.clone(), name.case_sensitive).ok(),
                    _ => None,
                },
            };
            let Some(identifier) = label else { continue };
            output.push(ScopeColumn {
                table_label: None,
                identifier,
                hidden_unqualified: false,
            });
        }
        output
    }

    fn translate_select_item(&self, item: &SelectItem, ctes: &[(Identifier, Scope)], scopes: &[&Scope]) -> AdqlResult<String> {
        let expr_sql = self.translate_expr(&item.expr, ctes, scopes)?;
        match &item.alias {
            Some(alias) => Ok(format!("{expr_sql} AS {}", self.dialect.quote(&alias.text, alias.case_sensitive))),
            None => Ok(expr_sql),
        }
    }

    /// `ORDER BY` may name a select-list alias directly (§4.7); that takes
    /// priority over resolving the name as an ordinary visible column.
    fn translate_order_item(&self, item: &OrderItem, query: &Query, ctes: &[(Identifier, Scope)], scopes: &[&Scope]) -> AdqlResult<String> {
        let direction = if item.descending { " DESC" } else { "" };
        if let Expr::ColumnRef { table: None, name, .. } = &item.expr {
            let aliased = query.select_list.iter().find(|sel| sel.alias.as_ref().is_some_and(|a| raw_matches(a, name)));
            if let Some(select_item) = aliased {
                let body = self.translate_expr(&select_item.expr, ctes, scopes)?;
                return Ok(format!("{body}{direction}"));
            }
        }
        let body = self.translate_expr(&item.expr, ctes, scopes)?;
        Ok(format!("{body}{direction}"))
    }

    fn translate_from_item(&self, item: &FromItem, ctes: &[(Identifier, Scope)]) -> AdqlResult<(String, Scope)> {
        match item {
            FromItem::Table { name, alias } => self.translate_table_item(name, alias, ctes),
            FromItem::Subquery { query, alias } => {
                let (sub_sql, sub_scope) = self.translate_query(query, ctes, &[])?;
                let label = Identifier::new(alias.text.clone(), alias.case_sensitive)?;
                let quoted_label = self.dialect.quote(&label.adql_name().to_lowercase(), true);
                Ok((format!("({sub_sql}) AS {quoted_label}"), relabel(sub_scope, Some(label))))
            }
            FromItem::Join { left, right, kind, condition } => {
                let (left_sql, left_scope) = self.translate_from_item(left, ctes)?;
                let (right_sql, right_scope) = self.translate_from_item(right, ctes)?;
                self.translate_join(left_sql, left_scope, right_sql, right_scope, *kind, condition, ctes)
            }
        }
    }

    fn translate_table_item(&self, table_ref: &TableRef, alias: &Option<RawIdentifier>, ctes: &[(Identifier, Scope)]) -> AdqlResult<(String, Scope)> {
        if table_ref.schema.is_none() {
            if let Some((cte_label, cte_scope)) = ctes.iter().rev().find(|(label, _)| matches_ref(label, &table_ref.name)) {
                let label = alias_or_name(alias, &table_ref.name)?;
                let quoted_cte = self.dialect.quote(&cte_label.adql_name().to_lowercase(), true);
                let quoted_label = self.dialect.quote(&label.adql_name().to_lowercase(), true);
                let sql = if alias.is_some() { format!("{quoted_cte} AS {quoted_label}") } else { quoted_cte };
                return Ok((sql, relabel(cte_scope.clone(), Some(label))));
            }
        }

        let table_id = table_ref
            .resolved_table
            .get()
            .ok_or_else(|| AdqlError::translation(format!("table reference \"{}\" was not resolved before translation", table_ref.name.text)))?;
        let table = self
            .catalog
            .table(table_id)
            .ok_or_else(|| AdqlError::translation(format!("resolved table \"{}\" is no longer present in the catalog", table_ref.name.text)))?;

        let label = alias_or_name(alias, &table_ref.name)?;
        let quoted_label = self.dialect.quote(&label.adql_name().to_lowercase(), true);
        let sql = format!("{} AS {quoted_label}", self.table_sql_name(table));

        let mut scope = Scope::default();
        for col_id in table.columns() {
            if let Some(col) = self.catalog.column(col_id) {
                scope.push(ScopeColumn {
                    table_label: Some(label.clone()),
                    identifier: col.identifier.clone(),
                    hidden_unqualified: false,
                });
            }
        }
        Ok((sql, scope))
    }

    fn table_sql_name(&self, table: &Table) -> String {
        let name = self.dialect.quote(table.identifier.db_name(), table.identifier.case_sensitive());
        match table.schema.and_then(|id| self.catalog.schema(id)) {
            Some(schema) => format!("{}.{name}", self.dialect.quote(schema.identifier.db_name(), schema.identifier.case_sensitive())),
            None => name,
        }
    }

    fn translate_join(
        &self,
        left_sql: String,
        left_scope: Scope,
        right_sql: String,
        right_scope: Scope,
        kind: JoinKind,
        condition: &JoinCondition,
        ctes: &[(Identifier, Scope)],
    ) -> AdqlResult<(String, Scope)> {
        let kind_sql = join_kind_sql(kind);
        match condition {
            JoinCondition::Natural => {
                let usual = natural_usual_columns(&left_scope, &right_scope);
                let scope = merge_with_usual_columns(left_scope, right_scope, usual);
                Ok((format!("{left_sql} NATURAL {kind_sql} JOIN {right_sql}"), scope))
            }
            JoinCondition::Using(names) => {
                let usual = self.using_usual_columns(&left_scope, &right_scope, names)?;
                if self.dialect.supports_using() {
                    let col_list = usual.iter().map(|c| c.identifier.denormalize()).collect::<Vec<_>>().join(", ");
                    let sql = format!("{left_sql} {kind_sql} JOIN {right_sql} USING ({col_list})");
                    let scope = merge_with_usual_columns(left_scope, right_scope, usual);
                    Ok((sql, scope))
                } else {
                    let on_sql = self.using_as_on_conjunction(&left_scope, &right_scope, &usual)?;
                    let sql = format!("{left_sql} {kind_sql} JOIN {right_sql} ON {on_sql}");
                    let scope = merge_with_usual_columns(left_scope, right_scope, usual);
                    Ok((sql, scope))
                }
            }
            JoinCondition::On(expr) => {
                let mut combined = left_scope;
                combined.extend(right_scope);
                let expr_sql = self.translate_expr(expr, ctes, &[&combined])?;
                Ok((format!("{left_sql} {kind_sql} JOIN {right_sql} ON {expr_sql}"), combined))
            }
            JoinCondition::None => {
                let mut combined = left_scope;
                combined.extend(right_scope);
                Ok((format!("{left_sql} {kind_sql} JOIN {right_sql}"), combined))
            }
        }
    }

    fn using_usual_columns(&self, left: &Scope, right: &Scope, names: &[RawIdentifier]) -> AdqlResult<Vec<ScopeColumn>> {
        let mut usual = Vec::with_capacity(names.len());
        for name in names {
            match (left.resolve(None, name), right.resolve(None, name)) {
                (Some(l), Some(_)) => usual.push(ScopeColumn {
                    table_label: None,
                    identifier: l.identifier.clone(),
                    hidden_unqualified: false,
                }),
                _ => return Err(AdqlError::translation(format!("USING column \"{}\" does not exist on both sides of the join", name.text))),
            }
        }
        Ok(usual)
    }

    /// Rewrites a `USING` join as an explicit `ON` conjunction for dialects
    /// without native `USING` support (§4.9, SQL Server).
    fn using_as_on_conjunction(&self, left: &Scope, right: &Scope, usual: &[ScopeColumn]) -> AdqlResult<String> {
        let mut parts = Vec::with_capacity(usual.len());
        for col in usual {
            let l = left
                .columns
                .iter()
                .find(|c| same_identifier(&c.identifier, &col.identifier))
                .ok_or_else(|| AdqlError::translation("USING column vanished from the left side during join translation"))?;
            let r = right
                .columns
                .iter()
                .find(|c| same_identifier(&c.identifier, &col.identifier))
                .ok_or_else(|| AdqlError::translation("USING column vanished from the right side during join translation"))?;
            parts.push(format!("{} = {}", self.qualify(l), self.qualify(r)));
        }
        Ok(parts.join(" AND "))
    }

    fn qualify(&self, col: &ScopeColumn) -> String {
        match &col.table_label {
            Some(label) => format!("{}.{}", label.adql_name().to_lowercase(), col.identifier.denormalize()),
            None => col.identifier.denormalize(),
        }
    }

    fn translate_column_ref(&self, table: Option<&RawIdentifier>, name: &RawIdentifier, scopes: &[&Scope]) -> AdqlResult<String> {
        match resolve_in_scopes(scopes, table, name) {
            Some(col) => Ok(self.qualify(col)),
            None => Err(AdqlError::translation(format!("column \"{}\" could not be located during translation", qualified_name(table, name)))),
        }
    }

    fn translate_expr(&self, expr: &Expr, ctes: &[(Identifier, Scope)], scopes: &[&Scope]) -> AdqlResult<String> {
        match expr {
            Expr::ColumnRef { table, name, .. } => self.translate_column_ref(table.as_ref(), name, scopes),
            Expr::NumericConstant { text, .. } => Ok(text.clone()),
            Expr::StringConstant { value, .. } => Ok(self.dialect.translate_string_constant(value)),
            Expr::Arithmetic { op, left, right, .. } => {
                let l = self.translate_expr(left, ctes, scopes)?;
                let r = self.translate_expr(right, ctes, scopes)?;
                Ok(format!("({l} {} {r})", arithmetic_op_sql(*op)))
            }
            Expr::Negate { operand, .. } => Ok(format!("(-{})", self.translate_expr(operand, ctes, scopes)?)),
            Expr::Concat { left, right, .. } => {
                let l = self.translate_expr(left, ctes, scopes)?;
                let r = self.translate_expr(right, ctes, scopes)?;
                Ok(self.dialect.translate_concat(&[l, r]))
            }
            Expr::FunctionCall { name, args, .. } => self.translate_function_call(name, args, ctes, scopes),
            Expr::GeometryFunction { kind, args, .. } => self.translate_geometry_function(*kind, args, ctes, scopes),
            Expr::Comparison { op, left, right, .. } => {
                let l = self.translate_expr(left, ctes, scopes)?;
                let r = self.translate_expr(right, ctes, scopes)?;
                Ok(format!("{l} {} {r}", comparison_op_sql(*op)))
            }
            Expr::Between { operand, low, high, negated, .. } => {
                let o = self.translate_expr(operand, ctes, scopes)?;
                let l = self.translate_expr(low, ctes, scopes)?;
                let h = self.translate_expr(high, ctes, scopes)?;
                let not = if *negated { "NOT " } else { "" };
                Ok(format!("{o} {not}BETWEEN {l} AND {h}"))
            }
            Expr::Like { operand, pattern, negated, .. } => {
                let o = self.translate_expr(operand, ctes, scopes)?;
                let p = self.translate_expr(pattern, ctes, scopes)?;
                let not = if *negated { "NOT " } else { "" };
                Ok(format!("{o} {not}LIKE {p}"))
            }
            Expr::InList { operand, list, negated, .. } => {
                let o = self.translate_expr(operand, ctes, scopes)?;
                let items = list.iter().map(|e| self.translate_expr(e, ctes, scopes)).collect::<AdqlResult<Vec<_>>>()?;
                let not = if *negated { "NOT " } else { "" };
                Ok(format!("{o} {not}IN ({})", items.join(", ")))
            }
            Expr::IsNull { operand, negated, .. } => {
                let o = self.translate_expr(operand, ctes, scopes)?;
                Ok(format!("{o} {}", if *negated { "IS NOT NULL" } else { "IS NULL" }))
            }
            Expr::Exists { query, .. } => {
                let (sub_sql, _) = self.translate_query(query, ctes, scopes)?;
                Ok(format!("EXISTS ({sub_sql})"))
            }
            Expr::And { left, right, .. } => Ok(format!("({} AND {})", self.translate_expr(left, ctes, scopes)?, self.translate_expr(right, ctes, scopes)?)),
            Expr::Or { left, right, .. } => Ok(format!("({} OR {})", self.translate_expr(left, ctes, scopes)?, self.translate_expr(right, ctes, scopes)?)),
            Expr::Not { operand, .. } => Ok(format!("NOT ({})", self.translate_expr(operand, ctes, scopes)?)),
        }
    }

    fn translate_function_call(&self, name: &RawIdentifier, args: &[Expr], ctes: &[(Identifier, Scope)], scopes: &[&Scope]) -> AdqlResult<String> {
        let arg_sql = args.iter().map(|a| self.translate_expr(a, ctes, scopes)).collect::<AdqlResult<Vec<_>>>()?;
        if let Some(sql) = self.dialect.translate_math_fn(&name.text, &arg_sql) {
            return Ok(sql);
        }
        let arg_types: Vec<Datatype> = args.iter().map(|a| self.expr_datatype(a)).collect();
        Ok(translate_call(self.registry, &name.text, &arg_types, &arg_sql, self.udf_translator))
    }

    fn translate_geometry_function(&self, kind: GeometryFunctionKind, args: &[Expr], ctes: &[(Identifier, Scope)], scopes: &[&Scope]) -> AdqlResult<String> {
        let arg_sql = args.iter().map(|a| self.translate_expr(a, ctes, scopes)).collect::<AdqlResult<Vec<_>>>()?;
        match self.dialect.translate_geometry_fn(kind, &arg_sql) {
            Some(sql) => Ok(sql),
            None => Ok(format!("{}({})", kind.name(), arg_sql.join(", "))),
        }
    }

    /// Reads the type a (sub-)expression was checked to carry, from the
    /// resolution `Cell`s the checker already populated, rather than
    /// re-running inference: the translator treats the checked tree as
    /// read-only (§9).
    fn expr_datatype(&self, expr: &Expr) -> Datatype {
        match expr {
            Expr::ColumnRef { resolved_column, .. } => resolved_column
                .get()
                .and_then(|id| self.catalog.column(id))
                .and_then(|c| c.datatype)
                .unwrap_or_else(|| Datatype::new(DatatypeKind::Unknown)),
            Expr::NumericConstant { .. } => Datatype::new(DatatypeKind::Double),
            Expr::StringConstant { .. } => Datatype::new(DatatypeKind::Varchar),
            Expr::Arithmetic { .. } | Expr::Negate { .. } => Datatype::new(DatatypeKind::Double),
            Expr::Concat { .. } => Datatype::new(DatatypeKind::Varchar),
            Expr::FunctionCall { resolved_type, .. } => resolved_type.get().unwrap_or_else(|| Datatype::new(DatatypeKind::Unknown)),
            Expr::GeometryFunction { kind, .. } => geometry_return_type(*kind),
            Expr::Comparison { .. }
            | Expr::Between { .. }
            | Expr::Like { .. }
            | Expr::InList { .. }
            | Expr::IsNull { .. }
            | Expr::Exists { .. }
            | Expr::And { .. }
            | Expr::Or { .. }
            | Expr::Not { .. } => Datatype::new(DatatypeKind::Smallint),
        }
    }
}

fn geometry_return_type(kind: GeometryFunctionKind) -> Datatype {
    use GeometryFunctionKind::*;
    match kind {
        Point | Centroid => Datatype::new(DatatypeKind::Point),
        Circle | Box | Polygon | Region => Datatype::new(DatatypeKind::Region),
        Contains | Intersects => Datatype::new(DatatypeKind::Smallint),
        Distance | Area | Coord1 | Coord2 => Datatype::new(DatatypeKind::Double),
        Coordsys => Datatype::new(DatatypeKind::Varchar),
    }
}

fn resolve_in_scopes<'s>(scopes: &[&'s Scope], table: Option<&RawIdentifier>, name: &RawIdentifier) -> Option<&'s ScopeColumn> {
    scopes.iter().rev().find_map(|scope| scope.resolve(table, name))
}

fn alias_or_name(alias: &Option<RawIdentifier>, name: &RawIdentifier) -> AdqlResult<Identifier> {
    let token = alias.as_ref().unwrap_or(name);
    Identifier::new(token.text.clone(), token.case_sensitive)
}

fn qualified_name(table: Option<&RawIdentifier>, name: &RawIdentifier) -> String {
    match table {
        Some(t) => format!("{}.{}", t.text, name.text),
        None => name.text.clone(),
    }
}

fn raw_matches(alias: &RawIdentifier, token: &RawIdentifier) -> bool {
    if alias.case_sensitive {
        alias.text == token.text
    } else {
        alias.text.eq_ignore_ascii_case(&token.text)
    }
}

fn join_kind_sql(kind: JoinKind) -> &'static str {
    match kind {
        JoinKind::Inner => "INNER",
        JoinKind::LeftOuter => "LEFT OUTER",
        JoinKind::RightOuter => "RIGHT OUTER",
        JoinKind::FullOuter => "FULL OUTER",
    }
}

fn arithmetic_op_sql(op: ArithmeticOp) -> &'static str {
    match op {
        ArithmeticOp::Add => "+",
        ArithmeticOp::Sub => "-",
        ArithmeticOp::Mul => "*",
        ArithmeticOp::Div => "/",
    }
}

fn comparison_op_sql(op: ComparisonOp) -> &'static str {
    match op {
        ComparisonOp::Eq => "=",
        ComparisonOp::Ne => "<>",
        ComparisonOp::Lt => "<",
        ComparisonOp::Le => "<=",
        ComparisonOp::Gt => ">",
        ComparisonOp::Ge => ">=",
    }
}

#[cfg(test)]
mod tests {
    use adql_core::Identifier as Ident;
    use adql_metadata::{ColumnFlags, TableKind};
    use adql_parser::{parse_query, AdqlVersion};

    use super::*;
    use crate::dialects::{GenericDialect, SqlServerDialect};

    fn two_table_catalog() -> Catalog {
        let mut cat = Catalog::new();
        let a = cat.add_table(None, "aTable", TableKind::Table, None, None, None).unwrap();
        for name in ["id", "name", "aColumn"] {
            cat.add_column(a, Ident::normalize(name).unwrap(), Some(Datatype::new(DatatypeKind::Double)), None, None, None, None, ColumnFlags::default(), None)
                .unwrap();
        }
        let b = cat.add_table(None, "anotherTable", TableKind::Table, None, None, None).unwrap();
        for name in ["id", "name", "anotherColumn"] {
            cat.add_column(b, Ident::normalize(name).unwrap(), Some(Datatype::new(DatatypeKind::Double)), None, None, None, None, ColumnFlags::default(), None)
                .unwrap();
        }
        cat
    }

    fn checked_query(cat: &Catalog, registry: &FunctionRegistry, sql: &str) -> Query {
        let query = parse_query(sql, AdqlVersion::V2_1).unwrap();
        let report = adql_check::check(cat, registry, &query, &adql_check::CheckerConfig::default());
        assert!(report.is_ok(), "{:?}", report.errors());
        query
    }

    #[test]
    fn natural_join_matches_the_worked_example() {
        let cat = two_table_catalog();
        let registry = FunctionRegistry::new();
        let query = checked_query(&cat, &registry, "SELECT id, name, aColumn, anotherColumn FROM aTable A NATURAL JOIN anotherTable B");
        let sql = translate(&cat, &registry, &query, &GenericDialect, None).unwrap();
        assert_eq!(
            sql,
            "SELECT id, name, a.aColumn, b.anotherColumn FROM aTable AS \"a\" NATURAL INNER JOIN anotherTable AS \"b\""
        );
    }

    #[test]
    fn where_clause_and_order_by_alias() {
        let cat = two_table_catalog();
        let registry = FunctionRegistry::new();
        let query = checked_query(&cat, &registry, "SELECT id AS anid FROM aTable WHERE id > 1 ORDER BY anid DESC");
        let sql = translate(&cat, &registry, &query, &GenericDialect, None).unwrap();
        assert_eq!(sql, "SELECT atable.id AS anid FROM aTable AS \"atable\" WHERE atable.id > 1 ORDER BY atable.id DESC");
    }

    #[test]
    fn sqlserver_using_join_is_rewritten_to_on() {
        let cat = two_table_catalog();
        let registry = FunctionRegistry::new();
        let query = checked_query(&cat, &registry, "SELECT id FROM aTable A JOIN anotherTable B USING(id)");
        let sql = translate(&cat, &registry, &query, &SqlServerDialect, None).unwrap();
        assert_eq!(sql, "SELECT id FROM aTable AS \"a\" INNER JOIN anotherTable AS \"b\" ON a.id = b.id");
    }

    #[test]
    fn top_becomes_a_select_prefix_on_sqlserver() {
        let cat = two_table_catalog();
        let registry = FunctionRegistry::new();
        let query = checked_query(&cat, &registry, "SELECT TOP 5 id FROM aTable");
        let sql = translate(&cat, &registry, &query, &SqlServerDialect, None).unwrap();
        assert_eq!(sql, "SELECT TOP 5 atable.id FROM aTable AS \"atable\"");
    }
}
