use adql_core::{AdqlError, Identifier, TextPosition};
use adql_metadata::{Catalog, Datatype, DatatypeKind};
use adql_parser::ast::{Expr, FromItem, GeometryFunctionKind, JoinCondition, OrderItem, Query, RawIdentifier, TableRef};
use adql_stcs::{parse_region, CoordinateSystem, Region};
use adql_udf::{FunctionDef, FunctionRegistry};

use crate::builtins;
use crate::config::{CheckerConfig, RegionArgumentPolicy, UdfPolicy};
use crate::report::CheckReport;
use crate::scope::{matches_ref, same_identifier, unknown_datatype, ColumnLookup, FromScope, VisibleColumn};

/// Checks `query` against `catalog`'s metadata and `registry`'s declared
/// UDFs (§4.8). Accumulates every diagnostic found in one pass (not just the
/// first) and links the AST's `Cell`-backed resolution fields as it goes, so
/// a later translation pass can walk the tree without re-resolving names.
pub fn check(catalog: &Catalog, registry: &FunctionRegistry, query: &Query, config: &CheckerConfig) -> CheckReport {
    let checker = Checker { catalog, registry, config };
    let mut report = CheckReport::default();
    checker.check_query(query, &[], &[], &mut report);
    report.finish()
}

struct Checker<'a> {
    catalog: &'a Catalog,
    registry: &'a FunctionRegistry,
    config: &'a CheckerConfig,
}

impl<'a> Checker<'a> {
    /// Checks one query (top-level or nested, via `WITH`, a FROM subquery or
    /// a correlated `EXISTS`), returning the `FromScope` it exposes to an
    /// enclosing query when used as a CTE or subquery FROM-item.
    fn check_query(
        &self,
        query: &Query,
        outer_ctes: &[(Identifier, FromScope)],
        outer_scopes: &[&FromScope],
        report: &mut CheckReport,
    ) -> FromScope {
        let mut ctes: Vec<(Identifier, FromScope)> = outer_ctes.to_vec();
        for cte in &query.with {
            // CTE bodies are not correlated: they see earlier CTEs in the
            // same WITH clause but nothing from an enclosing query.
            let scope = self.check_query(&cte.query, &ctes, &[], report);
            match Identifier::new(cte.label.text.clone(), cte.label.case_sensitive) {
                Ok(label) => ctes.push((label, scope)),
                Err(err) => report.push(err),
            }
        }

        let own_scope = self.build_from_scope(&query.from.item, &ctes, report);
        let mut scopes: Vec<&FromScope> = outer_scopes.to_vec();
        scopes.push(&own_scope);

        let mut item_types = Vec::with_capacity(query.select_list.len());
        for item in &query.select_list {
            let ty = self.infer_expr(&item.expr, &ctes, &scopes, report);
            if let Expr::ColumnRef { resolved_column, .. } = &item.expr {
                item.resolved_output_column.set(resolved_column.get());
            }
            item_types.push(ty);
        }

        for expr in &query.group_by {
            self.infer_expr(expr, &ctes, &scopes, report);
        }
        if let Some(having) = &query.having {
            self.infer_expr(having, &ctes, &scopes, report);
        }
        if let Some(where_clause) = &query.where_clause {
            self.infer_expr(where_clause, &ctes, &scopes, report);
        }
        for order_item in &query.order_by {
            self.check_order_item(order_item, query, &ctes, &scopes, report);
        }

        self.build_output_scope(query, &own_scope, &item_types)
    }

    /// The set of columns exposed by `query`'s own select list, used by an
    /// enclosing query when this one is a CTE or FROM subquery.
    fn build_output_scope(&self, query: &Query, own_scope: &FromScope, item_types: &[Datatype]) -> FromScope {
        if query.select_all {
            return own_scope.clone();
        }
        let mut output = FromScope::default();
        for (item, ty) in query.select_list.iter().zip(item_types) {
            let label = match &item.alias {
                Some(alias) => Identifier::new(alias.text.clone(), alias.case_sensitive).ok(),
                None => match &item.expr {
                    Expr::ColumnRef { name, .. } => Identifier::new(name.text.clone(), name.case_sensitive).ok(),
                    _ => None,
                },
            };
            let Some(identifier) = label else { continue };
            let column_id = match &item.expr {
                Expr::ColumnRef { resolved_column, .. } => resolved_column.get(),
                _ => None,
            };
            output.push(VisibleColumn::new(None, identifier, *ty, column_id));
        }
        output
    }

    /// `ORDER BY` may reference a select-list alias directly (§4.7); that
    /// takes priority over resolving the name as an ordinary column.
    fn check_order_item(
        &self,
        item: &OrderItem,
        query: &Query,
        ctes: &[(Identifier, FromScope)],
        scopes: &[&FromScope],
        report: &mut CheckReport,
    ) {
        if let Expr::ColumnRef { table: None, name, resolved_column, .. } = &item.expr {
            let matched = query.select_list.iter().find(|sel| {
                sel.alias
                    .as_ref()
                    .and_then(|a| Identifier::new(a.text.clone(), a.case_sensitive).ok())
                    .map(|id| matches_ref(&id, name))
                    .unwrap_or(false)
            });
            if let Some(select_item) = matched {
                if let Expr::ColumnRef { resolved_column: source, .. } = &select_item.expr {
                    resolved_column.set(source.get());
                }
                return;
            }
        }
        self.infer_expr(&item.expr, ctes, scopes, report);
    }

    fn build_from_scope(&self, item: &FromItem, ctes: &[(Identifier, FromScope)], report: &mut CheckReport) -> FromScope {
        match item {
            FromItem::Table { name, alias } => self.resolve_table_item(name, alias, ctes, report),
            FromItem::Subquery { query, alias } => {
                let scope = self.check_query(query, ctes, &[], report);
                let label = Identifier::new(alias.text.clone(), alias.case_sensitive).ok();
                relabel(scope, label)
            }
            FromItem::Join { left, right, condition, .. } => {
                let left_scope = self.build_from_scope(left, ctes, report);
                let right_scope = self.build_from_scope(right, ctes, report);
                self.combine_join_scopes(left_scope, right_scope, condition, ctes, report)
            }
        }
    }

    fn resolve_table_item(
        &self,
        table_ref: &TableRef,
        alias: &Option<RawIdentifier>,
        ctes: &[(Identifier, FromScope)],
        report: &mut CheckReport,
    ) -> FromScope {
        if table_ref.schema.is_none() {
            if let Some((_, cte_scope)) = ctes.iter().rev().find(|(label, _)| matches_ref(label, &table_ref.name)) {
                let label = alias_or_name(alias, &table_ref.name);
                return relabel(cte_scope.clone(), label);
            }
        }

        let schema_id = match &table_ref.schema {
            Some(schema_token) => {
                let matches: Vec<_> = self.catalog.schemas().filter(|s| matches_ref(&s.identifier, schema_token)).collect();
                match matches.as_slice() {
                    [] => {
                        report.push(AdqlError::unresolved_identifier(
                            format!("Unresolved schema: \"{}\"", schema_token.text),
                            schema_token.position,
                            vec![],
                        ));
                        return FromScope::default();
                    }
                    [single] => Some(single.id),
                    many => {
                        report.push(AdqlError::unresolved_identifier(
                            format!("Ambiguous schema: \"{}\"", schema_token.text),
                            schema_token.position,
                            many.iter().map(|s| s.identifier.denormalize()).collect(),
                        ));
                        return FromScope::default();
                    }
                }
            }
            None => None,
        };

        let candidates: Vec<_> = self
            .catalog
            .tables()
            .filter(|t| schema_id.map(|s| t.schema == Some(s)).unwrap_or(true))
            .filter(|t| matches_ref(&t.identifier, &table_ref.name))
            .collect();

        let table = match candidates.as_slice() {
            [] => {
                report.push(AdqlError::unresolved_identifier(
                    format!("Unresolved table: \"{}\"", table_ref.name.text),
                    table_ref.name.position,
                    vec![],
                ));
                return FromScope::default();
            }
            [single] => *single,
            many => {
                report.push(AdqlError::unresolved_identifier(
                    format!("Ambiguous table: \"{}\"", table_ref.name.text),
                    table_ref.name.position,
                    many.iter().map(|t| t.identifier.denormalize()).collect(),
                ));
                return FromScope::default();
            }
        };
        table_ref.resolved_table.set(Some(table.id));

        let label = alias_or_name(alias, &table_ref.name);
        let mut scope = FromScope::default();
        for col_id in table.columns() {
            if let Some(col) = self.catalog.column(col_id) {
                scope.push(VisibleColumn::new(
                    label.clone(),
                    col.identifier.clone(),
                    col.datatype.unwrap_or_else(unknown_datatype),
                    Some(col_id),
                ));
            }
        }
        scope
    }

    fn combine_join_scopes(
        &self,
        left: FromScope,
        right: FromScope,
        condition: &JoinCondition,
        ctes: &[(Identifier, FromScope)],
        report: &mut CheckReport,
    ) -> FromScope {
        match condition {
            JoinCondition::Natural => {
                let usual = natural_usual_columns(&left, &right);
                merge_with_usual_columns(left, right, usual)
            }
            JoinCondition::Using(names) => {
                let usual = self.using_usual_columns(&left, &right, names, report);
                merge_with_usual_columns(left, right, usual)
            }
            JoinCondition::On(expr) => {
                let mut combined = left;
                combined.extend(right);
                self.infer_expr(expr, ctes, &[&combined], report);
                combined
            }
            JoinCondition::None => {
                let mut combined = left;
                combined.extend(right);
                combined
            }
        }
    }

    fn using_usual_columns(&self, left: &FromScope, right: &FromScope, names: &[RawIdentifier], report: &mut CheckReport) -> Vec<VisibleColumn> {
        let mut usual = Vec::new();
        for name in names {
            match (left.resolve(None, name), right.resolve(None, name)) {
                (ColumnLookup::Found(l), ColumnLookup::Found(_)) => {
                    usual.push(VisibleColumn::new(None, l.identifier.clone(), l.datatype, l.column_id));
                }
                (ColumnLookup::Ambiguous(candidates), _) | (_, ColumnLookup::Ambiguous(candidates)) => {
                    report.push(AdqlError::unresolved_identifier(
                        format!("Ambiguous USING column: \"{}\"", name.text),
                        name.position,
                        candidates,
                    ));
                }
                _ => {
                    report.push(AdqlError::unresolved_identifier(
                        format!("USING column \"{}\" does not exist on both sides of the join", name.text),
                        name.position,
                        vec![],
                    ));
                }
            }
        }
        usual
    }

    fn infer_expr(&self, expr: &Expr, ctes: &[(Identifier, FromScope)], scopes: &[&FromScope], report: &mut CheckReport) -> Datatype {
        match expr {
            Expr::ColumnRef { table, name, position, resolved_column } => match resolve_in_scopes(scopes, table.as_ref(), name) {
                ColumnLookup::Found(col) => {
                    resolved_column.set(col.column_id);
                    col.datatype
                }
                ColumnLookup::NotFound => {
                    report.push(AdqlError::unresolved_identifier(
                        format!("Unresolved column: \"{}\"", qualified_name(table.as_ref(), name)),
                        *position,
                        vec![],
                    ));
                    unknown_datatype()
                }
                ColumnLookup::Ambiguous(candidates) => {
                    report.push(AdqlError::unresolved_identifier(format!("Ambiguous column: \"{}\"", name.text), *position, candidates));
                    unknown_datatype()
                }
            },
            Expr::NumericConstant { .. } => Datatype::new(DatatypeKind::Double),
            Expr::StringConstant { .. } => Datatype::new(DatatypeKind::Varchar),
            Expr::Arithmetic { left, right, .. } => {
                let lt = self.infer_expr(left, ctes, scopes, report);
                let rt = self.infer_expr(right, ctes, scopes, report);
                require_numeric(lt, left, report);
                require_numeric(rt, right, report);
                Datatype::new(DatatypeKind::Double)
            }
            Expr::Negate { operand, .. } => {
                let t = self.infer_expr(operand, ctes, scopes, report);
                require_numeric(t, operand, report);
                Datatype::new(DatatypeKind::Double)
            }
            Expr::Concat { left, right, .. } => {
                let lt = self.infer_expr(left, ctes, scopes, report);
                let rt = self.infer_expr(right, ctes, scopes, report);
                require_string(lt, left, report);
                require_string(rt, right, report);
                Datatype::new(DatatypeKind::Varchar)
            }
            Expr::FunctionCall { name, args, position, resolved_type } => {
                let arg_types: Vec<Datatype> = args.iter().map(|a| self.infer_expr(a, ctes, scopes, report)).collect();
                let result = self.resolve_function_call(name, &arg_types, *position, report);
                resolved_type.set(Some(result));
                result
            }
            Expr::GeometryFunction { kind, args, position } => self.check_geometry_function(*kind, args, *position, ctes, scopes, report),
            Expr::Comparison { left, right, .. } => {
                let lt = self.infer_expr(left, ctes, scopes, report);
                let rt = self.infer_expr(right, ctes, scopes, report);
                require_compatible(lt, rt, left.position().through(right.position()), report);
                Datatype::new(DatatypeKind::Smallint)
            }
            Expr::Between { operand, low, high, .. } => {
                let ot = self.infer_expr(operand, ctes, scopes, report);
                let lt = self.infer_expr(low, ctes, scopes, report);
                let ht = self.infer_expr(high, ctes, scopes, report);
                require_compatible(ot, lt, operand.position(), report);
                require_compatible(ot, ht, operand.position(), report);
                Datatype::new(DatatypeKind::Smallint)
            }
            Expr::Like { operand, pattern, .. } => {
                let ot = self.infer_expr(operand, ctes, scopes, report);
                let pt = self.infer_expr(pattern, ctes, scopes, report);
                require_string(ot, operand, report);
                require_string(pt, pattern, report);
                Datatype::new(DatatypeKind::Smallint)
            }
            Expr::InList { operand, list, .. } => {
                let ot = self.infer_expr(operand, ctes, scopes, report);
                for item in list {
                    let it = self.infer_expr(item, ctes, scopes, report);
                    require_compatible(ot, it, item.position(), report);
                }
                Datatype::new(DatatypeKind::Smallint)
            }
            Expr::IsNull { operand, .. } => {
                self.infer_expr(operand, ctes, scopes, report);
                Datatype::new(DatatypeKind::Smallint)
            }
            Expr::Exists { query, .. } => {
                self.check_query(query, ctes, scopes, report);
                Datatype::new(DatatypeKind::Smallint)
            }
            Expr::And { left, right, .. } | Expr::Or { left, right, .. } => {
                self.infer_expr(left, ctes, scopes, report);
                self.infer_expr(right, ctes, scopes, report);
                Datatype::new(DatatypeKind::Smallint)
            }
            Expr::Not { operand, .. } => {
                self.infer_expr(operand, ctes, scopes, report);
                Datatype::new(DatatypeKind::Smallint)
            }
        }
    }

    fn check_geometry_function(
        &self,
        kind: GeometryFunctionKind,
        args: &[Expr],
        position: TextPosition,
        ctes: &[(Identifier, FromScope)],
        scopes: &[&FromScope],
        report: &mut CheckReport,
    ) -> Datatype {
        use GeometryFunctionKind::*;

        if !self.config.is_geometry_function_allowed(kind.name()) {
            report.push(AdqlError::disallowed_feature(
                format!("The geometrical function \"{}\" is not available in this implementation!", kind.name()),
                position,
            ));
        }

        match kind {
            Point => self.check_arity(kind, args, 3, position, report),
            Circle => self.check_arity(kind, args, 4, position, report),
            Box => self.check_arity(kind, args, 5, position, report),
            Region | Area | Centroid | Coord1 | Coord2 | Coordsys => self.check_arity(kind, args, 1, position, report),
            Contains | Intersects | Distance => self.check_arity(kind, args, 2, position, report),
            Polygon => {
                if args.len() < 7 || args.len() % 2 == 0 {
                    report.push(AdqlError::syntax(
                        format!(
                            "Incorrect syntax: POLYGON expects a coordinate system and at least 3 coordinate pairs, found {} argument(s)",
                            args.len()
                        ),
                        position,
                        vec![],
                    ));
                }
            }
        }

        match kind {
            Point | Circle | Box | Polygon => {
                if let Some(first) = args.first() {
                    self.check_coordinate_system_literal(first, ctes, scopes, report);
                }
                for coord in args.iter().skip(1) {
                    let t = self.infer_expr(coord, ctes, scopes, report);
                    require_numeric(t, coord, report);
                }
                if matches!(kind, Point) {
                    Datatype::new(DatatypeKind::Point)
                } else {
                    Datatype::new(DatatypeKind::Region)
                }
            }
            Region => {
                if let Some(first) = args.first() {
                    self.check_region_literal(first, ctes, scopes, report);
                }
                Datatype::new(DatatypeKind::Region)
            }
            Contains | Intersects => {
                for arg in args {
                    let t = self.infer_expr(arg, ctes, scopes, report);
                    require_geometry(t, arg.position(), report);
                }
                Datatype::new(DatatypeKind::Smallint)
            }
            Distance => {
                for arg in args {
                    let t = self.infer_expr(arg, ctes, scopes, report);
                    require_geometry(t, arg.position(), report);
                }
                Datatype::new(DatatypeKind::Double)
            }
            Area => {
                self.check_single_geometry_arg(args, ctes, scopes, report);
                Datatype::new(DatatypeKind::Double)
            }
            Centroid => {
                self.check_single_geometry_arg(args, ctes, scopes, report);
                Datatype::new(DatatypeKind::Point)
            }
            Coord1 | Coord2 => {
                self.check_single_geometry_arg(args, ctes, scopes, report);
                Datatype::new(DatatypeKind::Double)
            }
            Coordsys => {
                self.check_single_geometry_arg(args, ctes, scopes, report);
                Datatype::new(DatatypeKind::Varchar)
            }
        }
    }

    fn check_arity(&self, kind: GeometryFunctionKind, args: &[Expr], expected: usize, position: TextPosition, report: &mut CheckReport) {
        if args.len() != expected {
            report.push(AdqlError::syntax(
                format!("Incorrect syntax: {} expects {expected} argument(s), found {}", kind.name(), args.len()),
                position,
                vec![],
            ));
        }
    }

    fn check_single_geometry_arg(&self, args: &[Expr], ctes: &[(Identifier, FromScope)], scopes: &[&FromScope], report: &mut CheckReport) {
        if let Some(arg) = args.first() {
            let t = self.infer_expr(arg, ctes, scopes, report);
            require_geometry(t, arg.position(), report);
        }
    }

    fn check_coordinate_system_literal(&self, expr: &Expr, ctes: &[(Identifier, FromScope)], scopes: &[&FromScope], report: &mut CheckReport) {
        match expr {
            Expr::StringConstant { value, position } => match CoordinateSystem::parse(value) {
                Ok(system) => {
                    if !self.config.is_coordinate_system_allowed(&system) {
                        report.push(AdqlError::disallowed_feature(format!("Coordinate system \"{value}\" is not allowed"), *position));
                    }
                }
                Err(err) => report.push(err),
            },
            other if self.config.region_argument_policy == RegionArgumentPolicy::StrictLiteralOnly => {
                report.push(AdqlError::type_mismatch("a string literal coordinate system was expected", other.position()));
            }
            other => {
                let t = self.infer_expr(other, ctes, scopes, report);
                require_string(t, other, report);
            }
        }
    }

    fn check_region_literal(&self, expr: &Expr, ctes: &[(Identifier, FromScope)], scopes: &[&FromScope], report: &mut CheckReport) {
        match expr {
            Expr::StringConstant { value, position } => match parse_region(value) {
                Ok(region) => {
                    if let Some(system) = region_coosys(&region) {
                        if !self.config.is_coordinate_system_allowed(system) {
                            report.push(AdqlError::disallowed_feature(format!("Coordinate system in REGION(\"{value}\") is not allowed"), *position));
                        }
                    }
                }
                Err(err) => report.push(err),
            },
            other if self.config.region_argument_policy == RegionArgumentPolicy::StrictLiteralOnly => {
                report.push(AdqlError::type_mismatch("REGION expects a string literal STC-S expression", other.position()));
            }
            other => {
                let t = self.infer_expr(other, ctes, scopes, report);
                require_string(t, other, report);
            }
        }
    }

    fn resolve_function_call(&self, name: &RawIdentifier, arg_types: &[Datatype], position: TextPosition, report: &mut CheckReport) -> Datatype {
        if let Some(shape) = builtins::shape_of(&name.text) {
            for (idx, t) in arg_types.iter().enumerate() {
                if shape.requires_numeric_arg(idx) && !t.is_numeric() {
                    report.push(AdqlError::type_mismatch(
                        format!("{} expects a numeric argument, found {}", name.text.to_ascii_uppercase(), kind_label(*t)),
                        position,
                    ));
                }
                if shape.requires_string_arg(idx) && !t.is_string() {
                    report.push(AdqlError::type_mismatch(
                        format!("{} expects a string argument, found {}", name.text.to_ascii_uppercase(), kind_label(*t)),
                        position,
                    ));
                }
            }
            return shape.return_type(arg_types);
        }

        let overloads = self.registry.overloads(&name.text);
        let arg_bits: Vec<u8> = arg_types.iter().map(|t| signature_bits(*t)).collect();
        let best = overloads
            .into_iter()
            .filter(|def| def.arity() == arg_types.len())
            .filter(|def| is_signature_superset(def, &arg_bits))
            .min_by_key(|def| def.signature_bits().iter().map(|b| b.count_ones()).sum::<u32>());

        match best {
            Some(def) => def.return_type.unwrap_or_else(unknown_datatype),
            None => match self.config.udf_policy {
                UdfPolicy::AllowAny => unknown_datatype(),
                UdfPolicy::DeclaredOnly => {
                    let signature = arg_types.iter().map(|t| kind_label(*t)).collect::<Vec<_>>().join(", ");
                    report.push(AdqlError::unresolved_identifier(
                        format!("No UDF has been defined or found with the signature: {}({})", name.text, signature),
                        position,
                        vec![],
                    ));
                    unknown_datatype()
                }
            },
        }
    }
}

/// A declared parameter accepts a call-site argument when every bit set at
/// the call site is also set in the declaration (§4.4/§4.8): e.g. a
/// `VARCHAR` parameter (bits `01`) accepts a `STRING` argument but not a
/// `NUMERIC` one, while an `UNKNOWN` parameter (bits `11`) accepts either.
fn is_signature_superset(def: &FunctionDef, arg_bits: &[u8]) -> bool {
    def.signature_bits().iter().zip(arg_bits).all(|(decl, call)| (*call | *decl) == *decl)
}

fn signature_bits(t: Datatype) -> u8 {
    let numeric = t.is_numeric() as u8;
    let string = (t.is_string() || t.is_geometry()) as u8;
    (numeric << 1) | string
}

fn resolve_in_scopes<'s>(scopes: &[&'s FromScope], table: Option<&RawIdentifier>, name: &RawIdentifier) -> ColumnLookup<'s> {
    for scope in scopes.iter().rev() {
        match scope.resolve(table, name) {
            ColumnLookup::NotFound => continue,
            other => return other,
        }
    }
    ColumnLookup::NotFound
}

fn qualified_name(table: Option<&RawIdentifier>, name: &RawIdentifier) -> String {
    match table {
        Some(t) => format!("{}.{}", t.text, name.text),
        None => name.text.clone(),
    }
}

fn alias_or_name(alias: &Option<RawIdentifier>, name: &RawIdentifier) -> Option<Identifier> {
    let token = alias.as_ref().unwrap_or(name);
    Identifier::new(token.text.clone(), token.case_sensitive).ok()
}

fn relabel(scope: FromScope, label: Option<Identifier>) -> FromScope {
    let mut out = FromScope::default();
    for col in scope.columns {
        out.push(VisibleColumn::new(label.clone(), col.identifier, col.datatype, col.column_id));
    }
    out
}

fn natural_usual_columns(left: &FromScope, right: &FromScope) -> Vec<VisibleColumn> {
    let mut usual = Vec::new();
    for l in &left.columns {
        if usual.iter().any(|u: &VisibleColumn| same_identifier(&u.identifier, &l.identifier)) {
            continue;
        }
        if right.columns.iter().any(|r| same_identifier(&r.identifier, &l.identifier)) {
            usual.push(VisibleColumn::new(None, l.identifier.clone(), l.datatype, l.column_id));
        }
    }
    usual
}

/// Applies the usual-column set computed for a NATURAL JOIN or `USING`
/// clause: the original table-qualified copies stay reachable as `a.id`, but
/// are hidden from unqualified lookup so the bare name resolves uniquely to
/// the new unqualified entry (§4.8's "usual columns", left side wins).
fn merge_with_usual_columns(mut left: FromScope, mut right: FromScope, usual: Vec<VisibleColumn>) -> FromScope {
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

fn region_coosys(region: &Region) -> Option<&CoordinateSystem> {
    match region {
        Region::Position { coosys, .. }
        | Region::Circle { coosys, .. }
        | Region::Box { coosys, .. }
        | Region::Polygon { coosys, .. }
        | Region::Union { coosys, .. }
        | Region::Intersection { coosys, .. } => Some(coosys),
        Region::Not(inner) => region_coosys(inner),
    }
}

fn category(t: Datatype) -> Option<&'static str> {
    match (t.is_numeric(), t.is_string(), t.is_geometry()) {
        (true, false, false) => Some("NUMERIC"),
        (false, true, false) => Some("STRING"),
        (false, false, true) => Some("GEOMETRY"),
        _ => None,
    }
}

fn kind_label(t: Datatype) -> &'static str {
    category(t).unwrap_or("UNKNOWN")
}

/// Renders the offending operand the way the diagnostics in §8 quote it:
/// a bare column reference reads as `"name"`; anything else falls back to
/// its inferred-kind label, since there is no single source token to quote.
fn describe_expr(expr: &Expr, t: Datatype) -> String {
    match expr {
        Expr::ColumnRef { name, .. } => format!("\"{}\"", name.text),
        _ => kind_label(t).to_string(),
    }
}

fn require_numeric(t: Datatype, expr: &Expr, report: &mut CheckReport) {
    if !t.is_numeric() {
        report.push(AdqlError::type_mismatch(
            format!("A numeric value was expected instead of {}", describe_expr(expr, t)),
            expr.position(),
        ));
    }
}

fn require_string(t: Datatype, expr: &Expr, report: &mut CheckReport) {
    if !t.is_string() {
        report.push(AdqlError::type_mismatch(
            format!("A string value was expected instead of {}", describe_expr(expr, t)),
            expr.position(),
        ));
    }
}

fn require_geometry(t: Datatype, position: TextPosition, report: &mut CheckReport) {
    if !t.is_geometry() {
        report.push(AdqlError::type_mismatch(format!("a geometry value was expected, found {}", kind_label(t)), position));
    }
}

fn require_compatible(a: Datatype, b: Datatype, position: TextPosition, report: &mut CheckReport) {
    if let (Some(ca), Some(cb)) = (category(a), category(b)) {
        if ca != cb {
            report.push(AdqlError::type_mismatch(format!("incompatible operand types: {ca} and {cb}"), position));
        }
    }
}

#[cfg(test)]
mod tests {
    use adql_core::Identifier;
    use adql_helpers::Config;
    use adql_metadata::{ColumnFlags, TableKind};
    use adql_parser::{parse_query, AdqlVersion};

    use super::*;

    fn basic_catalog() -> Catalog {
        let mut cat = Catalog::new();
        let t = cat.add_table(None, "mytable", TableKind::Table, None, None, None).unwrap();
        cat.add_column(
            t,
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
        cat.add_column(
            t,
            Identifier::normalize("name").unwrap(),
            Some(Datatype::new(DatatypeKind::Varchar)),
            None,
            None,
            None,
            None,
            ColumnFlags::default(),
            None,
        )
        .unwrap();
        cat
    }

    #[test]
    fn resolves_plain_column_reference() {
        let cat = basic_catalog();
        let registry = FunctionRegistry::new();
        let query = parse_query("SELECT ra FROM mytable", AdqlVersion::V2_1).unwrap();
        let report = check(&cat, &registry, &query, &CheckerConfig::default());
        assert!(report.is_ok(), "{:?}", report.errors());
    }

    #[test]
    fn flags_unresolved_table() {
        let cat = basic_catalog();
        let registry = FunctionRegistry::new();
        let query = parse_query("SELECT ra FROM nosuchtable", AdqlVersion::V2_1).unwrap();
        let report = check(&cat, &registry, &query, &CheckerConfig::default());
        assert!(!report.is_ok());
    }

    #[test]
    fn flags_arithmetic_on_a_string_column() {
        let cat = basic_catalog();
        let registry = FunctionRegistry::new();
        let query = parse_query("SELECT name + 1 FROM mytable", AdqlVersion::V2_1).unwrap();
        let report = check(&cat, &registry, &query, &CheckerConfig::default());
        assert!(!report.is_ok());
    }

    #[test]
    fn udf_resolves_against_the_most_specific_overload() {
        let cat = basic_catalog();
        let mut registry = FunctionRegistry::new();
        registry.insert(FunctionDef::parse("toto(str VARCHAR) -> VARCHAR").unwrap());
        let query = parse_query("SELECT toto(name) FROM mytable", AdqlVersion::V2_1).unwrap();
        let report = check(&cat, &registry, &query, &CheckerConfig::default());
        assert!(report.is_ok(), "{:?}", report.errors());

        let query = parse_query("SELECT toto(ra) FROM mytable", AdqlVersion::V2_1).unwrap();
        let report = check(&cat, &registry, &query, &CheckerConfig::default());
        assert!(!report.is_ok());
    }

    #[test]
    fn geometry_function_allow_list_rejects_disallowed_function() {
        let cat = basic_catalog();
        let registry = FunctionRegistry::new();
        let query = parse_query("SELECT ra FROM mytable WHERE CONTAINS(POINT('ICRS', ra, ra), CIRCLE('ICRS', 1, 2, 3)) = 1", AdqlVersion::V2_1).unwrap();
        let config = CheckerConfig::default().config(|c| {
            c.allowed_geometry_functions = Some(vec!["POINT".into()]);
        });
        let report = check(&cat, &registry, &query, &config);
        assert!(!report.is_ok());
    }

    #[test]
    fn natural_join_exposes_a_single_unqualified_usual_column() {
        let mut cat = basic_catalog();
        let t2 = cat.add_table(None, "other", TableKind::Table, None, None, None).unwrap();
        cat.add_column(t2, Identifier::normalize("ra").unwrap(), Some(Datatype::new(DatatypeKind::Double)), None, None, None, None, ColumnFlags::default(), None)
            .unwrap();
        let registry = FunctionRegistry::new();
        let query = parse_query("SELECT ra FROM mytable NATURAL JOIN other", AdqlVersion::V2_1).unwrap();
        let report = check(&cat, &registry, &query, &CheckerConfig::default());
        assert!(report.is_ok(), "{:?}", report.errors());
    }

    #[test]
    fn case_sensitive_quoted_table_reference_requires_exact_case() {
        let mut cat = Catalog::new();
        let t = cat.add_table(None, "MyTable", TableKind::Table, None, None, None).unwrap();
        cat.add_column(t, Identifier::normalize("ra").unwrap(), Some(Datatype::new(DatatypeKind::Double)), None, None, None, None, ColumnFlags::default(), None)
            .unwrap();
        let registry = FunctionRegistry::new();

        let ok = parse_query("SELECT ra FROM \"MyTable\"", AdqlVersion::V2_1).unwrap();
        assert!(check(&cat, &registry, &ok, &CheckerConfig::default()).is_ok());

        let bad = parse_query("SELECT ra FROM \"mytable\"", AdqlVersion::V2_1).unwrap();
        assert!(!check(&cat, &registry, &bad, &CheckerConfig::default()).is_ok());
    }
}
