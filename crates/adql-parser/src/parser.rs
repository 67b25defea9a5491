use std::cell::Cell;

use adql_core::{AdqlError, AdqlResult, TextPosition};

use crate::ast::*;
use crate::lexer::{tokenize, SpannedToken, Token};

/// Parses a complete ADQL query under the given grammar version (§4.7/C7).
pub fn parse_query(source: &str, version: AdqlVersion) -> AdqlResult<Query> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, idx: 0, version };
    let query = parser.parse_query()?;
    parser.expect_eof()?;
    Ok(query)
}

struct Parser {
    tokens: Vec<SpannedToken>,
    idx: usize,
    version: AdqlVersion,
}

impl Parser {
    fn peek(&self) -> &SpannedToken {
        &self.tokens[self.idx.min(self.tokens.len() - 1)]
    }

    fn position(&self) -> TextPosition {
        self.peek().position
    }

    fn advance(&mut self) -> SpannedToken {
        let tok = self.peek().clone();
        if self.idx < self.tokens.len() - 1 {
            self.idx += 1;
        }
        tok
    }

    fn is_word(&self, kw: &str) -> bool {
        matches!(&self.peek().token, Token::Word(w) if w.eq_ignore_ascii_case(kw))
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(&self.peek().token, Token::Punct(q) if *q == p)
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek().token, Token::Eof)
    }

    fn eat_word(&mut self, kw: &str) -> bool {
        if self.is_word(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, kw: &str) -> AdqlResult<()> {
        if self.eat_word(kw) {
            Ok(())
        } else {
            Err(self.unexpected(vec![kw.to_string()]))
        }
    }

    fn expect_punct(&mut self, p: &str) -> AdqlResult<()> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.unexpected(vec![p.to_string()]))
        }
    }

    fn expect_eof(&mut self) -> AdqlResult<()> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(self.unexpected(vec!["end of query".into()]))
        }
    }

    fn unexpected(&self, expected: Vec<String>) -> AdqlError {
        let found = match &self.peek().token {
            Token::Word(w) => w.clone(),
            Token::DelimitedIdentifier(s) => s.clone(),
            Token::Number(n) => n.clone(),
            Token::StringConstant(s) => format!("'{s}'"),
            Token::Punct(p) => p.to_string(),
            Token::Eof => "end of query".to_string(),
        };
        AdqlError::syntax(format!("unexpected token \"{found}\""), self.position(), expected)
    }

    fn parse_identifier(&mut self) -> AdqlResult<RawIdentifier> {
        let position = self.position();
        match self.peek().token.clone() {
            Token::Word(w) => {
                self.advance();
                Ok(RawIdentifier {
                    text: w,
                    case_sensitive: false,
                    position,
                })
            }
            Token::DelimitedIdentifier(text) => {
                self.advance();
                Ok(RawIdentifier {
                    text,
                    case_sensitive: true,
                    position,
                })
            }
            _ => Err(self.unexpected(vec!["identifier".into()])),
        }
    }

    fn parse_query(&mut self) -> AdqlResult<Query> {
        let start = self.position();
        let with = if self.version == AdqlVersion::V2_1 && self.is_word("WITH") {
            self.parse_with_clause()?
        } else {
            Vec::new()
        };

        self.expect_word("SELECT")?;

        let set_quantifier = if self.eat_word("DISTINCT") {
            Some(SetQuantifier::Distinct)
        } else if self.eat_word("ALL") {
            Some(SetQuantifier::All)
        } else {
            None
        };

        let top = if self.eat_word("TOP") {
            Some(self.parse_unsigned_integer()?)
        } else {
            None
        };

        let (select_all, select_list) = self.parse_select_list()?;

        self.expect_word("FROM")?;
        let from = self.parse_from_clause()?;

        let where_clause = if self.eat_word("WHERE") { Some(self.parse_expr()?) } else { None };

        let group_by = if self.eat_word("GROUP") {
            self.expect_word("BY")?;
            self.parse_expr_list()?
        } else {
            Vec::new()
        };

        let having = if self.eat_word("HAVING") { Some(self.parse_expr()?) } else { None };

        let order_by = if self.eat_word("ORDER") {
            self.expect_word("BY")?;
            self.parse_order_list()?
        } else {
            Vec::new()
        };

        let offset = if self.version == AdqlVersion::V2_1 && self.eat_word("OFFSET") {
            Some(self.parse_unsigned_integer()?)
        } else {
            None
        };

        Ok(Query {
            with,
            set_quantifier,
            top,
            select_all,
            select_list,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            offset,
            position: start,
        })
    }

    fn parse_with_clause(&mut self) -> AdqlResult<Vec<CteDef>> {
        self.expect_word("WITH")?;
        let mut ctes = Vec::new();
        loop {
            let start = self.position();
            let label = self.parse_identifier()?;
            self.expect_word("AS")?;
            self.expect_punct("(")?;
            let query = self.parse_query()?;
            self.expect_punct(")")?;
            ctes.push(CteDef {
                label,
                query: Box::new(query),
                position: start,
            });
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(ctes)
    }

    fn parse_unsigned_integer(&mut self) -> AdqlResult<u64> {
        match self.peek().token.clone() {
            Token::Number(n) if !n.contains('.') => {
                self.advance();
                n.parse().map_err(|_| AdqlError::syntax(format!("invalid integer literal \"{n}\""), self.position(), vec![]))
            }
            _ => Err(self.unexpected(vec!["<integer>".into()])),
        }
    }

    fn parse_select_list(&mut self) -> AdqlResult<(bool, Vec<SelectItem>)> {
        if self.is_punct("*") {
            self.advance();
            return Ok((true, Vec::new()));
        }
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            let alias = if self.eat_word("AS") {
                Some(self.parse_identifier()?)
            } else if matches!(self.peek().token, Token::Word(_)) && !self.is_clause_keyword() {
                Some(self.parse_identifier()?)
            } else {
                None
            };
            items.push(SelectItem {
                expr,
                alias,
                resolved_output_column: Cell::new(None),
            });
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok((false, items))
    }

    /// Keywords that can legally follow a select item/table reference
    /// without an intervening comma; used to decide whether a bare trailing
    /// word is an (unquoted) alias or the start of the next clause.
    fn is_clause_keyword(&self) -> bool {
        const KEYWORDS: &[&str] = &[
            "FROM", "WHERE", "GROUP", "HAVING", "ORDER", "OFFSET", "AND", "OR", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "NATURAL", "ON", "USING",
        ];
        matches!(&self.peek().token, Token::Word(w) if KEYWORDS.iter().any(|k| w.eq_ignore_ascii_case(k)))
    }

    fn parse_expr_list(&mut self) -> AdqlResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat_punct(",") {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_order_list(&mut self) -> AdqlResult<Vec<OrderItem>> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            let descending = if self.eat_word("DESC") {
                true
            } else {
                self.eat_word("ASC");
                false
            };
            items.push(OrderItem { expr, descending });
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(items)
    }

    // -- FROM -------------------------------------------------------------

    fn parse_from_clause(&mut self) -> AdqlResult<FromClause> {
        let start = self.position();
        let mut item = self.parse_table_reference()?;
        loop {
            item = match self.try_parse_join(item)? {
                Ok(joined) => joined,
                Err(same) => {
                    item = same;
                    break;
                }
            };
        }
        Ok(FromClause { item, position: start })
    }

    fn try_parse_join(&mut self, left: FromItem) -> AdqlResult<Result<FromItem, FromItem>> {
        let natural = self.eat_word("NATURAL");
        let kind = if self.eat_word("INNER") {
            Some(JoinKind::Inner)
        } else if self.eat_word("LEFT") {
            self.eat_word("OUTER");
            Some(JoinKind::LeftOuter)
        } else if self.eat_word("RIGHT") {
            self.eat_word("OUTER");
            Some(JoinKind::RightOuter)
        } else if self.eat_word("FULL") {
            self.eat_word("OUTER");
            Some(JoinKind::FullOuter)
        } else if self.is_word("JOIN") {
            Some(JoinKind::Inner)
        } else if natural {
            return Err(self.unexpected(vec!["JOIN".into()]));
        } else {
            None
        };

        let Some(kind) = kind else {
            return Ok(Err(left));
        };

        self.expect_word("JOIN")?;
        let right = self.parse_table_reference()?;

        let condition = if natural {
            JoinCondition::Natural
        } else if self.eat_word("ON") {
            JoinCondition::On(Box::new(self.parse_expr()?))
        } else if self.eat_word("USING") {
            self.expect_punct("(")?;
            let mut cols = vec![self.parse_identifier()?];
            while self.eat_punct(",") {
                cols.push(self.parse_identifier()?);
            }
            self.expect_punct(")")?;
            JoinCondition::Using(cols)
        } else {
            JoinCondition::None
        };

        Ok(Ok(FromItem::Join {
            left: Box::new(left),
            right: Box::new(right),
            kind,
            condition,
        }))
    }

    fn parse_table_reference(&mut self) -> AdqlResult<FromItem> {
        if self.eat_punct("(") {
            let query = self.parse_query()?;
            self.expect_punct(")")?;
            self.eat_word("AS");
            let alias = self.parse_identifier()?;
            return Ok(FromItem::Subquery {
                query: Box::new(query),
                alias,
            });
        }

        let first = self.parse_identifier()?;
        let (schema, name) = if self.eat_punct(".") {
            (Some(first), self.parse_identifier()?)
        } else {
            (None, first)
        };

        let table_ref = TableRef {
            schema,
            name,
            resolved_table: Cell::new(None),
        };

        let alias = if self.eat_word("AS") {
            Some(self.parse_identifier()?)
        } else if matches!(self.peek().token, Token::Word(_)) && !self.is_clause_keyword() {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        Ok(FromItem::Table { name: table_ref, alias })
    }

    // -- expressions --------------------------------------------------------

    fn parse_expr(&mut self) -> AdqlResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> AdqlResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_word("OR") {
            let position = left.position();
            let right = self.parse_and()?;
            left = Expr::Or {
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> AdqlResult<Expr> {
        let mut left = self.parse_not()?;
        while self.eat_word("AND") {
            let position = left.position();
            let right = self.parse_not()?;
            left = Expr::And {
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> AdqlResult<Expr> {
        if self.eat_word("NOT") {
            let position = self.position();
            let operand = self.parse_not()?;
            return Ok(Expr::Not {
                operand: Box::new(operand),
                position,
            });
        }
        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> AdqlResult<Expr> {
        if self.eat_word("EXISTS") {
            let position = self.position();
            self.expect_punct("(")?;
            let query = self.parse_query()?;
            self.expect_punct(")")?;
            return Ok(Expr::Exists {
                query: Box::new(query),
                position,
            });
        }

        let operand = self.parse_concat()?;
        let position = operand.position();

        let negated = self.eat_word("NOT");

        if self.eat_word("BETWEEN") {
            let low = self.parse_concat()?;
            self.expect_word("AND")?;
            let high = self.parse_concat()?;
            return Ok(Expr::Between {
                operand: Box::new(operand),
                low: Box::new(low),
                high: Box::new(high),
                negated,
                position,
            });
        }
        if self.eat_word("LIKE") {
            let pattern = self.parse_concat()?;
            return Ok(Expr::Like {
                operand: Box::new(operand),
                pattern: Box::new(pattern),
                negated,
                position,
            });
        }
        if self.eat_word("IN") {
            self.expect_punct("(")?;
            let list = self.parse_expr_list()?;
            self.expect_punct(")")?;
            return Ok(Expr::InList {
                operand: Box::new(operand),
                list,
                negated,
                position,
            });
        }
        if negated {
            return Err(self.unexpected(vec!["BETWEEN".into(), "LIKE".into(), "IN".into()]));
        }

        if self.eat_word("IS") {
            let negated = self.eat_word("NOT");
            self.expect_word("NULL")?;
            return Ok(Expr::IsNull {
                operand: Box::new(operand),
                negated,
                position,
            });
        }

        if let Some(op) = self.try_comparison_op() {
            let right = self.parse_concat()?;
            return Ok(Expr::Comparison {
                op,
                left: Box::new(operand),
                right: Box::new(right),
                position,
            });
        }

        Ok(operand)
    }

    fn try_comparison_op(&mut self) -> Option<ComparisonOp> {
        let op = match &self.peek().token {
            Token::Punct("=") => ComparisonOp::Eq,
            Token::Punct("<>") | Token::Punct("!=") => ComparisonOp::Ne,
            Token::Punct("<") => ComparisonOp::Lt,
            Token::Punct("<=") => ComparisonOp::Le,
            Token::Punct(">") => ComparisonOp::Gt,
            Token::Punct(">=") => ComparisonOp::Ge,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_concat(&mut self) -> AdqlResult<Expr> {
        let mut left = self.parse_additive()?;
        while self.is_punct("||") {
            let position = left.position();
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Concat {
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> AdqlResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.is_punct("+") {
                ArithmeticOp::Add
            } else if self.is_punct("-") {
                ArithmeticOp::Sub
            } else {
                break;
            };
            let position = left.position();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Arithmetic {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> AdqlResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.is_punct("*") {
                ArithmeticOp::Mul
            } else if self.is_punct("/") {
                ArithmeticOp::Div
            } else {
                break;
            };
            let position = left.position();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Arithmetic {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> AdqlResult<Expr> {
        if self.is_punct("-") {
            let position = self.position();
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Negate {
                operand: Box::new(operand),
                position,
            });
        }
        if self.is_punct("+") {
            self.advance();
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> AdqlResult<Expr> {
        let position = self.position();
        match self.peek().token.clone() {
            Token::Number(text) => {
                self.advance();
                Ok(Expr::NumericConstant { text, position })
            }
            Token::StringConstant(value) => {
                self.advance();
                Ok(Expr::StringConstant { value, position })
            }
            Token::Punct("(") => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            Token::Word(_) | Token::DelimitedIdentifier(_) => self.parse_identifier_led_expr(),
            _ => Err(self.unexpected(vec!["<expression>".into()])),
        }
    }

    fn parse_identifier_led_expr(&mut self) -> AdqlResult<Expr> {
        let position = self.position();
        let first = self.parse_identifier()?;

        if self.is_punct("(") && !first.case_sensitive {
            return self.parse_function_call(first, position);
        }

        if self.eat_punct(".") {
            let name = self.parse_identifier()?;
            return Ok(Expr::ColumnRef {
                table: Some(first),
                name,
                position,
                resolved_column: Cell::new(None),
            });
        }

        Ok(Expr::ColumnRef {
            table: None,
            name: first,
            position,
            resolved_column: Cell::new(None),
        })
    }

    fn parse_function_call(&mut self, name: RawIdentifier, position: TextPosition) -> AdqlResult<Expr> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if !self.is_punct(")") {
            args.push(self.parse_expr()?);
            while self.eat_punct(",") {
                args.push(self.parse_expr()?);
            }
        }
        self.expect_punct(")")?;

        if let Some(kind) = GeometryFunctionKind::from_name(&name.text) {
            return Ok(Expr::GeometryFunction { kind, args, position });
        }

        Ok(Expr::FunctionCall {
            name,
            args,
            position,
            resolved_type: Cell::new(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_select() {
        let query = parse_query("SELECT ra, dec FROM stars WHERE ra > 10", AdqlVersion::V2_0).unwrap();
        assert_eq!(query.select_list.len(), 2);
        assert!(query.where_clause.is_some());
    }

    #[test]
    fn parses_wildcard_select() {
        let query = parse_query("SELECT * FROM stars", AdqlVersion::V2_0).unwrap();
        assert!(query.select_all);
        assert!(query.select_list.is_empty());
    }

    #[test]
    fn parses_natural_join() {
        let query = parse_query("SELECT * FROM a NATURAL JOIN b", AdqlVersion::V2_0).unwrap();
        match query.from.item {
            FromItem::Join { condition, .. } => assert!(matches!(condition, JoinCondition::Natural)),
            other => panic!("expected Join, got {other:?}"),
        }
    }

    #[test]
    fn parses_with_clause_in_v21() {
        let sql = "WITH cte AS (SELECT ra FROM stars) SELECT ra FROM cte";
        let query = parse_query(sql, AdqlVersion::V2_1).unwrap();
        assert_eq!(query.with.len(), 1);
    }

    #[test]
    fn with_clause_rejected_in_v20() {
        let sql = "WITH cte AS (SELECT ra FROM stars) SELECT ra FROM cte";
        assert!(parse_query(sql, AdqlVersion::V2_0).is_err());
    }

    #[test]
    fn parses_offset_only_in_v21() {
        assert!(parse_query("SELECT ra FROM stars OFFSET 10", AdqlVersion::V2_1).is_ok());
        assert!(parse_query("SELECT ra FROM stars OFFSET 10", AdqlVersion::V2_0).is_err());
    }

    #[test]
    fn parses_geometry_function_call() {
        let query = parse_query("SELECT POINT('ICRS', ra, dec) FROM stars", AdqlVersion::V2_0).unwrap();
        match &query.select_list[0].expr {
            Expr::GeometryFunction { kind, args, .. } => {
                assert_eq!(*kind, GeometryFunctionKind::Point);
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected GeometryFunction, got {other:?}"),
        }
    }

    #[test]
    fn arithmetic_precedence_multiplies_before_adding() {
        let query = parse_query("SELECT 1 + 2 * 3 FROM stars", AdqlVersion::V2_0).unwrap();
        match &query.select_list[0].expr {
            Expr::Arithmetic { op: ArithmeticOp::Add, right, .. } => {
                assert!(matches!(**right, Expr::Arithmetic { op: ArithmeticOp::Mul, .. }));
            }
            other => panic!("expected top-level Add, got {other:?}"),
        }
    }

    #[test]
    fn select_item_alias_without_as() {
        let query = parse_query("SELECT ra r FROM stars", AdqlVersion::V2_0).unwrap();
        assert_eq!(query.select_list[0].alias.as_ref().unwrap().text, "r");
    }

    #[test]
    fn from_position_spans_the_joined_item() {
        let query = parse_query("SELECT * FROM a JOIN b ON a.id = b.id", AdqlVersion::V2_0).unwrap();
        assert!(matches!(query.from.item, FromItem::Join { .. }));
    }
}
