use std::cell::Cell;

use adql_core::TextPosition;
use adql_metadata::{ColumnId, Datatype, TableId};

/// The ADQL grammar version in effect while parsing (§4.7/C7). 2.1 adds
/// the `WITH` clause and `OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdqlVersion {
    V2_0,
    V2_1,
}

/// An identifier as it appeared in the source: the raw text plus whether it
/// was delimited (double-quoted), which the checker needs for case-rule
/// resolution (§4.1/§4.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIdentifier {
    pub text: String,
    pub case_sensitive: bool,
    pub position: TextPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetQuantifier {
    All,
    Distinct,
}

#[derive(Debug, Clone)]
pub struct Query {
    pub with: Vec<CteDef>,
    pub set_quantifier: Option<SetQuantifier>,
    pub top: Option<u64>,
    /// `true` for a bare `SELECT *`; `select_list` is empty in that case.
    pub select_all: bool,
    pub select_list: Vec<SelectItem>,
    pub from: FromClause,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderItem>,
    pub offset: Option<u64>,
    pub position: TextPosition,
}

#[derive(Debug, Clone)]
pub struct CteDef {
    pub label: RawIdentifier,
    pub query: Box<Query>,
    pub position: TextPosition,
}

#[derive(Debug, Clone)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<RawIdentifier>,
    /// Resolved by the checker: the `ColumnId` this select-list item
    /// behaves as when the query is itself used as a FROM-item (subquery
    /// or CTE output column). `None` until checked.
    pub resolved_output_column: Cell<Option<ColumnId>>,
}

#[derive(Debug, Clone)]
pub struct FromClause {
    pub item: FromItem,
    pub position: TextPosition,
}

#[derive(Debug, Clone)]
pub enum FromItem {
    Table {
        name: TableRef,
        alias: Option<RawIdentifier>,
    },
    Subquery {
        query: Box<Query>,
        alias: RawIdentifier,
    },
    Join {
        left: Box<FromItem>,
        right: Box<FromItem>,
        kind: JoinKind,
        condition: JoinCondition,
    },
}

#[derive(Debug, Clone)]
pub struct TableRef {
    pub schema: Option<RawIdentifier>,
    pub name: RawIdentifier,
    /// Linked by the checker once the referenced table is resolved.
    pub resolved_table: Cell<Option<TableId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

#[derive(Debug, Clone)]
pub enum JoinCondition {
    Natural,
    Using(Vec<RawIdentifier>),
    On(Box<Expr>),
    /// No explicit condition and not `NATURAL` (a plain comma-join / cross
    /// join in the FROM list).
    None,
}

#[derive(Debug, Clone)]
pub struct OrderItem {
    pub expr: Expr,
    pub descending: bool,
}

/// Operands and predicates share one AST (§3's sum type), since ADQL makes
/// no syntactic distinction between a boolean-valued expression used in a
/// predicate position and one used as a value.
#[derive(Debug, Clone)]
pub enum Expr {
    ColumnRef {
        table: Option<RawIdentifier>,
        name: RawIdentifier,
        position: TextPosition,
        resolved_column: Cell<Option<ColumnId>>,
    },
    NumericConstant {
        text: String,
        position: TextPosition,
    },
    StringConstant {
        value: String,
        position: TextPosition,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
        position: TextPosition,
    },
    Negate {
        operand: Box<Expr>,
        position: TextPosition,
    },
    Concat {
        left: Box<Expr>,
        right: Box<Expr>,
        position: TextPosition,
    },
    FunctionCall {
        name: RawIdentifier,
        args: Vec<Expr>,
        position: TextPosition,
        /// Filled in by the checker: `Some(datatype)` once the call is
        /// bound to a built-in or UDF signature.
        resolved_type: Cell<Option<Datatype>>,
    },
    GeometryFunction {
        kind: GeometryFunctionKind,
        args: Vec<Expr>,
        position: TextPosition,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
        position: TextPosition,
    },
    Between {
        operand: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
        position: TextPosition,
    },
    Like {
        operand: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
        position: TextPosition,
    },
    InList {
        operand: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
        position: TextPosition,
    },
    IsNull {
        operand: Box<Expr>,
        negated: bool,
        position: TextPosition,
    },
    Exists {
        query: Box<Query>,
        position: TextPosition,
    },
    And {
        left: Box<Expr>,
        right: Box<Expr>,
        position: TextPosition,
    },
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
        position: TextPosition,
    },
    Not {
        operand: Box<Expr>,
        position: TextPosition,
    },
}

impl Expr {
    pub fn position(&self) -> TextPosition {
        match self {
            Expr::ColumnRef { position, .. }
            | Expr::NumericConstant { position, .. }
            | Expr::StringConstant { position, .. }
            | Expr::Arithmetic { position, .. }
            | Expr::Negate { position, .. }
            | Expr::Concat { position, .. }
            | Expr::FunctionCall { position, .. }
            | Expr::GeometryFunction { position, .. }
            | Expr::Comparison { position, .. }
            | Expr::Between { position, .. }
            | Expr::Like { position, .. }
            | Expr::InList { position, .. }
            | Expr::IsNull { position, .. }
            | Expr::Exists { position, .. }
            | Expr::And { position, .. }
            | Expr::Or { position, .. }
            | Expr::Not { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFunctionKind {
    Point,
    Circle,
    Box,
    Polygon,
    Region,
    Contains,
    Intersects,
    Area,
    Centroid,
    Coord1,
    Coord2,
    Coordsys,
    Distance,
}

impl GeometryFunctionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_uppercase().as_str() {
            "POINT" => GeometryFunctionKind::Point,
            "CIRCLE" => GeometryFunctionKind::Circle,
            "BOX" => GeometryFunctionKind::Box,
            "POLYGON" => GeometryFunctionKind::Polygon,
            "REGION" => GeometryFunctionKind::Region,
            "CONTAINS" => GeometryFunctionKind::Contains,
            "INTERSECTS" => GeometryFunctionKind::Intersects,
            "AREA" => GeometryFunctionKind::Area,
            "CENTROID" => GeometryFunctionKind::Centroid,
            "COORD1" => GeometryFunctionKind::Coord1,
            "COORD2" => GeometryFunctionKind::Coord2,
            "COORDSYS" => GeometryFunctionKind::Coordsys,
            "DISTANCE" => GeometryFunctionKind::Distance,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            GeometryFunctionKind::Point => "POINT",
            GeometryFunctionKind::Circle => "CIRCLE",
            GeometryFunctionKind::Box => "BOX",
            GeometryFunctionKind::Polygon => "POLYGON",
            GeometryFunctionKind::Region => "REGION",
            GeometryFunctionKind::Contains => "CONTAINS",
            GeometryFunctionKind::Intersects => "INTERSECTS",
            GeometryFunctionKind::Area => "AREA",
            GeometryFunctionKind::Centroid => "CENTROID",
            GeometryFunctionKind::Coord1 => "COORD1",
            GeometryFunctionKind::Coord2 => "COORD2",
            GeometryFunctionKind::Coordsys => "COORDSYS",
            GeometryFunctionKind::Distance => "DISTANCE",
        }
    }
}
