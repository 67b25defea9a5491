use adql_metadata::{Datatype, DatatypeKind};

/// How a built-in ADQL function (§3 C4's `ADQL_BUILTIN_FUNCTIONS`) behaves
/// for type inference: what it requires of its arguments, and what it
/// returns.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BuiltinShape {
    /// All arguments must be numeric; returns `DOUBLE`.
    NumericToNumeric,
    /// No required argument check (e.g. `PI()`, `RAND()`); returns `DOUBLE`.
    NumericNullary,
    /// The first argument must be a string; returns `VARCHAR`.
    StringToString,
    /// `COUNT(...)`: no argument type constraint; returns `BIGINT`.
    CountAggregate,
    /// `SUM`/`AVG`/`MIN`/`MAX`: numeric argument, numeric result (passes
    /// through the argument's own datatype rather than forcing `DOUBLE`).
    NumericAggregate,
}

pub(crate) fn shape_of(name: &str) -> Option<BuiltinShape> {
    use BuiltinShape::*;
    Some(match name.to_ascii_uppercase().as_str() {
        "ABS" | "CEILING" | "DEGREES" | "EXP" | "FLOOR" | "LOG" | "LOG10" | "MOD" | "POWER" | "ROUND" | "SQRT" | "TRUNCATE" | "ACOS"
        | "ASIN" | "ATAN" | "ATAN2" | "COS" | "COT" | "SIN" | "TAN" | "RADIANS" | "SIGN" | "IN_UNIT" => NumericToNumeric,
        "PI" | "RAND" => NumericNullary,
        "LOWER" | "UPPER" | "SUBSTRING" | "TRIM" | "LTRIM" | "RTRIM" | "REPLACE" => StringToString,
        "COUNT" => CountAggregate,
        "AVG" | "MAX" | "MIN" | "SUM" => NumericAggregate,
        _ => return None,
    })
}

impl BuiltinShape {
    pub(crate) fn return_type(self, arg_types: &[Datatype]) -> Datatype {
        match self {
            BuiltinShape::NumericToNumeric | BuiltinShape::NumericNullary => Datatype::new(DatatypeKind::Double),
            BuiltinShape::StringToString => Datatype::new(DatatypeKind::Varchar),
            BuiltinShape::CountAggregate => Datatype::new(DatatypeKind::Bigint),
            BuiltinShape::NumericAggregate => arg_types.first().copied().unwrap_or(Datatype::new(DatatypeKind::Double)),
        }
    }

    /// Whether argument `idx` must be numeric to satisfy this builtin's
    /// contract (used to emit the same "numeric value expected" diagnostic
    /// as the arithmetic operators).
    pub(crate) fn requires_numeric_arg(self, _idx: usize) -> bool {
        matches!(self, BuiltinShape::NumericToNumeric | BuiltinShape::NumericAggregate)
    }

    pub(crate) fn requires_string_arg(self, idx: usize) -> bool {
        matches!(self, BuiltinShape::StringToString) && idx == 0
    }
}
