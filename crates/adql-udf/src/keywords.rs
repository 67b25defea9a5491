/// ADQL built-in function names (§3 C4): a UDF name colliding with one of
/// these, case-insensitively, is rejected at declaration time.
pub const ADQL_BUILTIN_FUNCTIONS: &[&str] = &[
    // numeric
    "ABS", "CEILING", "DEGREES", "EXP", "FLOOR", "LOG", "LOG10", "MOD", "PI", "POWER", "RAND",
    "ROUND", "SQRT", "TRUNCATE", "ACOS", "ASIN", "ATAN", "ATAN2", "COS", "COT", "SIN", "TAN",
    "RADIANS", "SIGN",
    // string
    "LOWER", "UPPER", "SUBSTRING", "TRIM", "LTRIM", "RTRIM", "REPLACE",
    // aggregates
    "AVG", "MAX", "MIN", "SUM", "COUNT",
    // geometry
    "POINT", "CIRCLE", "BOX", "POLYGON", "REGION", "CONTAINS", "INTERSECTS", "AREA", "CENTROID",
    "COORD1", "COORD2", "COORDSYS", "DISTANCE", "IN_UNIT",
];

/// ADQL reserved keywords (a representative subset of the ADQL 2.1 grammar's
/// reserved word list, enough to guard UDF name collisions).
pub const ADQL_RESERVED_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "GROUP", "BY", "HAVING", "ORDER", "AS", "JOIN", "NATURAL", "INNER",
    "OUTER", "LEFT", "RIGHT", "FULL", "ON", "USING", "UNION", "INTERSECT", "EXCEPT", "DISTINCT",
    "ALL", "TOP", "OFFSET", "WITH", "AND", "OR", "NOT", "IN", "EXISTS", "BETWEEN", "LIKE", "IS",
    "NULL", "CASE", "WHEN", "THEN", "ELSE", "END",
];

/// SQL reserved keywords (common ANSI SQL subset, independent of ADQL) that
/// would also collide with a generated dialect function call if used as a
/// UDF name.
pub const SQL_RESERVED_KEYWORDS: &[&str] = &[
    "TABLE", "VIEW", "INDEX", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER", "GRANT",
    "REVOKE", "PRIMARY", "FOREIGN", "KEY", "REFERENCES", "CONSTRAINT", "DEFAULT", "CHECK",
    "UNIQUE", "VALUES", "INTO", "SET", "CAST", "CONVERT",
];

pub fn is_reserved_or_builtin(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    ADQL_BUILTIN_FUNCTIONS.contains(&upper.as_str())
        || ADQL_RESERVED_KEYWORDS.contains(&upper.as_str())
        || SQL_RESERVED_KEYWORDS.contains(&upper.as_str())
}
