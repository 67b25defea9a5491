use strum_macros::{AsRefStr, EnumString};

/// The datatype kinds recognised by ADQL/TAP (§3, C3).
///
/// `Unknown` behaves permissively: it satisfies `is_string`, `is_numeric`
/// *and* `is_geometry`, so that partially-typed metadata (e.g. a UDF return
/// type the checker could not classify) never spuriously rejects a query.
/// `UnknownNumeric` is the narrower sibling used when a caller knows the
/// value is at least numeric-shaped but nothing more specific (see §9 open
/// question on the two historical `UNKNOWN` conventions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DatatypeKind {
    Char,
    Varchar,
    Clob,
    Timestamp,
    Smallint,
    Integer,
    Bigint,
    Real,
    Double,
    Binary,
    Varbinary,
    Blob,
    Point,
    Region,
    Unknown,
    #[strum(serialize = "UNKNOWN_NUMERIC")]
    UnknownNumeric,
}

/// A datatype: a kind tag plus an optional length, used for `CHAR(n)`,
/// `VARCHAR(n)`, `BINARY(n)` and `VARBINARY(n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Datatype {
    pub kind: DatatypeKind,
    pub length: Option<u32>,
}

impl Datatype {
    pub const fn new(kind: DatatypeKind) -> Self {
        Datatype { kind, length: None }
    }

    pub const fn with_length(kind: DatatypeKind, length: u32) -> Self {
        Datatype {
            kind,
            length: Some(length),
        }
    }

    pub fn is_string(&self) -> bool {
        use DatatypeKind::*;
        matches!(self.kind, Char | Varchar | Clob | Timestamp | Unknown)
    }

    pub fn is_numeric(&self) -> bool {
        use DatatypeKind::*;
        matches!(
            self.kind,
            Smallint | Integer | Bigint | Real | Double | Unknown | UnknownNumeric
        )
    }

    pub fn is_geometry(&self) -> bool {
        use DatatypeKind::*;
        matches!(self.kind, Point | Region | Unknown)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, DatatypeKind::Unknown)
    }

    /// A length accepts `(n)` only for the char/binary families; dropped
    /// silently for every other kind (§4.4).
    pub fn accepts_length(kind: DatatypeKind) -> bool {
        use DatatypeKind::*;
        matches!(kind, Char | Varchar | Binary | Varbinary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_satisfies_all_predicates() {
        let t = Datatype::new(DatatypeKind::Unknown);
        assert!(t.is_string());
        assert!(t.is_numeric());
        assert!(t.is_geometry());
    }

    #[test]
    fn unknown_numeric_is_numeric_only() {
        let t = Datatype::new(DatatypeKind::UnknownNumeric);
        assert!(t.is_numeric());
        assert!(!t.is_string());
        assert!(!t.is_geometry());
    }

    #[test]
    fn integer_is_only_numeric() {
        let t = Datatype::new(DatatypeKind::Integer);
        assert!(t.is_numeric());
        assert!(!t.is_string());
        assert!(!t.is_geometry());
    }

    #[test]
    fn length_accepted_only_for_char_and_binary_families() {
        assert!(Datatype::accepts_length(DatatypeKind::Varchar));
        assert!(Datatype::accepts_length(DatatypeKind::Binary));
        assert!(!Datatype::accepts_length(DatatypeKind::Double));
        assert!(!Datatype::accepts_length(DatatypeKind::Point));
    }
}
