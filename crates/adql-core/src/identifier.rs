use crate::error::{AdqlError, AdqlResult};

/// An ADQL identifier: a table, schema, column or function name as it
/// appears in a query or in metadata, together with the case-sensitivity
/// rule that governs how it is matched.
///
/// `db_name` defaults to `adql_name` but may be overridden when the
/// underlying database column/table name differs from the name exposed to
/// ADQL (e.g. a metadata ingester renaming a reserved-word column).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    adql_name: String,
    db_name: String,
    case_sensitive: bool,
}

impl Identifier {
    /// Builds an identifier from raw input, applying the normalization
    /// rules of §4.1: trims whitespace, unwraps a delimited (double-quoted)
    /// form and marks it case-sensitive, or keeps the trimmed input verbatim
    /// and case-insensitive otherwise.
    pub fn normalize(input: &str) -> AdqlResult<Self> {
        let name = normalize_name(input)?;
        let case_sensitive = is_delimited(input.trim());
        Ok(Identifier {
            db_name: name.clone(),
            adql_name: name,
            case_sensitive,
        })
    }

    /// Builds an identifier with an explicit case-sensitivity flag, bypassing
    /// delimiter sniffing. Used by the ADQL parser, which already knows from
    /// the token shape whether the name was quoted.
    pub fn new(name: impl Into<String>, case_sensitive: bool) -> AdqlResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AdqlError::missing_name());
        }
        Ok(Identifier {
            db_name: name.clone(),
            adql_name: name,
            case_sensitive,
        })
    }

    pub fn adql_name(&self) -> &str {
        &self.adql_name
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn set_adql_name(&mut self, name: impl Into<String>) {
        self.adql_name = name.into();
    }

    pub fn set_db_name(&mut self, name: impl Into<String>) {
        self.db_name = name.into();
    }

    /// Matches `self` against `other` per §3: octet-exact if either side is
    /// case-sensitive, case-insensitive otherwise.
    pub fn matches(&self, other: &str) -> bool {
        if self.case_sensitive {
            self.adql_name == other
        } else {
            self.adql_name.eq_ignore_ascii_case(other)
        }
    }

    /// Matches an unquoted ADQL reference `token` against this stored
    /// identifier under the case rule of §4.8: unquoted tokens compare
    /// case-insensitively, unless the *stored* identifier is itself
    /// case-sensitive, in which case the comparison is case-exact against
    /// the stored canonical name.
    pub fn matches_unquoted_reference(&self, token: &str) -> bool {
        if self.case_sensitive {
            self.adql_name == token
        } else {
            self.adql_name.eq_ignore_ascii_case(token)
        }
    }

    /// Matches a quoted (delimited) ADQL reference: always case-exact.
    pub fn matches_quoted_reference(&self, token: &str) -> bool {
        self.adql_name == token
    }

    /// Denormalizes this identifier for output per §4.1: wraps in double
    /// quotes (escaping inner `"` as `""`) when case-sensitive, or emits the
    /// name verbatim otherwise.
    pub fn denormalize(&self) -> String {
        denormalize(&self.adql_name, self.case_sensitive)
    }
}

/// Standalone denormalization, usable without constructing an `Identifier`
/// (the translator calls this for synthesized names such as join aliases).
pub fn denormalize(name: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

/// True iff `s` starts and ends with an unescaped `"` and no unescaped `"`
/// appears strictly inside (i.e. `s` is a valid delimited identifier,
/// possibly containing `""`-escaped quotes).
pub fn is_delimited(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'"' || bytes[bytes.len() - 1] != b'"' {
        return false;
    }
    let inner = &s[1..s.len() - 1];
    let chars: Vec<char> = inner.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '"' {
            // Must be part of an `""` escape, and not the last character.
            if i + 1 < chars.len() && chars[i + 1] == '"' {
                i += 2;
                continue;
            }
            return false;
        }
        i += 1;
    }
    true
}

fn normalize_name(input: &str) -> AdqlResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AdqlError::missing_name());
    }
    let name = if is_delimited(trimmed) {
        let inner = &trimmed[1..trimmed.len() - 1];
        inner.replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    };
    if name.trim().is_empty() {
        return Err(AdqlError::missing_name());
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(Identifier::normalize("").is_err());
        assert!(Identifier::normalize("   ").is_err());
        assert!(Identifier::normalize("\"\"").is_err());
        assert!(Identifier::normalize("\" \"").is_err());
    }

    #[test]
    fn unquoted_is_case_insensitive() {
        let id = Identifier::normalize("MyTable").unwrap();
        assert!(!id.case_sensitive());
        assert_eq!(id.adql_name(), "MyTable");
        assert!(id.matches("mytable"));
        assert!(id.matches("MYTABLE"));
    }

    #[test]
    fn quoted_is_case_sensitive_and_unescapes_inner_quotes() {
        let id = Identifier::normalize("\"My\"\"Table\"").unwrap();
        assert!(id.case_sensitive());
        assert_eq!(id.adql_name(), "My\"Table");
        assert!(id.matches("My\"Table"));
        assert!(!id.matches("my\"table"));
    }

    #[test]
    fn denormalize_round_trips_normalize() {
        for (name, cs) in [("Foo", false), ("Foo Bar", true), ("a\"b", true)] {
            let emitted = denormalize(name, cs);
            let reparsed = Identifier::normalize(&emitted).unwrap();
            assert_eq!(reparsed.adql_name(), name);
            assert_eq!(reparsed.case_sensitive(), cs);
        }
    }

    #[test]
    fn is_delimited_requires_matched_outer_quotes() {
        assert!(is_delimited("\"abc\""));
        assert!(is_delimited("\"a\"\"b\""));
        assert!(!is_delimited("abc"));
        assert!(!is_delimited("\"abc"));
        assert!(!is_delimited("\"a\"b\""));
    }
}
