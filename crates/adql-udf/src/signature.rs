use adql_core::{AdqlError, AdqlResult};
use adql_metadata::{Datatype, DatatypeKind};

use crate::keywords::is_reserved_or_builtin;

/// One parameter of a UDF signature: a name plus a datatype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub datatype: Datatype,
}

/// A declared UDF signature (§3/§4.4/§6). `translation_pattern` is the
/// optional `$N`/`$N..`/ternary template consumed by the translator (C9);
/// `class_name` is the opaque, never-invoked host-type reference allowed by
/// the `[signature, {fully.qualified.ClassName}]` declaration form (§9's
/// "dynamic otherData grab-bag" -- the core never loads this class).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<Datatype>,
    pub is_unknown: bool,
    pub translation_pattern: Option<String>,
    pub class_name: Option<String>,
}

impl FunctionDef {
    /// Parses a declaration of the form
    /// `identifier ( [param type (, param type)*] ) [ -> return_type ]`.
    pub fn parse(spec: &str) -> AdqlResult<Self> {
        let spec = spec.trim();
        let open = spec
            .find('(')
            .ok_or_else(|| AdqlError::syntax("expected '(' after function name", Default::default(), vec!["(".into()]))?;
        let name = spec[..open].trim();
        validate_function_name(name)?;

        let close = spec
            .find(')')
            .ok_or_else(|| AdqlError::syntax("expected ')'", Default::default(), vec![")".into()]))?;
        if close < open {
            return Err(AdqlError::syntax("unbalanced parentheses", Default::default(), vec![")".into()]));
        }
        let params_str = spec[open + 1..close].trim();
        let params = if params_str.is_empty() {
            Vec::new()
        } else {
            params_str
                .split(',')
                .map(parse_param)
                .collect::<AdqlResult<Vec<_>>>()?
        };

        let rest = spec[close + 1..].trim();
        let (return_type, is_unknown) = if let Some(type_name) = rest.strip_prefix("->") {
            let (datatype, unknown) = parse_type_name(type_name.trim())?;
            (Some(datatype), unknown)
        } else if rest.is_empty() {
            (None, false)
        } else {
            return Err(AdqlError::syntax(
                format!("unexpected trailing text after signature: {rest:?}"),
                Default::default(),
                vec!["->".into()],
            ));
        };

        Ok(FunctionDef {
            name: name.to_string(),
            params,
            return_type,
            is_unknown,
            translation_pattern: None,
            class_name: None,
        })
    }

    pub fn with_translation_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.translation_pattern = Some(pattern.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// The two-bit-per-parameter ordering key of §4.4: for each parameter,
    /// `is_numeric << 1 | is_string` (geometry counts as string).
    pub fn signature_bits(&self) -> Vec<u8> {
        self.params.iter().map(|p| param_bits(&p.datatype)).collect()
    }

    /// `(lowercased name, signature bitstring)` total order used to
    /// deduplicate and rank UDF candidates.
    pub fn order_key(&self) -> (String, Vec<u8>) {
        (self.name.to_lowercase(), self.signature_bits())
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

fn param_bits(datatype: &Datatype) -> u8 {
    let numeric = datatype.is_numeric() as u8;
    let string = (datatype.is_string() || datatype.is_geometry()) as u8;
    (numeric << 1) | string
}

fn validate_function_name(name: &str) -> AdqlResult<()> {
    if name.is_empty() {
        return Err(AdqlError::syntax("missing function name", Default::default(), vec![]));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap();
    if !(first.is_ascii_alphabetic()) || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AdqlError::syntax(
            format!("\"{name}\" is not a valid regular identifier"),
            Default::default(),
            vec!["[A-Za-z][A-Za-z0-9_]*".into()],
        ));
    }
    if is_reserved_or_builtin(name) {
        return Err(AdqlError::syntax(
            format!("\"{name}\" collides with an ADQL built-in or a reserved keyword"),
            Default::default(),
            vec![],
        ));
    }
    Ok(())
}

fn parse_param(s: &str) -> AdqlResult<Param> {
    let s = s.trim();
    let sep = s
        .find(|c: char| c.is_whitespace())
        .ok_or_else(|| AdqlError::syntax(format!("malformed parameter: {s:?}"), Default::default(), vec![]))?;
    let name = s[..sep].trim().to_string();
    let type_name = s[sep..].trim();
    let (datatype, _) = parse_type_name(type_name)?;
    Ok(Param { name, datatype })
}

/// Parses a type name with its aliases and optional `(n)` length (§4.4).
/// Unknown type names are accepted and flagged `is_unknown`.
pub fn parse_type_name(raw: &str) -> AdqlResult<(Datatype, bool)> {
    let raw = raw.trim();
    let (base, length) = match raw.find('(') {
        Some(open) => {
            let close = raw
                .find(')')
                .ok_or_else(|| AdqlError::syntax("unbalanced '(' in type length", Default::default(), vec![")".into()]))?;
            let len_str = raw[open + 1..close].trim();
            let len: u32 = len_str
                .parse()
                .map_err(|_| AdqlError::syntax(format!("invalid type length: {len_str:?}"), Default::default(), vec![]))?;
            (raw[..open].trim(), Some(len))
        }
        None => (raw, None),
    };

    let normalized = base.to_lowercase();
    let kind = match normalized.as_str() {
        "char" | "character" => Some(DatatypeKind::Char),
        "varchar" | "string" | "character varying" => Some(DatatypeKind::Varchar),
        "clob" | "text" => Some(DatatypeKind::Clob),
        "timestamp" | "date" | "time" => Some(DatatypeKind::Timestamp),
        "smallint" | "boolean" | "bool" => Some(DatatypeKind::Smallint),
        "integer" | "int" => Some(DatatypeKind::Integer),
        "bigint" => Some(DatatypeKind::Bigint),
        "real" | "float" => Some(DatatypeKind::Real),
        "double" | "double precision" | "numeric" => Some(DatatypeKind::Double),
        "binary" => Some(DatatypeKind::Binary),
        "varbinary" | "bit varying" => Some(DatatypeKind::Varbinary),
        "blob" => Some(DatatypeKind::Blob),
        "point" => Some(DatatypeKind::Point),
        "region" => Some(DatatypeKind::Region),
        _ => None,
    };

    match kind {
        Some(kind) => {
            let length = length.filter(|_| Datatype::accepts_length(kind));
            Ok((
                Datatype {
                    kind,
                    length,
                },
                false,
            ))
        }
        None => Ok((Datatype::new(DatatypeKind::Unknown), true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signature_with_params_and_return() {
        let def = FunctionDef::parse("toto(str VARCHAR) -> VARCHAR").unwrap();
        assert_eq!(def.name, "toto");
        assert_eq!(def.params.len(), 1);
        assert_eq!(def.params[0].datatype.kind, DatatypeKind::Varchar);
        assert_eq!(def.return_type.unwrap().kind, DatatypeKind::Varchar);
    }

    #[test]
    fn parses_signature_without_return_type() {
        let def = FunctionDef::parse("noop(a int, b double)").unwrap();
        assert_eq!(def.params.len(), 2);
        assert!(def.return_type.is_none());
    }

    #[test]
    fn rejects_name_colliding_with_builtin() {
        assert!(FunctionDef::parse("abs(x double) -> double").is_err());
        assert!(FunctionDef::parse("select(x double) -> double").is_err());
    }

    #[test]
    fn unknown_type_name_renders_is_unknown() {
        let (ty, unknown) = parse_type_name("frobnicate").unwrap();
        assert!(unknown);
        assert_eq!(ty.kind, DatatypeKind::Unknown);
    }

    #[test]
    fn length_is_dropped_for_non_char_kinds() {
        let (ty, _) = parse_type_name("double(5)").unwrap();
        assert_eq!(ty.length, None);
        let (ty, _) = parse_type_name("varchar(5)").unwrap();
        assert_eq!(ty.length, Some(5));
    }

    #[test]
    fn order_key_groups_by_lowercase_name_then_signature_bits() {
        let a = FunctionDef::parse("f(a int)").unwrap();
        let b = FunctionDef::parse("F(a varchar)").unwrap();
        assert_eq!(a.order_key().0, b.order_key().0);
        assert_ne!(a.signature_bits(), b.signature_bits());
    }
}
