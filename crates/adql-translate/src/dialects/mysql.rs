use adql_metadata::{Datatype, DatatypeKind};

use crate::dialect::Dialect;

/// MySQL: backtick quoting, `CONCAT()` instead of `||`, and a handful of
/// type-name differences (§4.9).
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self, name: &str, case_sensitive: bool) -> String {
        let _ = case_sensitive;
        format!("`{}`", name.replace('`', "``"))
    }

    fn translate_concat(&self, args: &[String]) -> String {
        format!("CONCAT({})", args.join(", "))
    }

    fn convert_type_to_db(&self, datatype: Datatype) -> String {
        match datatype.kind {
            DatatypeKind::Double => "DOUBLE".to_string(),
            DatatypeKind::Clob => "LONGTEXT".to_string(),
            DatatypeKind::Blob => "LONGBLOB".to_string(),
            _ => crate::dialect::Dialect::convert_type_to_db(&GenericFallback, datatype),
        }
    }
}

/// Used only to reach the trait's default `convert_type_to_db` mapping for
/// the kinds MySQL doesn't special-case.
struct GenericFallback;
impl Dialect for GenericFallback {
    fn name(&self) -> &'static str {
        "mysql-fallback"
    }
    fn quote(&self, name: &str, _case_sensitive: bool) -> String {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_always_backtick_quoted() {
        let d = MysqlDialect;
        assert_eq!(d.quote("foo", false), "`foo`");
        assert_eq!(d.quote("Foo", true), "`Foo`");
    }

    #[test]
    fn concat_uses_function_call_form() {
        let d = MysqlDialect;
        assert_eq!(d.translate_concat(&["a".into(), "b".into()]), "CONCAT(a, b)");
    }

    #[test]
    fn double_maps_to_plain_double() {
        let d = MysqlDialect;
        assert_eq!(d.convert_type_to_db(Datatype::new(DatatypeKind::Double)), "DOUBLE");
    }
}
