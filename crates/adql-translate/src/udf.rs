use adql_metadata::Datatype;
use adql_udf::{FunctionDef, FunctionRegistry, Pattern};

/// A host-supplied override for one UDF's call-site SQL (§4.9's "if it
/// carries a `translator`... and that translator returns non-null, use its
/// result"). Consulted before the declared translation pattern; `None`
/// falls through to the pattern (or the default serialization).
pub trait UdfTranslator {
    fn translate(&self, def: &FunctionDef, arg_sql: &[String]) -> Option<String>;
}

/// Renders one UDF call, given its already-translated argument SQL and the
/// inferred argument datatypes used to pick the matching overload (the
/// same superset-of-declared-bits rule the checker applies in §4.8, since
/// the checked AST does not itself remember which overload it bound to).
pub fn translate_call(registry: &FunctionRegistry, name: &str, arg_types: &[Datatype], arg_sql: &[String], translator: Option<&dyn UdfTranslator>) -> String {
    let Some(def) = resolve_overload(registry, name, arg_types) else {
        return format!("{name}({})", arg_sql.join(", "));
    };

    if let Some(translator) = translator {
        if let Some(sql) = translator.translate(def, arg_sql) {
            return sql;
        }
    }

    if let Some(pattern) = def.translation_pattern.as_deref() {
        if let Ok(parsed) = Pattern::parse(pattern) {
            return parsed.apply(arg_sql);
        }
    }

    format!("{}({})", def.name, arg_sql.join(", "))
}

fn resolve_overload<'a>(registry: &'a FunctionRegistry, name: &str, arg_types: &[Datatype]) -> Option<&'a FunctionDef> {
    let arg_bits: Vec<u8> = arg_types.iter().map(|t| signature_bits(*t)).collect();
    registry
        .overloads(name)
        .into_iter()
        .filter(|def| def.arity() == arg_bits.len())
        .filter(|def| is_signature_superset(def, &arg_bits))
        .min_by_key(|def| def.signature_bits().iter().map(|b| b.count_ones()).sum::<u32>())
}

fn is_signature_superset(def: &FunctionDef, arg_bits: &[u8]) -> bool {
    def.signature_bits().iter().zip(arg_bits).all(|(decl, call)| (*call | *decl) == *decl)
}

fn signature_bits(t: Datatype) -> u8 {
    let numeric = t.is_numeric() as u8;
    let string = (t.is_string() || t.is_geometry()) as u8;
    (numeric << 1) | string
}

#[cfg(test)]
mod tests {
    use adql_metadata::DatatypeKind;
    use adql_udf::FunctionDef;

    use super::*;

    #[test]
    fn applies_the_declared_translation_pattern() {
        let mut reg = FunctionRegistry::new();
        reg.insert(FunctionDef::parse("toto(a varchar) -> varchar").unwrap().with_translation_pattern("my_toto($1)"));
        let sql = translate_call(&reg, "toto", &[Datatype::new(DatatypeKind::Varchar)], &["'x'".to_string()], None);
        assert_eq!(sql, "my_toto('x')");
    }

    #[test]
    fn falls_back_to_default_call_syntax_without_a_pattern() {
        let mut reg = FunctionRegistry::new();
        reg.insert(FunctionDef::parse("toto(a varchar) -> varchar").unwrap());
        let sql = translate_call(&reg, "toto", &[Datatype::new(DatatypeKind::Varchar)], &["'x'".to_string()], None);
        assert_eq!(sql, "toto('x')");
    }

    #[test]
    fn host_translator_overrides_the_pattern() {
        struct AlwaysYes;
        impl UdfTranslator for AlwaysYes {
            fn translate(&self, _def: &FunctionDef, _args: &[String]) -> Option<String> {
                Some("CUSTOM()".to_string())
            }
        }
        let mut reg = FunctionRegistry::new();
        reg.insert(FunctionDef::parse("toto(a varchar) -> varchar").unwrap().with_translation_pattern("my_toto($1)"));
        let sql = translate_call(&reg, "toto", &[Datatype::new(DatatypeKind::Varchar)], &["'x'".to_string()], Some(&AlwaysYes));
        assert_eq!(sql, "CUSTOM()");
    }

    #[test]
    fn unregistered_name_falls_back_to_its_own_call_syntax() {
        let reg = FunctionRegistry::new();
        let sql = translate_call(&reg, "mystery", &[Datatype::new(DatatypeKind::Double)], &["1.0".to_string()], None);
        assert_eq!(sql, "mystery(1.0)");
    }
}
