use crate::dialect::Dialect;

/// Plain PostgreSQL, without the PgSphere geometry extension (see
/// [`crate::dialects::pgsphere::PgSphereDialect`] for that).
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn quote(&self, name: &str, case_sensitive: bool) -> String {
        if case_sensitive {
            format!("\"{}\"", name.replace('"', "\"\""))
        } else {
            name.to_string()
        }
    }

    /// PostgreSQL's `log`/`trunc`/`random` overloads don't line up 1:1 with
    /// ADQL's `LOG`/`LOG10`/`TRUNCATE`/`RAND` names (§4.9).
    fn translate_math_fn(&self, name: &str, args: &[String]) -> Option<String> {
        match name.to_ascii_uppercase().as_str() {
            "LOG" => Some(format!("ln({})", cast_numeric(&args[0]))),
            "LOG10" => Some(format!("log(10, {})", cast_numeric(&args[0]))),
            "TRUNCATE" => Some(format!("trunc({})", args.iter().map(|a| cast_numeric(a)).collect::<Vec<_>>().join(", "))),
            "RAND" => Some("random()".to_string()),
            _ => None,
        }
    }
}

/// PostgreSQL overloads several of these math functions across `real`,
/// `double precision` and `numeric`; ADQL's untyped literals otherwise
/// resolve to an ambiguous-overload error, so every numeric argument to a
/// function this dialect rewrites is cast explicitly.
fn cast_numeric(arg: &str) -> String {
    format!("({arg})::numeric")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_maps_to_ln() {
        let d = PostgresDialect;
        assert_eq!(d.translate_math_fn("LOG", &["x".into()]).unwrap(), "ln((x)::numeric)");
    }

    #[test]
    fn log10_maps_to_two_argument_log() {
        let d = PostgresDialect;
        assert_eq!(d.translate_math_fn("LOG10", &["x".into()]).unwrap(), "log(10, (x)::numeric)");
    }

    #[test]
    fn rand_maps_to_random() {
        let d = PostgresDialect;
        assert_eq!(d.translate_math_fn("RAND", &[]).unwrap(), "random()");
    }

    #[test]
    fn unrelated_function_falls_through() {
        let d = PostgresDialect;
        assert!(d.translate_math_fn("ABS", &["x".into()]).is_none());
    }
}
