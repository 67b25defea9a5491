use adql_helpers::Config as ConfigBuilder;

/// The canonical `UNKNOWN` rule (§3/§9) treats it as permissive-all
/// (string/numeric/geometry); `LegacyNumericOnly` reproduces the older,
/// stricter convention some source metadata was authored against, for
/// callers who need to flag metadata that relied on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTypePolicy {
    #[default]
    PermissiveAll,
    LegacyNumericOnly,
}

/// Whether a geometry function's coordinate-system argument must be a
/// string literal (the default, §9 open question) or may be any
/// string-valued expression, left unchecked and deferred to runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionArgumentPolicy {
    #[default]
    StrictLiteralOnly,
    AllowAnyStringExpression,
}

/// Whether an unrecognised UDF call is rejected (`DeclaredOnly`, the
/// default) or silently bound to a permissive `UNKNOWN`-returning stand-in
/// (`AllowAny`), per §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UdfPolicy {
    #[default]
    DeclaredOnly,
    AllowAny,
}

/// Checker configuration (§3.1/C10): the Open-Question policy switches plus
/// the optional geometry-function and coordinate-system allow-lists of
/// §4.8. Mirrors the teacher's `FluffConfig`-style builder via
/// `adql_helpers::Config`.
#[derive(Debug, Clone, Default)]
pub struct CheckerConfig {
    pub unknown_type_policy: UnknownTypePolicy,
    pub region_argument_policy: RegionArgumentPolicy,
    pub udf_policy: UdfPolicy,
    /// `None` = every geometry function is allowed; `Some(set)` = only
    /// those named (case-insensitively) in the set.
    pub allowed_geometry_functions: Option<Vec<String>>,
    /// `None` = every coordinate system is allowed; `Some(patterns)` = the
    /// literal coosys argument must match at least one `*`-wildcard pattern.
    pub allowed_coordinate_systems: Option<Vec<String>>,
}

impl CheckerConfig {
    pub fn is_geometry_function_allowed(&self, name: &str) -> bool {
        match &self.allowed_geometry_functions {
            None => true,
            Some(allowed) => allowed.iter().any(|a| a.eq_ignore_ascii_case(name)),
        }
    }

    pub fn is_coordinate_system_allowed(&self, system: &adql_stcs::CoordinateSystem) -> bool {
        match &self.allowed_coordinate_systems {
            None => true,
            Some(patterns) => patterns.iter().any(|p| system.matches_pattern(p)),
        }
    }
}

impl ConfigBuilder for CheckerConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_style_configuration() {
        let cfg = CheckerConfig::default().config(|c| {
            c.udf_policy = UdfPolicy::AllowAny;
            c.allowed_geometry_functions = Some(vec!["POINT".into(), "CIRCLE".into()]);
        });
        assert_eq!(cfg.udf_policy, UdfPolicy::AllowAny);
        assert!(cfg.is_geometry_function_allowed("point"));
        assert!(!cfg.is_geometry_function_allowed("POLYGON"));
    }

    #[test]
    fn no_allow_list_permits_everything() {
        let cfg = CheckerConfig::default();
        assert!(cfg.is_geometry_function_allowed("anything"));
    }
}
