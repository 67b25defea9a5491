use crate::dialect::RowLimitPlan;
use crate::dialect::Dialect;

/// T-SQL: double-quoted identifiers, `+` concatenation, no `JOIN ... USING`,
/// and `OFFSET`/`FETCH` in place of `LIMIT`/`OFFSET` (§4.9).
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote(&self, name: &str, case_sensitive: bool) -> String {
        if case_sensitive {
            format!("\"{}\"", name.replace('"', "\"\""))
        } else {
            name.to_string()
        }
    }

    fn translate_concat(&self, args: &[String]) -> String {
        args.join(" + ")
    }

    fn supports_using(&self) -> bool {
        false
    }

    /// `TOP` and `OFFSET`/`FETCH` cannot both appear in one `SELECT`; once
    /// an `OFFSET` is present (even `OFFSET 0`, to carry a `FETCH NEXT`),
    /// `TOP` is folded into `FETCH NEXT ... ROWS ONLY` instead.
    fn translate_offset(&self, top: Option<u64>, offset: Option<u64>, order_by_present: bool) -> RowLimitPlan {
        match offset {
            None => match top {
                Some(n) => RowLimitPlan {
                    select_prefix: Some(format!("TOP {n}")),
                    synthesized_order_by: None,
                    trailing: None,
                },
                None => RowLimitPlan::default(),
            },
            Some(0) if top.is_none() => RowLimitPlan::default(),
            Some(n) => {
                let synthesized_order_by = (!order_by_present).then(|| "1 ASC".to_string());
                let mut trailing = format!("OFFSET {n} ROWS");
                if let Some(t) = top {
                    trailing.push_str(&format!(" FETCH NEXT {t} ROWS ONLY"));
                }
                RowLimitPlan {
                    select_prefix: None,
                    synthesized_order_by,
                    trailing: Some(trailing),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_alone_becomes_a_select_prefix() {
        let plan = SqlServerDialect.translate_offset(Some(10), None, true);
        assert_eq!(plan.select_prefix.as_deref(), Some("TOP 10"));
        assert_eq!(plan.trailing, None);
    }

    #[test]
    fn offset_zero_alone_is_optimised_away() {
        let plan = SqlServerDialect.translate_offset(None, Some(0), true);
        assert_eq!(plan, RowLimitPlan::default());
    }

    #[test]
    fn offset_synthesizes_order_by_when_missing() {
        let plan = SqlServerDialect.translate_offset(None, Some(5), false);
        assert_eq!(plan.synthesized_order_by.as_deref(), Some("1 ASC"));
        assert_eq!(plan.trailing.as_deref(), Some("OFFSET 5 ROWS"));
    }

    #[test]
    fn top_and_offset_together_fold_into_fetch_next() {
        let plan = SqlServerDialect.translate_offset(Some(10), Some(0), true);
        assert_eq!(plan.select_prefix, None);
        assert_eq!(plan.trailing.as_deref(), Some("OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"));
    }
}
