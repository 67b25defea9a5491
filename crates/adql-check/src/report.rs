use adql_core::AdqlError;

/// The accumulated result of checking one query (§4.8/§7): every violation
/// found by a full traversal of the tree, not just the first one, sorted
/// ascending by source position so a user sees problems in reading order.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    errors: Vec<AdqlError>,
}

impl CheckReport {
    pub(crate) fn push(&mut self, error: AdqlError) {
        self.errors.push(error);
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[AdqlError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<AdqlError> {
        self.errors
    }

    /// Sorts accumulated diagnostics ascending by `(begin_line, begin_col)`
    /// (§5's ordering guarantee); errors without a position (none occur in
    /// practice during checking, but the sort must still be total) sort
    /// first.
    pub(crate) fn finish(mut self) -> Self {
        self.errors.sort_by_key(|e| e.position().map(|p| p.sort_key()).unwrap_or((0, 0)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adql_core::TextPosition;

    #[test]
    fn finish_sorts_by_position() {
        let mut report = CheckReport::default();
        report.push(AdqlError::type_mismatch("b", TextPosition::at(2, 1)));
        report.push(AdqlError::type_mismatch("a", TextPosition::at(1, 1)));
        let sorted = report.finish();
        assert_eq!(sorted.errors()[0].to_string().contains('a'), true);
    }
}
