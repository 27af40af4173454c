use std::sync::{Mutex, PoisonError};

use crate::report::{Report, ReportKind, ReportLocation, Values};

/// Reporting handle passed to a rule body.
///
/// Each call appends one [`Report`]; nothing is rendered until the engine
/// has run every rule.
#[derive(Debug)]
pub struct Context {
    rule_id: String,
    reports: Mutex<Vec<Report>>,
}

impl Context {
    pub fn new(rule_id: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn warn(&self, message_id: &str, location: impl Into<ReportLocation>) {
        self.report(ReportKind::Warn, message_id, location, Values::new());
    }

    pub fn fail(&self, message_id: &str, location: impl Into<ReportLocation>) {
        self.report(ReportKind::Fail, message_id, location, Values::new());
    }

    pub fn message(&self, message_id: &str, location: impl Into<ReportLocation>) {
        self.report(ReportKind::Message, message_id, location, Values::new());
    }

    /// Record a report with interpolation values for its message
    pub fn report(
        &self,
        kind: ReportKind,
        message_id: &str,
        location: impl Into<ReportLocation>,
        values: Values,
    ) {
        let report = Report {
            rule_id: self.rule_id.clone(),
            message_id: message_id.to_string(),
            kind,
            locations: vec![location.into()],
            values,
        };
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
    }

    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reports in the order they were raised
    pub fn into_reports(self) -> Vec<Report> {
        self.reports
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_context_new() {
        let ctx = Context::new("todo-comments");
        assert!(ctx.is_empty());
        assert_eq!(ctx.rule_id(), "todo-comments");
    }

    #[test]
    fn test_context_records_in_order() {
        let ctx = Context::new("r");
        ctx.warn("a", ReportLocation::file_line("x.ts", 1));
        ctx.fail("b", ReportLocation::file("y.ts"));
        ctx.message("c", ReportLocation::None);

        let reports = ctx.into_reports();
        let kinds: Vec<_> = reports.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![ReportKind::Warn, ReportKind::Fail, ReportKind::Message]
        );
        assert_eq!(reports[0].locations, vec![ReportLocation::file_line("x.ts", 1)]);
        assert!(reports.iter().all(|r| r.rule_id == "r"));
    }

    #[test]
    fn test_context_report_values() {
        let ctx = Context::new("r");
        let values = Values::from([("ticket".to_string(), "JIRA-1".to_string())]);
        ctx.report(ReportKind::Message, "link", ReportLocation::None, values.clone());

        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.into_reports()[0].values, values);
    }
}
