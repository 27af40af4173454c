use super::types::{Report, ReportKind};

/// Above this many reports for one rule and message, they are merged.
pub const MERGE_THRESHOLD: usize = 3;

/// Collapse a group of reports sharing a rule and message id.
///
/// Groups of up to [`MERGE_THRESHOLD`] reports are returned as they are.
/// Larger groups become a single report carrying every location, with the
/// most severe kind seen in the group. Values come from the first report.
pub fn merge_reports(reports: Vec<Report>) -> Vec<Report> {
    if reports.len() <= MERGE_THRESHOLD {
        return reports;
    }

    let kind = reports
        .iter()
        .map(|r| r.kind)
        .max()
        .unwrap_or(ReportKind::Message);

    let mut reports = reports.into_iter();
    let Some(first) = reports.next() else {
        return Vec::new();
    };

    let mut merged = Report { kind, ..first };
    for report in reports {
        debug_assert_eq!(report.rule_id, merged.rule_id);
        debug_assert_eq!(report.message_id, merged.message_id);
        merged.locations.extend(report.locations);
    }

    vec![merged]
}
