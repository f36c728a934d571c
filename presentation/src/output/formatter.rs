//! Output formatter trait

use super::ValidationOutcome;
use citeguard_domain::ConsistencyReport;

/// Trait for formatting pipeline results
pub trait OutputFormatter {
    /// Summary of a finished (or failed) validation job
    fn format_outcome(&self, outcome: &ValidationOutcome<'_>) -> String;

    /// Consistency report over several runs
    fn format_consistency(&self, report: &ConsistencyReport) -> String;
}

/// Pretty-printed JSON for both outputs
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_outcome(&self, outcome: &ValidationOutcome<'_>) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_consistency(&self, report: &ConsistencyReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeguard_domain::{CheckId, Citation, ConsistencyAnalyzer, DocumentCheck};

    #[test]
    fn test_json_outcome_shape() {
        let check = DocumentCheck::new(
            CheckId::new("doc"),
            vec![Citation::new("c1", "410 U.S. 113")],
        );
        let job = citeguard_domain::ValidationJob::new(check.id.clone(), 1);
        let outcome = ValidationOutcome {
            check: &check,
            progress: job.progress(),
            failure: None,
        };

        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_outcome(&outcome)).unwrap();
        assert_eq!(value["check"]["id"], "doc");
        assert_eq!(value["progress"]["tier2Total"], 1);
        assert!(value.get("failure").is_none());
    }

    #[test]
    fn test_json_consistency_report() {
        let report = ConsistencyAnalyzer::new().analyze(&[]);
        let value: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_consistency(&report)).unwrap();
        assert_eq!(value["summary"]["total_runs"], 0);
    }
}
