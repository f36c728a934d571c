//! Result formatting
//!
//! [`ValidationOutcome`] gathers what a finished job reports; formatters turn
//! it (or a consistency report) into console text or JSON.

pub mod console;
pub mod formatter;

use citeguard_domain::{DocumentCheck, JobFailureReport, JobProgress};
use serde::Serialize;

/// Everything `validate` reports about one job
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome<'a> {
    pub check: &'a DocumentCheck,
    pub progress: JobProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<&'a JobFailureReport>,
}
