//! Stage-3 investigation results and their resolution.
//!
//! Investigators answer either in the current shape (`risk_level` plus a
//! numeric `confidence_score`) or in the legacy shape (`verdict` of
//! VALID/WARN/FAIL plus `confidence` of high/medium/low). Both are held by
//! [`Assessment`], and everything downstream reads them through
//! [`Assessment::risk_level`] / [`Assessment::status`].

mod report;
mod resolver;
mod risk;

pub use report::{Assessment, InvestigatorReport, Tier3Result};
pub use resolver::FinalStatusResolver;
pub use risk::{LegacyConfidence, LegacyStatus, RiskLevel};
