//! Closed vocabulary of reasons an agent may give for doubting a citation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// No such case or statute could be located
    NonexistentAuthority,
    /// Case name does not match the reporter location
    CaseNameMismatch,
    /// Volume/page combination does not exist in the reporter
    VolumePageMismatch,
    /// Decision year is inconsistent with the reporter volume
    YearMismatch,
    /// Wrong court for the reporter or the case
    CourtMismatch,
    /// Quoted language does not appear in the authority
    FabricatedQuote,
    /// The authority exists but does not say what it is cited for
    MisattributedHolding,
    /// Malformed citation that nevertheless passed format checks
    FormatAnomaly,
    /// Not enough information to decide either way
    InsufficientInformation,
}

/// Keyword table used by the free-text fallback parser. Order matters:
/// the first matching entry wins.
const KEYWORDS: &[(ReasonCode, &[&str])] = &[
    (
        ReasonCode::FabricatedQuote,
        &["quote", "quotation", "quoted language"],
    ),
    (
        ReasonCode::MisattributedHolding,
        &["holding", "does not stand for", "misattribut", "mischaracteriz"],
    ),
    (
        ReasonCode::VolumePageMismatch,
        &["volume", "page", "pin cite", "pincite"],
    ),
    (ReasonCode::YearMismatch, &["year", "decision date", "decided in"]),
    (ReasonCode::CourtMismatch, &["court", "jurisdiction"]),
    (
        ReasonCode::CaseNameMismatch,
        &["case name", "party name", "parties", "caption"],
    ),
    (
        ReasonCode::NonexistentAuthority,
        &[
            "does not exist",
            "doesn't exist",
            "no such case",
            "cannot locate",
            "could not locate",
            "could not find",
            "fabricated",
            "fictitious",
            "hallucinat",
        ],
    ),
    (
        ReasonCode::FormatAnomaly,
        &["format", "malformed", "bluebook"],
    ),
    (
        ReasonCode::InsufficientInformation,
        &["insufficient", "not enough information", "unable to verify", "cannot verify"],
    ),
];

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::NonexistentAuthority => "NONEXISTENT_AUTHORITY",
            ReasonCode::CaseNameMismatch => "CASE_NAME_MISMATCH",
            ReasonCode::VolumePageMismatch => "VOLUME_PAGE_MISMATCH",
            ReasonCode::YearMismatch => "YEAR_MISMATCH",
            ReasonCode::CourtMismatch => "COURT_MISMATCH",
            ReasonCode::FabricatedQuote => "FABRICATED_QUOTE",
            ReasonCode::MisattributedHolding => "MISATTRIBUTED_HOLDING",
            ReasonCode::FormatAnomaly => "FORMAT_ANOMALY",
            ReasonCode::InsufficientInformation => "INSUFFICIENT_INFORMATION",
        }
    }

    /// Parse an explicit code such as `VOLUME_PAGE_MISMATCH` (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_uppercase().replace([' ', '-'], "_");
        KEYWORDS
            .iter()
            .map(|(c, _)| *c)
            .find(|c| c.as_str() == normalized)
    }

    /// Heuristic extraction from free text.
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(code, _)| *code)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(
            ReasonCode::from_code("volume_page_mismatch"),
            Some(ReasonCode::VolumePageMismatch)
        );
        assert_eq!(
            ReasonCode::from_code("Year Mismatch"),
            Some(ReasonCode::YearMismatch)
        );
        assert_eq!(ReasonCode::from_code("BAD_VIBES"), None);
    }

    #[test]
    fn test_detect_keywords() {
        assert_eq!(
            ReasonCode::detect("The quoted language appears nowhere in the opinion."),
            Some(ReasonCode::FabricatedQuote)
        );
        assert_eq!(
            ReasonCode::detect("I could not locate any such decision."),
            Some(ReasonCode::NonexistentAuthority)
        );
        assert_eq!(
            ReasonCode::detect("Volume 512 ends before page 9000."),
            Some(ReasonCode::VolumePageMismatch)
        );
        assert_eq!(ReasonCode::detect("Looks fine to me."), None);
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&ReasonCode::CourtMismatch).unwrap();
        assert_eq!(json, "\"COURT_MISMATCH\"");
    }
}
