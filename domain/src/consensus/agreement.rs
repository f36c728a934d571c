//! Agreement classification shared by Stage 2 and Stage 3.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How aligned a panel's verdicts are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementLevel {
    /// Every voter in the same bucket
    Unanimous,
    /// All but one voter in the same bucket
    Strong,
    /// Anything else
    Split,
}

impl AgreementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementLevel::Unanimous => "unanimous",
            AgreementLevel::Strong => "strong",
            AgreementLevel::Split => "split",
        }
    }
}

impl fmt::Display for AgreementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify agreement from the size of the largest bucket.
///
/// `strong` means exactly one dissenter and needs at least three voters;
/// with one or two voters any dissent is a split.
pub fn classify_agreement(dominant: usize, total: usize) -> AgreementLevel {
    if total == 0 || dominant == 0 {
        return AgreementLevel::Split;
    }
    if dominant >= total {
        AgreementLevel::Unanimous
    } else if total >= 3 && dominant + 1 == total {
        AgreementLevel::Strong
    } else {
        AgreementLevel::Split
    }
}
