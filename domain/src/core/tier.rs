//! Pipeline tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation tier a unit of work belongs to.
///
/// Tier 1 (format validity) is produced upstream and never queued here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// First-pass panel scoring and consensus
    #[serde(rename = "tier2")]
    Panel,
    /// Escalated investigation, only on disagreement
    #[serde(rename = "tier3")]
    Investigation,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Panel => "tier2",
            Tier::Investigation => "tier3",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
