//! Output format value object

use serde::{Deserialize, Serialize};

/// How pipeline results and consistency reports are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary table (default)
    #[default]
    Console,
    /// Citation-by-citation detail including every agent's reasoning
    Full,
    /// Machine-readable JSON
    Json,
}
