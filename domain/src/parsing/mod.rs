//! Agent response parsing.
//!
//! Answers arrive as free text in one of several historical shapes. Each
//! parser is layered, and every layer either produces a result or records
//! why it passed:
//!
//! | Layer | Stage 2 (panel) | Stage 3 (investigation) |
//! |-------|-----------------|-------------------------|
//! | 1. Structured | JSON `{label, reason}` or `{score, reasoning}` | JSON `{risk_level, ...}` or `{status, confidence}` |
//! | 2. Regex | `SCORE: n` / `REASONING: ...` | `RISK_LEVEL:` / `CONFIDENCE: 0.x` |
//! | 3. Keyword | VALID / INVALID / UNCERTAIN | `STATUS: VALID\|WARN\|FAIL` |
//!
//! When every layer passes, a typed [`ParseError`] lists the misses. Callers
//! that must never fail use the `*_or_fallback` variants, which substitute
//! the conservative answer (UNCERTAIN, or NEEDS_ADDITIONAL_REVIEW for Stage 3).

mod error;
mod investigation;
mod panel;

pub use error::{LayerMiss, ParseError, ParseLayer};
pub use investigation::{
    ParsedInvestigation, parse_investigation_response, parse_investigation_response_or_fallback,
};
pub use panel::{ParsedVerdict, parse_panel_response, parse_panel_response_or_fallback};

/// Extract the outermost `{...}` block, if any
pub(crate) fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(&text[start..=end])
        .ok()
        .filter(|v| v.is_object())
}
