//! Stage-3 investigation response parser

use super::error::{LayerMiss, ParseError, ParseLayer};
use super::extract_json_object;
use crate::escalation::{Assessment, LegacyConfidence, LegacyStatus, RiskLevel};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Confidence assumed when a risk level arrives without one
const DEFAULT_CONFIDENCE: f64 = 0.5;

static RISK_LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bRISK[_ ]LEVEL\s*:\s*\**\s*([A-Za-z_ \-]+?)\s*\**\s*(?:$|\n)")
        .expect("valid risk level regex")
});
static NUMERIC_CONFIDENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCONFIDENCE(?:[_ ]SCORE)?\s*:\s*(\d+(?:\.\d+)?)\s*(%)?")
        .expect("valid confidence regex")
});
static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bSTATUS\s*:\s*\**\s*(VALID|WARN|FAIL)\b").expect("valid status regex")
});
static LABEL_CONFIDENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCONFIDENCE\s*:\s*\**\s*(high|medium|moderate|low)\b")
        .expect("valid confidence label regex")
});
static SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bSOURCE(?:[_ ]LINK)?\s*:\s*<?(https?://[^\s>]+)").expect("valid source regex")
});
static REASONING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bREASONING\s*:\s*(.+?)(?:\n\s*SOURCE(?:[_ ]LINK)?\s*:|\z)")
        .expect("valid reasoning regex")
});

/// A successfully parsed investigator answer
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInvestigation {
    pub assessment: Assessment,
    pub reasoning: String,
    pub source_link: Option<String>,
    pub layer: ParseLayer,
}

impl ParsedInvestigation {
    /// Conservative substitute: flag the citation for human review
    pub fn fallback(raw: &str) -> Self {
        Self {
            assessment: Assessment::current(RiskLevel::NeedsAdditionalReview, 0.0),
            reasoning: raw.trim().to_string(),
            source_link: None,
            layer: ParseLayer::Fallback,
        }
    }
}

/// Parse an investigator answer in either the current risk-level format or
/// the legacy status format.
pub fn parse_investigation_response(text: &str) -> Result<ParsedInvestigation, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let mut misses = Vec::new();

    match parse_json(text) {
        Ok(parsed) => return Ok(parsed),
        Err(miss) => misses.push(miss),
    }
    match parse_risk_level(text) {
        Ok(parsed) => return Ok(parsed),
        Err(miss) => misses.push(miss),
    }
    match parse_legacy_status(text) {
        Ok(parsed) => return Ok(parsed),
        Err(miss) => misses.push(miss),
    }

    Err(ParseError::Unrecognized(misses))
}

/// Like [`parse_investigation_response`], but substitutes
/// NEEDS_ADDITIONAL_REVIEW on failure.
pub fn parse_investigation_response_or_fallback(
    text: &str,
) -> (ParsedInvestigation, Option<ParseError>) {
    match parse_investigation_response(text) {
        Ok(parsed) => (parsed, None),
        Err(e) => (ParsedInvestigation::fallback(text), Some(e)),
    }
}

fn parse_json(text: &str) -> Result<ParsedInvestigation, LayerMiss> {
    let miss = |reason: String| LayerMiss::new(ParseLayer::Json, reason);
    let value = extract_json_object(text).ok_or_else(|| miss("no JSON object".into()))?;

    let str_field = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| value.get(*k).and_then(Value::as_str))
            .map(str::trim)
    };

    let assessment = if let Some(level) = str_field(&["risk_level", "riskLevel"]) {
        let risk_level: RiskLevel = level.parse().map_err(|e| miss(format!("{}", e)))?;
        let confidence = ["confidence_score", "confidenceScore", "confidence"]
            .iter()
            .find_map(|k| value.get(*k).and_then(Value::as_f64))
            .map(normalize_confidence)
            .unwrap_or(DEFAULT_CONFIDENCE);
        Assessment::current(risk_level, confidence)
    } else if let Some(status) = str_field(&["status", "verdict"]) {
        let status: LegacyStatus = status.parse().map_err(|e| miss(format!("{}", e)))?;
        let confidence = match value.get("confidence") {
            Some(Value::String(label)) => label
                .parse::<LegacyConfidence>()
                .map_err(|e| miss(format!("{}", e)))?,
            Some(other) => other
                .as_f64()
                .map(|c| LegacyConfidence::from_score(normalize_confidence(c)))
                .unwrap_or(LegacyConfidence::Medium),
            None => LegacyConfidence::Medium,
        };
        Assessment::legacy(status, confidence)
    } else {
        return Err(miss("object has neither 'risk_level' nor 'status'".into()));
    };

    Ok(ParsedInvestigation {
        assessment,
        reasoning: str_field(&["reasoning", "reason"])
            .unwrap_or_default()
            .to_string(),
        source_link: str_field(&["source_link", "sourceLink", "source"])
            .filter(|s| s.starts_with("http"))
            .map(str::to_string),
        layer: ParseLayer::Json,
    })
}

fn parse_risk_level(text: &str) -> Result<ParsedInvestigation, LayerMiss> {
    let caps = RISK_LEVEL_RE
        .captures(text)
        .ok_or_else(|| LayerMiss::new(ParseLayer::Regex, "no RISK_LEVEL line"))?;
    let risk_level: RiskLevel = caps[1]
        .parse()
        .map_err(|e| LayerMiss::new(ParseLayer::Regex, format!("{}", e)))?;

    let confidence = NUMERIC_CONFIDENCE_RE
        .captures(text)
        .and_then(|c| {
            let raw: f64 = c[1].parse().ok()?;
            Some(if c.get(2).is_some() {
                raw / 100.0
            } else {
                normalize_confidence(raw)
            })
        })
        .unwrap_or(DEFAULT_CONFIDENCE);

    Ok(ParsedInvestigation {
        assessment: Assessment::current(risk_level, confidence),
        reasoning: reasoning(text),
        source_link: source_link(text),
        layer: ParseLayer::Regex,
    })
}

fn parse_legacy_status(text: &str) -> Result<ParsedInvestigation, LayerMiss> {
    let caps = STATUS_RE
        .captures(text)
        .ok_or_else(|| LayerMiss::new(ParseLayer::Keyword, "no STATUS line"))?;
    let status: LegacyStatus = caps[1]
        .parse()
        .map_err(|e| LayerMiss::new(ParseLayer::Keyword, format!("{}", e)))?;
    let confidence = LABEL_CONFIDENCE_RE
        .captures(text)
        .and_then(|c| c[1].parse::<LegacyConfidence>().ok())
        .unwrap_or(LegacyConfidence::Medium);

    Ok(ParsedInvestigation {
        assessment: Assessment::legacy(status, confidence),
        reasoning: reasoning(text),
        source_link: source_link(text),
        layer: ParseLayer::Keyword,
    })
}

/// Accept both 0.0-1.0 and 0-100 scales
fn normalize_confidence(raw: f64) -> f64 {
    let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
    scaled.clamp(0.0, 1.0)
}

fn reasoning(text: &str) -> String {
    REASONING_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}

fn source_link(text: &str) -> Option<String> {
    SOURCE_RE
        .captures(text)
        .map(|c| c[1].trim_end_matches(['.', ',', ')', ']']).to_string())
}
