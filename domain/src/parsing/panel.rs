//! Stage-2 panel response parser

use super::error::{LayerMiss, ParseError, ParseLayer};
use super::extract_json_object;
use crate::verdict::{Judgment, ReasonCode, Verdict};
use regex::Regex;
use std::sync::LazyLock;

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bSCORE\s*[:=]\s*(\d{1,3})(?:\s*/\s*10)?").expect("valid score regex")
});
static REASONING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bREASONING\s*:\s*(.+)").expect("valid reasoning regex")
});
static REASON_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*REASON[_ ]CODE\s*:\s*([A-Za-z_ ]+?)\s*$").expect("valid reason code regex")
});
static VERDICT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bVERDICT\s*:\s*(VALID|INVALID|UNCERTAIN)\b").expect("valid verdict regex")
});
static INVALID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bINVALID\b").expect("valid keyword regex"));
static UNCERTAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bUNCERTAIN\b").expect("valid keyword regex"));
static VALID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bVALID\b").expect("valid keyword regex"));

/// A successfully parsed panel answer
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVerdict {
    pub judgment: Judgment,
    pub reason_code: Option<ReasonCode>,
    pub reasoning: String,
    pub layer: ParseLayer,
}

impl ParsedVerdict {
    /// Conservative substitute for an unparseable answer
    pub fn fallback(raw: &str) -> Self {
        Self {
            judgment: Judgment::Categorical(Verdict::Uncertain),
            reason_code: None,
            reasoning: raw.trim().to_string(),
            layer: ParseLayer::Fallback,
        }
    }
}

/// Parse a panel answer through the JSON, regex and keyword layers.
///
/// # Examples
///
/// ```
/// use citeguard_domain::parsing::parse_panel_response;
/// use citeguard_domain::verdict::{Judgment, Verdict};
///
/// let parsed = parse_panel_response("SCORE: 9\nREASONING: Matches 347 U.S. 483.").unwrap();
/// assert_eq!(parsed.judgment, Judgment::Score(9));
///
/// let legacy = parse_panel_response(r#"{"label": "INVALID", "reason": "YEAR_MISMATCH"}"#).unwrap();
/// assert_eq!(legacy.judgment, Judgment::Categorical(Verdict::Invalid));
/// ```
pub fn parse_panel_response(text: &str) -> Result<ParsedVerdict, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let mut misses = Vec::new();

    match parse_json(text) {
        Ok(parsed) => return Ok(parsed),
        Err(miss) => misses.push(miss),
    }
    match parse_score(text) {
        Ok(parsed) => return Ok(parsed),
        Err(miss) => misses.push(miss),
    }
    match parse_keywords(text) {
        Ok(parsed) => return Ok(parsed),
        Err(miss) => misses.push(miss),
    }

    Err(ParseError::Unrecognized(misses))
}

/// Like [`parse_panel_response`], but substitutes UNCERTAIN on failure and
/// hands the error back for logging.
pub fn parse_panel_response_or_fallback(text: &str) -> (ParsedVerdict, Option<ParseError>) {
    match parse_panel_response(text) {
        Ok(parsed) => (parsed, None),
        Err(e) => (ParsedVerdict::fallback(text), Some(e)),
    }
}

fn parse_json(text: &str) -> Result<ParsedVerdict, LayerMiss> {
    let miss = |reason: &str| LayerMiss::new(ParseLayer::Json, reason);
    let value = extract_json_object(text).ok_or_else(|| miss("no JSON object"))?;

    let reason = value
        .get("reason")
        .or_else(|| value.get("reasoning"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .trim()
        .to_string();

    let judgment = if let Some(label) = value.get("label").and_then(|v| v.as_str()) {
        let verdict: Verdict = label
            .parse()
            .map_err(|_| miss(&format!("unknown label '{}'", label)))?;
        Judgment::Categorical(verdict)
    } else if let Some(score) = value.get("score").and_then(|v| v.as_f64()) {
        score_judgment(score.round() as i64).map_err(|r| LayerMiss::new(ParseLayer::Json, r))?
    } else {
        return Err(miss("object has neither 'label' nor 'score'"));
    };

    let reason_code = value
        .get("reason_code")
        .and_then(|v| v.as_str())
        .and_then(ReasonCode::from_code)
        .or_else(|| ReasonCode::from_code(&reason))
        .or_else(|| doubtful_reason(judgment, &reason));

    Ok(ParsedVerdict {
        judgment,
        reason_code,
        reasoning: reason,
        layer: ParseLayer::Json,
    })
}

fn parse_score(text: &str) -> Result<ParsedVerdict, LayerMiss> {
    let caps = SCORE_RE
        .captures(text)
        .ok_or_else(|| LayerMiss::new(ParseLayer::Regex, "no SCORE line"))?;
    let score: i64 = caps[1]
        .parse()
        .map_err(|_| LayerMiss::new(ParseLayer::Regex, "unreadable score"))?;
    let judgment = score_judgment(score).map_err(|r| LayerMiss::new(ParseLayer::Regex, r))?;

    let reasoning = REASONING_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();
    let reason_code = REASON_CODE_RE
        .captures(text)
        .and_then(|c| ReasonCode::from_code(&c[1]))
        .or_else(|| doubtful_reason(judgment, &reasoning));

    Ok(ParsedVerdict {
        judgment,
        reason_code,
        reasoning,
        layer: ParseLayer::Regex,
    })
}

fn parse_keywords(text: &str) -> Result<ParsedVerdict, LayerMiss> {
    let verdict = if let Some(caps) = VERDICT_LINE_RE.captures(text) {
        caps[1].parse().ok()
    } else if INVALID_RE.is_match(text) {
        Some(Verdict::Invalid)
    } else if UNCERTAIN_RE.is_match(text) {
        Some(Verdict::Uncertain)
    } else if VALID_RE.is_match(text) {
        Some(Verdict::Valid)
    } else {
        None
    };
    let verdict = verdict
        .ok_or_else(|| LayerMiss::new(ParseLayer::Keyword, "no VALID/INVALID/UNCERTAIN label"))?;
    let judgment = Judgment::Categorical(verdict);
    let reasoning = REASONING_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| text.trim().to_string());

    Ok(ParsedVerdict {
        judgment,
        reason_code: doubtful_reason(judgment, &reasoning),
        reasoning,
        layer: ParseLayer::Keyword,
    })
}

fn score_judgment(score: i64) -> Result<Judgment, String> {
    if (1..=10).contains(&score) {
        Ok(Judgment::Score(score as u8))
    } else {
        Err(format!("score {} outside 1-10", score))
    }
}

/// Reason codes only make sense for answers that doubt the citation
fn doubtful_reason(judgment: Judgment, reasoning: &str) -> Option<ReasonCode> {
    if judgment.verdict() == Verdict::Valid {
        None
    } else {
        ReasonCode::detect(reasoning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_format() {
        let parsed = parse_panel_response(
            "SCORE: 3\nREASONING: Volume 999 of the reporter does not contain page 1200.",
        )
        .unwrap();
        assert_eq!(parsed.judgment, Judgment::Score(3));
        assert_eq!(parsed.layer, ParseLayer::Regex);
        assert_eq!(parsed.reason_code, Some(ReasonCode::VolumePageMismatch));
        assert!(parsed.reasoning.starts_with("Volume 999"));
    }

    #[test]
    fn test_score_with_denominator_and_explicit_code() {
        let parsed = parse_panel_response(
            "Score = 2/10\nREASON_CODE: nonexistent authority\nREASONING: Nothing found.",
        )
        .unwrap();
        assert_eq!(parsed.judgment, Judgment::Score(2));
        assert_eq!(parsed.reason_code, Some(ReasonCode::NonexistentAuthority));
    }

    #[test]
    fn test_high_score_has_no_reason_code() {
        let parsed =
            parse_panel_response("SCORE: 9\nREASONING: The page and volume check out.").unwrap();
        assert_eq!(parsed.reason_code, None);
    }

    #[test]
    fn test_out_of_range_score_falls_through() {
        let err = parse_panel_response("SCORE: 42").unwrap_err();
        match err {
            ParseError::Unrecognized(misses) => {
                assert_eq!(misses.len(), 3);
                assert!(misses[1].reason.contains("outside 1-10"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_legacy_json() {
        let parsed = parse_panel_response(
            "Here you go:\n```json\n{\"label\": \"INVALID\", \"reason\": \"The quoted language is invented.\"}\n```",
        )
        .unwrap();
        assert_eq!(parsed.judgment, Judgment::Categorical(Verdict::Invalid));
        assert_eq!(parsed.layer, ParseLayer::Json);
        assert_eq!(parsed.reason_code, Some(ReasonCode::FabricatedQuote));
    }

    #[test]
    fn test_json_score() {
        let parsed =
            parse_panel_response(r#"{"score": 8, "reasoning": "Consistent with reporter"}"#)
                .unwrap();
        assert_eq!(parsed.judgment, Judgment::Score(8));
        assert_eq!(parsed.reasoning, "Consistent with reporter");
    }

    #[test]
    fn test_legacy_text() {
        let invalid = parse_panel_response("This citation is INVALID: no such case exists.").unwrap();
        assert_eq!(invalid.judgment, Judgment::Categorical(Verdict::Invalid));
        assert_eq!(invalid.layer, ParseLayer::Keyword);
        assert_eq!(invalid.reason_code, Some(ReasonCode::NonexistentAuthority));

        let valid = parse_panel_response("VALID - standard Supreme Court reporter cite.").unwrap();
        assert_eq!(valid.judgment, Judgment::Categorical(Verdict::Valid));

        let uncertain = parse_panel_response("Verdict: uncertain").unwrap();
        assert_eq!(uncertain.judgment, Judgment::Categorical(Verdict::Uncertain));
    }

    #[test]
    fn test_invalid_is_not_mistaken_for_valid() {
        let parsed = parse_panel_response("INVALID").unwrap();
        assert_eq!(parsed.judgment, Judgment::Categorical(Verdict::Invalid));
    }

    #[test]
    fn test_fallback_is_uncertain() {
        let (parsed, err) = parse_panel_response_or_fallback("I'd rather not say.");
        assert_eq!(parsed.judgment, Judgment::Categorical(Verdict::Uncertain));
        assert_eq!(parsed.layer, ParseLayer::Fallback);
        assert!(matches!(err, Some(ParseError::Unrecognized(_))));

        let (_, err) = parse_panel_response_or_fallback("   ");
        assert_eq!(err, Some(ParseError::Empty));
    }
}
