//! Prompt templates for the validation pipeline

use crate::agent::InvestigatorPersona;
use crate::citation::Citation;
use crate::consensus::ConsensusResult;

/// Longest document excerpt handed to an agent, in characters
const MAX_CONTEXT_CHARS: usize = 2_000;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for Stage-2 panelists
    pub fn panel_system() -> &'static str {
        r#"You are an experienced legal research attorney verifying citations in a court filing.
Your task is to judge whether a single citation refers to real, correctly cited authority.
Consider whether the case or statute exists, whether the reporter, volume and page are plausible
for the court and year, and whether the surrounding text attributes a holding it could support.
Be calibrated: reserve low scores for citations you believe are fabricated or materially wrong."#
    }

    /// User prompt for one Stage-2 evaluation
    pub fn panel_prompt(citation: &Citation) -> String {
        let mut prompt = Self::citation_block(citation);
        prompt.push_str(
            r#"
Rate how likely this citation is authentic and correctly cited, from 1 (certainly fabricated)
to 10 (certainly authentic). Scores of 8 or more mean you would rely on it; 5-7 mean you are unsure;
4 or less mean you believe it is fabricated or materially wrong.

Respond in exactly this format:
SCORE: <1-10>
REASON_CODE: <optional; one of NONEXISTENT_AUTHORITY, CASE_NAME_MISMATCH, VOLUME_PAGE_MISMATCH, YEAR_MISMATCH, COURT_MISMATCH, FABRICATED_QUOTE, MISATTRIBUTED_HOLDING, FORMAT_ANOMALY, INSUFFICIENT_INFORMATION>
REASONING: <two to four sentences>"#,
        );
        prompt
    }

    /// System prompt for a Stage-3 investigator, specialized by persona
    pub fn investigation_system(persona: Option<InvestigatorPersona>) -> String {
        let focus = match persona {
            Some(InvestigatorPersona::DetailChecker) => {
                r#"You are a meticulous cite-checker. Verify every component in isolation: party names,
volume, reporter series, first page, pin cite, court and decision year. A single component that
cannot be reconciled is enough to raise the risk level. When in doubt, be conservative."#
            }
            Some(InvestigatorPersona::HolisticSynthesizer) => {
                r#"You are a senior litigator reviewing a brief. Weigh the citation against the argument it
supports: does the authority plausibly stand for the proposition, in this jurisdiction, at this time?
Minor formatting slips matter less than whether the authority is real and on point."#
            }
            Some(InvestigatorPersona::FabricationSpecialist) => {
                r#"You specialize in detecting fabricated legal authority. Look for the patterns typical of
invented citations: plausible but nonexistent party names, volumes beyond a reporter's range, page
numbers inconsistent with the volume's year, quotations that appear nowhere, and holdings that are
too conveniently on point."#
            }
            None => {
                r#"You are a legal research specialist investigating a citation whose authenticity is in dispute."#
            }
        };
        format!(
            "{}\n\nA first-pass review panel disagreed about this citation. Resolve the dispute: \
             locate the authority if you can, and state your risk assessment.",
            focus
        )
    }

    /// User prompt for one Stage-3 investigation, carrying the panel's disagreement
    pub fn investigation_prompt(citation: &Citation, consensus: &ConsensusResult) -> String {
        let mut prompt = Self::citation_block(citation);
        prompt.push_str(&format!(
            "\nFirst-pass panel ({} votes {}):\n{}",
            consensus.panel_size(),
            consensus.vote_summary(),
            consensus.disagreement_summary()
        ));
        prompt.push_str(
            r#"
Classify the risk that this citation is fabricated or materially wrong.

Respond in exactly this format:
RISK_LEVEL: <LOW_RISK | MODERATE_RISK | NEEDS_ADDITIONAL_REVIEW>
CONFIDENCE: <0.0-1.0>
REASONING: <what you checked and what you found>
SOURCE: <URL of the located authority, or omit this line>"#,
        );
        prompt
    }

    fn citation_block(citation: &Citation) -> String {
        let mut block = format!("Citation ({}):\n{}\n", citation.kind.as_str(), citation.text);

        let components = citation.components.describe();
        if !components.is_empty() {
            block.push_str("\nExtracted components:\n");
            for (name, value) in components {
                block.push_str(&format!("- {}: {}\n", name, value));
            }
        }

        if let Some(context) = citation.context.as_deref().filter(|c| !c.trim().is_empty()) {
            block.push_str(&format!(
                "\nDocument context:\n\"\"\"\n{}\n\"\"\"\n",
                truncate_chars(context.trim(), MAX_CONTEXT_CHARS)
            ));
        }

        if !citation.tier1.issues.is_empty() {
            block.push_str(&format!(
                "\nFormat check notes: {}\n",
                citation.tier1.issues.join("; ")
            ));
        }
        block
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::CitationComponents;
    use crate::consensus::ConsensusCalculator;
    use crate::verdict::AgentVerdict;

    fn citation() -> Citation {
        Citation::new("c1", "Varghese v. China Southern Airlines, 925 F.3d 1339 (11th Cir. 2019)")
            .with_components(CitationComponents {
                case_name: Some("Varghese v. China Southern Airlines".into()),
                volume: Some("925".into()),
                reporter: Some("F.3d".into()),
                page: Some("1339".into()),
                ..Default::default()
            })
            .with_context("The Montreal Convention's limitations period is tolled, see Varghese.")
    }

    #[test]
    fn test_panel_prompt_contains_citation_and_contract() {
        let prompt = PromptTemplate::panel_prompt(&citation());
        assert!(prompt.contains("925 F.3d 1339"));
        assert!(prompt.contains("- reporter: F.3d"));
        assert!(prompt.contains("Montreal Convention"));
        assert!(prompt.contains("SCORE: <1-10>"));
    }

    #[test]
    fn test_investigation_prompt_carries_panel_breakdown() {
        let verdicts = [9, 2, 8, 9, 3]
            .iter()
            .enumerate()
            .map(|(i, s)| {
                AgentVerdict::scored(format!("panel-{}", i + 1), *s)
                    .with_reasoning(format!("reason {}", i + 1))
            })
            .collect();
        let consensus = ConsensusCalculator::new(5).calculate(verdicts).unwrap();

        let prompt = PromptTemplate::investigation_prompt(&citation(), &consensus);
        assert!(prompt.contains("[+-++-]"));
        assert!(prompt.contains("panel-2: 2/10"));
        assert!(prompt.contains("reason 5"));
        assert!(prompt.contains("RISK_LEVEL:"));
    }

    #[test]
    fn test_personas_get_distinct_system_prompts() {
        let prompts: Vec<String> = InvestigatorPersona::ALL
            .iter()
            .map(|p| PromptTemplate::investigation_system(Some(*p)))
            .collect();
        assert_ne!(prompts[0], prompts[1]);
        assert_ne!(prompts[1], prompts[2]);
        assert!(prompts[2].contains("fabricated"));
    }

    #[test]
    fn test_long_context_is_truncated() {
        let long = "x".repeat(MAX_CONTEXT_CHARS + 50);
        let prompt = PromptTemplate::panel_prompt(&Citation::new("c", "1 U.S. 1").with_context(long));
        assert!(prompt.contains(&format!("{}...", "x".repeat(MAX_CONTEXT_CHARS))));
        assert!(!prompt.contains(&"x".repeat(MAX_CONTEXT_CHARS + 1)));
    }
}
