//! Agent specifications for the Stage-2 panel and the Stage-3 investigators.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Investigation style of a Stage-3 agent.
///
/// Investigators are deliberately heterogeneous so that their disagreement
/// carries information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigatorPersona {
    /// Checks every component (volume, reporter, page, year, court) in isolation
    DetailChecker,
    /// Weighs the citation against the document's argument as a whole
    HolisticSynthesizer,
    /// Looks for the tell-tale patterns of fabricated authority
    FabricationSpecialist,
}

impl InvestigatorPersona {
    pub const ALL: [InvestigatorPersona; 3] = [
        InvestigatorPersona::DetailChecker,
        InvestigatorPersona::HolisticSynthesizer,
        InvestigatorPersona::FabricationSpecialist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestigatorPersona::DetailChecker => "detail_checker",
            InvestigatorPersona::HolisticSynthesizer => "holistic_synthesizer",
            InvestigatorPersona::FabricationSpecialist => "fabrication_specialist",
        }
    }
}

impl fmt::Display for InvestigatorPersona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestigatorPersona {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "detail_checker" | "conservative" => Ok(InvestigatorPersona::DetailChecker),
            "holistic_synthesizer" | "holistic" => Ok(InvestigatorPersona::HolisticSynthesizer),
            "fabrication_specialist" | "fabrication" => {
                Ok(InvestigatorPersona::FabricationSpecialist)
            }
            other => Err(DomainError::unknown("persona", other)),
        }
    }
}

/// One configured evaluation agent.
///
/// `id` is the stable identity used for consistency statistics; `model` is
/// what gets sent to the oracle. Two agents may share a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<InvestigatorPersona>,
}

impl AgentSpec {
    pub fn new(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            persona: None,
        }
    }

    pub fn with_persona(mut self, persona: InvestigatorPersona) -> Self {
        self.persona = Some(persona);
        self
    }

    /// The five-member Stage-2 panel used when nothing is configured
    pub fn default_panel() -> Vec<AgentSpec> {
        [
            "claude-sonnet-4.5",
            "gpt-5.2",
            "gemini-3-pro-preview",
            "claude-haiku-4.5",
            "gpt-5-mini",
        ]
        .iter()
        .enumerate()
        .map(|(i, model)| AgentSpec::new(format!("panel-{}", i + 1), *model))
        .collect()
    }

    /// One investigator per persona
    pub fn default_investigators() -> Vec<AgentSpec> {
        InvestigatorPersona::ALL
            .iter()
            .map(|p| AgentSpec::new(format!("investigator-{}", p.as_str()), "claude-opus-4.5").with_persona(*p))
            .collect()
    }
}

/// Validate a set of agents: non-empty, unique ids, non-empty models.
pub fn validate_agents(agents: &[AgentSpec]) -> Result<(), DomainError> {
    if agents.is_empty() {
        return Err(DomainError::NoAgents);
    }
    let mut seen = std::collections::HashSet::new();
    for agent in agents {
        if agent.id.trim().is_empty() || agent.model.trim().is_empty() {
            return Err(DomainError::InvalidAgent(format!(
                "agent '{}' has an empty id or model",
                agent.id
            )));
        }
        if !seen.insert(agent.id.as_str()) {
            return Err(DomainError::InvalidAgent(format!(
                "duplicate agent id '{}'",
                agent.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_panel_has_five_distinct_agents() {
        let panel = AgentSpec::default_panel();
        assert_eq!(panel.len(), 5);
        assert!(validate_agents(&panel).is_ok());
        assert!(panel.iter().all(|a| a.persona.is_none()));
    }

    #[test]
    fn test_default_investigators_cover_every_persona() {
        let investigators = AgentSpec::default_investigators();
        assert_eq!(investigators.len(), 3);
        for persona in InvestigatorPersona::ALL {
            assert!(investigators.iter().any(|a| a.persona == Some(persona)));
        }
    }

    #[test]
    fn test_validate_rejects_duplicates_and_empty() {
        assert!(matches!(validate_agents(&[]), Err(DomainError::NoAgents)));
        let dup = vec![AgentSpec::new("a", "m1"), AgentSpec::new("a", "m2")];
        assert!(validate_agents(&dup).is_err());
        let empty_model = vec![AgentSpec::new("a", " ")];
        assert!(validate_agents(&empty_model).is_err());
    }

    #[test]
    fn test_persona_parse() {
        assert_eq!(
            "detail-checker".parse::<InvestigatorPersona>().unwrap(),
            InvestigatorPersona::DetailChecker
        );
        assert_eq!(
            "Fabrication".parse::<InvestigatorPersona>().unwrap(),
            InvestigatorPersona::FabricationSpecialist
        );
        assert!("optimist".parse::<InvestigatorPersona>().is_err());
    }
}
