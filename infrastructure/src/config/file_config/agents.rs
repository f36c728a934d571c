//! Agent configuration from TOML (`[panel]` and `[escalation]` sections)

use citeguard_domain::{AgentSpec, ConfigIssue, ConfigIssueCode, InvestigatorPersona};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One `[[panel.agents]]` or `[[escalation.investigators]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAgentEntry {
    pub id: String,
    pub model: String,
    /// Persona name, investigators only (e.g., "detail_checker", "holistic")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

impl From<&AgentSpec> for FileAgentEntry {
    fn from(spec: &AgentSpec) -> Self {
        Self {
            id: spec.id.clone(),
            model: spec.model.clone(),
            persona: spec.persona.map(|p| p.as_str().to_string()),
        }
    }
}

/// Raw panel configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePanelConfig {
    pub agents: Vec<FileAgentEntry>,
}

impl Default for FilePanelConfig {
    fn default() -> Self {
        Self {
            agents: AgentSpec::default_panel().iter().map(Into::into).collect(),
        }
    }
}

impl FilePanelConfig {
    /// Parse the panel, dropping unusable entries and reporting why.
    pub fn parse(&self) -> (Vec<AgentSpec>, Vec<ConfigIssue>) {
        let (agents, mut issues) = parse_entries("panel.agents", &self.agents, false);
        if agents.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyPanel,
                "panel.agents: at least one panel agent is required",
            ));
        } else if agents.len() < 3 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::SmallPanel,
                format!(
                    "panel.agents: {} agents can only agree unanimously or split",
                    agents.len()
                ),
            ));
        }
        (agents, issues)
    }
}

/// Raw escalation configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEscalationConfig {
    pub investigators: Vec<FileAgentEntry>,
}

impl Default for FileEscalationConfig {
    fn default() -> Self {
        Self {
            investigators: AgentSpec::default_investigators()
                .iter()
                .map(Into::into)
                .collect(),
        }
    }
}

impl FileEscalationConfig {
    pub fn parse(&self) -> (Vec<AgentSpec>, Vec<ConfigIssue>) {
        let (agents, mut issues) =
            parse_entries("escalation.investigators", &self.investigators, true);
        if agents.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyEscalation,
                "escalation.investigators: at least one investigator is required",
            ));
        }
        (agents, issues)
    }
}

fn parse_entries(
    field: &str,
    entries: &[FileAgentEntry],
    wants_persona: bool,
) -> (Vec<AgentSpec>, Vec<ConfigIssue>) {
    let mut agents = Vec::with_capacity(entries.len());
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for entry in entries {
        if entry.id.trim().is_empty() || entry.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::BlankAgent,
                format!("{}: agent '{}' has an empty id or model", field, entry.id),
            ));
            continue;
        }
        if !seen.insert(entry.id.as_str()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateAgentId,
                format!("{}: duplicate agent id '{}'", field, entry.id),
            ));
            continue;
        }

        let mut spec = AgentSpec::new(entry.id.trim(), entry.model.trim());
        match entry.persona.as_deref().map(str::parse::<InvestigatorPersona>) {
            Some(Ok(persona)) => spec = spec.with_persona(persona),
            Some(Err(_)) => issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownPersona,
                format!(
                    "{}: unknown persona '{}' on agent '{}'",
                    field,
                    entry.persona.as_deref().unwrap_or_default(),
                    entry.id
                ),
            )),
            None if wants_persona => issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingPersona,
                format!(
                    "{}: agent '{}' has no persona and gets the generic prompt",
                    field, entry.id
                ),
            )),
            None => {}
        }
        agents.push(spec);
    }
    (agents, issues)
}
