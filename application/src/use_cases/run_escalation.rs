//! Escalation Investigator (Stage 3)
//!
//! Runs only for citations whose Stage-2 consensus escalated. Every
//! investigator sees the panel's vote breakdown, not just the citation.

use super::invoke_agent::AgentInvoker;
use super::run_panel::{PanelError, PanelOutcome, check_agents, collect_panel};
use crate::ports::agent_gateway::AgentGateway;
use citeguard_domain::{AgentSpec, Citation, ConsensusResult, InvestigatorReport};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::info;

/// Use case for running the Stage-3 investigation
pub struct EscalationInvestigator<G: AgentGateway + 'static> {
    invoker: Arc<AgentInvoker<G>>,
}

impl<G: AgentGateway + 'static> EscalationInvestigator<G> {
    pub fn new(invoker: Arc<AgentInvoker<G>>) -> Self {
        Self { invoker }
    }

    pub async fn investigate(
        &self,
        citation: &Citation,
        consensus: &ConsensusResult,
        investigators: &[AgentSpec],
    ) -> Result<PanelOutcome<InvestigatorReport>, PanelError> {
        if !consensus.escalation_trigger {
            return Err(PanelError::NotEscalated);
        }
        check_agents(investigators)?;
        info!(
            "Stage 3: {} investigators on citation {} (panel {} {})",
            investigators.len(),
            citation.id,
            consensus.agreement_level,
            consensus.vote_summary()
        );

        let consensus = Arc::new(consensus.clone());
        let mut join_set = JoinSet::new();
        for agent in investigators {
            let invoker = Arc::clone(&self.invoker);
            let agent = agent.clone();
            let citation = citation.clone();
            let consensus = Arc::clone(&consensus);

            join_set.spawn(async move {
                let result = invoker.investigate(&agent, &citation, &consensus).await;
                (agent.id, result)
            });
        }

        Ok(collect_panel(join_set, investigators.len()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::use_cases::test_support::{ScriptedGateway, investigators, risk};
    use citeguard_domain::{AgentVerdict, ConsensusCalculator, RiskLevel};
    use std::time::Duration;

    fn consensus(scores: &[u8]) -> ConsensusResult {
        ConsensusCalculator::new(scores.len())
            .calculate(
                scores
                    .iter()
                    .enumerate()
                    .map(|(i, s)| AgentVerdict::scored(format!("panel-{}", i + 1), *s))
                    .collect(),
            )
            .unwrap()
    }

    fn investigator(gateway: Arc<ScriptedGateway>) -> EscalationInvestigator<ScriptedGateway> {
        let invoker = AgentInvoker::new(gateway, RetryPolicy::immediate(0), Duration::from_secs(5));
        EscalationInvestigator::new(Arc::new(invoker))
    }

    #[tokio::test]
    async fn test_investigators_see_the_disagreement() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_script("inv-model-1", vec![risk("MODERATE_RISK")])
                .with_script("inv-model-2", vec![risk("LOW_RISK")])
                .with_script("inv-model-3", vec![risk("NEEDS_ADDITIONAL_REVIEW")]),
        );
        let citation = Citation::new("c2", "Martinez v. Delta Air Lines, 523 F.3d 901 (9th Cir. 2011)");

        let outcome = investigator(Arc::clone(&gateway))
            .investigate(&citation, &consensus(&[9, 2, 8, 9, 3]), &investigators())
            .await
            .unwrap();

        assert!(outcome.is_complete());
        let mut levels: Vec<RiskLevel> = outcome.results.iter().map(|r| r.risk_level()).collect();
        levels.sort();
        assert_eq!(
            levels,
            vec![
                RiskLevel::LowRisk,
                RiskLevel::ModerateRisk,
                RiskLevel::NeedsAdditionalReview
            ]
        );
        for model in ["inv-model-1", "inv-model-2", "inv-model-3"] {
            assert!(gateway.prompts(model)[0].contains("Panel agreement: split"));
        }
    }

    #[tokio::test]
    async fn test_refuses_unescalated_citation() {
        let err = investigator(Arc::new(ScriptedGateway::new()))
            .investigate(
                &Citation::new("c1", "1 U.S. 1"),
                &consensus(&[9, 9, 9, 9, 9]),
                &investigators(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PanelError::NotEscalated));
    }
}
