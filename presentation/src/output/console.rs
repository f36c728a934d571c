//! Console output formatter for validation runs and consistency reports

use super::ValidationOutcome;
use super::formatter::OutputFormatter;
use citeguard_domain::{AgreementLevel, Citation, ConsistencyReport, JobStatus, RiskLevel, Tier};
use colored::{ColoredString, Colorize};
use std::collections::BTreeMap;

/// Formats results for console display
pub struct ConsoleFormatter {
    /// Include every agent's verdict and reasoning
    full: bool,
}

impl ConsoleFormatter {
    pub fn summary() -> Self {
        Self { full: false }
    }

    pub fn full() -> Self {
        Self { full: true }
    }

    fn risk(level: Option<RiskLevel>) -> ColoredString {
        match level {
            Some(RiskLevel::LowRisk) => "LOW_RISK".green(),
            Some(RiskLevel::ModerateRisk) => "MODERATE_RISK".yellow(),
            Some(RiskLevel::NeedsAdditionalReview) => "NEEDS_REVIEW".red().bold(),
            None => "UNRESOLVED".dimmed(),
        }
    }

    fn agreement(level: AgreementLevel) -> ColoredString {
        match level {
            AgreementLevel::Unanimous => level.as_str().green(),
            AgreementLevel::Strong => level.as_str().cyan(),
            AgreementLevel::Split => level.as_str().yellow(),
        }
    }

    fn citation_row(citation: &Citation) -> String {
        let stage2 = citation
            .tier2
            .as_ref()
            .map(|c| {
                format!(
                    "{} {} {}",
                    Self::agreement(c.agreement_level),
                    c.vote_summary(),
                    c.recommendation.as_str().dimmed()
                )
            })
            .unwrap_or_else(|| "-".dimmed().to_string());
        let stage3 = if citation.tier3.is_some() {
            format!(" {}", "[investigated]".magenta())
        } else {
            String::new()
        };
        format!(
            "  {:<14} {:<8} {}{}\n      {}\n",
            Self::risk(citation.effective_risk_level()).to_string(),
            citation.id.to_string(),
            stage2,
            stage3,
            truncate(&citation.text, 100)
        )
    }

    fn citation_detail(citation: &Citation) -> String {
        let mut out = String::new();
        if let Some(consensus) = &citation.tier2 {
            out.push_str(&format!(
                "      {} confidence {:.2}{}\n",
                "Stage 2".cyan(),
                consensus.confidence_score,
                consensus
                    .mean_score
                    .map(|m| format!(", mean score {:.1}", m))
                    .unwrap_or_default()
            ));
            for verdict in &consensus.verdicts {
                let mut line = format!("        {:<12} {}", verdict.agent, verdict.judgment);
                if let Some(code) = verdict.reason_code {
                    line.push_str(&format!(" ({})", code));
                }
                if verdict.parse_fallback {
                    line.push_str(&format!(" {}", "[unparsed]".red()));
                }
                out.push_str(&line);
                out.push('\n');
                if !verdict.reasoning.is_empty() {
                    out.push_str(&format!(
                        "          {}\n",
                        truncate(&verdict.reasoning, 200).dimmed()
                    ));
                }
            }
        }
        if let Some(tier3) = &citation.tier3 {
            out.push_str(&format!(
                "      {} {} ({})\n",
                "Stage 3".magenta(),
                Self::risk(Some(tier3.final_risk_level())),
                Self::agreement(tier3.agreement_level)
            ));
            for report in &tier3.reports {
                let persona = report
                    .persona
                    .map(|p| format!(" [{}]", p))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "        {}{}: {}\n",
                    report.agent,
                    persona,
                    Self::risk(Some(report.risk_level()))
                ));
                if !report.reasoning.is_empty() {
                    out.push_str(&format!(
                        "          {}\n",
                        truncate(&report.reasoning, 200).dimmed()
                    ));
                }
            }
            if let Some(link) = tier3.source_link() {
                out.push_str(&format!("      {} {}\n", "Source:".bold(), link.underline()));
            }
        }
        out
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_outcome(&self, outcome: &ValidationOutcome<'_>) -> String {
        let check = outcome.check;
        let mut output = String::new();

        output.push_str(&Self::header("Citation Verification"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Document:".cyan().bold(),
            check.document_name.as_deref().unwrap_or(check.id.as_str())
        ));
        let status = match outcome.progress.status {
            JobStatus::Completed => "completed".green(),
            JobStatus::Failed => "failed".red().bold(),
            other => other.to_string().yellow(),
        };
        output.push_str(&format!(
            "{} {} ({} citations, {} escalated)\n",
            "Status:".cyan().bold(),
            status,
            outcome.progress.tier2_total,
            outcome.progress.tier3_total
        ));

        // Tally by effective risk level
        let mut tally: BTreeMap<Option<RiskLevel>, usize> = BTreeMap::new();
        for citation in &check.citations {
            *tally.entry(citation.effective_risk_level()).or_default() += 1;
        }
        let counts: Vec<String> = tally
            .iter()
            .map(|(level, n)| format!("{} {}", n, Self::risk(*level)))
            .collect();
        output.push_str(&format!("{} {}\n", "Results:".cyan().bold(), counts.join(", ")));

        output.push_str(&Self::section_header("Citations"));
        for citation in &check.citations {
            output.push_str(&Self::citation_row(citation));
            if self.full {
                output.push_str(&Self::citation_detail(citation));
            }
        }

        if let Some(failure) = outcome.failure {
            output.push_str(&Self::section_header("Job Failed"));
            output.push_str(&format!("{}\n", failure.reason.red()));
            if !failure.unresolved_citations.is_empty() {
                let ids: Vec<String> = failure
                    .unresolved_citations
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                output.push_str(&format!("{} {}\n", "Unresolved:".bold(), ids.join(", ")));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    fn format_consistency(&self, report: &ConsistencyReport) -> String {
        let summary = &report.summary;
        let mut output = String::new();

        output.push_str(&Self::header("Consistency Report"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}   {} {}   {} {}\n",
            "Runs:".cyan().bold(),
            summary.total_runs,
            "Citations:".cyan().bold(),
            summary.total_citations,
            "Multi-run:".cyan().bold(),
            summary.multi_run_citations
        ));
        output.push_str(&format!(
            "{} {}/{}   {} {}   {} {}\n",
            "Fully consistent:".cyan().bold(),
            summary.fully_consistent_citations,
            summary.multi_run_citations,
            "Mean agreement:".cyan().bold(),
            percent(summary.mean_agreement_rate.map(|r| r * 100.0)),
            "Mean agent consistency:".cyan().bold(),
            percent(summary.mean_agent_consistency)
        ));

        output.push_str(&Self::section_header("Citations"));
        for citation in &report.citations {
            let distribution: Vec<String> = citation
                .distribution
                .iter()
                .map(|(level, n)| format!("{}x{}", level.as_str(), n))
                .collect();
            let rate = citation.agreement_rate * 100.0;
            let rate = if rate >= 100.0 {
                format!("{:>5.1}%", rate).green()
            } else {
                format!("{:>5.1}%", rate).yellow()
            };
            output.push_str(&format!(
                "  {} {:<14} {}\n      {}\n",
                rate,
                Self::risk(citation.most_common).to_string(),
                distribution.join(" ").dimmed(),
                truncate(&citation.text, 100)
            ));
        }

        output.push_str(&Self::section_header("Agents"));
        for agent in &report.agents {
            let stage = match agent.tier {
                Tier::Panel => "panel",
                Tier::Investigation => "investigation",
            };
            output.push_str(&format!(
                "  {:<24} {:<13} {:>7}  {} citations, {} multi-run\n",
                agent.agent,
                stage,
                percent(agent.consistency_pct),
                agent.unique_citations,
                agent.multi_run_citations
            ));
            if self.full && !agent.distribution.is_empty() {
                let distribution: Vec<String> = agent
                    .distribution
                    .iter()
                    .map(|(token, n)| format!("{}x{}", token, n))
                    .collect();
                output.push_str(&format!("      {}\n", distribution.join(" ").dimmed()));
            }
        }

        output.push_str(&Self::footer());
        output
    }
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}
