//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for pipeline results and consistency reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Summary table, one row per citation
    Console,
    /// Every agent's verdict and reasoning
    Full,
    /// JSON output
    Json,
}

impl From<OutputFormat> for citeguard_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Console => citeguard_domain::OutputFormat::Console,
            OutputFormat::Full => citeguard_domain::OutputFormat::Full,
            OutputFormat::Json => citeguard_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for citeguard
#[derive(Parser, Debug)]
#[command(name = "citeguard")]
#[command(author, version, about = "Multi-agent verification of legal citations")]
#[command(long_about = r#"
citeguard checks extracted legal citations for fabrication with a panel of
independent AI evaluators.

Every citation goes through two stages:
1. Panel: five evaluators score the citation; their agreement is measured
2. Investigation: only when the panel disagrees, three investigators with
   different styles dig deeper and settle on a risk level

Configuration files are loaded from (in priority order):
1. --config <path>          Explicit config file
2. CITEGUARD_* variables    e.g. CITEGUARD_QUEUE__BATCH_SIZE=10
3. ./citeguard.toml         Project-level config
4. ~/.config/citeguard/config.toml   Global config

Example:
  citeguard validate brief.citations.json --out runs/brief-1.json
  citeguard consistency runs/brief-1.json runs/brief-2.json runs/brief-3.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (defaults to the config file's, then console)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostic logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run citations through the verification pipeline
    Validate {
        /// JSON file of extracted citations
        input: PathBuf,

        /// Document check id (defaults to the file's own, then its name)
        #[arg(long, value_name = "ID")]
        check_id: Option<String>,

        /// Write the finished run snapshot here
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Compare independently completed runs of the same citations
    Consistency {
        /// Run snapshots written by `validate --out`
        #[arg(required = true, num_args = 1..)]
        runs: Vec<PathBuf>,
    },
}
