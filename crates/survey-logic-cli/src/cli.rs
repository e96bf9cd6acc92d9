use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{self, check::CheckArgs, replay::ReplayArgs, schema::SchemaArgs};
use crate::config::CliConfig;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "SURVEY_LOGIC_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "survey-logic",
    about = "Check, replay and describe branching survey definitions",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log engine decisions at debug level
    #[arg(long = "verbose", short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lint a survey definition
    Check(CheckArgs),
    /// Drive a survey with a scripted sequence of answers and moves
    Replay(ReplayArgs),
    /// Print the JSON Schema for survey definitions or exported state
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Check(args) => cmd::check::run(&args),
        Commands::Replay(args) => cmd::replay::run(&args, &config),
        Commands::Schema(args) => cmd::schema::run(&args),
    }
}

fn init_tracing(config: &CliConfig, verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(config, verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// `--verbose` wins, then the environment, then the config file, then `warn`.
fn log_filter(config: &CliConfig, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    match config.log.filter.as_deref() {
        Some(directive) => {
            EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
        }
        None => EnvFilter::new("warn"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::schema::SchemaKind;

    #[test]
    fn parses_check_subcommand() {
        let cli = Cli::try_parse_from(["survey-logic", "check", "survey.json", "--json"])
            .expect("expected CLI to parse");
        assert!(!cli.verbose);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.survey, PathBuf::from("survey.json"));
                assert!(args.json);
            }
            _ => panic!("expected check args"),
        }
    }

    #[test]
    fn parses_replay_with_global_flags() {
        let cli = Cli::try_parse_from([
            "survey-logic",
            "replay",
            "survey.json",
            "--script",
            "steps.json",
            "--state-out",
            "out/state.cbor",
            "--config",
            "survey-logic.toml",
            "-v",
        ])
        .expect("expected CLI to parse");
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("survey-logic.toml")));
        match cli.command {
            Commands::Replay(args) => {
                assert_eq!(args.script, PathBuf::from("steps.json"));
                assert_eq!(args.state, None);
                assert_eq!(args.state_out, Some(PathBuf::from("out/state.cbor")));
                assert!(!args.json);
            }
            _ => panic!("expected replay args"),
        }
    }

    #[test]
    fn replay_requires_script() {
        assert!(Cli::try_parse_from(["survey-logic", "replay", "survey.json"]).is_err());
    }

    #[test]
    fn schema_defaults_to_survey() {
        let cli = Cli::try_parse_from(["survey-logic", "schema"]).expect("expected CLI to parse");
        match cli.command {
            Commands::Schema(args) => assert_eq!(args.kind, SchemaKind::Survey),
            _ => panic!("expected schema args"),
        }

        let cli = Cli::try_parse_from(["survey-logic", "schema", "state"])
            .expect("expected CLI to parse");
        match cli.command {
            Commands::Schema(args) => assert_eq!(args.kind, SchemaKind::State),
            _ => panic!("expected schema args"),
        }
    }
}
