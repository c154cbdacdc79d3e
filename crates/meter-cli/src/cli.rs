//! Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use meter_core::domain::TaskHints;

#[derive(Debug, Parser)]
#[command(name = "meter", version, about = "Replay a measurement task against a scripted page")]
pub struct Cli {
    /// Debug logging for the harness
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one scenario and print every submission
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Scenario JSON: {"config": TaskConfig, "page": PageScript}
    pub scenario: PathBuf,

    /// Query-style hint, e.g. `showStats=false` (repeatable)
    #[arg(long = "hint", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub hints: Vec<(String, String)>,

    /// Hint cookie, e.g. `cmh-disable=true` (repeatable)
    #[arg(long = "cookie", value_name = "NAME=VALUE", value_parser = parse_pair)]
    pub cookies: Vec<(String, String)>,

    /// How long to watch the task before printing the summary
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub window_ms: u64,
}

impl RunArgs {
    /// Hints from the command line, if any were given.
    pub fn task_hints(&self) -> Option<TaskHints> {
        if self.hints.is_empty() && self.cookies.is_empty() {
            return None;
        }
        Some(TaskHints::from_query_and_cookies(
            self.hints.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meter_core::domain::LibraryHint;

    #[test]
    fn pairs_split_on_the_first_equals() {
        assert_eq!(
            parse_pair("count=3").unwrap(),
            ("count".to_string(), "3".to_string())
        );
        assert_eq!(parse_pair("k=a=b").unwrap().1, "a=b");
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn run_flags_become_hints() {
        let cli = Cli::parse_from([
            "meter",
            "run",
            "scenario.json",
            "--hint",
            "jQueryAlreadyLoaded=false",
            "--hint",
            "count=2",
            "--cookie",
            "cmh-count=7",
        ]);
        let Command::Run(args) = cli.command;

        let hints = args.task_hints().unwrap();
        assert_eq!(hints.library, LibraryHint::Absent);
        assert_eq!(hints.prior_count, 7);
        assert_eq!(args.window_ms, 5000);
    }

    #[test]
    fn no_flags_keep_the_scenario_hints() {
        let cli = Cli::parse_from(["meter", "run", "scenario.json", "--window-ms", "10"]);
        let Command::Run(args) = cli.command;
        assert_eq!(args.task_hints(), None);
        assert_eq!(args.window_ms, 10);
    }
}
