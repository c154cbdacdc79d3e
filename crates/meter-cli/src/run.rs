//! `meter run`: replay a scenario through the real harness.

use std::time::Duration;

use anyhow::Context;
use meter_core::Task;
use meter_core::domain::{HarnessError, Submission};
use meter_core::impls::{RecordingBeacon, ScriptedPage, TokioClock};
use meter_core::ports::{Beacon, RandomIdGenerator};
use url::Url;

use crate::cli::RunArgs;
use crate::scenario::Scenario;

/// Prints each submission URL as it is dispatched and keeps a copy.
#[derive(Debug, Clone, Default)]
pub struct StdoutBeacon {
    log: RecordingBeacon,
}

impl StdoutBeacon {
    pub fn submissions(&self) -> Vec<Submission> {
        self.log.submissions()
    }
}

impl Beacon for StdoutBeacon {
    fn dispatch(&self, url: Url) {
        println!("GET {url}");
        self.log.dispatch(url);
    }
}

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let beacon = StdoutBeacon::default();
    let replay = replay(&args, &beacon).await?;
    print_summary(&replay.measurement_id, &beacon.submissions());
    replay.result.context("task stopped before measuring")
}

/// What happened within the observation window.
struct Replay {
    measurement_id: String,
    result: Result<(), HarnessError>,
}

async fn replay(args: &RunArgs, beacon: &StdoutBeacon) -> anyhow::Result<Replay> {
    let hints = args.task_hints();
    let scenario = Scenario::load(&args.scenario)?;
    let (config, script) = scenario.into_parts(&RandomIdGenerator, hints);
    let measurement_id = config.measurement_id.to_string();

    let task = Task::builder(config)
        .page(ScriptedPage::new(script))
        .beacon(beacon.clone())
        .clock(TokioClock::new())
        .build()
        .context("failed to build task")?;

    let window = Duration::from_millis(args.window_ms);
    let result = match tokio::time::timeout(window, task.launch()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::info!(
                window_ms = args.window_ms,
                "observation window closed with resources still pending"
            );
            Ok(())
        }
    };
    Ok(Replay {
        measurement_id,
        result,
    })
}

fn print_summary(measurement_id: &str, submissions: &[Submission]) {
    println!();
    println!("measurement {measurement_id}: {} submission(s)", submissions.len());
    for s in submissions {
        println!("  {}", summary_line(s));
    }
}

fn summary_line(s: &Submission) -> String {
    let subject = if s.outcome.state.is_control() {
        "control"
    } else {
        "target"
    };
    format!(
        "{subject:<8} {:<22} {}",
        s.outcome.state.as_str(),
        s.outcome.message.as_deref().unwrap_or("")
    )
}
