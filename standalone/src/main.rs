use std::fs;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use standalone::args::{parse_args, Commands, SubmitArgs};
use standalone::run_standalone_mr_job;

fn submit(args: SubmitArgs) -> Result<()> {
    let job = args.to_job()?;
    info!(
        "Submitting workload `{}` on `{}` with {} partition(s)",
        job.workload.name, job.input, job.n_reduce
    );

    let report = run_standalone_mr_job(&job)
        .with_context(|| format!("failed to run job on `{}`", job.input))?;

    if report.skipped > 0 {
        warn!("Skipped {} invalid record(s)", report.skipped);
    }
    if report.top.is_empty() {
        warn!("No records were counted");
    }

    let rendered = report
        .render(args.format)
        .context("failed to render report")?;

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write report to `{}`", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so the report on stdout stays clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match parse_args() {
        Commands::Submit(args) => submit(args),
        Commands::Workloads => {
            for wl in workload::all() {
                println!("{:<10} {} / {}", wl.name, wl.label, wl.metric);
            }
            Ok(())
        }
    }
}
