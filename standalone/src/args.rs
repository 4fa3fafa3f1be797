use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::engine::{default_n_reduce, Job};
use crate::loader::{LoadOptions, Policy};
use crate::reduce::ReduceMode;
use crate::report::Format;

//
// For parsing user specified command.
//
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a job in this process and print the most frequent keys.
    Submit(SubmitArgs),
    /// List the known workloads.
    Workloads,
}

#[derive(clap::Args, Debug)]
pub struct SubmitArgs {
    /// Input file, directory or glob spec. Every matching file is one shard.
    #[arg(short, long)]
    pub input: String,

    /// Name of the workload.
    #[arg(short, long, default_value = workload::DEFAULT)]
    pub workload: String,

    /// Number of keys to report.
    #[arg(short = 'n', long, default_value = "1")]
    pub top: NonZeroUsize,

    /// Number of reduce partitions. Defaults to the available parallelism.
    #[arg(short, long)]
    pub partitions: Option<NonZeroUsize>,

    /// Abort on the first invalid record instead of skipping it.
    #[arg(long)]
    pub strict: bool,

    /// Reduce each partition on its own thread.
    #[arg(long)]
    pub parallel: bool,

    /// Field delimiter, a single ASCII character.
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Treat the first row of every shard as a header.
    #[arg(long)]
    pub has_headers: bool,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Write the report to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SubmitArgs {
    /// Resolve the arguments into a runnable job.
    pub fn to_job(&self) -> Result<Job> {
        let workload = workload::try_named(&self.workload)
            .ok_or_else(|| anyhow!("The workload `{}` is not a known workload", self.workload))?;

        Ok(Job {
            input: self.input.clone(),
            workload,
            top: self.top,
            n_reduce: self.partitions.unwrap_or_else(default_n_reduce),
            load: LoadOptions {
                policy: if self.strict {
                    Policy::Strict
                } else {
                    Policy::Lenient
                },
                delimiter: self.delimiter,
                has_headers: self.has_headers,
            },
            reduce: if self.parallel {
                ReduceMode::Threaded
            } else {
                ReduceMode::Sequential
            },
        })
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("`{s}` is not a single ASCII character")),
    }
}

/// Parse the user command.
pub fn parse_args() -> Commands {
    Args::parse().command
}
