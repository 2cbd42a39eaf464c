use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(version, about = "Run a MapReduce job over a local text file", long_about = None)]
pub struct Args {
    /// Newline-delimited input file.
    pub input: PathBuf,

    /// Number of map tasks (input sections).
    #[arg(allow_negative_numbers = true)]
    pub num_mappers: String,

    /// Number of reduce tasks (output files).
    #[arg(allow_negative_numbers = true)]
    pub num_reducers: String,

    /// Directory receiving output_<i>.txt.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Built-in workload to run: `identity` or `word-count`.
    #[arg(short, long, default_value = "identity")]
    pub workload: String,

    /// Write a JSON summary of the run to this file.
    #[arg(short, long)]
    pub summary: Option<PathBuf>,

    /// Log more (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Parses a worker count. Anything that is not a positive integer is an
/// invalid argument for the pipeline.
pub fn parse_count(name: &str, raw: &str) -> mr::Result<usize> {
    let n: i64 = raw.trim().parse().map_err(|_| {
        mr::Error::invalid(format!("{} must be an integer, got `{}`", name, raw))
    })?;
    if n <= 0 {
        return Err(mr::Error::invalid(format!(
            "{} must be positive, got {}",
            name, n
        )));
    }
    usize::try_from(n).map_err(|_| mr::Error::invalid(format!("{} is too large: {}", name, n)))
}
