use std::process::ExitCode;

use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use mr::{JobConfig, Workload};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod args;
use args::{parse_count, Args};

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            println!("{}", Args::command().render_usage());
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let num_mappers = parse_count("num-mappers", &args.num_mappers)?;
    let num_reducers = parse_count("num-reducers", &args.num_reducers)?;
    let workload = Workload::named(&args.workload)?;

    let config =
        JobConfig::new(args.input, num_mappers, num_reducers).with_output_dir(args.output_dir);
    let summary = mr::run(config, workload).await?;

    if let Some(path) = args.summary {
        summary
            .write_json(&path)
            .context("run succeeded but the summary could not be saved")?;
        info!(summary = %path.display(), "wrote run summary");
    }
    for output in &summary.outputs {
        debug!(output = %output.display(), "output written");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = parse_args();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
