mod args;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sql_expander::{WriterSink, expand_table};
use tracing::Level;

use crate::args::Args;
use crate::logging::LogTarget;

fn main() -> ExitCode {
    let args = Args::parse();
    let writer = LogTarget::from_arg(args.log.as_ref()).unwrap_or_else(|err| {
        eprintln!("failed to open log file: {err}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(false)
        .with_max_level(if args.verbose { Level::INFO } else { Level::WARN })
        .init();

    let (job, opts) = match args.build_job() {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("table-expand: {err}");
            return ExitCode::FAILURE;
        }
    };

    match expand_table(&job, &opts, Arc::new(WriterSink::stderr())) {
        Ok(report) => {
            let json = serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("table-expand: {err}");
            ExitCode::FAILURE
        }
    }
}
