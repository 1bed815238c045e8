use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use portc::{Cli, Error, Session};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    let options = match cli.into_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("portc: {e}");
            return ExitCode::FAILURE;
        }
    };

    match Session::new(options).run() {
        Ok(report) => {
            for warning in &report.warnings {
                eprintln!("{warning}");
            }
            tracing::info!(files = report.written.len(), "done");
            ExitCode::SUCCESS
        }
        Err(Error::Compile {
            rendered, warnings, ..
        }) => {
            for warning in &warnings {
                eprintln!("{warning}");
            }
            eprintln!("{rendered}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("portc: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
