// SPDX-License-Identifier: MIT

//! `marketflow` binary entrypoint. Stays a thin
//! `std::process::exit(...)` shim; all dispatch logic lives in [`run`].

mod cli;
mod exit_error;
mod run;
mod unconfigured;

use clap::Parser;
use cli::Cli;
use exit_error::ExitError;

#[tokio::main]
async fn main() {
    std::process::exit(main_inner().await);
}

async fn main_inner() -> i32 {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(message) => {
            eprintln!("error: {message}");
            return 1;
        }
    };

    match run::run(mode, cli.priority.into(), cli.dry_run).await {
        Ok(()) => 0,
        Err(ExitError { code, message }) => {
            eprintln!("error: {message}");
            code
        }
    }
}
