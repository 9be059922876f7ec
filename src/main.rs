// ABOUTME: Main entry point for the topos command-line client
//
// Binary: topos
// Usage: topos <COMMAND> <ARGS...>
// - newPool
// - createTokensFromLinesInFile <pool> <file>
// - uploadFileAsToken <pool> <file>
// - uploadFilesInDirAsTokens <pool> <dir>
// - nextToken <pool>
// - nextTokenWithLock <pool> <timeout>
// - getToken <pool> <token>
// - refreshLock <pool> <lock> <timeout>
// - deleteLock <pool> <lock>
// - deleteToken <pool> <token>
//
// Exit codes: 0 success, 1 no command, 2 invalid argument, 3 file not found,
// 4 service call failed, 5 protocol violation, 6 configuration, 7 output

#![allow(missing_docs)]

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::{error, info};

use topos::cli::{self, Cli};
use topos::config::ToposConfig;
use topos::error::ToposError;
use topos::logging::setup_logging;
use topos::pool_client::PoolClient;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return cli::classify_parse_error(&err).map_or(ExitCode::SUCCESS, |e| e.exit_code());
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, exit_code = e.exit_code_value(), "Command failed");
            report(&e);
            e.exit_code()
        }
    }
}

async fn run(args: Cli) -> Result<(), ToposError> {
    let overrides = args.config_overrides();
    let Some(command) = args.command else {
        return Err(ToposError::NoCommand);
    };

    // Help, usage errors and a bare `topos` never touch the log directory
    setup_logging();

    let config = ToposConfig::load(&overrides).map_err(|e| ToposError::Config(format!("{e:#}")))?;
    let client = PoolClient::new(&config)?;

    info!(endpoint = %client.base_url(), command = ?command, "Running command");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::execute(command, &client, args.format, &mut out).await?;
    out.flush()?;

    Ok(())
}

fn report(e: &ToposError) {
    eprintln!("topos: {e}");

    if matches!(e, ToposError::NoCommand) {
        eprintln!();
        eprintln!("{}", Cli::command().render_help());
    }
}
