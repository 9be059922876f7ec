// ABOUTME: CLI argument parsing and command routing for topos
//
// One subcommand per pool service operation:
// - Pools: newPool
// - Uploads: createTokensFromLinesInFile, uploadFileAsToken, uploadFilesInDirAsTokens
// - Tokens: nextToken, getToken, deleteToken
// - Locks: nextTokenWithLock, refreshLock, deleteLock

pub mod lock;
pub mod pool;
pub mod token;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::config::ConfigOverrides;
use crate::error::{ToposError, ToposResult};
use crate::pool_client::PoolClient;

/// Client for the Topos token pool service
#[derive(Debug, Parser)]
#[command(name = "topos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Service endpoint base URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Additional config file, applied after the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Command-line values that override the loaded configuration
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout,
        }
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new pool and print its name
    #[command(name = "newPool")]
    NewPool,

    /// Create one token per line of a text file
    #[command(name = "createTokensFromLinesInFile")]
    CreateTokensFromLinesInFile(PoolFileArgs),

    /// Upload a file as the content of a single token and print the token name
    #[command(name = "uploadFileAsToken")]
    UploadFileAsToken(PoolFileArgs),

    /// Upload every file in a directory (non-recursive) as one token each
    #[command(name = "uploadFilesInDirAsTokens")]
    UploadFilesInDirAsTokens(PoolDirArgs),

    /// Take the next token from a pool and print its name
    #[command(name = "nextToken")]
    NextToken(PoolArgs),

    /// Take and lock the next token; prints the token name, then the lock name
    #[command(name = "nextTokenWithLock")]
    NextTokenWithLock(NextTokenWithLockArgs),

    /// Print the content of a token
    #[command(name = "getToken")]
    GetToken(TokenArgs),

    /// Extend a lock's lifetime
    #[command(name = "refreshLock")]
    RefreshLock(RefreshLockArgs),

    /// Release a lock
    #[command(name = "deleteLock")]
    DeleteLock(LockArgs),

    /// Delete a token
    #[command(name = "deleteToken")]
    DeleteToken(DeleteTokenArgs),
}

/// Arguments naming only a pool
#[derive(Debug, clap::Args)]
pub struct PoolArgs {
    /// Pool name
    pub pool: String,
}

/// Arguments for commands reading a local file
#[derive(Debug, clap::Args)]
pub struct PoolFileArgs {
    /// Pool name
    pub pool: String,

    /// Local file
    pub file: PathBuf,
}

/// Arguments for the directory upload command
#[derive(Debug, clap::Args)]
pub struct PoolDirArgs {
    /// Pool name
    pub pool: String,

    /// Local directory
    pub dir: PathBuf,
}

/// Arguments for nextTokenWithLock
#[derive(Debug, clap::Args)]
pub struct NextTokenWithLockArgs {
    /// Pool name
    pub pool: String,

    /// Lock lifetime in seconds
    pub timeout: u64,

    /// Lock description (defaults to this host's name)
    #[arg(long)]
    pub description: Option<String>,
}

/// Arguments naming a token
#[derive(Debug, clap::Args)]
pub struct TokenArgs {
    /// Pool name
    pub pool: String,

    /// Token name
    pub token: String,
}

/// Arguments for deleteToken
#[derive(Debug, clap::Args)]
pub struct DeleteTokenArgs {
    /// Pool name
    pub pool: String,

    /// Token name
    pub token: String,

    /// Fail when the service rejects the deletion instead of ignoring it
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for refreshLock
#[derive(Debug, clap::Args)]
pub struct RefreshLockArgs {
    /// Pool name
    pub pool: String,

    /// Lock name
    pub lock: String,

    /// New lifetime in seconds, counted from now
    pub timeout: u64,
}

/// Arguments naming a lock
#[derive(Debug, clap::Args)]
pub struct LockArgs {
    /// Pool name
    pub pool: String,

    /// Lock name
    pub lock: String,
}

/// Classify a clap parse failure.
///
/// `None` means clap only displayed help or version and the process should
/// exit successfully.
pub fn classify_parse_error(err: &clap::Error) -> Option<ToposError> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            Some(ToposError::NoCommand)
        }
        ErrorKind::MissingRequiredArgument => Some(ToposError::InvalidArgument(
            "missing required argument".to_string(),
        )),
        kind => Some(ToposError::InvalidArgument(
            kind.as_str().unwrap_or("invalid arguments").to_string(),
        )),
    }
}

/// Run one command against `client`, writing its result to `out`
pub async fn execute<W: Write>(
    command: Commands,
    client: &PoolClient,
    format: OutputFormat,
    out: &mut W,
) -> ToposResult<()> {
    match command {
        Commands::NewPool => pool::new_pool(client, format, out).await,
        Commands::CreateTokensFromLinesInFile(args) => pool::create_tokens_from_lines(client, args).await,
        Commands::UploadFileAsToken(args) => pool::upload_file(client, args, format, out).await,
        Commands::UploadFilesInDirAsTokens(args) => pool::upload_dir(client, args).await,
        Commands::NextToken(args) => token::next_token(client, args, format, out).await,
        Commands::NextTokenWithLock(args) => lock::next_token_with_lock(client, args, format, out).await,
        Commands::GetToken(args) => token::get_token(client, args, out).await,
        Commands::RefreshLock(args) => lock::refresh_lock(client, args).await,
        Commands::DeleteLock(args) => lock::delete_lock(client, args).await,
        Commands::DeleteToken(args) => token::delete_token(client, args).await,
    }
}

/// Print a single identifier: the bare value as text, or `{"<key>": value}` as JSON
fn write_identifier<W: Write>(
    out: &mut W,
    format: OutputFormat,
    key: &str,
    value: &str,
) -> ToposResult<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{value}")?,
        OutputFormat::Json => {
            let json = serde_json::json!({ key: value });
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

/// Print a structured value as compact JSON
fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> ToposResult<()> {
    let json = serde_json::to_string(value)
        .map_err(|e| ToposError::Output(std::io::Error::other(e)))?;
    writeln!(out, "{json}")?;
    Ok(())
}
