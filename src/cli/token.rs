// ABOUTME: CLI commands that consume tokens: nextToken, getToken, deleteToken

use std::io::Write;

use tracing::info;

use super::{write_identifier, DeleteTokenArgs, OutputFormat, PoolArgs, TokenArgs};
use crate::error::ToposResult;
use crate::pool_client::{DeleteMode, PoolClient};

/// Execute the nextToken command
pub async fn next_token<W: Write>(
    client: &PoolClient,
    args: PoolArgs,
    format: OutputFormat,
    out: &mut W,
) -> ToposResult<()> {
    match client.pop_token(&args.pool).await {
        Ok(token) => write_identifier(out, format, "token", &token),
        Err(e) => {
            if e.is_empty_pool() {
                info!(pool = %args.pool, "No token available");
                eprintln!("topos: no token available in pool '{}'", args.pool);
            }
            Err(e)
        }
    }
}

/// Execute the getToken command
///
/// Content is written byte for byte regardless of the output format.
pub async fn get_token<W: Write>(client: &PoolClient, args: TokenArgs, out: &mut W) -> ToposResult<()> {
    let content = client.get_token_content(&args.pool, &args.token).await?;
    out.write_all(&content)?;
    out.flush()?;
    Ok(())
}

/// Execute the deleteToken command (best-effort unless --strict)
pub async fn delete_token(client: &PoolClient, args: DeleteTokenArgs) -> ToposResult<()> {
    let mode = if args.strict {
        DeleteMode::Strict
    } else {
        DeleteMode::BestEffort
    };
    client.delete_token(&args.pool, &args.token, mode).await
}
