// ABOUTME: CLI commands for token locks: nextTokenWithLock, refreshLock, deleteLock
//
// A worker that takes a token with a lock must call refreshLock before the
// timeout passes, or the token becomes available to other workers again.

use std::io::Write;

use super::{write_json, LockArgs, NextTokenWithLockArgs, OutputFormat, RefreshLockArgs};
use crate::error::ToposResult;
use crate::pool_client::PoolClient;

/// Execute the nextTokenWithLock command
///
/// Text output is two lines: the token name, then the lock name.
pub async fn next_token_with_lock<W: Write>(
    client: &PoolClient,
    args: NextTokenWithLockArgs,
    format: OutputFormat,
    out: &mut W,
) -> ToposResult<()> {
    let locked = client
        .pop_token_with_lock(&args.pool, args.timeout, args.description.as_deref())
        .await
        .inspect_err(|e| {
            if e.is_empty_pool() {
                eprintln!("topos: no unlocked token available in pool '{}'", args.pool);
            }
        })?;

    match format {
        OutputFormat::Text => {
            writeln!(out, "{}", locked.token)?;
            writeln!(out, "{}", locked.lock)?;
        }
        OutputFormat::Json => write_json(out, &locked)?,
    }
    Ok(())
}

/// Execute the refreshLock command
pub async fn refresh_lock(client: &PoolClient, args: RefreshLockArgs) -> ToposResult<()> {
    client.refresh_lock(&args.pool, &args.lock, args.timeout).await
}

/// Execute the deleteLock command
pub async fn delete_lock(client: &PoolClient, args: LockArgs) -> ToposResult<()> {
    client.delete_lock(&args.pool, &args.lock).await
}
