// ABOUTME: CLI commands that create pools and fill them with tokens
//
// newPool: print the name of a fresh pool
// createTokensFromLinesInFile: one token per line of a local file
// uploadFileAsToken / uploadFilesInDirAsTokens: file content as token content

use std::io::Write;

use super::{write_identifier, OutputFormat, PoolDirArgs, PoolFileArgs};
use crate::error::ToposResult;
use crate::pool_client::PoolClient;

/// Execute the newPool command
pub async fn new_pool<W: Write>(
    client: &PoolClient,
    format: OutputFormat,
    out: &mut W,
) -> ToposResult<()> {
    let pool = client.create_pool().await?;
    write_identifier(out, format, "pool", &pool)
}

/// Execute the createTokensFromLinesInFile command
pub async fn create_tokens_from_lines(client: &PoolClient, args: PoolFileArgs) -> ToposResult<()> {
    client.push_lines_from_file(&args.pool, &args.file).await
}

/// Execute the uploadFileAsToken command
pub async fn upload_file<W: Write>(
    client: &PoolClient,
    args: PoolFileArgs,
    format: OutputFormat,
    out: &mut W,
) -> ToposResult<()> {
    let token = client.push_file(&args.pool, &args.file).await?;
    write_identifier(out, format, "token", &token)
}

/// Execute the uploadFilesInDirAsTokens command
pub async fn upload_dir(client: &PoolClient, args: PoolDirArgs) -> ToposResult<()> {
    client.push_directory(&args.pool, &args.dir).await
}
