// ABOUTME: Pool client implementation translating token pool operations into HTTP calls

use std::path::Path;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ToposConfig;
use crate::error::{ToposError, ToposResult};
use crate::pool_client::types::{DeleteMode, LockedToken, ServiceResponse, LOCK_URL_HEADER};

/// Stateless client for one pool service endpoint.
///
/// Every method performs exactly one request and never retries; coordination
/// between concurrent workers is left entirely to the service.
#[derive(Debug, Clone)]
pub struct PoolClient {
    client: Client,
    base_url: Url,
    lock_description: String,
}

impl PoolClient {
    /// Create a client for the endpoint and timeout in `config`
    pub fn new(config: &ToposConfig) -> ToposResult<Self> {
        let base_url = config
            .endpoint_url()
            .map_err(|e| ToposError::Config(format!("{e:#}")))?;

        let mut builder = Client::builder().user_agent(concat!("topos/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ToposError::Config(format!("Failed to create HTTP client: {e}")))?;

        let lock_description = config
            .lock_description
            .clone()
            .unwrap_or_else(default_lock_description);

        Ok(Self {
            client,
            base_url,
            lock_description,
        })
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Description sent with locks when the caller gives none
    pub fn lock_description(&self) -> &str {
        &self.lock_description
    }

    /// Create a new, empty pool and return its identifier
    pub async fn create_pool(&self) -> ToposResult<String> {
        let url = self.url(&["newPool"])?;
        let pool = self.send(self.client.get(url)).await?.identifier()?;

        info!(pool = %pool, "Created pool");
        Ok(pool)
    }

    /// Submit a block of text; the service turns each line into one token
    pub async fn push_lines(&self, pool: &str, content: impl Into<Vec<u8>>) -> ToposResult<()> {
        let content = content.into();
        let bytes = content.len();
        let url = self.url(&["pools", pool, "tokens", ""])?;

        self.send(
            self.client
                .post(url)
                .header(CONTENT_TYPE, "text/plain")
                .body(content),
        )
        .await?;

        info!(pool = %pool, bytes, "Created tokens from lines");
        Ok(())
    }

    /// Read `path` and submit its lines as tokens
    pub async fn push_lines_from_file(&self, pool: &str, path: &Path) -> ToposResult<()> {
        let content = tokio::fs::read(path).await.map_err(|e| {
            ToposError::InvalidArgument(format!("Cannot read {}: {e}", path.display()))
        })?;

        self.push_lines(pool, content).await
    }

    /// Upload the whole file as the content of one new token and return its identifier
    pub async fn push_file(&self, pool: &str, path: &Path) -> ToposResult<String> {
        if !path.exists() {
            return Err(ToposError::FileNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(ToposError::InvalidArgument(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let content = tokio::fs::read(path).await.map_err(|e| {
            ToposError::InvalidArgument(format!("Cannot read {}: {e}", path.display()))
        })?;
        let url = self.url(&["pools", pool, "nextToken"])?;

        let response = self
            .send(
                self.client
                    .put(url)
                    .header(CONTENT_DISPOSITION, content_disposition(path))
                    .body(content),
            )
            .await?;
        let token = response.identifier()?;

        info!(pool = %pool, token = %token, file = %path.display(), "Uploaded file as token");
        Ok(token)
    }

    /// Upload every regular file directly inside `dir` as one token each, in one request
    pub async fn push_directory(&self, pool: &str, dir: &Path) -> ToposResult<()> {
        if !dir.is_dir() {
            return Err(ToposError::InvalidArgument(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let files = regular_files(dir).await?;
        let count = files.len();

        let mut form = Form::new();
        for (name, path) in files {
            let content = tokio::fs::read(&path).await.map_err(|e| {
                ToposError::InvalidArgument(format!("Cannot read {}: {e}", path.display()))
            })?;
            form = form.part("file", Part::bytes(content).file_name(name));
        }

        let url = self.url(&["pools", pool, "tokens", ""])?;
        self.send(self.client.post(url).multipart(form)).await?;

        info!(pool = %pool, files = count, dir = %dir.display(), "Uploaded directory as tokens");
        Ok(())
    }

    /// Take the next available token and return its identifier
    pub async fn pop_token(&self, pool: &str) -> ToposResult<String> {
        let url = self.url(&["pools", pool, "nextToken"])?;
        let token = self.send(self.client.get(url)).await?.identifier()?;

        info!(pool = %pool, token = %token, "Fetched next token");
        Ok(token)
    }

    /// Take the next available token and lock it for `timeout_secs`.
    ///
    /// The lock identifier travels in the `X-Topos-LockURL` header; a success
    /// response without it is a protocol violation.
    pub async fn pop_token_with_lock(
        &self,
        pool: &str,
        timeout_secs: u64,
        description: Option<&str>,
    ) -> ToposResult<LockedToken> {
        let url = self.url(&["pools", pool, "nextToken"])?;
        let description = description.unwrap_or(&self.lock_description);

        let response = self
            .send(self.client.get(url).query(&[
                ("timeout", timeout_secs.to_string()),
                ("description", description.to_string()),
            ]))
            .await?;

        let token = response.identifier()?;
        let lock = response.header_identifier(LOCK_URL_HEADER)?;

        info!(pool = %pool, token = %token, lock = %lock, timeout_secs, "Fetched next token with lock");
        Ok(LockedToken { token, lock })
    }

    /// Raw content stored for `token`; neither deletes nor unlocks it
    pub async fn get_token_content(&self, pool: &str, token: &str) -> ToposResult<Vec<u8>> {
        let url = self.url(&["pools", pool, "tokens", token])?;
        let response = self.send(self.client.get(url)).await?;

        debug!(pool = %pool, token = %token, bytes = response.body.len(), "Fetched token content");
        Ok(response.body)
    }

    /// Extend `lock` to expire `timeout_secs` from now
    pub async fn refresh_lock(&self, pool: &str, lock: &str, timeout_secs: u64) -> ToposResult<()> {
        let url = self.url(&["pools", pool, "locks", lock])?;
        self.send(
            self.client
                .head(url)
                .query(&[("timeout", timeout_secs.to_string())]),
        )
        .await?;

        info!(pool = %pool, lock = %lock, timeout_secs, "Refreshed lock");
        Ok(())
    }

    /// Release `lock` so its token is immediately available again
    pub async fn delete_lock(&self, pool: &str, lock: &str) -> ToposResult<()> {
        let url = self.url(&["pools", pool, "locks", lock])?;
        self.send(self.client.delete(url)).await?;

        info!(pool = %pool, lock = %lock, "Deleted lock");
        Ok(())
    }

    /// Remove `token` from `pool`; with `DeleteMode::BestEffort` failures are only logged
    pub async fn delete_token(&self, pool: &str, token: &str, mode: DeleteMode) -> ToposResult<()> {
        let url = self.url(&["pools", pool, "tokens", token])?;

        match self.send(self.client.delete(url)).await {
            Ok(_) => {
                info!(pool = %pool, token = %token, "Deleted token");
                Ok(())
            }
            Err(e) if mode == DeleteMode::BestEffort && e.is_transport() => {
                warn!(pool = %pool, token = %token, error = %e, "Ignoring failed token deletion");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Endpoint extended by `segments`, each percent-encoded as a single path segment
    fn url(&self, segments: &[&str]) -> ToposResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ToposError::Config(format!("Endpoint {} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request and collect status, headers and body
    async fn send(&self, request: RequestBuilder) -> ToposResult<ServiceResponse> {
        let request = request.build().map_err(|source| ToposError::Request {
            url: source.url().map_or_else(String::new, ToString::to_string),
            source,
        })?;
        let method = request.method().to_string();
        let url = request.url().to_string();

        debug!(method = %method, url = %url, "Sending pool service request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| ToposError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| ToposError::Request {
                url: url.clone(),
                source,
            })?
            .to_vec();

        if !status.is_success() {
            return Err(ToposError::Status {
                method,
                url,
                status,
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        debug!(status = %status, bytes = body.len(), "Received pool service response");
        Ok(ServiceResponse {
            status,
            headers,
            body,
        })
    }
}

/// Fully-qualified local host name, used to tag locks with their holder
pub fn default_lock_description() -> String {
    match hostname::get() {
        Ok(name) => {
            let short = name.to_string_lossy().into_owned();
            let canonical = canonical_host_name(&short);
            qualified_host_name(&short, canonical)
        }
        Err(e) => {
            warn!(error = %e, "Could not determine host name for lock description");
            "unknown-host".to_string()
        }
    }
}

/// Canonical name the resolver reports for `host`
#[cfg(unix)]
fn canonical_host_name(host: &str) -> Option<String> {
    let hints = dns_lookup::AddrInfoHints {
        flags: libc::AI_CANONNAME,
        socktype: libc::SOCK_STREAM,
        ..dns_lookup::AddrInfoHints::default()
    };

    match dns_lookup::getaddrinfo(Some(host), None, Some(hints)) {
        Ok(infos) => infos.filter_map(Result::ok).find_map(|info| info.canonname),
        Err(e) => {
            debug!(host = %host, error = ?e, "Host name did not resolve");
            None
        }
    }
}

#[cfg(not(unix))]
fn canonical_host_name(_host: &str) -> Option<String> {
    None
}

/// Prefer the resolver's dotted name; keep the short name when there is none
fn qualified_host_name(short: &str, canonical: Option<String>) -> String {
    canonical
        .map(|name| name.trim_end_matches('.').to_string())
        .filter(|name| name.contains('.'))
        .unwrap_or_else(|| short.to_string())
}

fn content_disposition(path: &Path) -> String {
    let name = path
        .file_name()
        .map_or_else(|| "token".to_string(), |n| n.to_string_lossy().into_owned());
    format!("attachment; filename=\"{}\"", name.replace('"', "\\\""))
}

/// Regular files directly inside `dir`, sorted by file name
async fn regular_files(dir: &Path) -> ToposResult<Vec<(String, std::path::PathBuf)>> {
    let unreadable =
        |e: std::io::Error| ToposError::InvalidArgument(format!("Cannot list {}: {e}", dir.display()));

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        // Follows symlinks, so a link to a regular file counts as one
        let is_file = tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file());
        if is_file {
            files.push((entry.file_name().to_string_lossy().into_owned(), path));
        }
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
