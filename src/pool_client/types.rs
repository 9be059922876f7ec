// ABOUTME: Response and result types for the pool client, plus identifier extraction

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Serialize;

use crate::error::{ToposError, ToposResult};

/// Header carrying the lock address on a locked `nextToken`
pub const LOCK_URL_HEADER: &str = "X-Topos-LockURL";

/// One completed exchange with the service: primary body plus header side channel
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ServiceResponse {
    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Identifier at the end of the address the body reports
    pub fn identifier(&self) -> ToposResult<String> {
        let text = self.text();
        trailing_identifier(&text).map(str::to_string).ok_or_else(|| {
            ToposError::ProtocolViolation(format!(
                "expected a resource address in the response body, got {:?}",
                text.trim()
            ))
        })
    }

    /// Identifier at the end of the address carried in `name`
    pub fn header_identifier(&self, name: &str) -> ToposResult<String> {
        let value = self
            .headers
            .get(name)
            .ok_or_else(|| ToposError::ProtocolViolation(format!("missing {name} header")))?;

        let value = value.to_str().map_err(|_| {
            ToposError::ProtocolViolation(format!("{name} header is not valid text"))
        })?;

        trailing_identifier(value).map(str::to_string).ok_or_else(|| {
            ToposError::ProtocolViolation(format!("{name} header has no identifier: {value:?}"))
        })
    }
}

/// Extract the trailing path segment of a resource address.
///
/// `https://host/4.1/pools/abc/tokens/tok-123` and the same address with a
/// trailing slash both yield `tok-123`. Surrounding whitespace (the service
/// terminates bodies with a newline) is ignored. Returns `None` when no
/// segment remains.
pub fn trailing_identifier(address: &str) -> Option<&str> {
    address
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// A token handed out together with a lock on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockedToken {
    pub token: String,
    pub lock: String,
}

/// How `delete_token` treats a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Log the failure and report success; consumed-token cleanup must not fail a worker
    #[default]
    BestEffort,
    /// Surface the failure like every other operation
    Strict,
}
