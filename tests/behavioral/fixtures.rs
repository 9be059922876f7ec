// ABOUTME: Shared test fixtures for behavioral tests
//
// Provides:
// - client_for(): PoolClient pointed at a mockito server
// - resource_url(): full address the service would return for a resource

#![allow(dead_code)]

use mockito::ServerGuard;
use topos::{PoolClient, ToposConfig};

/// API version prefix the fake service is mounted under
pub const PREFIX: &str = "/4.1";

/// Lock description the test client sends
pub const DESCRIPTION: &str = "wn-01.grid.example.org";

/// Client talking to `server`
pub fn client_for(server: &ServerGuard) -> PoolClient {
    PoolClient::new(&ToposConfig {
        endpoint: format!("{}{PREFIX}", server.url()),
        timeout_secs: 5,
        lock_description: Some(DESCRIPTION.to_string()),
    })
    .expect("client should build for mock server")
}

/// Client for an address nothing listens on
pub fn unreachable_client() -> PoolClient {
    PoolClient::new(&ToposConfig {
        endpoint: "http://127.0.0.1:1/4.1/".to_string(),
        timeout_secs: 5,
        lock_description: None,
    })
    .expect("client should build")
}

/// Service path for `rest` below the version prefix
pub fn path(rest: &str) -> String {
    format!("{PREFIX}/{rest}")
}

/// Full resource address as the service reports it in bodies and headers
pub fn resource_url(server: &ServerGuard, rest: &str) -> String {
    format!("{}{PREFIX}/{rest}", server.url())
}
