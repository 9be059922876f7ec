// ABOUTME: Pool client module for the remote token pool service
// Provides pool creation, token upload/fetch/delete and lock handling over HTTP

pub mod client;
pub mod types;

pub use client::PoolClient;
pub use types::{DeleteMode, LockedToken, ServiceResponse, trailing_identifier};
