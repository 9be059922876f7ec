// ABOUTME: Library crate for the topos pool client exposing its public API for testing and reuse

#![allow(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pool_client;

pub use config::ToposConfig;
pub use error::{ToposError, ToposResult};
pub use pool_client::{DeleteMode, LockedToken, PoolClient};
