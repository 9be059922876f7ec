// ABOUTME: Error taxonomy for the topos client and its mapping to process exit codes
//
// Every failure surfaces to the invocation boundary as a ToposError; main.rs turns
// it into a failure-specific exit code. Nothing here retries.

use std::path::PathBuf;
use std::process::ExitCode;

use reqwest::StatusCode;
use thiserror::Error;

/// Exit code when no command was given
pub const EXIT_NO_COMMAND: u8 = 1;
/// Exit code for a missing or malformed argument
pub const EXIT_INVALID_ARGUMENT: u8 = 2;
/// Exit code when a referenced local file or directory does not exist
pub const EXIT_FILE_NOT_FOUND: u8 = 3;
/// Exit code when the call to the pool service failed
pub const EXIT_TRANSPORT: u8 = 4;
/// Exit code when the pool service answered without an expected element
pub const EXIT_PROTOCOL_VIOLATION: u8 = 5;
/// Exit code for unusable configuration
pub const EXIT_CONFIG: u8 = 6;
/// Exit code when results could not be written to standard output
pub const EXIT_OUTPUT: u8 = 7;

/// Errors that can occur while talking to the pool service
#[derive(Debug, Error)]
pub enum ToposError {
    /// No subcommand on the command line
    #[error("No command given. Run 'topos --help' for the list of commands.")]
    NoCommand,

    /// Required argument missing, or a local path is not of the expected kind
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Local file referenced by a command does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The request never produced a response (connect, TLS, timeout, body read)
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Success status, but an element the protocol requires was absent
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing the result failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for pool client operations
pub type ToposResult<T> = Result<T, ToposError>;

impl ToposError {
    /// True for both halves of the transport family: no response, or a non-success status
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Request { .. } | Self::Status { .. })
    }

    /// HTTP status reported by the service, if it got that far
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The service signals an exhausted pool with 404 on `nextToken`
    pub fn is_empty_pool(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Numeric exit code for this failure kind
    pub const fn exit_code_value(&self) -> u8 {
        match self {
            Self::NoCommand => EXIT_NO_COMMAND,
            Self::InvalidArgument(_) => EXIT_INVALID_ARGUMENT,
            Self::FileNotFound(_) => EXIT_FILE_NOT_FOUND,
            Self::Request { .. } | Self::Status { .. } => EXIT_TRANSPORT,
            Self::ProtocolViolation(_) => EXIT_PROTOCOL_VIOLATION,
            Self::Config(_) => EXIT_CONFIG,
            Self::Output(_) => EXIT_OUTPUT,
        }
    }

    /// Process exit status for this failure
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_code_value())
    }
}
