use thiserror::Error;

mod remote;
mod ssh;
pub mod cli;

pub use remote::{CommandOutput, RemoteExec};
pub use ssh::{RemoteHost, SshConnector};

#[derive(Error, Debug)]
pub enum SshError {
    #[error("SSH configuration error: {0}")]
    ConfigurationError(String),
    #[error("SSH connection error: {0}")]
    ConnectionError(String),
    #[error("SSH authentication error: {0}")]
    AuthenticationError(String),
    #[error("SSH session error: {0}")]
    SessionError(String),
    #[error("Failed to hand remote output to the local reader: {0}")]
    SinkError(String),
}
