//! Remote Magento inspection and streaming import.
//!
//! The pipeline runs over a single SSH connection: detect which Magento
//! generation lives under the application root, pull the database
//! credentials out of its config file, estimate the artifact size, then
//! stream a compressed dump or media archive into a local file.

use std::path::PathBuf;
use thiserror::Error;

pub mod cli;
pub mod credentials;
pub mod detect;
pub mod estimate;
pub mod import;
pub mod progress;
pub mod transfer;
pub mod types;
pub mod wrapper;

#[cfg(test)]
pub(crate) mod testing;

pub use types::{CmsVariant, DbCredentials, EstimateRatios, ImportRequest, ImportTarget, RemoteRoot, TransferTarget};
pub use import::{run_import, ImportSummary};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("SSH connection failed")]
    Transport(#[source] ssh::SshError),

    #[error("Remote command could not be started")]
    Session(#[source] ssh::SshError),

    #[error("Remote command `{command}` failed ({}){}", describe_status(.status), describe_output(.output))]
    RemoteExit {
        command: String,
        status: Option<u32>,
        output: String,
    },

    #[error("Failed to parse {what} from remote output: {output:?}")]
    Parse { what: &'static str, output: String },

    #[error("Local I/O error on {}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't find a Magento config file in {root} (expected app/etc/local.xml or app/etc/env.php, got {output:?})")]
    UnknownVariant { root: String, output: String },

    #[error("Database setting '{0}' is missing from the Magento config")]
    MissingCredential(&'static str),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<ssh::SshError> for ImportError {
    fn from(err: ssh::SshError) -> Self {
        match err {
            ssh::SshError::SessionError(_) | ssh::SshError::SinkError(_) => ImportError::Session(err),
            _ => ImportError::Transport(err),
        }
    }
}

fn describe_status(status: &Option<u32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "no exit status".to_string(),
    }
}

fn describe_output(output: &str) -> String {
    let output = output.trim();
    if output.is_empty() {
        String::new()
    } else {
        format!(": {}", output)
    }
}
