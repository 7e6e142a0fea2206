//! Database credential extraction.
//!
//! The remote config reader prints one line of whitespace separated tokens:
//!
//! ```text
//! line  = token *( WS token )
//! token = "[" key "]=" value
//! ```
//!
//! Each token is split at its first `=`; brackets are trimmed from the key.
//! Tokens without `=` (PHP notices, banners) are ignored, and a key that
//! occurs twice keeps its last value. Values cannot contain whitespace.

use log::{debug, info};
use ssh::RemoteExec;
use std::collections::HashMap;

use crate::types::{CmsVariant, DbCredentials, RemoteRoot};
use crate::wrapper::config_reader_command;
use crate::ImportError;

/// Parses `[key]=value` tokens into a map.
pub fn parse_key_values(output: &str) -> HashMap<String, String> {
    output
        .split_whitespace()
        .filter_map(|token| token.split_once('='))
        .filter_map(|(key, value)| {
            let key = key.trim_matches(|c| c == '[' || c == ']');
            (!key.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

/// Reads the database settings of the Magento install under `root`.
pub async fn extract<R: RemoteExec + ?Sized>(
    remote: &R,
    root: &RemoteRoot,
    variant: CmsVariant,
) -> Result<DbCredentials, ImportError> {
    let command = config_reader_command(root, variant).ok_or_else(|| {
        ImportError::UnknownVariant {
            root: root.to_string(),
            output: String::new(),
        }
    })?;
    debug!("Reading {} config with: {}", variant, command);

    let result = remote.run_captured(command.as_str()).await?;
    if !result.success() {
        return Err(ImportError::RemoteExit {
            command: format!("reading the {} config in {}", variant, root),
            status: result.exit_status,
            output: result.text(),
        });
    }

    let values = parse_key_values(&result.text());
    if values.is_empty() {
        return Err(ImportError::Parse {
            what: "database settings",
            output: result.text(),
        });
    }

    let credentials = DbCredentials::from_map(values);
    info!(
        "Found database {} on {}",
        credentials.name.as_deref().unwrap_or("<unnamed>"),
        credentials.host.as_deref().unwrap_or("<no host>")
    );
    Ok(credentials)
}
