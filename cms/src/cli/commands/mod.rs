use anyhow::Result;
use common::config::{expand_path, ImporterConfig};
use log::{info, warn};
use ssh::SshConnector;
use std::path::PathBuf;

use crate::cli::ImportCommands;
use crate::import::{run_import, ImportSummary};
use crate::types::{EstimateRatios, ImportRequest, RemoteRoot};
use crate::ImportError;

/// Merges the command line with the configuration file. Flags win.
pub fn resolve_request(
    command: &ImportCommands,
    config: &ImporterConfig,
) -> Result<(SshConnector, ImportRequest), ImportError> {
    let args = command.args();

    let user = args
        .ssh
        .user
        .clone()
        .or_else(|| config.ssh.user.clone())
        .filter(|user| !user.is_empty())
        .ok_or_else(|| {
            ImportError::Configuration(
                "SSH user must be given with --user or ssh.user in importer.toml".to_string(),
            )
        })?;
    let port = args.ssh.port.unwrap_or(config.ssh.port);
    let key_path = args
        .ssh
        .key_path
        .clone()
        .unwrap_or_else(|| config.ssh.key_path.clone());
    let key_path = expand_path(&key_path).map_err(|e| ImportError::Configuration(e.to_string()))?;

    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => PathBuf::from(
            expand_path(&config.import.output_dir)
                .map_err(|e| ImportError::Configuration(e.to_string()))?,
        ),
    };

    let ratios = EstimateRatios {
        dump: config.estimate.dump_compression_ratio,
        media: config.estimate.media_compression_ratio,
    };
    for (name, ratio) in [("dump", ratios.dump), ("media", ratios.media)] {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ImportError::Configuration(format!(
                "estimate.{}_compression_ratio must be a positive number, got {}",
                name, ratio
            )));
        }
    }

    let root = RemoteRoot::new(
        args.root.as_deref().or(config.import.root.as_deref()),
        &user,
    );
    let connector = args.ssh.connector(user.clone(), port, key_path)?;

    let request = ImportRequest {
        target: command.target(),
        root,
        ssh_user: user,
        output_dir,
        ratios,
        show_progress: !args.no_progress,
    };
    Ok((connector, request))
}

/// Connects, runs the import and closes the connection exactly once.
pub async fn import(command: ImportCommands, config: &ImporterConfig) -> Result<ImportSummary> {
    let (connector, request) = resolve_request(&command, config)?;

    info!(
        "Connecting to {}@{}:{}",
        connector.user,
        connector.host,
        connector.port()
    );
    let remote = connector
        .connect()
        .await
        .map_err(ImportError::from)?;
    println!("SSH session open finished successfully!");

    let result = run_import(&remote, &request).await;

    if let Err(e) = remote.close().await {
        warn!("Error closing SSH connection: {}", e);
    }

    Ok(result?)
}
