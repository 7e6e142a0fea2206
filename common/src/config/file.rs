use config::{Config, ConfigError, File};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations searched for a configuration file, lowest priority first.
pub const CONFIG_PATHS: [&str; 3] = [
    "/etc/importer/importer.toml",
    "~/.config/importer/importer.toml",
    "importer.toml",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImporterConfig {
    pub ssh: SshConfig,
    pub import: ImportConfig,
    pub estimate: EstimateConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SshConfig {
    pub port: u16,
    pub user: Option<String>,
    /// Private key used when no password is supplied.
    pub key_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Application root on the remote host (not the `pub` directory).
    pub root: Option<String>,
    pub output_dir: String,
}

/// Heuristic multipliers turning an uncompressed size into the expected
/// size of the compressed artifact. Display only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EstimateConfig {
    pub dump_compression_ratio: f64,
    pub media_compression_ratio: f64,
}

/// Loads the configuration from the default search paths.
pub fn load_config() -> Result<ImporterConfig, ConfigError> {
    let paths = CONFIG_PATHS
        .iter()
        .map(|path| expand_path(path).map(PathBuf::from))
        .collect::<Result<Vec<_>, _>>()?;
    load_config_from(&paths)
}

/// Loads the configuration from an explicit list of files. Missing files are
/// skipped and later files override earlier ones.
pub fn load_config_from<P: AsRef<Path>>(paths: &[P]) -> Result<ImporterConfig, ConfigError> {
    let config_builder = Config::builder()
        .set_default("ssh.port", 22)?
        .set_default("ssh.user", None::<String>)?
        .set_default("ssh.key_path", "~/.ssh/id_rsa")?
        .set_default("import.root", None::<String>)?
        .set_default("import.output_dir", ".")?
        .set_default("estimate.dump_compression_ratio", 0.125)?
        .set_default("estimate.media_compression_ratio", 0.7)?;

    let config_builder = paths.iter().fold(config_builder, |builder, path| {
        let path = path.as_ref();
        if path.exists() {
            debug!("Reading configuration from {}", path.display());
            builder.add_source(File::from(path))
        } else {
            builder
        }
    });

    config_builder.build()?.try_deserialize()
}

/// Renders the effective configuration as TOML.
pub fn render_config(config: &ImporterConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

/// Expands `~` and environment variables in a configured path.
pub fn expand_path(path: &str) -> Result<String, ConfigError> {
    shellexpand::full(path)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| ConfigError::Message(format!("Failed to expand {}: {}", path, e)))
}
