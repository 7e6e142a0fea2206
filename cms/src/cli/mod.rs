pub mod commands;

use std::path::PathBuf;

use crate::types::ImportTarget;

/// Flags shared by every import subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct ImportArgs {
    #[clap(flatten)]
    pub ssh: ssh::cli::connect::SshArgs,

    /// Magento 1/2 root directory (NOT pub), e.g. /var/www/website
    /// (default: /home/<user>/public_html)
    #[clap(long)]
    pub root: Option<String>,

    /// Local directory the downloads are written to
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Do not draw progress bars
    #[clap(long)]
    pub no_progress: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum ImportCommands {
    /// Create an SQL dump and download it to the local machine
    Sql(ImportArgs),

    /// Copy the media files in an archive to the local machine
    Media(ImportArgs),

    /// Download both the SQL dump and the media archive
    Both(ImportArgs),
}

impl ImportCommands {
    pub fn target(&self) -> ImportTarget {
        match self {
            ImportCommands::Sql(_) => ImportTarget::Sql,
            ImportCommands::Media(_) => ImportTarget::Media,
            ImportCommands::Both(_) => ImportTarget::Both,
        }
    }

    pub fn args(&self) -> &ImportArgs {
        match self {
            ImportCommands::Sql(args) | ImportCommands::Media(args) | ImportCommands::Both(args) => {
                args
            }
        }
    }
}
