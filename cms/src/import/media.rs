use log::info;
use ssh::RemoteExec;
use std::path::PathBuf;

use super::progress_for;
use crate::estimate::{estimate_media_size, human_size, SizeEstimate};
use crate::transfer::transfer;
use crate::wrapper::TarOptions;
use crate::ImportError;

/// A downloaded media archive. The gzipped tarball is kept as is.
#[derive(Debug, Clone)]
pub struct MediaArtifact {
    pub path: PathBuf,
    pub estimate: SizeEstimate,
    pub transferred: u64,
}

/// `<ssh user>_media.tar.gz`
pub fn media_file_name(ssh_user: &str) -> String {
    format!("{}_media.tar.gz", ssh_user.replace(['/', '\\'], "_"))
}

/// Archives the remote `media/` directory into the output directory.
pub struct MediaImporter<'a, R: ?Sized> {
    remote: &'a R,
    output_dir: PathBuf,
    ssh_user: String,
    ratio: f64,
    show_progress: bool,
}

impl<'a, R: RemoteExec + ?Sized> MediaImporter<'a, R> {
    pub fn new(
        remote: &'a R,
        output_dir: PathBuf,
        ssh_user: String,
        ratio: f64,
        show_progress: bool,
    ) -> Self {
        Self {
            remote,
            output_dir,
            ssh_user,
            ratio,
            show_progress,
        }
    }

    /// `media_root` is the directory that contains `media/`.
    pub async fn import(&self, media_root: &str) -> Result<MediaArtifact, ImportError> {
        info!("Starting media download from {}/media", media_root);

        println!("Calculating media directory size...");
        let estimate = estimate_media_size(self.remote, media_root, self.ratio).await?;
        println!("Uncompressed media size: {}", human_size(estimate.uncompressed));
        println!(
            "!!! Estimated compressed media size: {}",
            human_size(estimate.compressed)
        );

        let path = self.output_dir.join(media_file_name(&self.ssh_user));
        let command = TarOptions::media(media_root).command();
        let mut progress = progress_for(estimate.compressed, self.show_progress);
        let transferred = transfer(self.remote, &command, &mut progress, &path).await?;
        println!("Media download finished successfully! File: {}", path.display());

        Ok(MediaArtifact {
            path,
            estimate,
            transferred,
        })
    }
}
