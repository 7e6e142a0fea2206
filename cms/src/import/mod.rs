pub mod database;
pub mod media;

use log::info;
use ssh::RemoteExec;
use std::fs;

use crate::detect::detect;
use crate::credentials::extract;
use crate::progress::TransferProgress;
use crate::types::{CmsVariant, ImportRequest, TransferTarget};
use crate::ImportError;

pub use database::{dump_file_name, DatabaseArtifact, DatabaseImporter};
pub use media::{media_file_name, MediaArtifact, MediaImporter};

/// What an import run produced.
#[derive(Debug)]
pub struct ImportSummary {
    pub variant: CmsVariant,
    pub database: Option<DatabaseArtifact>,
    pub media: Option<MediaArtifact>,
}

/// Runs one import over an established connection: detect the install,
/// then perform the requested transfers one after another.
pub async fn run_import<R: RemoteExec + ?Sized>(
    remote: &R,
    request: &ImportRequest,
) -> Result<ImportSummary, ImportError> {
    if !request.output_dir.exists() {
        info!("Creating output directory: {:?}", request.output_dir);
        fs::create_dir_all(&request.output_dir).map_err(|source| ImportError::LocalIo {
            path: request.output_dir.clone(),
            source,
        })?;
    }

    let variant = detect(remote, &request.root).await?;
    let mut summary = ImportSummary {
        variant,
        database: None,
        media: None,
    };

    for target in request.target.transfers() {
        match target {
            TransferTarget::DatabaseDump => {
                let credentials = extract(remote, &request.root, variant).await?;
                let importer = DatabaseImporter::new(
                    remote,
                    request.output_dir.clone(),
                    request.ratios.dump,
                    request.show_progress,
                );
                summary.database = Some(importer.import(&credentials).await?);
            }
            TransferTarget::MediaArchive => {
                let importer = MediaImporter::new(
                    remote,
                    request.output_dir.clone(),
                    request.ssh_user.clone(),
                    request.ratios.media,
                    request.show_progress,
                );
                summary.media = Some(importer.import(&request.root.media_root(variant)).await?);
            }
        }
    }

    Ok(summary)
}

fn progress_for(estimated: u64, visible: bool) -> TransferProgress {
    if visible {
        TransferProgress::new(estimated)
    } else {
        TransferProgress::hidden(estimated)
    }
}
