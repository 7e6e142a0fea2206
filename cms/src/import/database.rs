use chrono::{DateTime, Local, TimeZone};
use log::info;
use ssh::RemoteExec;
use std::path::PathBuf;

use super::progress_for;
use crate::estimate::{estimate_database_size, human_size, SizeEstimate};
use crate::transfer::{decompress_in_place, transfer};
use crate::types::DbCredentials;
use crate::wrapper::MysqlDumpOptions;
use crate::ImportError;

/// A downloaded, decompressed SQL dump.
#[derive(Debug, Clone)]
pub struct DatabaseArtifact {
    pub path: PathBuf,
    pub estimate: SizeEstimate,
    /// Compressed bytes received over the wire.
    pub transferred: u64,
}

/// `auto_<db>_<DD_MM-hh_mm>.sql.gz`; the `.gz` is dropped after
/// decompression.
pub fn dump_file_name<Tz: TimeZone>(database: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let database = database.replace(['/', '\\'], "_");
    format!("auto_{}_{}.sql.gz", database, at.format("%d_%m-%H_%M"))
}

/// Dumps the remote database into the output directory.
pub struct DatabaseImporter<'a, R: ?Sized> {
    remote: &'a R,
    output_dir: PathBuf,
    ratio: f64,
    show_progress: bool,
}

impl<'a, R: RemoteExec + ?Sized> DatabaseImporter<'a, R> {
    pub fn new(remote: &'a R, output_dir: PathBuf, ratio: f64, show_progress: bool) -> Self {
        Self {
            remote,
            output_dir,
            ratio,
            show_progress,
        }
    }

    pub async fn import(&self, credentials: &DbCredentials) -> Result<DatabaseArtifact, ImportError> {
        let options = MysqlDumpOptions::from_credentials(credentials)?;
        info!("Starting export of database {}", options.database);

        let estimate = estimate_database_size(self.remote, credentials, self.ratio).await?;
        println!(
            "!!! Estimated compressed db file size: {}",
            human_size(estimate.compressed)
        );

        let archive = self
            .output_dir
            .join(dump_file_name(&options.database, &Local::now()));
        let mut progress = progress_for(estimate.compressed, self.show_progress);
        let transferred = transfer(self.remote, &options.command(), &mut progress, &archive).await?;
        println!("Database export completed");

        let path = decompress_in_place(&archive).await?;
        println!("SQL download finished successfully! File: {}", path.display());

        Ok(DatabaseArtifact {
            path,
            estimate,
            transferred,
        })
    }
}
