//! Streaming transfer of a remotely produced byte stream into a local file.
//!
//! The remote command writes into one end of an in-memory pipe while this
//! side drains the other end into the file and the progress counter. Both
//! halves run concurrently; the producer closes its end when the command
//! finishes (or fails), so the consumer always reaches end-of-stream. A
//! slow disk fills the pipe, which stops the channel from being read and
//! throttles the remote producer.

use flate2::read::MultiGzDecoder;
use log::{debug, error, info, warn};
use ssh::{CommandOutput, RemoteExec};
use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::progress::TransferProgress;
use crate::wrapper::RemoteCommand;
use crate::ImportError;

/// Capacity of the pipe between the remote producer and the local writer.
pub const PIPE_CAPACITY: usize = 64 * 1024;

/// Runs `command` and streams its stdout into a new file at `local_path`.
/// Returns the number of bytes written.
///
/// A file that cannot be written aborts the transfer. A command that exits
/// non-zero after output started leaves the partial file in place.
pub async fn transfer<R: RemoteExec + ?Sized>(
    remote: &R,
    command: &RemoteCommand,
    progress: &mut TransferProgress,
    local_path: &Path,
) -> Result<u64, ImportError> {
    let mut file = File::create(local_path)
        .await
        .map_err(|source| ImportError::LocalIo {
            path: local_path.to_path_buf(),
            source,
        })?;

    info!("Streaming into {}", local_path.display());
    let result = stream_to(remote, command, progress, &mut file, local_path).await;

    match &result {
        Ok(bytes) => {
            progress.finish("done");
            info!(
                "Wrote {} bytes to {} (estimated {})",
                bytes,
                local_path.display(),
                progress.estimated()
            );
        }
        Err(e) => {
            progress.abandon();
            error!(
                "Transfer into {} stopped after {} bytes: {}",
                local_path.display(),
                progress.observed(),
                e
            );
        }
    }
    result
}

/// Pumps the output of `command` into `writer`. `path` only labels errors.
pub async fn stream_to<R, W>(
    remote: &R,
    command: &RemoteCommand,
    progress: &mut TransferProgress,
    writer: &mut W,
    path: &Path,
) -> Result<u64, ImportError>
where
    R: RemoteExec + ?Sized,
    W: AsyncWrite + Unpin,
{
    debug!("Running streaming command: {}", command);
    let (reader, pipe_writer) = tokio::io::duplex(PIPE_CAPACITY);

    let producer = remote.run_streaming(command.as_str(), Box::new(pipe_writer));
    let consumer = pump(reader, writer, progress);
    let (produced, consumed) = tokio::join!(producer, consumer);

    // A local write failure wins; the producer then only saw a broken pipe.
    let bytes = consumed.map_err(|source| ImportError::LocalIo {
        path: path.to_path_buf(),
        source,
    })?;

    let outcome = produced?;
    if !outcome.success() {
        return Err(ImportError::RemoteExit {
            command: command.to_string(),
            status: outcome.exit_status,
            output: outcome.text(),
        });
    }

    if let Some(stderr) = remote_stderr(&outcome) {
        // A pipeline reports only its last stage, so a failing producer can
        // still end with status 0.
        warn!("`{}` succeeded but wrote to stderr: {}", command, stderr);
    }
    Ok(bytes)
}

/// Non-blank stderr of a streaming command.
fn remote_stderr(outcome: &CommandOutput) -> Option<String> {
    let text = outcome.text();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Copies `reader` into `writer` until end-of-stream, counting bytes.
async fn pump<R, W>(mut reader: R, writer: &mut W, progress: &mut TransferProgress) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; PIPE_CAPACITY];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
        progress.observe(n as u64);
    }

    writer.flush().await?;
    Ok(total)
}

/// Replaces `archive` (`*.gz`) with its decompressed content, like
/// `gzip -d`. Returns the path of the decompressed file.
pub async fn decompress_in_place(archive: &Path) -> Result<PathBuf, ImportError> {
    let path = archive.to_path_buf();
    tokio::task::spawn_blocking(move || gunzip(&path))
        .await
        .map_err(|e| ImportError::LocalIo {
            path: archive.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, e),
        })?
}

fn local_io(path: &Path) -> impl FnOnce(io::Error) -> ImportError {
    let path = path.to_path_buf();
    move |source| ImportError::LocalIo { path, source }
}

fn gunzip(archive: &Path) -> Result<PathBuf, ImportError> {
    let target = archive.with_extension("");
    let input = fs::File::open(archive).map_err(local_io(archive))?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));
    let mut output = fs::File::create(&target).map_err(local_io(&target))?;

    if let Err(e) = io::copy(&mut decoder, &mut output) {
        let _ = fs::remove_file(&target);
        return Err(ImportError::LocalIo {
            path: archive.to_path_buf(),
            source: e,
        });
    }

    fs::remove_file(archive).map_err(local_io(archive))?;
    debug!("Decompressed {} into {}", archive.display(), target.display());
    Ok(target)
}
