//! Size estimates shown before a transfer. They are advisory: the transfer
//! is never bounded or checked against them.

use log::debug;
use ssh::RemoteExec;

use crate::types::DbCredentials;
use crate::wrapper::{database_size_command, media_size_command, RemoteCommand};
use crate::ImportError;

/// An uncompressed measurement and the compressed size it suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeEstimate {
    pub uncompressed: u64,
    pub compressed: u64,
}

impl SizeEstimate {
    pub fn from_ratio(uncompressed: u64, ratio: f64) -> Self {
        Self {
            uncompressed,
            // Truncates like integer division; the epsilon absorbs float
            // error such as 1_000_000 * 0.7 landing just under 700_000.
            compressed: (uncompressed as f64 * ratio + 1e-6).floor() as u64,
        }
    }
}

/// Last line of `output` that is not blank.
pub fn last_non_blank_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).rev().find(|line| !line.is_empty())
}

/// Parses the size query result. Client warnings may precede the number;
/// `NULL` (a schema without tables) counts as zero.
pub fn parse_database_size(output: &str) -> Result<u64, ImportError> {
    let parse_error = || ImportError::Parse {
        what: "database size",
        output: output.to_string(),
    };

    let line = last_non_blank_line(output).ok_or_else(parse_error)?;
    if line.eq_ignore_ascii_case("NULL") {
        return Ok(0);
    }
    line.parse::<u64>().map_err(|_| parse_error())
}

/// Parses the first line that starts with a number, e.g. `du` output.
pub fn parse_leading_number(output: &str) -> Result<u64, ImportError> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .find_map(|token| token.parse::<u64>().ok())
        .ok_or_else(|| ImportError::Parse {
            what: "directory size",
            output: output.to_string(),
        })
}

async fn run_size_query<R: RemoteExec + ?Sized>(
    remote: &R,
    command: &RemoteCommand,
) -> Result<String, ImportError> {
    debug!("Measuring size with: {}", command);
    let result = remote.run_captured(command.as_str()).await?;
    if !result.success() {
        return Err(ImportError::RemoteExit {
            command: command.to_string(),
            status: result.exit_status,
            output: result.text(),
        });
    }
    Ok(result.text())
}

/// Table data plus index size of the database, scaled by `ratio`.
pub async fn estimate_database_size<R: RemoteExec + ?Sized>(
    remote: &R,
    credentials: &DbCredentials,
    ratio: f64,
) -> Result<SizeEstimate, ImportError> {
    let command = database_size_command(credentials)?;
    let output = run_size_query(remote, &command).await?;
    let size = parse_database_size(&output)?;
    Ok(SizeEstimate::from_ratio(size, ratio))
}

/// Size of `<media_root>/media/`, scaled by `ratio`.
pub async fn estimate_media_size<R: RemoteExec + ?Sized>(
    remote: &R,
    media_root: &str,
    ratio: f64,
) -> Result<SizeEstimate, ImportError> {
    let command = media_size_command(media_root);
    let output = run_size_query(remote, &command).await?;
    let size = parse_leading_number(&output)?;
    Ok(SizeEstimate::from_ratio(size, ratio))
}

/// Formats a byte count with 1024-based units.
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.2} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.2} KB", b as f64 / KB as f64),
        b => format!("{} bytes", b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{captured, MockRemote};
    use crate::types::EstimateRatios;

    const WARNING: &str = "mysql: [Warning] Using a password on the command line interface can be insecure.";

    #[test]
    fn test_numeric_line_after_any_number_of_warnings() {
        for n in 0..6 {
            let mut output = String::new();
            for _ in 0..n {
                output.push_str(WARNING);
                output.push('\n');
            }
            output.push_str("123456789\n");
            assert_eq!(parse_database_size(&output).unwrap(), 123456789, "with {} warnings", n);
        }
    }

    #[test]
    fn test_trailing_blank_lines_are_skipped() {
        assert_eq!(parse_database_size("\n  42  \n\n   \n").unwrap(), 42);
    }

    #[test]
    fn test_null_size_is_zero() {
        assert_eq!(parse_database_size(&format!("{}\nNULL\n", WARNING)).unwrap(), 0);
    }

    #[test]
    fn test_malformed_database_size() {
        assert!(matches!(parse_database_size(""), Err(ImportError::Parse { .. })));
        assert!(matches!(parse_database_size(WARNING), Err(ImportError::Parse { .. })));
        assert!(matches!(parse_database_size("12.5"), Err(ImportError::Parse { .. })));
        assert!(matches!(parse_database_size("-3"), Err(ImportError::Parse { .. })));
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(parse_leading_number("1000000\n").unwrap(), 1000000);
        assert_eq!(parse_leading_number("52428800\t/var/www/pub/media/\n").unwrap(), 52428800);
        assert_eq!(
            parse_leading_number("du: cannot read directory 'x': Permission denied\n777\n").unwrap(),
            777
        );
        assert!(matches!(parse_leading_number(""), Err(ImportError::Parse { .. })));
        assert!(matches!(parse_leading_number("total unknown"), Err(ImportError::Parse { .. })));
    }

    #[test]
    fn test_compression_proxies() {
        let ratios = EstimateRatios::default();
        assert_eq!(SizeEstimate::from_ratio(80_000_000, ratios.dump).compressed, 10_000_000);
        assert_eq!(SizeEstimate::from_ratio(1_000_000, ratios.media).compressed, 700_000);
        assert_eq!(SizeEstimate::from_ratio(0, ratios.media).compressed, 0);
        assert_eq!(SizeEstimate::from_ratio(15, ratios.dump).compressed, 1);
        assert_eq!(SizeEstimate::from_ratio(7, ratios.dump).compressed, 0);
        assert_eq!(SizeEstimate::from_ratio(80_000_007, ratios.dump).compressed, 10_000_000);
        assert_eq!(SizeEstimate::from_ratio(10, ratios.media).compressed, 7);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 bytes");
        assert_eq!(human_size(2048), "2.00 KB");
        assert_eq!(human_size(10_000_000), "9.54 MB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[tokio::test]
    async fn test_estimate_database_size() {
        let mut remote = MockRemote::new();
        remote
            .expect_run_captured()
            .withf(|command| command.contains("information_schema.TABLES"))
            .times(1)
            .returning(|_| Ok(captured(&format!("{}\n80000000\n", WARNING), 0)));

        let creds = DbCredentials {
            host: Some("localhost".to_string()),
            name: Some("shop".to_string()),
            user: Some("mage".to_string()),
            password: Some("pw".to_string()),
        };
        let estimate = estimate_database_size(&remote, &creds, EstimateRatios::DUMP_COMPRESSION_RATIO)
            .await
            .unwrap();
        assert_eq!(estimate, SizeEstimate { uncompressed: 80_000_000, compressed: 10_000_000 });
    }

    #[tokio::test]
    async fn test_estimate_media_size() {
        let mut remote = MockRemote::new();
        remote
            .expect_run_captured()
            .withf(|command| command.starts_with("du -sb /srv/shop/pub/media/"))
            .times(1)
            .returning(|_| Ok(captured("1000000\n", 0)));

        let estimate = estimate_media_size(&remote, "/srv/shop/pub", EstimateRatios::MEDIA_COMPRESSION_RATIO)
            .await
            .unwrap();
        assert_eq!(estimate, SizeEstimate { uncompressed: 1_000_000, compressed: 700_000 });
    }

    #[tokio::test]
    async fn test_estimate_reports_remote_failure() {
        let mut remote = MockRemote::new();
        remote
            .expect_run_captured()
            .returning(|_| Ok(captured("ERROR 1045 (28000): Access denied", 1)));

        let creds = DbCredentials {
            host: Some("localhost".to_string()),
            name: Some("shop".to_string()),
            user: Some("mage".to_string()),
            password: Some("pw".to_string()),
        };
        let err = estimate_database_size(&remote, &creds, 0.125).await.unwrap_err();
        match err {
            ImportError::RemoteExit { command, .. } => assert!(!command.contains("-ppw")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
