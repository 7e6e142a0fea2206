use log::{debug, info, warn};
use ssh::RemoteExec;

use crate::types::{CmsVariant, RemoteRoot};
use crate::wrapper::{quote, RemoteCommand};
use crate::ImportError;

const MAGENTO1_MARKER: &str = "app/etc/local.xml";
const MAGENTO2_MARKER: &str = "app/etc/env.php";

/// Prints `2` if the Magento 2 config exists and `1` if the Magento 1
/// config exists, one per line. Always exits 0.
pub fn probe_command(root: &RemoteRoot) -> RemoteCommand {
    RemoteCommand::new(format!(
        "[ -f {} ] && echo 2; [ -f {} ] && echo 1; true",
        quote(&root.join(MAGENTO2_MARKER)),
        quote(&root.join(MAGENTO1_MARKER)),
    ))
}

/// Maps probe output to a variant. When both markers are reported the
/// Magento 2 config wins.
pub fn parse_variant(output: &str) -> CmsVariant {
    let markers: Vec<&str> = output.lines().map(str::trim).collect();
    let has_m2 = markers.contains(&"2");
    let has_m1 = markers.contains(&"1");

    if has_m1 && has_m2 {
        warn!("Both {} and {} exist, treating the install as Magento 2", MAGENTO1_MARKER, MAGENTO2_MARKER);
    }

    if has_m2 {
        CmsVariant::Magento2
    } else if has_m1 {
        CmsVariant::Magento1
    } else {
        CmsVariant::Unknown
    }
}

/// Determines the Magento generation installed under `root`. An install
/// that cannot be recognised is an error.
pub async fn detect<R: RemoteExec + ?Sized>(
    remote: &R,
    root: &RemoteRoot,
) -> Result<CmsVariant, ImportError> {
    let command = probe_command(root);
    debug!("Probing for Magento config files: {}", command);

    let result = remote.run_captured(command.as_str()).await?;
    if !result.success() {
        return Err(ImportError::RemoteExit {
            command: command.to_string(),
            status: result.exit_status,
            output: result.text(),
        });
    }

    match parse_variant(&result.text()) {
        CmsVariant::Unknown => Err(ImportError::UnknownVariant {
            root: root.to_string(),
            output: result.text().trim().to_string(),
        }),
        variant => {
            info!("Detected {} in {}", variant, root);
            Ok(variant)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{captured, MockRemote};

    #[test]
    fn test_probe_command() {
        let root = RemoteRoot::new(Some("/var/www/shop"), "deploy");
        assert_eq!(
            probe_command(&root).as_str(),
            "[ -f /var/www/shop/app/etc/env.php ] && echo 2; [ -f /var/www/shop/app/etc/local.xml ] && echo 1; true"
        );
    }

    #[test]
    fn test_parse_variant() {
        assert_eq!(parse_variant("1\n"), CmsVariant::Magento1);
        assert_eq!(parse_variant("2\n"), CmsVariant::Magento2);
        assert_eq!(parse_variant("  2  "), CmsVariant::Magento2);
        assert_eq!(parse_variant(""), CmsVariant::Unknown);
        assert_eq!(parse_variant("3\n"), CmsVariant::Unknown);
        assert_eq!(parse_variant("12\n"), CmsVariant::Unknown);
    }

    #[test]
    fn test_both_markers_prefer_magento2() {
        assert_eq!(parse_variant("2\n1\n"), CmsVariant::Magento2);
        assert_eq!(parse_variant("1\n2\n"), CmsVariant::Magento2);
    }

    #[tokio::test]
    async fn test_detect_magento1() {
        let mut remote = MockRemote::new();
        remote
            .expect_run_captured()
            .withf(|command| command.contains("local.xml") && command.contains("env.php"))
            .times(1)
            .returning(|_| Ok(captured("1\n", 0)));

        let root = RemoteRoot::new(Some("/var/www/shop"), "deploy");
        assert_eq!(detect(&remote, &root).await.unwrap(), CmsVariant::Magento1);
    }

    #[tokio::test]
    async fn test_detect_magento2() {
        let mut remote = MockRemote::new();
        remote
            .expect_run_captured()
            .times(1)
            .returning(|_| Ok(captured("2\n", 0)));

        let root = RemoteRoot::new(Some("/var/www/shop"), "deploy");
        assert_eq!(detect(&remote, &root).await.unwrap(), CmsVariant::Magento2);
    }

    #[tokio::test]
    async fn test_detect_nothing_is_fatal() {
        let mut remote = MockRemote::new();
        remote
            .expect_run_captured()
            .times(1)
            .returning(|_| Ok(captured("", 0)));

        let root = RemoteRoot::new(Some("/var/www/shop"), "deploy");
        let err = detect(&remote, &root).await.unwrap_err();
        assert!(matches!(err, ImportError::UnknownVariant { .. }));
        assert!(err.to_string().contains("/var/www/shop"));
    }

    #[tokio::test]
    async fn test_detect_session_failure() {
        let mut remote = MockRemote::new();
        remote
            .expect_run_captured()
            .returning(|_| Err(ssh::SshError::SessionError("channel refused".to_string())));

        let root = RemoteRoot::new(Some("/var/www/shop"), "deploy");
        let err = detect(&remote, &root).await.unwrap_err();
        assert!(matches!(err, ImportError::Session(_)));
    }
}
