use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::wrapper::quote;
use crate::ImportError;

/// Magento generation, told apart by which config file exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmsVariant {
    Unknown,
    /// Magento 1: flat XML config in `app/etc/local.xml`.
    Magento1,
    /// Magento 2: PHP array config in `app/etc/env.php`.
    Magento2,
}

impl fmt::Display for CmsVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmsVariant::Unknown => write!(f, "unknown"),
            CmsVariant::Magento1 => write!(f, "Magento 1"),
            CmsVariant::Magento2 => write!(f, "Magento 2"),
        }
    }
}

/// Application root on the remote host, without trailing separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRoot(String);

impl RemoteRoot {
    /// Normalizes an operator-supplied root. An empty value, `/` or the
    /// literal `~/public_html` resolve to `/home/<ssh user>/public_html`.
    pub fn new(raw: Option<&str>, ssh_user: &str) -> Self {
        let trimmed = raw.unwrap_or("").trim().trim_end_matches('/');
        if trimmed.is_empty() || trimmed == "~/public_html" {
            RemoteRoot(format!("/home/{}/public_html", ssh_user))
        } else {
            RemoteRoot(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a relative path below the root.
    pub fn join(&self, relative: &str) -> String {
        format!("{}/{}", self.0, relative.trim_start_matches('/'))
    }

    /// Directory holding `media/`: `root/pub` for Magento 2, `root` otherwise.
    pub fn media_root(&self, variant: CmsVariant) -> String {
        match variant {
            CmsVariant::Magento2 => self.join("pub"),
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for RemoteRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Database settings read from the Magento config. Keys that the config did
/// not provide stay `None`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DbCredentials {
    pub host: Option<String>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DbCredentials {
    pub fn from_map(mut values: HashMap<String, String>) -> Self {
        Self {
            host: values.remove("host"),
            name: values.remove("name"),
            user: values.remove("user"),
            password: values.remove("password"),
        }
    }

    pub fn host(&self) -> Result<&str, ImportError> {
        self.host.as_deref().ok_or(ImportError::MissingCredential("host"))
    }

    pub fn name(&self) -> Result<&str, ImportError> {
        self.name.as_deref().ok_or(ImportError::MissingCredential("name"))
    }

    pub fn user(&self) -> Result<&str, ImportError> {
        self.user.as_deref().ok_or(ImportError::MissingCredential("user"))
    }

    /// `None` for both an absent and an empty password.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Client flags `-h <host> -u <user> [-p<password>]`.
    pub fn client_args(&self) -> Result<String, ImportError> {
        let mut args = format!("-h {} -u {}", quote(self.host()?), quote(self.user()?));
        if let Some(password) = self.password() {
            args.push_str(&format!(" -p{}", quote(password)));
        }
        Ok(args)
    }
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

/// One artifact pulled from the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferTarget {
    DatabaseDump,
    MediaArchive,
}

/// What the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    Sql,
    Media,
    Both,
}

impl ImportTarget {
    /// Transfers in execution order. A combined run dumps the database first.
    pub fn transfers(&self) -> &'static [TransferTarget] {
        match self {
            ImportTarget::Sql => &[TransferTarget::DatabaseDump],
            ImportTarget::Media => &[TransferTarget::MediaArchive],
            ImportTarget::Both => &[TransferTarget::DatabaseDump, TransferTarget::MediaArchive],
        }
    }
}

/// Compression proxies applied to uncompressed sizes. Display only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateRatios {
    pub dump: f64,
    pub media: f64,
}

impl EstimateRatios {
    /// A gzipped SQL dump is assumed to be an eighth of the table data.
    pub const DUMP_COMPRESSION_RATIO: f64 = 0.125;
    /// A gzipped media tarball is assumed to be 30% smaller than the files.
    pub const MEDIA_COMPRESSION_RATIO: f64 = 0.7;
}

impl Default for EstimateRatios {
    fn default() -> Self {
        Self {
            dump: Self::DUMP_COMPRESSION_RATIO,
            media: Self::MEDIA_COMPRESSION_RATIO,
        }
    }
}

/// A fully resolved import run.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub target: ImportTarget,
    pub root: RemoteRoot,
    /// SSH login, used to name the media archive.
    pub ssh_user: String,
    pub output_dir: PathBuf,
    pub ratios: EstimateRatios,
    pub show_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_strips_trailing_slashes() {
        let root = RemoteRoot::new(Some("/var/www/shop///"), "deploy");
        assert_eq!(root.as_str(), "/var/www/shop");
        assert_eq!(root.join("app/etc/env.php"), "/var/www/shop/app/etc/env.php");
    }

    #[test]
    fn test_root_defaults_to_public_html() {
        assert_eq!(RemoteRoot::new(None, "deploy").as_str(), "/home/deploy/public_html");
        assert_eq!(RemoteRoot::new(Some(""), "deploy").as_str(), "/home/deploy/public_html");
        assert_eq!(RemoteRoot::new(Some("/"), "deploy").as_str(), "/home/deploy/public_html");
        assert_eq!(
            RemoteRoot::new(Some("~/public_html/"), "deploy").as_str(),
            "/home/deploy/public_html"
        );
    }

    #[test]
    fn test_media_root_depends_on_variant() {
        let root = RemoteRoot::new(Some("/var/www/shop"), "deploy");
        assert_eq!(root.media_root(CmsVariant::Magento1), "/var/www/shop");
        assert_eq!(root.media_root(CmsVariant::Magento2), "/var/www/shop/pub");
    }

    #[test]
    fn test_missing_credentials_are_errors() {
        let creds = DbCredentials {
            host: Some("localhost".to_string()),
            ..Default::default()
        };
        assert_eq!(creds.host().unwrap(), "localhost");
        assert!(matches!(creds.name(), Err(ImportError::MissingCredential("name"))));
        assert!(matches!(creds.user(), Err(ImportError::MissingCredential("user"))));
        assert_eq!(creds.password(), None);
    }

    #[test]
    fn test_empty_password_is_omitted_from_client_args() {
        let mut creds = DbCredentials {
            host: Some("db.internal".to_string()),
            name: Some("shop".to_string()),
            user: Some("shop_rw".to_string()),
            password: Some(String::new()),
        };
        assert_eq!(creds.client_args().unwrap(), "-h db.internal -u shop_rw");

        creds.password = None;
        assert_eq!(creds.client_args().unwrap(), "-h db.internal -u shop_rw");

        creds.password = Some("s3cret".to_string());
        assert_eq!(creds.client_args().unwrap(), "-h db.internal -u shop_rw -ps3cret");

        creds.password = Some("it's".to_string());
        assert_eq!(creds.client_args().unwrap(), "-h db.internal -u shop_rw -p'it'\\''s'");
    }

    #[test]
    fn test_debug_masks_password() {
        let creds = DbCredentials {
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("****"));
    }

    #[test]
    fn test_combined_run_dumps_database_first() {
        assert_eq!(
            ImportTarget::Both.transfers(),
            &[TransferTarget::DatabaseDump, TransferTarget::MediaArchive]
        );
        assert_eq!(ImportTarget::Media.transfers(), &[TransferTarget::MediaArchive]);
    }
}
