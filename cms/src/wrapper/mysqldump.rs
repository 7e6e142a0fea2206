use crate::types::DbCredentials;
use crate::wrapper::{quote, RemoteCommand};
use crate::ImportError;

/// Options for a remote `mysqldump` piped through gzip.
pub struct MysqlDumpOptions {
    pub host: String,
    pub username: String,
    pub password: Option<String>,
    pub database: String,
    pub no_tablespaces: bool,
    pub routines: bool,
    pub skip_triggers: bool,
    pub single_transaction: bool,
    /// gzip level; `None` streams the dump uncompressed.
    pub compress: Option<u32>,
}

impl Default for MysqlDumpOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            username: "root".to_string(),
            password: None,
            database: String::new(),
            no_tablespaces: true,
            routines: true,
            skip_triggers: true,
            single_transaction: true,
            compress: Some(9),
        }
    }
}

impl MysqlDumpOptions {
    /// Dump options for the database described by `credentials`. Host, name
    /// and user are required; an empty password is dropped.
    pub fn from_credentials(credentials: &DbCredentials) -> Result<Self, ImportError> {
        Ok(Self {
            host: credentials.host()?.to_string(),
            username: credentials.user()?.to_string(),
            password: credentials.password().map(str::to_string),
            database: credentials.name()?.to_string(),
            ..Default::default()
        })
    }

    pub fn command(&self) -> RemoteCommand {
        let mut cmd = format!(
            "mysqldump -h {} -u {}",
            quote(&self.host),
            quote(&self.username)
        );

        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            cmd.push_str(&format!(" -p{}", quote(password)));
        }

        if self.no_tablespaces {
            cmd.push_str(" --no-tablespaces");
        }

        if self.routines {
            cmd.push_str(" --routines");
        }

        if self.skip_triggers {
            cmd.push_str(" --skip-triggers");
        }

        if self.single_transaction {
            cmd.push_str(" --single-transaction");
        }

        cmd.push(' ');
        cmd.push_str(&quote(&self.database));

        if let Some(level) = self.compress {
            cmd.push_str(&format!(" | gzip -{}", level));
        }

        RemoteCommand::new(cmd).with_secret(self.password.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(password: Option<&str>) -> DbCredentials {
        DbCredentials {
            host: Some("localhost".to_string()),
            name: Some("magento".to_string()),
            user: Some("mage".to_string()),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_dump_command_with_password() {
        let options = MysqlDumpOptions::from_credentials(&credentials(Some("s3cret"))).unwrap();
        let cmd = options.command();
        assert_eq!(
            cmd.as_str(),
            "mysqldump -h localhost -u mage -ps3cret --no-tablespaces --routines --skip-triggers --single-transaction magento | gzip -9"
        );
        assert!(!cmd.to_string().contains("s3cret"));
    }

    #[test]
    fn test_dump_command_without_password_has_no_password_flag() {
        for password in [None, Some("")] {
            let options = MysqlDumpOptions::from_credentials(&credentials(password)).unwrap();
            let cmd = options.command();
            assert!(!cmd.as_str().contains(" -p"), "unexpected flag in {}", cmd.as_str());
            assert!(!cmd.as_str().contains("''"));
        }
    }

    #[test]
    fn test_dump_requires_database_name() {
        let mut creds = credentials(None);
        creds.name = None;
        assert!(matches!(
            MysqlDumpOptions::from_credentials(&creds),
            Err(ImportError::MissingCredential("name"))
        ));
    }

    #[test]
    fn test_uncompressed_dump() {
        let options = MysqlDumpOptions {
            database: "shop".to_string(),
            compress: None,
            routines: false,
            ..Default::default()
        };
        let cmd = options.command();
        assert!(!cmd.as_str().contains("gzip"));
        assert!(!cmd.as_str().contains("--routines"));
        assert!(cmd.as_str().ends_with(" shop"));
    }
}
