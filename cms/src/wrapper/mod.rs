//! Builders for the shell commands run on the remote host.

pub mod mysql;
pub mod mysqldump;
pub mod php;
pub mod tar;

use std::fmt;

pub use mysql::database_size_command;
pub use mysqldump::MysqlDumpOptions;
pub use php::config_reader_command;
pub use tar::{media_size_command, TarOptions};

/// Quotes a value for a POSIX shell. Values made only of characters the
/// shell treats literally are returned unchanged.
pub fn quote(value: &str) -> String {
    let is_plain = |c: char| c.is_ascii_alphanumeric() || "_-./:@%+=,".contains(c);
    if !value.is_empty() && value.chars().all(is_plain) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// Renders a value as a double-quoted PHP string literal.
pub fn php_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A shell command plus the secrets that must not show up in logs or error
/// messages.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    script: String,
    secrets: Vec<String>,
}

impl RemoteCommand {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            secrets: Vec::new(),
        }
    }

    pub fn with_secret(mut self, secret: Option<&str>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.secrets.push(secret.to_string());
        }
        self
    }

    pub fn as_str(&self) -> &str {
        &self.script
    }

    /// The command with every secret replaced by `****`.
    pub fn redacted(&self) -> String {
        self.secrets.iter().fold(self.script.clone(), |script, secret| {
            script.replace(&quote(secret), "****").replace(secret.as_str(), "****")
        })
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RemoteCommand({:?})", self.redacted())
    }
}
