use crate::wrapper::{quote, RemoteCommand};

/// Options for a remote `tar` that writes a gzipped archive to stdout.
pub struct TarOptions {
    /// Directory the archive is taken relative to.
    pub directory: String,
    /// Members to archive. Shell globs are left unquoted.
    pub members: Vec<String>,
    pub exclude: Vec<String>,
    pub gzip: bool,
}

impl TarOptions {
    /// Archive of `<media_root>/media/*`, skipping any `cache` directory.
    pub fn media(media_root: &str) -> Self {
        Self {
            directory: media_root.to_string(),
            members: vec!["media/*".to_string()],
            exclude: vec!["cache".to_string()],
            gzip: true,
        }
    }

    pub fn command(&self) -> RemoteCommand {
        let mut cmd = format!("cd {} && tar -c", quote(&self.directory));
        if self.gzip {
            cmd.push('z');
        }
        cmd.push_str("f -");

        for pattern in &self.exclude {
            cmd.push_str(&format!(" --exclude={}", quote(pattern)));
        }

        for member in &self.members {
            cmd.push(' ');
            cmd.push_str(member);
        }

        RemoteCommand::new(cmd)
    }
}

/// Prints the apparent size in bytes of `<media_root>/media/`. Unreadable
/// entries are skipped rather than failing the whole measurement.
pub fn media_size_command(media_root: &str) -> RemoteCommand {
    RemoteCommand::new(format!(
        "du -sb {} 2>/dev/null | awk '{{print $1}}'",
        quote(&format!("{}/media/", media_root))
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_archive_command() {
        let cmd = TarOptions::media("/var/www/shop/pub").command();
        assert_eq!(cmd.as_str(), "cd /var/www/shop/pub && tar -czf - --exclude=cache media/*");
    }

    #[test]
    fn test_archive_directory_is_quoted() {
        let cmd = TarOptions::media("/var/www/my shop").command();
        assert_eq!(cmd.as_str(), "cd '/var/www/my shop' && tar -czf - --exclude=cache media/*");
    }

    #[test]
    fn test_plain_tar() {
        let options = TarOptions {
            directory: "/srv".to_string(),
            members: vec!["a".to_string(), "b".to_string()],
            exclude: Vec::new(),
            gzip: false,
        };
        assert_eq!(options.command().as_str(), "cd /srv && tar -cf - a b");
    }

    #[test]
    fn test_media_size_command() {
        assert_eq!(
            media_size_command("/var/www/shop").as_str(),
            "du -sb /var/www/shop/media/ 2>/dev/null | awk '{print $1}'"
        );
    }
}
