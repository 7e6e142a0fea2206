use clap::Args;
use log::info;

use crate::ssh::SshConnector;
use crate::SshError;

/// SSH connection flags shared by every command that talks to a remote host.
#[derive(Args, Debug, Clone)]
pub struct SshArgs {
    /// The SSH server address.
    #[clap(short = 'H', long)]
    pub host: String,

    /// The SSH server port (default 22).
    #[clap(short = 'P', long)]
    pub port: Option<u16>,

    /// The SSH username.
    #[clap(short = 'U', long)]
    pub user: Option<String>,

    /// The SSH password. The private key is used when omitted.
    #[clap(long, conflicts_with = "ask_password")]
    pub password: Option<String>,

    /// Prompt for the SSH password without echoing it.
    #[clap(long)]
    pub ask_password: bool,

    /// The path to the private key for SSH authentication.
    #[clap(long)]
    pub key_path: Option<String>,
}

impl SshArgs {
    /// Returns the password from the flags, or from a prompt when
    /// `--ask-password` was given. An empty answer means "use the key".
    pub fn resolve_password(&self) -> Result<Option<String>, SshError> {
        if self.ask_password {
            let password = rpassword::prompt_password("Enter ssh password or leave empty: ")
                .map_err(|e| {
                    SshError::ConfigurationError(format!("Failed to read password: {}", e))
                })?;
            return Ok(Some(password).filter(|p| !p.is_empty()));
        }
        Ok(self.password.clone().filter(|p| !p.is_empty()))
    }

    /// Builds a connector. `user`, `port` and `key_path` are the already
    /// resolved values (flags first, then configuration).
    pub fn connector(
        &self,
        user: String,
        port: u16,
        key_path: String,
    ) -> Result<SshConnector, SshError> {
        let connector = SshConnector::new(self.host.clone(), user, Some(port));
        match self.resolve_password()? {
            Some(password) => Ok(connector.with_password(password)),
            None => {
                info!("No SSH password supplied, using key {}", key_path);
                Ok(connector.with_private_key_path(key_path))
            }
        }
    }
}
