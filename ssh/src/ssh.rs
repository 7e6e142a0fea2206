use async_trait::async_trait;
use log::{debug, info, warn};
use russh::keys::*;
use russh::*;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::remote::{CommandOutput, RemoteExec};
use crate::SshError;

/// Connection parameters for a single remote host.
pub struct SshConnector {
    pub host: String,
    pub user: String,
    private_key_path: Option<String>,
    password: Option<String>,
    port: Option<u16>,
}

/// An authenticated connection. Each command runs on its own channel.
pub struct RemoteHost {
    pub host: String,
    pub user: String,
    session: Mutex<client::Handle<Client>>,
}

impl fmt::Debug for SshConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshConnector")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("port", &self.port())
            .field("private_key_path", &self.private_key_path)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

impl fmt::Debug for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteHost")
            .field("host", &self.host)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

struct Client;

impl client::Handler for Client {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        // Host identity is not verified.
        Ok(true)
    }
}

impl SshConnector {
    pub fn new(host: String, user: String, port: Option<u16>) -> Self {
        Self {
            host,
            user,
            private_key_path: None,
            password: None,
            port: Some(port.unwrap_or(22)),
        }
    }

    pub fn with_private_key_path(mut self, private_key_path: String) -> Self {
        self.private_key_path = Some(private_key_path);
        self
    }

    pub fn with_password(mut self, password: String) -> Self {
        self.password = Some(password);
        self
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(22)
    }

    pub fn uses_password(&self) -> bool {
        self.password.is_some()
    }

    /// Dials the host and authenticates with the password if one was given,
    /// otherwise with the private key.
    pub async fn connect(&self) -> Result<RemoteHost, SshError> {
        if self.password.is_none() && self.private_key_path.is_none() {
            return Err(SshError::ConfigurationError(
                "Either SSH password or key path must be specified".to_string(),
            ));
        }

        let config = Arc::new(client::Config::default());
        let mut session = client::connect(config, (self.host.as_str(), self.port()), Client)
            .await
            .map_err(|e| {
                SshError::ConnectionError(format!("{}:{}: {}", self.host, self.port(), e))
            })?;
        warn!(
            "The host key of {} is accepted without verification",
            self.host
        );

        let auth_res = match (&self.password, &self.private_key_path) {
            (Some(password), _) => {
                debug!("Using SSH password authentication");
                session.authenticate_password(&self.user, password).await
            }
            (None, Some(key_path)) => {
                debug!("Using SSH key authentication from {}", key_path);
                let key_pair = load_secret_key(key_path, None).map_err(|e| {
                    SshError::ConfigurationError(format!(
                        "Error reading SSH key {}: {}",
                        key_path, e
                    ))
                })?;
                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .map_err(|e| SshError::AuthenticationError(e.to_string()))?
                    .flatten();
                session
                    .authenticate_publickey(
                        &self.user,
                        PrivateKeyWithHashAlg::new(Arc::new(key_pair), hash_alg),
                    )
                    .await
            }
            (None, None) => {
                return Err(SshError::ConfigurationError(
                    "Either SSH password or key path must be specified".to_string(),
                ))
            }
        };

        let auth_res = auth_res.map_err(|e| SshError::AuthenticationError(e.to_string()))?;
        if !auth_res.success() {
            return Err(SshError::AuthenticationError(format!(
                "{}@{} rejected the supplied credentials",
                self.user, self.host
            )));
        }

        info!("SSH session to {}@{}:{} established", self.user, self.host, self.port());

        Ok(RemoteHost {
            host: self.host.clone(),
            user: self.user.clone(),
            session: Mutex::new(session),
        })
    }
}

impl RemoteHost {
    async fn open_exec(&self, command: &str) -> Result<Channel<client::Msg>, SshError> {
        let channel = {
            let session = self.session.lock().await;
            session
                .channel_open_session()
                .await
                .map_err(|e| SshError::SessionError(format!("Failed to open session: {}", e)))?
        };
        channel
            .exec(true, command)
            .await
            .map_err(|e| SshError::SessionError(format!("Failed to start command: {}", e)))?;
        Ok(channel)
    }

    /// Disconnects from the host. Consumes the connection so it can only be
    /// closed once.
    pub async fn close(self) -> Result<(), SshError> {
        let session = self.session.into_inner();
        session
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .map_err(|e| SshError::ConnectionError(format!("Failed to disconnect: {}", e)))?;
        info!("SSH connection to {} closed", self.host);
        Ok(())
    }
}

#[async_trait]
impl RemoteExec for RemoteHost {
    async fn run_captured(&self, command: &str) -> Result<CommandOutput, SshError> {
        let mut channel = self.open_exec(command).await?;
        let mut result = CommandOutput::default();

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => result.output.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, .. } => result.output.extend_from_slice(data),
                ChannelMsg::ExitStatus { exit_status } => result.exit_status = Some(exit_status),
                ChannelMsg::ExitSignal { signal_name, .. } => {
                    warn!("Remote command terminated by signal {:?}", signal_name);
                }
                _ => {}
            }
        }

        Ok(result)
    }

    async fn run_streaming(
        &self,
        command: &str,
        mut sink: Box<dyn AsyncWrite + Send + Unpin>,
    ) -> Result<CommandOutput, SshError> {
        let mut channel = self.open_exec(command).await?;
        let mut result = CommandOutput::default();

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => {
                    sink.write_all(data)
                        .await
                        .map_err(|e| SshError::SinkError(e.to_string()))?;
                }
                ChannelMsg::ExtendedData { ref data, .. } => {
                    result.output.extend_from_slice(data);
                }
                ChannelMsg::ExitStatus { exit_status } => result.exit_status = Some(exit_status),
                ChannelMsg::ExitSignal { signal_name, .. } => {
                    warn!("Remote command terminated by signal {:?}", signal_name);
                }
                _ => {}
            }
        }

        sink.shutdown()
            .await
            .map_err(|e| SshError::SinkError(e.to_string()))?;
        Ok(result)
    }
}
