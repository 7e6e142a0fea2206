use async_trait::async_trait;
use mockall::mock;
use ssh::{CommandOutput, RemoteExec, SshError};
use tokio::io::{AsyncWrite, AsyncWriteExt};

mock! {
    pub Remote {}

    #[async_trait]
    impl RemoteExec for Remote {
        async fn run_captured(&self, command: &str) -> Result<CommandOutput, SshError>;
        async fn run_streaming(
            &self,
            command: &str,
            sink: Box<dyn AsyncWrite + Send + Unpin>,
        ) -> Result<CommandOutput, SshError>;
    }
}

pub fn captured(text: &str, status: u32) -> CommandOutput {
    CommandOutput {
        output: text.as_bytes().to_vec(),
        exit_status: Some(status),
    }
}

/// Streams a fixed payload in small chunks and then reports `exit_status`.
pub struct StreamingRemote {
    pub payload: Vec<u8>,
    pub exit_status: Option<u32>,
}

#[async_trait]
impl RemoteExec for StreamingRemote {
    async fn run_captured(&self, command: &str) -> Result<CommandOutput, SshError> {
        Err(SshError::SessionError(format!("unexpected command {}", command)))
    }

    async fn run_streaming(
        &self,
        _command: &str,
        mut sink: Box<dyn AsyncWrite + Send + Unpin>,
    ) -> Result<CommandOutput, SshError> {
        for chunk in self.payload.chunks(4096) {
            sink.write_all(chunk)
                .await
                .map_err(|e| SshError::SinkError(e.to_string()))?;
        }
        sink.shutdown()
            .await
            .map_err(|e| SshError::SinkError(e.to_string()))?;
        Ok(CommandOutput {
            output: Vec::new(),
            exit_status: self.exit_status,
        })
    }
}
