use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::SshError;

/// Result of a remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// For captured commands: stdout and stderr in arrival order.
    /// For streaming commands: stderr only, stdout went to the sink.
    pub output: Vec<u8>,
    /// `None` when the remote side closed the channel without reporting a
    /// status (e.g. the process was killed by a signal).
    pub exit_status: Option<u32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Capability to execute shell commands on a remote host. Every call uses a
/// fresh session.
#[async_trait]
pub trait RemoteExec: Send + Sync {
    /// Runs `command` to completion and collects its combined output.
    async fn run_captured(&self, command: &str) -> Result<CommandOutput, SshError>;

    /// Runs `command` and writes its stdout into `sink` as it arrives. The
    /// sink is shut down and dropped before this returns, on success and on
    /// failure alike, so the reading side always observes end-of-stream.
    async fn run_streaming(
        &self,
        command: &str,
        sink: Box<dyn AsyncWrite + Send + Unpin>,
    ) -> Result<CommandOutput, SshError>;
}
