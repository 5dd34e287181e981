// Adapters layer: concrete implementations of the domain ports against real
// external systems (apt-get, docker, systemctl, the Ollama HTTP API).

pub mod apt;
pub mod docker;
pub mod ollama;
pub mod systemd;

use crate::utils::error::{ProvisionError, Result};
use tokio::process::Command;

/// Run a host command to completion, failing with captured stderr on a
/// non-zero exit. Host commands are not interruptible mid-flight.
pub(crate) async fn run_checked(cmd: &mut Command, label: &str) -> Result<String> {
    tracing::debug!("running: {}", label);
    let output = cmd.output().await?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(ProvisionError::CommandFailed {
            command: label.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
