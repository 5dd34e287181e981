use crate::adapters::run_checked;
use crate::domain::model::ContainerSpec;
use crate::domain::ports::ContainerRuntime;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use tokio::process::Command;

/// Docker-backed container runtime. A name conflict from a previous run is
/// treated as success: the existing container is started instead.
#[derive(Debug, Clone, Default)]
pub struct DockerRuntime;

impl DockerRuntime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn start(&self, spec: &ContainerSpec) -> Result<()> {
        let mut cmd = Command::new("docker");
        cmd.args(["run", "-d", "--restart", "unless-stopped", "--name", &spec.name])
            .args(&spec.args)
            .arg(&spec.image);

        match run_checked(&mut cmd, &format!("docker run {}", spec.name)).await {
            Ok(_) => Ok(()),
            Err(ProvisionError::CommandFailed { stderr, .. })
                if stderr.contains("already in use") =>
            {
                tracing::debug!("container {} exists, starting it", spec.name);
                let mut start = Command::new("docker");
                start.args(["start", &spec.name]);
                run_checked(&mut start, &format!("docker start {}", spec.name)).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
