use crate::adapters::run_checked;
use crate::domain::ports::PackageManager;
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::process::Command;

/// apt-get backed package installation. `install -y` is idempotent: packages
/// already at the latest version are left alone.
#[derive(Debug, Clone, Default)]
pub struct AptPackageManager;

impl AptPackageManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PackageManager for AptPackageManager {
    async fn install(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let mut cmd = Command::new("apt-get");
        cmd.env("DEBIAN_FRONTEND", "noninteractive")
            .args(["install", "-y"])
            .args(packages);
        run_checked(&mut cmd, &format!("apt-get install {}", packages.join(" "))).await?;
        Ok(())
    }
}
