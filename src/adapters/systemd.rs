use crate::adapters::run_checked;
use crate::domain::model::ServiceUnit;
use crate::domain::ports::InitSystem;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tokio::process::Command;

/// systemctl-backed init system.
#[derive(Debug, Clone, Default)]
pub struct SystemdInit;

impl SystemdInit {
    pub fn new() -> Self {
        Self
    }

    fn probe_writable(dir: &Path) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        let probe = dir.join(".genome-provision-probe");
        fs::write(&probe, b"")?;
        fs::remove_file(&probe)
    }
}

#[async_trait]
impl InitSystem for SystemdInit {
    /// Installation needs write access to every unit destination directory.
    /// Checked up front so a privilege failure aborts before any unit is
    /// touched.
    fn ensure_privileged(&self, units: &[ServiceUnit]) -> Result<()> {
        let dirs: BTreeSet<&Path> = units
            .iter()
            .filter_map(|u| u.destination.parent())
            .collect();
        for dir in dirs {
            Self::probe_writable(dir).map_err(|e| ProvisionError::PreconditionError {
                message: format!(
                    "no write access to {} ({}); re-run with sufficient privilege",
                    dir.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }

    async fn install_unit(&self, unit: &ServiceUnit) -> Result<()> {
        if let Some(parent) = unit.destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&unit.source, &unit.destination)?;
        Ok(())
    }

    async fn daemon_reload(&self) -> Result<()> {
        let mut cmd = Command::new("systemctl");
        cmd.arg("daemon-reload");
        run_checked(&mut cmd, "systemctl daemon-reload").await?;
        Ok(())
    }

    async fn enable_and_start(&self, names: &[String]) -> Result<()> {
        let mut cmd = Command::new("systemctl");
        cmd.args(["enable", "--now"]).args(names);
        run_checked(&mut cmd, &format!("systemctl enable --now {}", names.join(" "))).await?;
        Ok(())
    }

    async fn status(&self, names: &[String]) -> Result<String> {
        // systemctl status exits non-zero for inactive units; this is a
        // pass-through read, so only spawn failures are errors.
        let output = Command::new("systemctl")
            .args(["status", "--no-pager"])
            .args(names)
            .output()
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
