use crate::domain::model::{ProvisioningOutcome, ServiceUnit};
use crate::domain::ports::InitSystem;
use crate::utils::error::Result;
use std::collections::BTreeMap;

/// Installs, enables and starts a batch of service units. Per-unit failures
/// are recorded and do not stop the rest of the batch; the reload and the
/// enable/start are each issued once for the whole batch.
pub struct ServiceInstaller<I: InitSystem> {
    init: I,
}

impl<I: InitSystem> ServiceInstaller<I> {
    pub fn new(init: I) -> Self {
        Self { init }
    }

    pub async fn install(
        &self,
        units: &[ServiceUnit],
    ) -> Result<BTreeMap<String, ProvisioningOutcome>> {
        // Fatal precondition: checked before any unit is touched.
        self.init.ensure_privileged(units)?;

        let mut outcomes = BTreeMap::new();
        let mut installed: Vec<String> = Vec::new();

        for unit in units {
            if !unit.source.exists() {
                let cause = format!("unit source not found: {}", unit.source.display());
                println!("❌ {}: {}", unit.name, cause);
                outcomes.insert(unit.name.clone(), ProvisioningOutcome::Failed(cause));
                continue;
            }
            match self.init.install_unit(unit).await {
                Ok(()) => {
                    println!("✅ {}: unit installed", unit.name);
                    installed.push(unit.name.clone());
                    outcomes.insert(unit.name.clone(), ProvisioningOutcome::Installed);
                }
                Err(e) => {
                    println!("❌ {}: {}", unit.name, e);
                    outcomes.insert(unit.name.clone(), ProvisioningOutcome::Failed(e.to_string()));
                }
            }
        }

        // One reload for the whole batch, then enable/start only the units
        // that actually installed.
        self.init.daemon_reload().await?;
        if !installed.is_empty() {
            self.init.enable_and_start(&installed).await?;
            tracing::info!("enabled and started: {}", installed.join(", "));
        }

        Ok(outcomes)
    }

    /// Pass-through consolidated status across the managed units.
    pub async fn consolidated_status(&self, units: &[ServiceUnit]) -> Result<String> {
        let names: Vec<String> = units.iter().map(|u| u.name.clone()).collect();
        self.init.status(&names).await
    }
}
