use crate::core::prober::ReadinessProber;
use crate::domain::model::{ContainerSpec, RoleDefinition, ServiceUnit, TemplatePatch};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_unique, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Declarative provisioning source, loaded once at process start and
/// immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub probe: ProbeConfig,
    pub roles: Vec<RoleDefinition>,
    #[serde(default)]
    pub services: Vec<ServiceUnit>,
    pub patch: Option<TemplatePatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_attempt_timeout_ms() -> u64 {
    2_000
}

fn default_max_wait_ms() -> u64 {
    60_000
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

impl ProbeConfig {
    pub fn prober(&self) -> ReadinessProber {
        ReadinessProber::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_millis(self.attempt_timeout_ms),
            Duration::from_millis(self.max_wait_ms),
        )
    }
}

impl ProvisionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Validate for ProvisionConfig {
    fn validate(&self) -> Result<()> {
        validate_url("runtime.base_url", &self.runtime.base_url)?;
        validate_positive_number("probe.poll_interval_ms", self.probe.poll_interval_ms, 1)?;
        validate_positive_number("probe.attempt_timeout_ms", self.probe.attempt_timeout_ms, 1)?;
        validate_positive_number("probe.max_wait_ms", self.probe.max_wait_ms, 1)?;

        // An empty role set is a config mistake; every-role-skipped at
        // runtime is graceful degradation instead.
        if self.roles.is_empty() {
            return Err(crate::utils::error::ProvisionError::MissingConfigError {
                field: "roles".to_string(),
            });
        }
        for role in &self.roles {
            validate_non_empty_string("roles.role_id", &role.role_id)?;
            validate_non_empty_string("roles.base_model", &role.base_model)?;
            validate_non_empty_string("roles.model_name", &role.model_name)?;
        }
        validate_unique("roles.role_id", self.roles.iter().map(|r| r.role_id.as_str()))?;
        validate_unique(
            "roles.model_name",
            self.roles.iter().map(|r| r.model_name.as_str()),
        )?;
        validate_unique(
            "services.name",
            self.services.iter().map(|s| s.name.as_str()),
        )?;
        validate_unique(
            "containers.name",
            self.containers.iter().map(|c| c.name.as_str()),
        )?;
        Ok(())
    }
}
