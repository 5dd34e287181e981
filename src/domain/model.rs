use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// One role specialization: a derived model registered with the runtime
/// under `model_name`, built from `base_model` plus a Modelfile template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub role_id: String,
    pub base_model: String,
    pub model_name: String,
    pub template: PathBuf,
}

/// A systemd unit to install: the source definition is copied verbatim to
/// `destination`, and `name` is the identifier systemctl operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceUnit {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Optional pre-registration substitution applied to a working copy of each
/// Modelfile, e.g. downgrading a heavy base model to a lighter one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatePatch {
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProvisioningOutcome {
    Installed,
    AlreadyPresent,
    Skipped(SkipReason),
    Failed(String),
}

impl ProvisioningOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Installed | Self::AlreadyPresent)
    }
}

impl fmt::Display for ProvisioningOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed => write!(f, "installed"),
            Self::AlreadyPresent => write!(f, "already present"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::Failed(cause) => write!(f, "failed: {}", cause),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    TemplateNotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemplateNotFound => write!(f, "template not found"),
        }
    }
}

/// Audit record of the substitution step, kept separate from the outcome so
/// operators can tell which variant was actually registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PatchStatus {
    NotRequested,
    Applied,
    FellBack(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleReport {
    pub role_id: String,
    pub model_name: String,
    pub outcome: ProvisioningOutcome,
    pub patch: PatchStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadinessOutcome {
    Ready,
    TimedOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessCheckResult {
    pub attempts: u32,
    pub elapsed: Duration,
    pub outcome: ReadinessOutcome,
}

impl ReadinessCheckResult {
    pub fn is_ready(&self) -> bool {
        self.outcome == ReadinessOutcome::Ready
    }
}

/// Bootstrap progresses linearly through these stages; there are no backward
/// transitions. A fatal error aborts carrying the stage it occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Init,
    DependenciesInstalled,
    InfrastructureUp,
    RuntimeReady,
    RolesRegistered,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "Init",
            Self::DependenciesInstalled => "DependenciesInstalled",
            Self::InfrastructureUp => "InfrastructureUp",
            Self::RuntimeReady => "RuntimeReady",
            Self::RolesRegistered => "RolesRegistered",
            Self::Done => "Done",
        };
        write!(f, "{}", name)
    }
}

/// Final report of a bootstrap run. Fail-at-end: per-role failures are
/// collected here instead of aborting, so a re-run only needs the roles
/// that did not reach a success outcome.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub readiness: ReadinessCheckResult,
    pub roles: Vec<RoleReport>,
    pub registered_models: Vec<String>,
}

impl BootstrapReport {
    pub fn succeeded(&self) -> bool {
        self.roles.iter().all(|r| r.outcome.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success_classification() {
        assert!(ProvisioningOutcome::Installed.is_success());
        assert!(ProvisioningOutcome::AlreadyPresent.is_success());
        assert!(!ProvisioningOutcome::Skipped(SkipReason::TemplateNotFound).is_success());
        assert!(!ProvisioningOutcome::Failed("boom".to_string()).is_success());
    }

    #[test]
    fn test_report_succeeded_requires_every_role() {
        let readiness = ReadinessCheckResult {
            attempts: 1,
            elapsed: Duration::from_millis(10),
            outcome: ReadinessOutcome::Ready,
        };
        let mut report = BootstrapReport {
            readiness,
            roles: vec![RoleReport {
                role_id: "admin".to_string(),
                model_name: "genome-admin".to_string(),
                outcome: ProvisioningOutcome::Installed,
                patch: PatchStatus::NotRequested,
            }],
            registered_models: vec![],
        };
        assert!(report.succeeded());

        report.roles.push(RoleReport {
            role_id: "auditor".to_string(),
            model_name: "genome-worker-auditor".to_string(),
            outcome: ProvisioningOutcome::Failed("derive rejected".to_string()),
            patch: PatchStatus::NotRequested,
        });
        assert!(!report.succeeded());
    }
}
