use crate::config::ProvisionConfig;
use crate::core::prober::ReadinessProber;
use crate::core::registry::RoleRegistrar;
use crate::domain::model::{BootstrapReport, Stage};
use crate::domain::ports::{ContainerRuntime, ModelRuntime, PackageManager};
use crate::utils::cancel::CancelToken;
use crate::utils::error::{ProvisionError, Result};
use crate::utils::validation;

/// Sequences the full provisioning run:
/// `Init → DependenciesInstalled → InfrastructureUp → RuntimeReady →
/// RolesRegistered → Done`, with no backward transitions. Package and
/// infrastructure failures are fatal; per-role failures are collected and
/// only downgrade the final result (fail-at-end).
pub struct BootstrapCoordinator<P, C, M>
where
    P: PackageManager,
    C: ContainerRuntime,
    M: ModelRuntime,
{
    config: ProvisionConfig,
    packages: P,
    containers: C,
    runtime: M,
}

impl<P, C, M> BootstrapCoordinator<P, C, M>
where
    P: PackageManager,
    C: ContainerRuntime,
    M: ModelRuntime,
{
    pub fn new(config: ProvisionConfig, packages: P, containers: C, runtime: M) -> Self {
        Self {
            config,
            packages,
            containers,
            runtime,
        }
    }

    pub async fn run(&self, cancel: &CancelToken) -> Result<BootstrapReport> {
        // Concurrent derive requests may not collide on a name, so the
        // uniqueness invariant is validated before any side effect.
        validation::validate_unique(
            "roles.model_name",
            self.config.roles.iter().map(|r| r.model_name.as_str()),
        )?;

        println!(
            "🚀 GENOME bootstrap: {} packages, {} containers, {} roles",
            self.config.packages.len(),
            self.config.containers.len(),
            self.config.roles.len()
        );

        // Init → DependenciesInstalled
        self.checkpoint(Stage::Init, cancel)?;
        self.packages
            .install(&self.config.packages)
            .await
            .map_err(|e| abort(Stage::DependenciesInstalled, e))?;
        println!("✅ host packages installed");

        // DependenciesInstalled → InfrastructureUp
        self.checkpoint(Stage::DependenciesInstalled, cancel)?;
        for spec in &self.config.containers {
            self.containers
                .start(spec)
                .await
                .map_err(|e| abort(Stage::InfrastructureUp, e))?;
            println!("✅ container {} up", spec.name);
        }

        // InfrastructureUp → RuntimeReady
        self.checkpoint(Stage::InfrastructureUp, cancel)?;
        let prober: ReadinessProber = self.config.probe.prober();
        let readiness = prober.wait_until_ready(&self.runtime, cancel).await;
        if !readiness.is_ready() {
            return Err(ProvisionError::DependencyUnavailable {
                stage: Stage::RuntimeReady,
                cause: format!(
                    "runtime not ready after {} attempts over {:.1}s",
                    readiness.attempts,
                    readiness.elapsed.as_secs_f64()
                ),
            });
        }
        println!(
            "✅ runtime ready ({} attempts, {:.1}s)",
            readiness.attempts,
            readiness.elapsed.as_secs_f64()
        );

        // RuntimeReady → RolesRegistered
        self.checkpoint(Stage::RuntimeReady, cancel)?;
        let registrar = RoleRegistrar::new(&self.runtime, self.config.patch.as_ref());
        let roles = registrar.register_roles(&self.config.roles).await;

        // RolesRegistered → Done. The listing is informational only and
        // never decides pass/fail.
        let registered_models = match registrar.consolidated_listing().await {
            Ok(models) => models,
            Err(e) => {
                tracing::warn!("consolidated listing failed: {}", e);
                Vec::new()
            }
        };

        let report = BootstrapReport {
            readiness,
            roles,
            registered_models,
        };
        summarize(&report);
        Ok(report)
    }

    fn checkpoint(&self, stage: Stage, cancel: &CancelToken) -> Result<()> {
        if cancel.is_cancelled() {
            Err(ProvisionError::Cancelled { stage })
        } else {
            Ok(())
        }
    }
}

fn abort(stage: Stage, cause: ProvisionError) -> ProvisionError {
    ProvisionError::DependencyUnavailable {
        stage,
        cause: cause.to_string(),
    }
}

fn summarize(report: &BootstrapReport) {
    let ok = report.roles.iter().filter(|r| r.outcome.is_success()).count();
    println!("📦 {}/{} roles registered", ok, report.roles.len());
    if !report.registered_models.is_empty() {
        println!("📋 runtime now serves: {}", report.registered_models.join(", "));
    }
    if !report.succeeded() {
        for role in report.roles.iter().filter(|r| !r.outcome.is_success()) {
            println!("⚠️  re-run needed for {}: {}", role.role_id, role.outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProbeConfig, ProvisionConfig, RuntimeConfig};
    use crate::domain::model::{
        ContainerSpec, ProvisioningOutcome, RoleDefinition, ServiceUnit, SkipReason,
    };
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakePackages {
        fail: bool,
        installed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PackageManager for FakePackages {
        async fn install(&self, packages: &[String]) -> crate::utils::error::Result<()> {
            if self.fail {
                return Err(ProvisionError::CommandFailed {
                    command: "apt-get install".to_string(),
                    status: "exit status: 100".to_string(),
                    stderr: "unable to locate package".to_string(),
                });
            }
            self.installed.lock().unwrap().extend(packages.iter().cloned());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeContainers {
        started: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ContainerRuntime for FakeContainers {
        async fn start(&self, spec: &ContainerSpec) -> crate::utils::error::Result<()> {
            self.started.lock().unwrap().push(spec.name.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeModelRuntime {
        never_ready: bool,
        ready_after_probes: u32,
        probes: AtomicU32,
        created: Mutex<Vec<String>>,
        pulled: AtomicBool,
    }

    #[async_trait]
    impl ModelRuntime for FakeModelRuntime {
        async fn probe(&self) -> crate::utils::error::Result<()> {
            let n = self.probes.fetch_add(1, Ordering::SeqCst);
            if self.never_ready || n < self.ready_after_probes {
                Err(ProvisionError::RuntimeError {
                    message: "connection refused".to_string(),
                })
            } else {
                Ok(())
            }
        }

        async fn pull(&self, _reference: &str) -> crate::utils::error::Result<()> {
            self.pulled.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn create(&self, name: &str, _modelfile: &str) -> crate::utils::error::Result<()> {
            self.created.lock().unwrap().push(name.to_string());
            Ok(())
        }

        async fn list(&self) -> crate::utils::error::Result<Vec<String>> {
            Ok(self.created.lock().unwrap().clone())
        }
    }

    fn role(temp: &Path, role_id: &str, model_name: &str, with_template: bool) -> RoleDefinition {
        let template = temp.join(format!("Modelfile.{}", role_id));
        if with_template {
            std::fs::write(&template, "FROM qwen2.5-coder:7b\n").unwrap();
        }
        RoleDefinition {
            role_id: role_id.to_string(),
            base_model: "qwen2.5-coder:7b".to_string(),
            model_name: model_name.to_string(),
            template,
        }
    }

    fn config(roles: Vec<RoleDefinition>) -> ProvisionConfig {
        ProvisionConfig {
            runtime: RuntimeConfig {
                base_url: "http://localhost:11434".to_string(),
            },
            packages: vec!["curl".to_string()],
            containers: vec![
                ContainerSpec {
                    name: "genome-redis".to_string(),
                    image: "redis:7-alpine".to_string(),
                    args: vec!["-p".to_string(), "6379:6379".to_string()],
                },
                ContainerSpec {
                    name: "genome-ollama".to_string(),
                    image: "ollama/ollama:latest".to_string(),
                    args: vec!["-p".to_string(), "11434:11434".to_string()],
                },
            ],
            probe: ProbeConfig {
                poll_interval_ms: 10,
                attempt_timeout_ms: 50,
                max_wait_ms: 300,
            },
            roles,
            services: Vec::<ServiceUnit>::new(),
            patch: None,
        }
    }

    #[tokio::test]
    async fn test_full_bootstrap_happy_path() {
        let temp = TempDir::new().unwrap();
        let roles = vec![
            role(temp.path(), "admin", "genome-admin", true),
            role(temp.path(), "sysadmin", "genome-worker-sysadmin", true),
        ];

        let coordinator = BootstrapCoordinator::new(
            config(roles),
            FakePackages::default(),
            FakeContainers::default(),
            FakeModelRuntime {
                ready_after_probes: 2,
                ..FakeModelRuntime::default()
            },
        );

        let report = coordinator.run(&CancelToken::new()).await.unwrap();

        assert!(report.succeeded());
        assert_eq!(report.roles.len(), 2);
        assert!(report.roles.iter().all(|r| r.outcome == ProvisioningOutcome::Installed));
        assert_eq!(report.readiness.attempts, 3);
        assert_eq!(
            report.registered_models,
            vec!["genome-admin", "genome-worker-sysadmin"]
        );
        assert_eq!(
            *coordinator.containers.started.lock().unwrap(),
            vec!["genome-redis", "genome-ollama"]
        );
    }

    #[tokio::test]
    async fn test_runtime_never_ready_aborts_before_registration() {
        let temp = TempDir::new().unwrap();
        let roles = vec![role(temp.path(), "admin", "genome-admin", true)];

        let coordinator = BootstrapCoordinator::new(
            config(roles),
            FakePackages::default(),
            FakeContainers::default(),
            FakeModelRuntime {
                never_ready: true,
                ..FakeModelRuntime::default()
            },
        );

        let err = coordinator.run(&CancelToken::new()).await.unwrap_err();

        match err {
            ProvisionError::DependencyUnavailable { stage, cause } => {
                assert_eq!(stage, Stage::RuntimeReady);
                assert!(cause.contains("attempts"));
            }
            other => panic!("expected DependencyUnavailable, got {:?}", other),
        }
        // no role registration was attempted
        assert!(coordinator.runtime.created.lock().unwrap().is_empty());
        assert!(!coordinator.runtime.pulled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_package_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let roles = vec![role(temp.path(), "admin", "genome-admin", true)];

        let coordinator = BootstrapCoordinator::new(
            config(roles),
            FakePackages {
                fail: true,
                ..FakePackages::default()
            },
            FakeContainers::default(),
            FakeModelRuntime::default(),
        );

        let err = coordinator.run(&CancelToken::new()).await.unwrap_err();
        match err {
            ProvisionError::DependencyUnavailable { stage, .. } => {
                assert_eq!(stage, Stage::DependenciesInstalled);
            }
            other => panic!("expected DependencyUnavailable, got {:?}", other),
        }
        // nothing downstream ran
        assert!(coordinator.containers.started.lock().unwrap().is_empty());
        assert_eq!(coordinator.runtime.probes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_model_names_rejected_before_side_effects() {
        let temp = TempDir::new().unwrap();
        let roles = vec![
            role(temp.path(), "admin", "genome-admin", true),
            role(temp.path(), "admin2", "genome-admin", true),
        ];

        let coordinator = BootstrapCoordinator::new(
            config(roles),
            FakePackages::default(),
            FakeContainers::default(),
            FakeModelRuntime::default(),
        );

        let err = coordinator.run(&CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidConfigValueError { .. }));
        assert!(coordinator.packages.installed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_role_failure_downgrades_but_completes() {
        let temp = TempDir::new().unwrap();
        let roles = vec![
            role(temp.path(), "admin", "genome-admin", true),
            role(temp.path(), "auditor", "genome-worker-auditor", false),
            role(temp.path(), "sysadmin", "genome-worker-sysadmin", true),
        ];

        let coordinator = BootstrapCoordinator::new(
            config(roles),
            FakePackages::default(),
            FakeContainers::default(),
            FakeModelRuntime::default(),
        );

        let report = coordinator.run(&CancelToken::new()).await.unwrap();

        assert!(!report.succeeded());
        assert_eq!(report.roles[0].outcome, ProvisioningOutcome::Installed);
        assert_eq!(
            report.roles[1].outcome,
            ProvisioningOutcome::Skipped(SkipReason::TemplateNotFound)
        );
        assert_eq!(report.roles[2].outcome, ProvisioningOutcome::Installed);
    }

    #[tokio::test]
    async fn test_cancellation_respected_at_stage_boundary() {
        let temp = TempDir::new().unwrap();
        let roles = vec![role(temp.path(), "admin", "genome-admin", true)];
        let cancel = CancelToken::new();
        cancel.cancel();

        let coordinator = BootstrapCoordinator::new(
            config(roles),
            FakePackages::default(),
            FakeContainers::default(),
            FakeModelRuntime::default(),
        );

        let err = coordinator.run(&cancel).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Cancelled { stage: Stage::Init }));
        assert!(coordinator.packages.installed.lock().unwrap().is_empty());
    }
}
