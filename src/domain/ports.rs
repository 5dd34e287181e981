use crate::domain::model::{ContainerSpec, ServiceUnit};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Host package installation (apt-get in production).
#[async_trait]
pub trait PackageManager: Send + Sync {
    async fn install(&self, packages: &[String]) -> Result<()>;
}

/// Container lifecycle for the infrastructure trio (cache/queue store,
/// vector store, model runtime). Starting an already-running container
/// must succeed.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn start(&self, spec: &ContainerSpec) -> Result<()>;
}

/// Init-system capability set consumed by the service installer.
#[async_trait]
pub trait InitSystem: Send + Sync {
    /// Fatal precondition check, performed before any unit is touched.
    fn ensure_privileged(&self, units: &[ServiceUnit]) -> Result<()>;

    /// Copy a unit definition into place, overwriting any existing file.
    async fn install_unit(&self, unit: &ServiceUnit) -> Result<()>;

    /// Reload init-system configuration. Called once per batch.
    async fn daemon_reload(&self) -> Result<()>;

    /// Enable (persist across restarts) and start the named units.
    async fn enable_and_start(&self, names: &[String]) -> Result<()>;

    /// Consolidated status across the named units; pass-through read.
    async fn status(&self, names: &[String]) -> Result<String>;
}

/// Management interface of the model-serving runtime (Ollama in production).
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Single reachability attempt. Any answer counts as ready; transport
    /// errors do not.
    async fn probe(&self) -> Result<()>;

    /// Pull a base artifact by reference. Idempotent, safe to repeat;
    /// transfer retries are owned by the runtime, not the caller.
    async fn pull(&self, reference: &str) -> Result<()>;

    /// Derive a named model from Modelfile content. Idempotent by name.
    async fn create(&self, name: &str, modelfile: &str) -> Result<()>;

    /// List registered model names.
    async fn list(&self) -> Result<Vec<String>>;
}
