pub mod bootstrap;
pub mod installer;
pub mod prober;
pub mod registry;

pub use bootstrap::BootstrapCoordinator;
pub use installer::ServiceInstaller;
pub use prober::ReadinessProber;
pub use registry::RoleRegistrar;

pub use crate::domain::model::{
    BootstrapReport, ProvisioningOutcome, ReadinessCheckResult, RoleDefinition, RoleReport,
    ServiceUnit, Stage,
};
pub use crate::domain::ports::{ContainerRuntime, InitSystem, ModelRuntime, PackageManager};
pub use crate::utils::error::Result;
