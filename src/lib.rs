pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::apt::AptPackageManager;
pub use adapters::docker::DockerRuntime;
pub use adapters::ollama::OllamaClient;
pub use adapters::systemd::SystemdInit;
pub use config::{Cli, ProvisionCommand, ProvisionConfig};
pub use core::{BootstrapCoordinator, ReadinessProber, RoleRegistrar, ServiceInstaller};
pub use utils::cancel::CancelToken;
pub use utils::error::{ProvisionError, Result};
