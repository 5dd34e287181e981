pub mod toml_config;

pub use toml_config::{ProbeConfig, ProvisionConfig, RuntimeConfig};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "genome-provision")]
#[command(about = "Provision the GENOME local inference platform")]
pub struct Cli {
    /// Declarative provisioning config
    #[arg(long, default_value = "provision.toml")]
    pub config: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: ProvisionCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProvisionCommand {
    /// Full run: packages → containers → readiness wait → role registration
    Bootstrap,
    /// Install, enable and start the GENOME service units
    InstallServices,
    /// Register role models against an already-running runtime
    RegisterRoles,
}
