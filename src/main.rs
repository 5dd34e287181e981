use anyhow::Context;
use clap::Parser;
use genome_provision::utils::{logger, validation::Validate};
use genome_provision::{
    AptPackageManager, BootstrapCoordinator, CancelToken, Cli, DockerRuntime, OllamaClient,
    ProvisionCommand, ProvisionConfig, RoleRegistrar, ServiceInstaller, SystemdInit,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting genome-provision");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let config = ProvisionConfig::load(&cli.config)
        .with_context(|| format!("cannot load {}", cli.config.display()))?;
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // Ctrl-C cancels at the next stage/probe boundary; in-flight host
    // commands run to completion first.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("⚠️  interrupt received, stopping at the next boundary");
                cancel.cancel();
            }
        });
    }

    let exit_code = match cli.command {
        ProvisionCommand::Bootstrap => run_bootstrap(config, &cancel).await,
        ProvisionCommand::InstallServices => run_install_services(config).await,
        ProvisionCommand::RegisterRoles => run_register_roles(config).await,
    };
    std::process::exit(exit_code);
}

async fn run_bootstrap(config: ProvisionConfig, cancel: &CancelToken) -> i32 {
    let runtime = match OllamaClient::new(&config.runtime.base_url) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ {}", e);
            return 1;
        }
    };
    let coordinator =
        BootstrapCoordinator::new(config, AptPackageManager::new(), DockerRuntime::new(), runtime);

    match coordinator.run(cancel).await {
        Ok(report) if report.succeeded() => {
            println!("✅ Bootstrap complete: {} roles registered", report.roles.len());
            0
        }
        Ok(_) => {
            eprintln!("⚠️  Bootstrap finished with failures; re-run for the roles listed above");
            2
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            1
        }
    }
}

async fn run_install_services(config: ProvisionConfig) -> i32 {
    let installer = ServiceInstaller::new(SystemdInit::new());
    match installer.install(&config.services).await {
        Ok(outcomes) => {
            let failed = outcomes.values().filter(|o| !o.is_success()).count();
            match installer.consolidated_status(&config.services).await {
                Ok(status) => println!("{}", status),
                Err(e) => tracing::warn!("status query failed: {}", e),
            }
            if failed == 0 {
                println!("✅ {} services installed and started", outcomes.len());
                0
            } else {
                eprintln!("⚠️  {}/{} services failed to install", failed, outcomes.len());
                2
            }
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            1
        }
    }
}

async fn run_register_roles(config: ProvisionConfig) -> i32 {
    let runtime = match OllamaClient::new(&config.runtime.base_url) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ {}", e);
            return 1;
        }
    };
    let registrar = RoleRegistrar::new(&runtime, config.patch.as_ref());
    let reports = registrar.register_roles(&config.roles).await;

    match registrar.consolidated_listing().await {
        Ok(models) => println!("📋 runtime now serves: {}", models.join(", ")),
        Err(e) => tracing::warn!("consolidated listing failed: {}", e),
    }

    let failed = reports.iter().filter(|r| !r.outcome.is_success()).count();
    if failed == 0 {
        println!("✅ {} roles registered", reports.len());
        0
    } else {
        eprintln!("⚠️  {}/{} roles need a re-run", failed, reports.len());
        2
    }
}
