//! tfpilot CLI - layered Terraform stack deployment orchestrator
//!
//! Usage: tfpilot <COMMAND> <ENV>
//!
//! Commands:
//!   bootstrap      Deploy the 00-bootstrap stack
//!   platform       Deploy the 10-platform stack
//!   observability  Deploy the 05-observability stack
//!   foundry        Deploy the 15-foundry stack
//!   workload       Deploy the 20-workload stack
//!   all            Deploy every stack in order
//!   seed-secrets   Reconcile OpenAI secrets into Key Vault

mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use tfpilot::{Orchestrator, PipelineOptions, SeedOptions, WorkloadOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root: PathBuf = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Bootstrap { env } => {
            Orchestrator::new(&root, &env)?.deploy_bootstrap()?;
        }
        Commands::Platform { env } => {
            Orchestrator::new(&root, &env)?.deploy_platform(None)?;
        }
        Commands::Observability { env } => {
            Orchestrator::new(&root, &env)?.deploy_observability(None)?;
        }
        Commands::Foundry {
            env,
            no_azure_openai,
        } => {
            Orchestrator::new(&root, &env)?.deploy_foundry(no_azure_openai, None, None)?;
        }
        Commands::Workload {
            env,
            no_image_build,
            local_docker,
            no_azure_openai,
        } => {
            let options = WorkloadOptions {
                no_image_build,
                local_docker,
                skip_openai: no_azure_openai,
            };
            Orchestrator::new(&root, &env)?.deploy_workload(&options, None, None, None)?;
        }
        Commands::All {
            env,
            no_image_build,
            local_docker,
            no_azure_openai,
        } => {
            let options = PipelineOptions {
                skip_foundry: no_azure_openai,
                workload: WorkloadOptions {
                    no_image_build,
                    local_docker,
                    skip_openai: no_azure_openai,
                },
            };
            Orchestrator::new(&root, &env)?.deploy_all(&options)?;
        }
        Commands::SeedSecrets {
            env,
            key_vault,
            expected_names,
            no_placeholders,
        } => {
            let options = SeedOptions {
                key_vault,
                expected_names,
                allow_placeholders: !no_placeholders,
            };
            let summary = Orchestrator::new(&root, &env)?.reconcile_secrets(&options)?;
            println!("seeded:       {}", summary.seeded.join(", "));
            println!("placeholders: {}", summary.placeholders.join(", "));
            println!("unchanged:    {}", summary.unchanged.join(", "));
            println!("skipped:      {}", summary.skipped.join(", "));
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .init();
}
