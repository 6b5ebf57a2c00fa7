use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tfpilot - layered Terraform stack deployment orchestrator
#[derive(Parser, Debug)]
#[command(name = "tfpilot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    pub root: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy the 00-bootstrap stack (local backend, creates remote state)
    Bootstrap {
        /// Environment code, e.g. dev
        env: String,
    },

    /// Deploy the 10-platform stack
    Platform {
        env: String,
    },

    /// Deploy the 05-observability stack
    Observability {
        env: String,
    },

    /// Deploy the 15-foundry stack (Azure AI Foundry / OpenAI)
    Foundry {
        env: String,

        /// Skip the stack even if it exists
        #[arg(long)]
        no_azure_openai: bool,
    },

    /// Deploy the 20-workload stack (images, config sync, apply)
    Workload {
        env: String,

        /// Use image tags recorded in the tfvars instead of building
        #[arg(long)]
        no_image_build: bool,

        /// Build images with the local docker daemon
        #[arg(long)]
        local_docker: bool,

        /// Deploy without provisioned Azure OpenAI
        #[arg(long)]
        no_azure_openai: bool,
    },

    /// Deploy every stack in order: bootstrap, platform, foundry, workload
    All {
        env: String,

        #[arg(long)]
        no_image_build: bool,

        #[arg(long)]
        local_docker: bool,

        #[arg(long)]
        no_azure_openai: bool,
    },

    /// Reconcile OpenAI secrets into the environment's Key Vault
    SeedSecrets {
        env: String,

        /// Vault name (otherwise read from the workload tfvars)
        #[arg(long)]
        key_vault: Option<String>,

        /// Expected secret name (repeatable)
        #[arg(long = "expected-name")]
        expected_names: Vec<String>,

        /// Fail instead of writing placeholder values
        #[arg(long)]
        no_placeholders: bool,
    },
}
