//! tfpilot - layered Terraform stack deployment orchestrator
//!
//! tfpilot applies a fixed pipeline of Terraform stacks against Azure in
//! dependency order, threading each stage's outputs into the next stage's
//! environment bindings, retrying known-transient cloud failures, and
//! keeping the environment's Key Vault reconciled with desired secrets
//! under a provenance policy.

pub mod azure;
pub mod classify;
pub mod config;
pub mod deploy;
pub mod envctx;
pub mod error;
pub mod exec;
pub mod images;
pub mod outputs;
pub mod retry;
pub mod secrets;
pub mod stacks;
pub mod state;
pub mod terraform;
pub mod tfvars;
pub mod vault;

// Re-exports for convenience
pub use classify::{classify_text, RetryKind};
pub use config::Config;
pub use deploy::{Orchestrator, PipelineOptions, SeedOptions, WorkloadOptions};
pub use envctx::{AzureContext, TfEnv};
pub use error::{PilotError, PilotResult};
pub use outputs::StackOutputs;
pub use retry::{Backoff, RetryPolicy};
pub use secrets::{seed_secrets, ProvisionedSecrets, SeedSummary};
pub use state::{state_key, state_prefix_from_blob};
pub use tfvars::{Document, TfValue, TfvarsStore};
