//! Error types for tfpilot
//!
//! Library errors use `thiserror`; the binary layer wraps them with `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::exec::CommandFailure;

/// Result type alias for tfpilot operations
pub type PilotResult<T> = Result<T, PilotError>;

/// Main error type for tfpilot operations
#[derive(Error, Debug)]
pub enum PilotError {
    /// No tfvars file and no example to seed it from
    #[error("no tfvars present for env '{env}' and no example tfvars found in {stack_dir}")]
    MissingTfvars { env: String, stack_dir: PathBuf },

    /// A tfvars document could not be parsed
    #[error("invalid tfvars in {file} at line {line}: {message}")]
    TfvarsParse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// A required terraform output was absent or null
    #[error("missing terraform output '{name}'")]
    MissingOutput { name: String },

    /// Bootstrap state has not been deployed yet
    #[error("bootstrap state not found at {path}; run `tfpilot bootstrap {env}` first")]
    BootstrapStateNotFound { path: PathBuf, env: String },

    /// No Key Vault name available for secret reconciliation
    #[error("key vault name not found; pass --key-vault or set key_vault_name in the workload tfvars")]
    MissingKeyVault,

    /// Image references required but absent from the workload tfvars
    #[error("missing required image values in tfvars (needed because --no-image-build is set): {keys}")]
    MissingImages { keys: String },

    /// A build command finished without printing an image reference
    #[error("failed to parse image reference from build output: {command}")]
    ImageParse { command: String },

    /// A required external tool is not installed
    #[error("missing dependency: {name}")]
    MissingTool { name: String },

    /// An external command exited with a failure status
    #[error(transparent)]
    Command(#[from] CommandFailure),

    /// Secret store payload could not be decoded
    #[error("unexpected secret store response for '{name}': {message}")]
    SecretDecode { name: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON decoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file error
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}
