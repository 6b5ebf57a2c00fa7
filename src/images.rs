//! Workload image resolution
//!
//! The workload stage applies with concrete image references. They come
//! from either the external build-and-push pipeline (the image reference is
//! the last non-empty line of the build command's stdout) or, with
//! `--no-image-build`, from tags previously recorded in the workload's own
//! tfvars.

use std::path::Path;

use crate::config::Config;
use crate::error::{PilotError, PilotResult};
use crate::exec::{last_non_empty_line, Cmd, Echo};
use crate::tfvars;

/// Image references consumed by the workload apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Images {
    pub gateway: String,
    pub hydrenv: String,
}

/// Build fresh images through the external build pipeline.
pub fn build_images(config: &Config, local_docker: bool) -> PilotResult<Images> {
    tracing::info!("building container images (capturing image references for terraform)");
    Ok(Images {
        gateway: run_build(&config.build_gateway_command, local_docker)?,
        hydrenv: run_build(&config.build_hydrenv_command, local_docker)?,
    })
}

fn run_build(command: &str, local_docker: bool) -> PilotResult<String> {
    let mut cmd = Cmd::new(command);
    if local_docker {
        cmd = cmd.arg("--local-docker");
    }
    let output = cmd.run_captured(Echo::Always)?;
    let image = last_non_empty_line(&output.stdout)
        .ok_or_else(|| PilotError::ImageParse {
            command: command.to_string(),
        })?
        .to_string();
    tracing::info!("built {image}");
    Ok(image)
}

/// Read previously-recorded image tags from the workload tfvars.
pub fn images_from_tfvars(tfvars_path: &Path) -> PilotResult<Images> {
    tracing::info!("using pre-built images from tfvars (no image build requested)");
    let document = tfvars::parse_file(tfvars_path)?;

    let read = |key: &str| -> String {
        document
            .get(key)
            .and_then(|value| value.as_str())
            .unwrap_or("")
            .to_string()
    };
    let images = Images {
        gateway: read("gateway_image"),
        hydrenv: read("hydrenv_image"),
    };

    let mut missing = Vec::new();
    if images.gateway.is_empty() {
        missing.push("gateway_image");
    }
    if images.hydrenv.is_empty() {
        missing.push("hydrenv_image");
    }
    if !missing.is_empty() {
        return Err(PilotError::MissingImages {
            keys: missing.join(", "),
        });
    }
    Ok(images)
}
