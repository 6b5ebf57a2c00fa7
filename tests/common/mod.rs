#![allow(dead_code)]
//! Common test utilities for tfpilot integration tests.
//!
//! Provides an isolated repository layout in a tempdir plus stub `az`,
//! `terraform` and boundary executables on a private PATH, so the real
//! binary can be driven end-to-end without touching any cloud.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

pub fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_tfpilot")
}

pub struct TestEnv {
    _dir: TempDir,
    pub root: PathBuf,
    pub stub_bin: PathBuf,
    pub log_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("repo");
        let stub_bin = dir.path().join("bin");
        let log_dir = dir.path().join("logs");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&stub_bin).unwrap();
        fs::create_dir_all(&log_dir).unwrap();
        Self {
            _dir: dir,
            root,
            stub_bin,
            log_dir,
        }
    }

    /// Stage directory under the conventional stacks root, created on use.
    pub fn stack_dir(&self, stage: &str) -> PathBuf {
        let dir = self.root.join("infra/terraform/stacks").join(stage);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn write_example_tfvars(&self, stage: &str, env: &str, body: &str) {
        let dir = self.stack_dir(stage);
        fs::write(dir.join(format!("terraform.tfvars.{env}.example")), body).unwrap();
    }

    /// Outputs the stub `terraform output -json` serves for a stage.
    pub fn write_stub_outputs(&self, stage: &str, outputs: serde_json::Value) {
        let dir = self.stack_dir(stage);
        fs::write(dir.join("stub-outputs.json"), outputs.to_string()).unwrap();
    }

    pub fn write_stub(&self, name: &str, script: &str) {
        let path = self.stub_bin.join(name);
        fs::write(&path, script).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    /// Stub `az` answering account queries; keyvault reads answer
    /// not-found, writes succeed. Every invocation is logged.
    pub fn stub_az(&self) {
        let log = self.log_file("az.log");
        self.write_stub(
            "az",
            &format!(
                r#"#!/bin/sh
echo "az $*" >> "{log}"
case "$*" in
  *"account show"*"--query tenantId"*) echo ten-stub ;;
  *"account show"*"--query id"*) echo sub-stub ;;
  *"keyvault secret show"*) echo "ERROR: SecretNotFound" >&2; exit 1 ;;
  *"keyvault secret set"*) echo "{{}}" ;;
  *) echo "{{}}" ;;
esac
"#,
                log = log.display()
            ),
        );
    }

    /// Stub `terraform` that succeeds on init/apply and serves each
    /// stage's `stub-outputs.json` for `output -json`.
    pub fn stub_terraform(&self) {
        let log = self.log_file("terraform.log");
        self.write_stub(
            "terraform",
            &format!(
                r#"#!/bin/sh
dir=""
case "$1" in
  -chdir=*) dir="${{1#-chdir=}}"; shift ;;
esac
echo "terraform [$dir] $* use_provisioned=$TF_VAR_use_provisioned_azure_openai gateway_image=$TF_VAR_gateway_image" >> "{log}"
for arg in "$@"; do
  case "$arg" in
    -backend-config=path=*)
      state="${{arg#-backend-config=path=}}"
      mkdir -p "$(dirname "$state")"
      touch "$state"
      ;;
  esac
done
case "$1" in
  output)
    if [ -f "$dir/stub-outputs.json" ]; then
      cat "$dir/stub-outputs.json"
    else
      echo "{{}}"
    fi
    ;;
esac
exit 0
"#,
                log = log.display()
            ),
        );
    }

    /// Boundary stubs used by the workload stage.
    pub fn stub_workload_boundaries(&self) {
        let sync_log = self.log_file("sync-env.log");
        self.write_stub(
            "sync-env",
            &format!(
                "#!/bin/sh\necho \"sync-env $*\" >> \"{}\"\n",
                sync_log.display()
            ),
        );
        self.write_stub(
            "build-and-push-gateway",
            "#!/bin/sh\necho pushing layers...\necho acr.io/gateway:stub1\n",
        );
        self.write_stub(
            "build-and-push-hydrenv",
            "#!/bin/sh\necho pushing layers...\necho acr.io/hydrenv:stub2\n",
        );
    }

    pub fn log_file(&self, name: &str) -> PathBuf {
        self.log_dir.join(name)
    }

    pub fn read_log(&self, name: &str) -> String {
        fs::read_to_string(self.log_file(name)).unwrap_or_default()
    }

    /// The real tfpilot binary with PATH pointing at the stub bin dir.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        let path = format!(
            "{}:{}",
            self.stub_bin.display(),
            std::env::var("PATH").unwrap_or_default()
        );
        cmd.env("PATH", path).current_dir(&self.root);
        cmd
    }

    pub fn read_tfvars(&self, stage: &str, env: &str) -> String {
        fs::read_to_string(self.stack_dir(stage).join(format!("{env}.tfvars"))).unwrap()
    }
}

/// Assert a path exists, with a readable failure.
pub fn assert_exists(path: &Path) {
    assert!(path.exists(), "expected {} to exist", path.display());
}
