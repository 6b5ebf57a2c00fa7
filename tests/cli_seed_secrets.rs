#![cfg(unix)]
//! Integration tests for `tfpilot seed-secrets`.

use serde_json::json;

mod common;
use common::TestEnv;

fn seed_bootstrap(env: &TestEnv) {
    env.stub_az();
    env.stub_terraform();
    env.write_example_tfvars("00-bootstrap", "dev", "location = \"westeurope\"\n");
    env.write_stub_outputs(
        "00-bootstrap",
        json!({
            "state_rg_name": {"value": "rg-state-stub"},
            "storage_account_name": {"value": "ststub"},
            "state_container_name": {"value": "tfstate"},
            "state_blob_key": {"value": "envs/dev/terraform.tfstate"},
        }),
    );
    let bootstrap = env.command().args(["bootstrap", "dev"]).output().unwrap();
    assert!(bootstrap.status.success());
}

#[test]
fn missing_vault_name_is_a_configuration_error() {
    let env = TestEnv::new();
    env.stub_az();
    env.stub_terraform();
    env.stack_dir("20-workload");

    let output = env.command().args(["seed-secrets", "dev"]).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("key vault name not found"), "{stderr}");
}

#[test]
fn vault_name_falls_back_to_the_workload_tfvars() {
    let env = TestEnv::new();
    seed_bootstrap(&env);
    std::fs::write(
        env.stack_dir("20-workload").join("dev.tfvars"),
        "key_vault_name = \"kv-from-tfvars\"\n",
    )
    .unwrap();

    let output = env.command().args(["seed-secrets", "dev"]).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let az_log = env.read_log("az.log");
    assert!(az_log.contains("--vault-name kv-from-tfvars"), "{az_log}");
}

#[test]
fn placeholders_carry_pending_provenance_tags() {
    let env = TestEnv::new();
    seed_bootstrap(&env);

    let output = env
        .command()
        .args([
            "seed-secrets",
            "dev",
            "--key-vault",
            "kv-test",
            "--expected-name",
            "azure-openai-key-0",
            "--expected-name",
            "azure-openai-key-1",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("placeholders: azure-openai-key-0, azure-openai-key-1"),
        "{stdout}"
    );

    let az_log = env.read_log("az.log");
    assert!(az_log.contains("secret set --vault-name kv-test --name azure-openai-key-0 --value pending-foundry"), "{az_log}");
    assert!(az_log.contains("--tags provenance=workload source=pending"), "{az_log}");
}

#[test]
fn seeding_without_bootstrap_state_fails_with_direction() {
    let env = TestEnv::new();
    env.stub_az();
    env.stub_terraform();
    env.stack_dir("00-bootstrap");

    let output = env
        .command()
        .args(["seed-secrets", "dev", "--key-vault", "kv-test"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bootstrap state not found"), "{stderr}");
}
