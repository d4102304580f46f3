//! Integration tests for CLI commands.

use serde_json::{json, Value};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_portico"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    let success = output.status.success();

    (success, stdout, stderr)
}

fn write_json(dir: &Path, name: &str, value: &Value) -> String {
    let path = dir.join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path.to_str().unwrap().to_string()
}

fn generate_did(secrets: &str) -> String {
    let (success, stdout, stderr) = run_cli(&["--secrets-dir", secrets, "did", "generate", "--json"]);
    assert!(success, "{stderr}");
    let out: Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    out["did"].as_str().unwrap().to_string()
}

#[test]
fn test_did_generate_issue_and_verify() {
    let temp = TempDir::new().unwrap();
    let secrets = temp.path().join("secrets");
    let secrets = secrets.to_str().unwrap();

    let did = generate_did(secrets);
    assert!(did.starts_with("did:key:z6Mk"));

    let profiles = write_json(
        temp.path(),
        "profiles.json",
        &json!({ did.clone(): { "profile": { "name": "Alice", "socials": [] } } }),
    );
    let (success, stdout, stderr) = run_cli(&[
        "--secrets-dir",
        secrets,
        "assertion",
        "issue",
        "--did",
        &did,
        "--kind",
        "profile",
        "--profiles",
        &profiles,
        "--audience",
        "demo.miniapp",
    ]);
    assert!(success, "{stderr}");
    let token = stdout.trim().to_string();
    assert_eq!(token.split('.').count(), 3);

    let (success, stdout, stderr) =
        run_cli(&["assertion", "verify", &token, "--issuer", &did, "--json"]);
    assert!(success, "{stderr}");
    let claims: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(claims["data"]["name"], "Alice");
    assert_eq!(claims["aud"], "demo.miniapp");
    assert_eq!(claims["type"], "profile");
    assert_eq!(
        claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(),
        120
    );
}

#[test]
fn test_verify_rejects_other_issuer() {
    let temp = TempDir::new().unwrap();
    let secrets = temp.path().to_str().unwrap();
    let did = generate_did(secrets);
    let other = generate_did(secrets);

    let (success, stdout, _) = run_cli(&[
        "--secrets-dir",
        secrets,
        "assertion",
        "issue",
        "--did",
        &did,
        "--kind",
        "disconnect",
    ]);
    assert!(success);

    let (success, _, stderr) = run_cli(&["assertion", "verify", stdout.trim(), "--issuer", &other]);
    assert!(!success);
    assert!(stderr.contains("Assertion rejected"));
}

#[test]
fn test_issue_without_stored_key_fails() {
    let temp = TempDir::new().unwrap();
    let secrets = temp.path().join("empty");
    let generated = TempDir::new().unwrap();
    let did = generate_did(generated.path().to_str().unwrap());

    let (success, _, stderr) = run_cli(&[
        "--secrets-dir",
        secrets.to_str().unwrap(),
        "assertion",
        "issue",
        "--did",
        &did,
        "--kind",
        "avatar",
    ]);
    assert!(!success);
    assert!(stderr.contains("no private key"));
}

#[test]
fn test_error_assertion_requires_code() {
    let temp = TempDir::new().unwrap();
    let secrets = temp.path().to_str().unwrap();
    let did = generate_did(secrets);

    let (success, _, stderr) = run_cli(&[
        "--secrets-dir",
        secrets,
        "assertion",
        "issue",
        "--did",
        &did,
        "--kind",
        "error",
    ]);
    assert!(!success);
    assert!(stderr.contains("--code"));
}

#[test]
fn test_canonicalize_sorts_keys() {
    let temp = TempDir::new().unwrap();
    let input = write_json(temp.path(), "in.json", &json!({"b": 1, "a": 2}));

    let (success, stdout, _) = run_cli(&["canonicalize", &input]);
    assert!(success);
    assert_eq!(stdout.trim(), r#"{"a":2,"b":1}"#);
}

#[test]
fn test_canonicalize_refuses_nested_objects() {
    let temp = TempDir::new().unwrap();
    let input = write_json(temp.path(), "in.json", &json!({"a": {"b": 1}}));

    let (success, _, stderr) = run_cli(&["canonicalize", &input]);
    assert!(!success);
    assert!(stderr.contains("Canonicalization failed"));
}

#[test]
fn test_canonicalize_signed_subset() {
    let temp = TempDir::new().unwrap();
    let input = write_json(
        temp.path(),
        "env.json",
        &json!({
            "type": "portico:api:getProfileDetails:error",
            "requestId": "0b6f1c2e-6a7d-4e4b-9d59-2f1f3f0f6a11",
            "timestamp": 1700000000000u64,
            "error": "No profile",
            "signature": "AAAA"
        }),
    );

    let (success, stdout, _) = run_cli(&["canonicalize", "--signed-subset", &input]);
    assert!(success);
    assert!(!stdout.contains("No profile"));
    assert!(!stdout.contains("signature"));
    assert!(stdout.contains("requestId"));
}

#[test]
fn test_envelope_sign_then_verify() {
    let temp = TempDir::new().unwrap();
    let input = write_json(
        temp.path(),
        "env.json",
        &json!({
            "type": "portico:api:requestPermission:response",
            "requestId": "0b6f1c2e-6a7d-4e4b-9d59-2f1f3f0f6a11",
            "timestamp": 1700000000000u64,
            "result": true
        }),
    );

    let (success, stdout, stderr) = run_cli(&["envelope", "sign", &input]);
    assert!(success, "{stderr}");
    let signed: Value = serde_json::from_str(&stdout).unwrap();
    let public_key = signed["publicKey"].as_str().unwrap().to_string();

    let envelope = write_json(temp.path(), "signed.json", &signed["envelope"]);
    let (success, stdout, _) =
        run_cli(&["envelope", "verify", "--public-key", &public_key, &envelope]);
    assert!(success);
    assert_eq!(stdout.trim(), "valid");

    let mut tampered = signed["envelope"].clone();
    tampered["result"] = json!(false);
    let tampered = write_json(temp.path(), "tampered.json", &tampered);
    let (success, stdout, _) = run_cli(&[
        "envelope",
        "verify",
        "--public-key",
        &public_key,
        &tampered,
        "--json",
    ]);
    assert!(!success);
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["valid"], false);
}

#[test]
fn test_simulate_runs_end_to_end() {
    let (success, stdout, stderr) = run_cli(&[
        "simulate",
        "--name",
        "Alice",
        "--permission",
        "camera",
        "--permission",
        "contacts",
        "--json",
    ]);
    assert!(success, "{stderr}");
    let report: Value = serde_json::from_str(&stdout).unwrap();
    let steps = report["steps"].as_array().unwrap();

    let result_of = |name: &str| {
        steps
            .iter()
            .find(|s| s["step"] == name)
            .map(|s| s["result"].clone())
            .unwrap_or(Value::Null)
    };
    assert_eq!(result_of("getProfileDetails")["name"], "Alice");
    assert_eq!(result_of("getAvatar"), json!({"noContent": true}));
    assert_eq!(result_of("requestPermission(camera)"), json!(true));
    assert_eq!(result_of("requestPermission(contacts)"), json!(false));
    assert_eq!(result_of("close")["reason"], "closed");
    assert_eq!(report["sessionActive"], false);
}

#[test]
fn test_simulate_prints_non_ascii_names() {
    let name = format!("x{}", "é".repeat(60));
    let (success, stdout, stderr) = run_cli(&["simulate", "--name", &name]);
    assert!(success, "{stderr}");
    assert!(!stderr.contains("panicked"));
    assert!(stdout.contains("getProfileDetails"));
    assert!(stdout.contains("xéé"));
}

#[test]
fn test_simulate_honours_config_file() {
    let temp = TempDir::new().unwrap();
    let config = write_json(
        temp.path(),
        "config.json",
        &json!({
            "domain": "kiosk",
            "environment": {
                "name": "Kiosk",
                "version": "9.9.9",
                "platform": "test",
                "supportedPermissions": ["location"]
            }
        }),
    );

    let (success, stdout, stderr) = run_cli(&[
        "--config",
        &config,
        "simulate",
        "--permission",
        "camera",
        "--json",
    ]);
    assert!(success, "{stderr}");
    let report: Value = serde_json::from_str(&stdout).unwrap();
    let steps = report["steps"].as_array().unwrap();
    assert_eq!(steps[0]["result"]["name"], "Kiosk");
    assert!(steps
        .iter()
        .any(|s| s["step"] == "requestPermission(camera)" && s["result"] == false));
}

#[test]
fn test_bad_config_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let (success, _, stderr) = run_cli(&["--config", path.to_str().unwrap(), "simulate"]);
    assert!(!success);
    assert!(stderr.contains("configuration error"));
}
