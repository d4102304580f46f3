//! DID commands.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use portico_identity::{generate_did, IdentityService};
use portico_store::{FileSecretStore, MemoryProfileStore};
use serde_json::json;

use crate::output::{format_field, format_json};

/// Generates a DID and stores its private key under `secrets_dir`.
pub fn generate(secrets_dir: &Path, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let secrets = FileSecretStore::open(secrets_dir)
        .map_err(|e| format!("Failed to open secret store {}: {}", secrets_dir.display(), e))?;
    let service = IdentityService::new(Arc::new(secrets), Arc::new(MemoryProfileStore::new()));

    let identity = generate_did();
    service.store_identity(&identity)?;

    let public_key = STANDARD.encode(identity.public_key);
    if json_output {
        println!(
            "{}",
            format_json(&json!({
                "did": identity.did.as_str(),
                "publicKey": public_key,
            }))
        );
    } else {
        println!("{}", format_field("did", identity.did.as_str()));
        println!("{}", format_field("public key", &public_key));
        println!("{}", format_field("stored in", &secrets_dir.display().to_string()));
    }
    Ok(())
}
