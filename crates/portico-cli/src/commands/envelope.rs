//! Envelope commands.

use std::sync::Arc;

use portico_keys::{ContentVerifier, EphemeralKeyStore, HostSigner};
use serde_json::{json, Value};

use crate::input::read_json;
use crate::output::format_json;

/// Signs an envelope with a throwaway session key.
///
/// The key only lives for this process, so the output carries the public
/// key needed to verify it.
pub fn sign(input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let value = read_json(input.as_deref())?;
    let Value::Object(mut envelope) = value else {
        return Err("Envelope must be a JSON object".into());
    };

    let store = Arc::new(EphemeralKeyStore::new());
    let signer = HostSigner::new(store.clone());
    let key = store.create_session();
    signer
        .seal(&mut envelope, &key)
        .map_err(|e| format!("Signing failed: {}", e))?;
    store.destroy_session(&key);

    println!(
        "{}",
        format_json(&json!({
            "publicKey": key.as_str(),
            "envelope": Value::Object(envelope),
        }))
    );
    Ok(())
}

/// Verifies an envelope against a session public key.
pub fn verify(
    public_key: String,
    input: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let envelope = read_json(input.as_deref())?;
    let verifier = ContentVerifier::new(&public_key);
    let outcome = verifier.check(&envelope);

    if json_output {
        println!(
            "{}",
            format_json(&json!({
                "valid": outcome.is_ok(),
                "reason": outcome.as_ref().err().map(|e| e.to_string()),
            }))
        );
    } else {
        match &outcome {
            Ok(()) => println!("valid"),
            Err(e) => println!("invalid: {}", e),
        }
    }

    outcome.map_err(|e| format!("Verification failed: {}", e).into())
}
