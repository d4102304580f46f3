//! In-process end-to-end run of the bridge.

use std::sync::Arc;

use portico_bridge::{BridgeConfig, FacadeSlot, GrantAll, HostBridge, HostSession, Loopback};
use portico_identity::{verify_assertion, IdentityService};
use portico_keys::EphemeralKeyStore;
use portico_store::{MemoryProfileStore, MemorySecretStore, Profile};
use serde_json::{json, Value};
use tracing::info;

use crate::output::{format_field, format_json, truncate};

const AUDIENCE: &str = "portico.simulate";

pub fn run(
    config: BridgeConfig,
    name: String,
    permissions: Vec<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(simulate(config, name, permissions))?;

    if json_output {
        println!("{}", format_json(&report));
    } else {
        println!("{}", format_field("did", report["did"].as_str().unwrap_or("?")));
        println!(
            "{}",
            format_field("session key", report["publicKey"].as_str().unwrap_or("?"))
        );
        if let Some(steps) = report["steps"].as_array() {
            for step in steps {
                println!(
                    "{}",
                    format_field(
                        step["step"].as_str().unwrap_or("?"),
                        &truncate(&step["result"].to_string(), 80)
                    )
                );
            }
        }
    }
    Ok(())
}

async fn simulate(
    config: BridgeConfig,
    name: String,
    permissions: Vec<String>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let profiles = Arc::new(MemoryProfileStore::new());
    let identity = IdentityService::new(Arc::new(MemorySecretStore::new()), profiles.clone());
    let did = identity.create_identity()?;
    profiles.put_profile(
        did.as_str(),
        Profile {
            name,
            bio: None,
            socials: vec![],
        },
    );

    let (session, bootstrap) = HostSession::open(Arc::new(EphemeralKeyStore::new()), config.clone());
    let host = HostBridge::new(&session, identity, did.clone())
        .with_audience(AUDIENCE)
        .with_policy(Arc::new(GrantAll));
    let slot = FacadeSlot::new();
    let link = Loopback::connect(host, &bootstrap, &config, &slot);
    let capabilities = link.capabilities.clone();
    info!(did = %did, "simulation session open");

    let mut steps = Vec::new();
    steps.push(json!({
        "step": "environment",
        "result": serde_json::to_value(capabilities.get_environment())?,
    }));

    let profile = capabilities.get_profile_details().await?;
    let claims = verify_assertion(&profile, Some(&did))?;
    steps.push(json!({ "step": "getProfileDetails", "result": claims.data }));

    let avatar = capabilities.get_avatar().await?;
    let claims = verify_assertion(&avatar, Some(&did))?;
    steps.push(json!({ "step": "getAvatar", "result": claims.data }));

    for permission in permissions {
        let granted = capabilities.request_permission(&permission).await?;
        steps.push(json!({
            "step": format!("requestPermission({permission})"),
            "result": granted,
        }));
    }

    let notice = capabilities.close().await?;
    let claims = verify_assertion(&notice, Some(&did))?;
    steps.push(json!({ "step": "close", "result": claims.data }));

    let report = json!({
        "did": did.as_str(),
        "publicKey": truncate(&bootstrap.public_key, 24),
        "sessionActive": session.is_active(),
        "steps": steps,
    });
    link.shutdown();
    Ok(report)
}
