//! Assertion commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use portico_identity::{verify_assertion_at, Did, IdentityService};
use portico_store::{FileSecretStore, MemoryProfileStore};

use crate::output::{format_field, format_json};

/// Assertion kinds selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Profile,
    Avatar,
    Disconnect,
    Error,
}

pub struct IssueArgs {
    pub did: String,
    pub kind: KindArg,
    pub profiles: Option<PathBuf>,
    pub audience: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

pub fn issue(secrets_dir: &Path, args: IssueArgs) -> Result<(), Box<dyn std::error::Error>> {
    let did = Did::parse(args.did)?;
    let secrets = FileSecretStore::open(secrets_dir)
        .map_err(|e| format!("Failed to open secret store {}: {}", secrets_dir.display(), e))?;
    let profiles = match &args.profiles {
        Some(path) => MemoryProfileStore::from_json_file(path)
            .map_err(|e| format!("Failed to load profiles {}: {}", path.display(), e))?,
        None => MemoryProfileStore::new(),
    };
    let service = IdentityService::new(Arc::new(secrets), Arc::new(profiles));

    let audience = args.audience.as_deref();
    let token = match args.kind {
        KindArg::Profile => service.profile_assertion(&did, audience)?,
        KindArg::Avatar => service.avatar_assertion(&did, audience)?,
        KindArg::Disconnect => service.disconnect_assertion(&did, audience)?,
        KindArg::Error => {
            let code = args.code.ok_or("--code is required for error assertions")?;
            let message = args
                .message
                .ok_or("--message is required for error assertions")?;
            service.error_assertion(&did, &code, &message, audience)?
        }
    };

    println!("{}", token);
    Ok(())
}

pub fn verify(
    token: String,
    issuer: Option<String>,
    clock_skew_secs: i64,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let issuer = issuer.map(Did::parse).transpose()?;
    let now = chrono::Utc::now().timestamp();

    let claims = verify_assertion_at(token.trim(), issuer.as_ref(), now, clock_skew_secs)
        .map_err(|e| format!("Assertion rejected: {}", e))?;

    if json_output {
        println!("{}", format_json(&serde_json::to_value(&claims)?));
    } else {
        println!("{}", format_field("valid", "yes"));
        println!("{}", format_field("issuer", &claims.iss));
        println!("{}", format_field("type", &format!("{:?}", claims.kind).to_lowercase()));
        println!("{}", format_field("audience", claims.aud.as_deref().unwrap_or("-")));
        println!("{}", format_field("expires in", &format!("{}s", claims.exp - now)));
        println!("{}", format_field("data", &claims.data.to_string()));
    }
    Ok(())
}
