//! Portico CLI - Command-line interface for identities, assertions and bridge envelopes.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portico_bridge::BridgeConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod output;

use commands::assertion::{IssueArgs, KindArg};
use commands::{assertion, canonicalize, did, envelope, simulate};

#[derive(Parser)]
#[command(name = "portico")]
#[command(about = "Portico identity assertion and bridge envelope CLI")]
struct Cli {
    /// Bridge configuration file (JSON)
    #[arg(long, global = true, env = "PORTICO_CONFIG")]
    config: Option<PathBuf>,
    /// Directory holding long-term identity keys
    #[arg(
        long,
        global = true,
        env = "PORTICO_SECRETS_DIR",
        default_value = ".portico/secrets"
    )]
    secrets_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// DID management
    Did {
        #[command(subcommand)]
        command: DidCommands,
    },
    /// Issue or verify identity assertions
    Assertion {
        #[command(subcommand)]
        command: AssertionCommands,
    },
    /// Show canonical bytes for input JSON
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Canonicalize only the signed subset of a bridge envelope
        #[arg(long)]
        signed_subset: bool,
    },
    /// Sign or verify bridge envelopes
    Envelope {
        #[command(subcommand)]
        command: EnvelopeCommands,
    },
    /// Run a host and a mini app against each other in-process
    Simulate {
        /// Profile name to share
        #[arg(long, default_value = "Alice")]
        name: String,
        /// Permissions to request (repeatable)
        #[arg(long = "permission")]
        permissions: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum DidCommands {
    /// Generate a DID and store its private key
    Generate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum AssertionCommands {
    /// Issue an assertion for a stored DID
    Issue {
        /// Issuer DID
        #[arg(long, env = "PORTICO_DID")]
        did: String,
        /// Assertion kind
        #[arg(long, value_enum, default_value = "profile")]
        kind: KindArg,
        /// Profiles file ({"<did>": {"profile": …, "avatar": …}})
        #[arg(long)]
        profiles: Option<PathBuf>,
        /// Audience (mini app identifier)
        #[arg(long)]
        audience: Option<String>,
        /// Error code (error assertions)
        #[arg(long)]
        code: Option<String>,
        /// Error message (error assertions)
        #[arg(long)]
        message: Option<String>,
    },
    /// Verify an assertion
    Verify {
        /// Compact JWT
        token: String,
        /// Require this issuer DID
        #[arg(long)]
        issuer: Option<String>,
        /// Tolerated clock skew for future issue times (seconds)
        #[arg(long)]
        skew: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum EnvelopeCommands {
    /// Sign an envelope with a throwaway session key
    Sign {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
    },
    /// Verify an envelope signature
    Verify {
        /// Base64 session public key
        #[arg(long)]
        public_key: String,
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<BridgeConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(BridgeConfig::from_json_file(path)?),
        None => Ok(BridgeConfig::default()),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Commands::Did {
            command: DidCommands::Generate { json },
        } => did::generate(&cli.secrets_dir, json),
        Commands::Assertion { command } => match command {
            AssertionCommands::Issue {
                did,
                kind,
                profiles,
                audience,
                code,
                message,
            } => assertion::issue(
                &cli.secrets_dir,
                IssueArgs {
                    did,
                    kind,
                    profiles,
                    audience,
                    code,
                    message,
                },
            ),
            AssertionCommands::Verify {
                token,
                issuer,
                skew,
                json,
            } => assertion::verify(
                token,
                issuer,
                skew.unwrap_or(config.clock_skew_secs),
                json,
            ),
        },
        Commands::Canonicalize {
            input,
            signed_subset,
        } => canonicalize::run(input, signed_subset),
        Commands::Envelope { command } => match command {
            EnvelopeCommands::Sign { input } => envelope::sign(input),
            EnvelopeCommands::Verify {
                public_key,
                input,
                json,
            } => envelope::verify(public_key, input, json),
        },
        Commands::Simulate {
            name,
            permissions,
            json,
        } => simulate::run(config, name, permissions, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
