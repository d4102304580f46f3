//! Canonicalize command implementation.

use portico_canonical::{signing_input, Canonicalizer};

use crate::input::read_json;

pub fn run(input: Option<String>, signed_subset: bool) -> Result<(), Box<dyn std::error::Error>> {
    let value = read_json(input.as_deref())?;

    let bytes = if signed_subset {
        let message = value
            .as_object()
            .ok_or("Envelope must be a JSON object")?;
        signing_input(message).map_err(|e| format!("Not a signed envelope: {}", e))?
    } else {
        Canonicalizer::new()
            .canonicalize(&value)
            .map_err(|e| format!("Canonicalization failed: {}", e))?
    };

    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
