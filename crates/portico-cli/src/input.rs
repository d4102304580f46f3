//! Input helpers shared by commands.

use std::io::{self, Read};

/// Reads a file, or stdin when `input` is `None`.
pub fn read_input(input: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
    match input {
        Some(path) => Ok(std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Reads and parses JSON from a file or stdin.
pub fn read_json(input: Option<&str>) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let raw = read_input(input)?;
    Ok(serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON: {}", e))?)
}
