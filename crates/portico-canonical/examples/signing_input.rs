use portico_canonical::signing_input;
use serde_json::json;

fn main() {
    let message = json!({
        "type": "portico:api:getProfileDetails:response",
        "requestId": "0b6f1c2e-6a7d-4e4b-9d59-2f1f3f0f6a11",
        "timestamp": 1700000000000u64,
        "jwt": "header.payload.signature",
        "signature": "not part of the signed bytes"
    });

    let Some(map) = message.as_object() else {
        eprintln!("example message is not an object");
        std::process::exit(1);
    };

    match signing_input(map) {
        Ok(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
        Err(err) => {
            eprintln!("canonicalization failed: {}", err);
            std::process::exit(1);
        }
    }
}
