//! paydoc CLI entrypoint.
//!
//! Runs one paid exchange against the parsing service and prints a single
//! JSON object: `{"result": ..., "transaction": ...}` on success, or
//! `{"error": ...}` on failure. Exchange failures never panic the process.

use std::process;

#[tokio::main]
async fn main() {
    let result = paydoc::run::run().await;
    if let Err(e) = result {
        println!("{}", serde_json::json!({ "error": e.to_string() }));
        process::exit(1)
    }
}
