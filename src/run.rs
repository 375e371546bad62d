//! Tool entry: parse arguments, run one paid exchange, print one JSON object.

use std::time::Duration;

use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use crate::config::CliArgs;
use crate::parse::{ParseRequest, ServiceConfig, parse_document};

/// Loads the environment, initializes logging, and runs the exchange.
///
/// Logs go to stderr so stdout carries nothing but the result object.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let signer: PrivateKeySigner = args.private_key.parse()?;

    let config = ServiceConfig {
        endpoint: args.endpoint,
        timeout: Duration::from_secs(args.timeout),
    };
    let request = ParseRequest {
        document_url: args.url,
        format: args.format,
        vlm: args.vlm,
        network: args.network,
        max_value: args.max_value,
    };

    let outcome = parse_document(signer, &config, request).await?;
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}
