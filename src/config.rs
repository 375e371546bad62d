//! CLI arguments and environment configuration.

use clap::Parser;
use url::Url;

use paydoc_types::amount::TokenAmount;
use paydoc_types::network::Network;

use crate::parse::OutputFormat;

const DEFAULT_ENDPOINT: &str = "https://x402.api.netmind.ai/inference-api/agent/v1/parse-pdf";

/// CLI arguments for the paydoc tool.
#[derive(Parser, Debug)]
#[command(name = "paydoc")]
#[command(about = "Parse a document through a pay-per-use HTTP 402 service")]
pub struct CliArgs {
    /// Hex-encoded private key used to sign payments
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// URL of the document to parse
    #[arg(long)]
    pub url: Url,

    /// Output format produced by the service
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Run the service's vision-language model over the document
    #[arg(long, default_value_t = false)]
    pub vlm: bool,

    /// Only accept payment requirements settling on this network
    #[arg(long)]
    pub network: Option<Network>,

    /// Refuse payments above this amount, in token base units
    #[arg(long)]
    pub max_value: Option<TokenAmount>,

    /// Endpoint of the parsing service
    #[arg(long, env = "PAYDOC_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: Url,

    /// Overall timeout for the exchange, in seconds
    #[arg(long, env = "HTTP_TIMEOUT", default_value_t = 60)]
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let args = CliArgs::parse_from([
            "paydoc",
            "--private-key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "--url",
            "https://example.com/paper.pdf",
        ]);
        assert_eq!(args.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(args.timeout, 60);
        assert!(matches!(args.format, OutputFormat::Json));
        assert!(!args.vlm);
        assert!(args.network.is_none());
    }

    #[test]
    fn filters_parse() {
        let args = CliArgs::parse_from([
            "paydoc",
            "--private-key",
            "0x01",
            "--url",
            "https://example.com/paper.pdf",
            "--format",
            "markdown",
            "--network",
            "eip155:8453",
            "--max-value",
            "50000",
        ]);
        assert!(matches!(args.format, OutputFormat::Markdown));
        // the chain-id alias normalizes on the way in
        assert_eq!(args.network.unwrap(), "base");
        assert_eq!(args.max_value.unwrap(), TokenAmount::from(50000u64));
    }
}
