use std::sync::Arc;

use clap::{Parser, Subcommand};
use pnp_server::client::PnpClient;
use pnp_server::crypto::{AesGcmCodec, CodecKey};
use pnp_server::protocol::{Method, Request};

#[derive(Parser)]
#[command(name = "pnp-cli")]
#[command(about = "Client for the encrypted request/response server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh random key as hex
    Keygen,
    /// Send one request and print the decrypted response
    Send {
        #[arg(short, long, default_value = "127.0.0.1:7878")]
        addr: String,

        /// Shared key as 64 hex characters
        #[arg(short, long, env = "PNP_KEY")]
        key: String,

        #[arg(short, long, default_value = "get")]
        method: String,

        #[arg(short, long, default_value = "/")]
        path: String,

        /// Header as name=value, repeatable
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        #[arg(short, long, default_value = "")]
        body: String,
    },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{}`", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen => {
            println!("{}", CodecKey::generate().to_hex());
        }
        Commands::Send {
            addr,
            key,
            method,
            path,
            headers,
            body,
        } => {
            let codec = Arc::new(AesGcmCodec::new(&CodecKey::from_hex(&key)?));
            let mut client = PnpClient::connect(addr.as_str(), codec).await?;

            let mut request = Request::new(Method::from(method.as_str()), path).with_body(body);
            request.headers.extend(headers);

            let response = client.send(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
