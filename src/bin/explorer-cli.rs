use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "explorer-cli")]
#[command(about = "Command-line client for the block explorer API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Network key (mainnet, sepolia, goerli).
    #[arg(short, long)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send native value and wait for inclusion
    Send {
        /// Recipient address
        to: String,
        /// Amount in ETH, e.g. 0.01
        amount: String,
        /// Signing key, 64 hex characters
        #[arg(short, long, env = "EXPLORER_PRIVATE_KEY", hide_env_values = true)]
        key: String,
    },
    /// Show the status of a transaction
    Status { hash: String },
    /// List transfers of one category for an address
    Transfers {
        address: String,
        #[arg(short, long, default_value = "external")]
        category: String,
    },
    /// Show the transfer history of an address
    History {
        address: String,
        /// all, sent or received
        #[arg(short, long, default_value = "all")]
        filter: String,
    },
    /// Show balance and code presence of an address
    Account { address: String },
    /// List the latest blocks, or one block with its transactions
    Blocks {
        #[arg(short, long)]
        number: Option<u64>,
    },
    /// List NFTs held by an address
    Nfts { address: String },
    /// Show the metadata of one NFT
    Nft {
        /// Collection contract address
        contract: String,
        /// Token id, decimal or 0x-hex
        token_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut query: Vec<(&str, String)> = Vec::new();
    if let Some(network) = &cli.network {
        query.push(("network", network.clone()));
    }

    let res = match cli.command {
        Commands::Send { to, amount, key } => {
            let body = json!({
                "toAddress": to,
                "amountInETH": amount,
                "privateKey": key,
                "network": cli.network.as_deref().unwrap_or("sepolia"),
            });
            client.post(format!("{}/api/send-transaction", base)).json(&body).send().await?
        }
        Commands::Status { hash } => {
            query.push(("hash", hash));
            client.get(format!("{}/api/transaction", base)).query(&query).send().await?
        }
        Commands::Transfers { address, category } => {
            query.push(("address", address));
            query.push(("category", category));
            client.get(format!("{}/api/transfers", base)).query(&query).send().await?
        }
        Commands::History { address, filter } => {
            query.push(("address", address));
            query.push(("filter", filter));
            client.get(format!("{}/api/account/transactions", base)).query(&query).send().await?
        }
        Commands::Account { address } => {
            query.push(("address", address));
            client.get(format!("{}/api/account/info", base)).query(&query).send().await?
        }
        Commands::Blocks { number } => match number {
            Some(number) => {
                query.push(("blockNumber", number.to_string()));
                client
                    .get(format!("{}/api/blocks/with-transactions", base))
                    .query(&query)
                    .send()
                    .await?
            }
            None => client.get(format!("{}/api/blocks", base)).query(&query).send().await?,
        },
        Commands::Nfts { address } => {
            query.push(("address", address));
            client.get(format!("{}/api/nft", base)).query(&query).send().await?
        }
        Commands::Nft { contract, token_id } => {
            query.push(("contractAddress", contract));
            query.push(("tokenId", token_id));
            client.get(format!("{}/api/nft/metadata", base)).query(&query).send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        let message = json.get("error").and_then(Value::as_str).unwrap_or("no error message");
        eprintln!("Error: explorer returned status {}: {}", status, message);
        std::process::exit(1);
    }

    if status == reqwest::StatusCode::ACCEPTED {
        eprintln!("Transaction broadcast but not yet included; poll it with `status`.");
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
