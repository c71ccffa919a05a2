use clap::{Parser, Subcommand};
use orderbook::Side;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "hftx-cli")]
#[command(about = "Command line client for the exchange service")]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Submit {
        #[arg(short = 's', long)]
        symbol: String,
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(short = 'p', long)]
        price: f64,
        #[arg(short = 'q', long)]
        quantity: i64,
        #[arg(short = 'u', long, default_value = "cli")]
        user: String,
    },
    Depth {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "10")]
        depth: usize,
    },
    Stats,
    Health,
}

#[derive(Serialize)]
struct SubmitOrderRequest {
    side: Side,
    price: f64,
    quantity: i64,
    user_id: String,
}

#[derive(Deserialize)]
struct SubmitOrderResponse {
    status: String,
    order_id: serde_json::Value,
}

#[derive(Deserialize)]
struct PriceLevel {
    price: f64,
    qty: i64,
}

#[derive(Deserialize)]
struct BookSnapshot {
    symbol: String,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s.to_lowercase().as_str() {
        "buy" | "bid" => Ok(Side::Buy),
        "sell" | "ask" => Ok(Side::Sell),
        _ => Err(format!("invalid side: {s}. use 'buy' or 'sell'")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Submit {
            symbol,
            side,
            price,
            quantity,
            user,
        } => {
            let request = SubmitOrderRequest {
                side,
                price,
                quantity,
                user_id: user,
            };

            let response = client
                .post(format!("{}/symbols/{}/orders", cli.server, symbol))
                .json(&request)
                .send()
                .await?;

            if response.status().is_success() {
                let result: SubmitOrderResponse = response.json().await?;
                println!("status: {}", result.status);
                println!("order id: {}", result.order_id);
            } else {
                println!("error: {}", response.status());
                println!("{}", response.text().await?);
            }
        }

        Commands::Depth { symbol, depth } => {
            let response = client
                .get(format!("{}/symbols/{}/orderbook?depth={}", cli.server, symbol, depth))
                .send()
                .await?;

            if response.status().is_success() {
                let snapshot: BookSnapshot = response.json().await?;
                println!("order book for {}", snapshot.symbol);
                println!("\nasks:");
                for (i, level) in snapshot.asks.iter().enumerate() {
                    println!("  {}: {} @ {}", i + 1, level.qty, level.price);
                }
                println!("\nbids:");
                for (i, level) in snapshot.bids.iter().enumerate() {
                    println!("  {}: {} @ {}", i + 1, level.qty, level.price);
                }
            } else {
                println!("error: {}", response.status());
            }
        }

        Commands::Stats => {
            let response = client.get(format!("{}/stats", cli.server)).send().await?;
            if response.status().is_success() {
                let stats: serde_json::Value = response.json().await?;
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("error: {}", response.status());
            }
        }

        Commands::Health => {
            let response = client.get(format!("{}/health", cli.server)).send().await?;
            if response.status().is_success() {
                let health: serde_json::Value = response.json().await?;
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("error: {}", response.status());
            }
        }
    }

    Ok(())
}
