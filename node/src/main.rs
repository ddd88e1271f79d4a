//! AnyFee fee exchange-rate tool
//!
//! Inspects and updates the fee exchange rates stored in a node's data
//! directory.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anyfee_node::{FeeRateNode, NodeConfig};

/// Fee exchange-rate operator CLI
#[derive(Parser, Debug)]
#[command(name = "feerates")]
#[command(about = "Inspect and update fee exchange rates")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current rates
    Get,
    /// Replace all rates with a JSON object of label-or-hex to scaled rate
    Set {
        /// e.g. '{"bitcoin": 100000000}'
        rates: String,
    },
    /// Reference value of an amount paid in an asset
    Value {
        #[arg(long)]
        asset: String,
        #[arg(long)]
        amount: i64,
    },
    /// Amount of an asset worth a reference value
    Amount {
        #[arg(long)]
        asset: String,
        #[arg(long)]
        value: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = NodeConfig::from_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    info!(
        data_dir = %config.data_dir.display(),
        native_asset = %config.native_asset_label,
        "Starting fee rate tool"
    );

    let mut node = FeeRateNode::new(&config)?;
    let mut recompute_rx = node
        .take_recompute_receiver()
        .ok_or_else(|| anyhow::anyhow!("recompute receiver already taken"))?;

    // Stand-in for the mempool's fee recomputation pass.
    let consumer = tokio::spawn(async move {
        while let Some(event) = recompute_rx.recv().await {
            info!(
                update_id = %event.id,
                entries = event.entries,
                persisted = event.persisted,
                "Fee exchange rates changed, mempool fees need recomputing"
            );
        }
    });

    node.start();
    let handler = node.handler();

    let result = match args.command {
        Command::Get => Ok(handler.get_fee_exchange_rates()),
        Command::Set { rates } => {
            let params: serde_json::Value = serde_json::from_str(&rates)?;
            handler.set_fee_exchange_rates(&params)
        }
        Command::Value { asset, amount } => handler.value_of(&asset, amount),
        Command::Amount { asset, value } => handler.amount_for(&asset, value),
    };

    // Closing the engine's sender lets the consumer drain and finish.
    drop(handler);
    drop(node);
    consumer.await?;

    match result {
        Ok(output) => {
            if !output.is_null() {
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            Ok(())
        }
        Err(e) => {
            error!(code = e.code(), error = %e, "Request failed");
            Err(anyhow::anyhow!("error code: {}\n{}", e.code(), e))
        }
    }
}
