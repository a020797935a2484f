//! Expense Pie CLI
//!
//! Command-line client for a running Expense Pie server:
//! - List expenses
//! - Add, replace and delete expenses
//! - Check status

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "expense-pie-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage expenses shown on a live Expense Pie chart")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub server: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List expenses in chart order
    List,

    /// Add an expense
    Add {
        /// Expense name
        name: String,
        /// Cost
        cost: f64,
    },

    /// Replace an expense
    Set {
        /// Expense id
        id: String,
        /// New name
        name: String,
        /// New cost
        cost: f64,
    },

    /// Delete an expense
    Delete {
        /// Expense id
        id: String,
    },

    /// Show server status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.server.trim_end_matches('/');

    match cli.command {
        Commands::List => {
            let response = client
                .get(format!("{}/api/v1/expenses", base))
                .send()
                .await
                .with_context(|| format!("Cannot connect to Expense Pie at {}", base))?;
            let data = expect_success(response).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_table(&data);
            }
        }

        Commands::Add { name, cost } => {
            let response = client
                .post(format!("{}/api/v1/expenses", base))
                .json(&serde_json::json!({ "name": name, "cost": cost }))
                .send()
                .await?;
            let created = expect_success(response).await?;
            println!(
                "Added {} ({}) as {}",
                created["name"].as_str().unwrap_or("-"),
                created["cost"],
                created["id"].as_str().unwrap_or("-")
            );
        }

        Commands::Set { id, name, cost } => {
            let response = client
                .put(expense_url(base, &id))
                .json(&serde_json::json!({ "name": name, "cost": cost }))
                .send()
                .await?;
            expect_success(response).await?;
            println!("Updated {}", id);
        }

        Commands::Delete { id } => {
            let response = client
                .delete(expense_url(base, &id))
                .send()
                .await?;
            expect_success(response).await?;
            println!("Deleted {}", id);
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", base))
                .send()
                .await
                .with_context(|| format!("Cannot connect to Expense Pie at {}", base))?;
            let health = expect_success(response).await?;

            println!("Expense Pie v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Status: {}", health["status"].as_str().unwrap_or("unknown"));
            println!("Collection: {}", health["collection"].as_str().unwrap_or("unknown"));
            println!("Chart: {}", health["chart"].as_str().unwrap_or("unknown"));
            println!("Viewers: {}", health["viewers"].as_u64().unwrap_or(0));
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!("Uptime: {}", format_duration(uptime));
            }
        }
    }

    Ok(())
}

/// Body of a successful response, or the server's error message
async fn expect_success(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(text);
        bail!("Request failed ({}): {}", status, message);
    }

    if text.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).context("Server returned invalid JSON")
}

/// URL of a single expense, with the id percent-encoded as one path segment
fn expense_url(base: &str, id: &str) -> String {
    format!("{}/api/v1/expenses/{}", base, urlencoding::encode(id))
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_table(data: &Value) {
    let expenses = match data["expenses"].as_array() {
        Some(e) if !e.is_empty() => e,
        _ => {
            println!("No expenses yet.");
            println!();
            println!("Add one with:");
            println!("  expense-pie-cli add Coffee 5");
            return;
        }
    };

    println!("{:<34} {:<24} {:>12}", "ID", "Name", "Cost");
    println!("{}", "-".repeat(72));
    for expense in expenses {
        println!(
            "{:<34} {:<24} {:>12}",
            expense["id"].as_str().unwrap_or("-"),
            expense["name"].as_str().unwrap_or("-"),
            expense["cost"].as_f64().map(|c| c.to_string()).unwrap_or_default()
        );
    }
    println!("{}", "-".repeat(72));
    println!(
        "{:<34} {:<24} {:>12}",
        format!("{} expenses", data["total"].as_u64().unwrap_or(0)),
        "Total",
        data["total_cost"].as_f64().map(|c| c.to_string()).unwrap_or_default()
    );
}
