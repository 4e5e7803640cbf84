use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tinylink::config::Config;
use tinylink::models::LinkRecord;
use tinylink::registry::LinkRegistry;

#[derive(Parser)]
#[command(name = "tinylink-admin")]
#[command(about = "TinyLink link management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Create {
        /// Short code
        code: String,
        /// Target URL (https:// is added when no scheme is given)
        url: String,
    },
    /// Show one link with its click statistics
    Get {
        /// Short code
        code: String,
    },
    /// List all links, most recent first
    List,
    /// Delete a short link
    Delete {
        /// Short code
        code: String,
    },
}

fn format_timestamp(secs: Option<i64>) -> String {
    secs.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}

fn print_link(link: &LinkRecord) {
    println!("Code:         {}", link.code);
    println!("Target:       {}", link.target_url);
    println!("Clicks:       {}", link.click_count);
    println!("Last clicked: {}", format_timestamp(link.last_clicked_at));
    println!("Created:      {}", format_timestamp(Some(link.created_at)));
}

#[tokio::main]
async fn main() -> Result<()> {
    tinylink::init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = config.open_storage().await?;
    let registry = LinkRegistry::new(storage.clone());

    let outcome = run(&registry, cli.command).await;
    storage.close().await;
    outcome
}

async fn run(registry: &LinkRegistry, command: Commands) -> Result<()> {
    match command {
        Commands::Create { code, url } => {
            let link = registry.create_link(Some(&code), Some(&url)).await?;
            println!("✓ Created '{}' -> {}", link.code, link.target_url);
        }
        Commands::Get { code } => {
            let link = registry.get_link(&code).await?;
            print_link(&link);
        }
        Commands::List => {
            let links = registry.list_links().await?;
            if links.is_empty() {
                println!("No links found.");
            } else {
                println!("{:<20} {:>8} {:<24} {}", "Code", "Clicks", "Last clicked", "Target");
                println!("{}", "-".repeat(80));
                for link in links {
                    println!(
                        "{:<20} {:>8} {:<24} {}",
                        link.code,
                        link.click_count,
                        format_timestamp(link.last_clicked_at),
                        link.target_url
                    );
                }
            }
        }
        Commands::Delete { code } => {
            registry.delete_link(&code).await?;
            println!("✓ Deleted '{}'", code);
        }
    }

    Ok(())
}
