//! Diagnostics command.

use anyhow::Result;
use colored::Colorize;

use yester_core::client::GeminiClient;
use yester_core::remote::{RemoteCache, SqliteRemoteCache};

use crate::config::Config;

pub async fn execute(config: &Config) -> Result<()> {
    println!("{}", "yester Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    let config_path = Config::config_path();
    if config_path.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check data directory
    print!("  Data directory: ");
    if config.paths.data_dir.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ will be created".yellow());
    }

    // Check shared cache
    let db_path = config.remote_db_path();
    print!("  Shared cache ({}): ", db_path.display());
    if db_path.exists() {
        match SqliteRemoteCache::open(&db_path) {
            Ok(db) if db.ping().await => match db.usage_stats().await {
                Ok(stats) => println!(
                    "{}",
                    format!("✓ connected ({} entries)", stats.total_content).green()
                ),
                Err(e) => {
                    println!("{}", format!("✗ {}", e).red());
                    issues.push("Shared cache cannot be queried");
                }
            },
            Ok(_) => {
                println!("{}", "✗ not responding".red());
                issues.push("Shared cache is not responding");
            }
            Err(e) => {
                println!("{}", format!("✗ {}", e).red());
                issues.push("Shared cache cannot be opened");
            }
        }
    } else {
        println!("{}", "○ will be created".yellow());
    }

    // Check API key and reachability
    print!("  Gemini API key: ");
    match config.api_key() {
        Some(key) => {
            println!("{}", "✓ configured".green());

            print!("  Gemini API ({}): ", config.api.base_url);
            let client = GeminiClient::with_options(
                key,
                config.api.base_url.clone(),
                config.request_timeout(),
            );
            match client {
                Ok(client) => match client.ping().await {
                    Ok(()) => println!("{}", "✓ reachable".green()),
                    Err(e) => {
                        println!("{}", format!("✗ {}", e).red());
                        issues.push("Cannot reach the Gemini API");
                    }
                },
                Err(e) => {
                    println!("{}", format!("✗ {}", e).red());
                    issues.push("Gemini client could not be created");
                }
            }
        }
        None => {
            println!("{}", "✗ missing".red());
            issues.push("No Gemini API key - set GEMINI_API_KEY; archive events will be shown");
        }
    }

    // Check content settings
    print!("  Content settings: ");
    match config.content.validate() {
        Ok(()) => println!(
            "{}",
            format!(
                "✓ {} events, {}ms debounce",
                config.content.generator.max_events, config.content.resolution.debounce_ms
            )
            .green()
        ),
        Err(e) => {
            println!("{}", format!("✗ {}", e).red());
            issues.push("Invalid [content] settings");
        }
    }

    // Summary
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in &issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}
