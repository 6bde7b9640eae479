//! Cache statistics.

use anyhow::Result;
use colored::Colorize;

use crate::app::App;

pub async fn execute(json: bool, app: &App) -> Result<()> {
    let stats = app.orchestrator.initialize().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Cache Statistics".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Local entries:   {}", stats.local);
    if app.capabilities.shared_cache {
        println!("  Shared entries:  {}", stats.global);
        println!("  Total views:     {}", stats.total_usage);
    } else {
        println!("  Shared cache:    {}", "not connected".yellow());
    }
    if !app.capabilities.persistent {
        println!("  {}", "(ephemeral run: local cache is not saved)".dimmed());
    }

    Ok(())
}
