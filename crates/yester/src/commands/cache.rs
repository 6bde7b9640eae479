//! Cache maintenance commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;

use yester_core::remote::RemoteRow;

use crate::app::App;
use crate::cli::{CacheAction, CacheCommand};
use crate::selection::Selection;

pub async fn execute(cmd: CacheCommand, app: &App) -> Result<()> {
    match cmd.action {
        CacheAction::List => {
            let keys = app.orchestrator.local_keys().await;
            if keys.is_empty() {
                println!("{}", "Local cache is empty".dimmed());
                return Ok(());
            }

            println!("{}", format!("{} local entries", keys.len()).cyan().bold());
            for key in keys {
                println!("  {}", key);
            }
        }

        CacheAction::Clear => {
            let cleared = app
                .orchestrator
                .clear_local()
                .await
                .context("Failed to clear local cache")?;
            println!("{} Removed {} local entries", "✓".green(), cleared);
        }

        CacheAction::Prune { days } => {
            if !app.capabilities.shared_cache {
                println!("{}", "Shared cache is not connected; nothing to prune".yellow());
                return Ok(());
            }

            let pruned = app
                .orchestrator
                .remote()
                .prune(days)
                .await
                .context("Failed to prune shared cache")?;
            println!(
                "{} Pruned {} unused shared entries older than {} day(s)",
                "✓".green(),
                pruned,
                days
            );
        }

        CacheAction::Similar { selection, limit } => {
            let params = Selection::load(app.storage.as_ref())
                .await
                .merge(&selection)
                .params();

            let rows = app
                .orchestrator
                .remote()
                .find_similar(&params, limit)
                .await
                .context("Failed to query shared cache")?;

            if rows.is_empty() {
                println!("{}", format!("Nothing related to {} yet", params).dimmed());
                return Ok(());
            }

            println!("{}", format!("Related to {}", params).cyan().bold());
            for row in &rows {
                println!("  {}", describe_row(row));
            }
        }
    }

    Ok(())
}

fn describe_row(row: &RemoteRow) -> String {
    let updated = DateTime::<Utc>::from_timestamp_millis(row.updated_at)
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<28} {:>4} view(s)  {} event(s)  updated {}",
        row.params().cache_key().to_string(),
        row.usage_count,
        row.events.len(),
        updated
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_row() {
        let row = RemoteRow {
            id: "row-1".into(),
            year: 1969,
            region: "America".into(),
            topic: "Science".into(),
            events: Vec::new(),
            created_at: 0,
            updated_at: 1_700_000_000_000,
            usage_count: 12,
        };

        let line = describe_row(&row);
        assert!(line.starts_with("1969-America-Science"));
        assert!(line.contains("  12 view(s)"));
        assert!(line.contains("updated 2023-11-14"));
    }
}
