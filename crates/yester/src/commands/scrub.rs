//! Sweep through a range of years the way a scrubbing timeline does.

use anyhow::Result;
use colored::Colorize;
use std::time::Duration;

use super::print_state;
use super::show::resolve_with_progress;
use crate::app::App;
use crate::cli::{ScrubCommand, SelectionArgs};
use crate::selection::Selection;

pub async fn execute(cmd: ScrubCommand, app: &App, debounce: Duration) -> Result<()> {
    let base = Selection::load(app.storage.as_ref()).await.merge(&SelectionArgs {
        year: None,
        region: cmd.region.clone(),
        topic: cmd.topic.clone(),
    });

    let interval = Duration::from_millis(cmd.interval_ms);
    if interval >= debounce {
        eprintln!(
            "{}",
            format!(
                "Interval {}ms is not shorter than the {}ms debounce; every year will resolve",
                cmd.interval_ms,
                debounce.as_millis()
            )
            .yellow()
        );
    }

    app.orchestrator.initialize().await;

    let years = sweep(cmd.from, cmd.to);
    for &year in &years[..years.len() - 1] {
        let params = Selection {
            year,
            ..base.clone()
        }
        .params();
        eprint!("\r{} {}", "scrubbing".dimmed(), year);
        app.orchestrator.request_content(params);
        tokio::time::sleep(interval).await;
    }
    eprintln!();

    let target = Selection {
        year: cmd.to,
        ..base
    };
    target.save(app.storage.as_ref()).await?;

    let state = resolve_with_progress(&app.orchestrator, target.params()).await?;
    print_state(&state);
    println!(
        "{}",
        format!("Swept {} year(s), settled on {}", years.len(), cmd.to).dimmed()
    );
    Ok(())
}

/// Years from `from` to `to` inclusive, in sweep order.
fn sweep(from: i32, to: i32) -> Vec<i32> {
    if from <= to {
        (from..=to).collect()
    } else {
        (to..=from).rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_directions() {
        assert_eq!(sweep(1990, 1993), vec![1990, 1991, 1992, 1993]);
        assert_eq!(sweep(1993, 1991), vec![1993, 1992, 1991]);
        assert_eq!(sweep(2000, 2000), vec![2000]);
    }
}
