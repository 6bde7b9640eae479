//! Show events for one selection.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use yester_core::{ContentOrchestrator, ContentState, GenerationParams, ResolutionPhase};

use super::print_state;
use crate::app::App;
use crate::cli::ShowCommand;
use crate::selection::Selection;

pub async fn execute(cmd: ShowCommand, app: &App) -> Result<()> {
    let selection = Selection::load(app.storage.as_ref())
        .await
        .merge(&cmd.selection);
    selection.save(app.storage.as_ref()).await?;

    let params = selection.params();
    app.orchestrator.initialize().await;
    if cmd.refresh {
        if app.orchestrator.invalidate(&params).await {
            eprintln!("{}", "Dropped local copy, fetching again".dimmed());
        }
        // Starts the request; the resolve below adopts it
        app.orchestrator.retry(params.clone());
    }

    let state = resolve_with_progress(&app.orchestrator, params).await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_state(&state);
    }
    Ok(())
}

/// Resolve `params` while mirroring the loading phases on stderr.
///
/// Ctrl-C cancels the resolution.
pub(crate) async fn resolve_with_progress(
    orchestrator: &ContentOrchestrator,
    params: GenerationParams,
) -> Result<ContentState> {
    let mut rx = orchestrator.subscribe();
    let resolve = orchestrator.resolve(params);
    tokio::pin!(resolve);

    let mut progress = Progress::default();
    let mut watching = true;
    let result = loop {
        tokio::select! {
            result = &mut resolve => break result,
            changed = rx.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let phase = rx.borrow_and_update().phase;
                progress.update(phase);
            }
            _ = tokio::signal::ctrl_c() => {
                orchestrator.cancel();
            }
        }
    };
    progress.finish();

    result.context("Failed to resolve content")
}

/// Terminal rendering of the loading phases: a spinner while generating, a
/// single note while a cached set is being revealed.
#[derive(Default)]
struct Progress {
    spinner: Option<ProgressBar>,
    last: Option<ResolutionPhase>,
}

impl Progress {
    fn update(&mut self, phase: ResolutionPhase) {
        if self.last == Some(phase) {
            return;
        }
        self.last = Some(phase);

        match phase {
            ResolutionPhase::CacheHitSkeleton => {
                eprintln!("{}", "… loading from local cache".dimmed());
            }
            ResolutionPhase::RemoteHitSkeleton => {
                eprintln!("{}", "… loading from shared cache".dimmed());
            }
            ResolutionPhase::Generating if self.spinner.is_none() => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                spinner.set_message("Generating historical events");
                spinner.enable_steady_tick(Duration::from_millis(100));
                self.spinner = Some(spinner);
            }
            _ => {}
        }
    }

    fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
