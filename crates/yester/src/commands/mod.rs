//! Command implementations for the yester CLI.
//!
//! Each submodule implements the logic for one command or command group.

pub mod cache;
pub mod doctor;
pub mod scrub;
pub mod show;
pub mod stats;

use colored::Colorize;

use yester_core::{ContentSource, ContentState, HistoricalEvent};

/// Short label for an image reference; inline images are not printed.
fn image_label(url: &str) -> String {
    if url.starts_with("data:") {
        "generated image (inline)".to_string()
    } else {
        url.to_string()
    }
}

fn source_label(source: Option<ContentSource>) -> &'static str {
    match source {
        Some(ContentSource::Memory) => "local cache",
        Some(ContentSource::Remote) => "shared cache",
        Some(ContentSource::Generated) => "freshly generated",
        Some(ContentSource::Fallback) => "offline archive",
        None => "unknown",
    }
}

pub(crate) fn print_event(event: &HistoricalEvent) {
    let marker = if event.is_primary { "★" } else { "•" };
    println!("{} {}", marker.yellow(), event.title.bold());
    println!("  {}", event.short_content);
    if let Some(url) = &event.image_url {
        println!("  {}", image_label(url).dimmed());
    }
    println!();
}

/// Render a settled state: error banner first, then the cards.
pub(crate) fn print_state(state: &ContentState) {
    if let Some(error) = &state.error {
        println!("{}", format!("⚠ {}", error).red().bold());
        println!(
            "  {}",
            "Showing archive events instead. Run again (or `yester show --refresh`) to retry."
                .dimmed()
        );
        println!();
    }

    if let Some(key) = &state.key {
        println!(
            "{} {}",
            key.to_string().cyan().bold(),
            format!("({})", source_label(state.source)).dimmed()
        );
        println!("{}", "─".repeat(50));
    }

    for event in &state.events {
        print_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_label_hides_inline_payload() {
        assert_eq!(
            image_label("data:image/png;base64,aGVsbG8="),
            "generated image (inline)"
        );
        assert_eq!(
            image_label("https://example.org/a.jpg"),
            "https://example.org/a.jpg"
        );
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label(Some(ContentSource::Fallback)), "offline archive");
        assert_eq!(source_label(None), "unknown");
    }
}
