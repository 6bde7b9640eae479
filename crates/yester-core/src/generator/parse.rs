//! Parser for the `EVENT_N: / Title: / Content:` completion grammar.
//!
//! Never fails: malformed blocks are dropped, and an empty result is the
//! caller's problem.

use crate::types::{GenerationParams, HistoricalEvent};

const BLOCK_DELIMITER: &str = "EVENT_";
const TITLE_LABEL: &str = "Title:";
const CONTENT_LABEL: &str = "Content:";

#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Title,
    Content,
}

/// Strip whitespace and markdown emphasis around a value
fn clean(value: &str) -> &str {
    value.trim_matches(|c: char| c == '*' || c.is_whitespace())
}

/// Extract `(title, content)` from one block, if both are present.
fn parse_block(block: &str) -> Option<(String, String)> {
    let mut title = String::new();
    let mut content = String::new();
    let mut field = Field::None;

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(pos) = line.find(TITLE_LABEL) {
            title = clean(&line[pos + TITLE_LABEL.len()..]).to_string();
            field = Field::Title;
        } else if let Some(pos) = line.find(CONTENT_LABEL) {
            content = clean(&line[pos + CONTENT_LABEL.len()..]).to_string();
            field = Field::Content;
        } else if field == Field::Content {
            let extra = clean(line);
            if extra.is_empty() {
                continue;
            }
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(extra);
        }
    }

    if title.is_empty() || content.is_empty() {
        None
    } else {
        Some((title, content))
    }
}

/// Parse a completion into at most `max_events` events.
///
/// Ids are numbered among the valid blocks, and only the first is primary.
/// Images are left unset.
pub fn parse_events(
    raw: &str,
    params: &GenerationParams,
    max_events: usize,
) -> Vec<HistoricalEvent> {
    raw.split(BLOCK_DELIMITER)
        .filter(|block| !block.trim().is_empty())
        .filter_map(parse_block)
        .take(max_events)
        .enumerate()
        .map(|(index, (title, content))| HistoricalEvent {
            id: format!("{}-{}", params.year, index + 1),
            title,
            short_content: content.clone(),
            full_content: content,
            year: params.year,
            region: params.region.clone(),
            topic: params.topic.clone(),
            image_url: None,
            is_primary: index == 0,
        })
        .collect()
}
