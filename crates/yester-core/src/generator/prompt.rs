//! Prompt templates.

use std::fmt::Write;

use super::ImageStrategy;
use crate::types::{GenerationParams, HistoricalEvent};

/// Characters of event content quoted in the image prompt
const IMAGE_CONTEXT_CHARS: usize = 200;

/// Historian prompt asking for exactly `count` events in the parseable grammar.
pub fn text_prompt(params: &GenerationParams, strategy: ImageStrategy, count: usize) -> String {
    let GenerationParams { year, region, topic } = params;
    let word_range = match strategy {
        ImageStrategy::AttemptAi => "100-120",
        ImageStrategy::FallbackOnly => "80-120",
    };

    let mut prompt = format!(
        "Act as an expert historian. Generate EXACTLY {count} significant historical events from {year}\n\
         in the {region} region related to {topic}.\n\n\
         SPECIFIC INSTRUCTIONS:\n\
         - ONLY {count} EVENTS (no more)\n\
         - The first event must be the MOST IMPORTANT and influential of the year\n\
         - Include relevant emojis at the start of each description\n\
         - Use an engaging and narrative tone\n\
         - Each event should be {word_range} words\n\
         - ALWAYS respond in ENGLISH\n\n\
         Response format:\n"
    );

    for n in 1..=count {
        // Writing to a String cannot fail
        let _ = write!(
            prompt,
            "EVENT_{n}:\nTitle: [title]\nContent: [detailed description with emojis]\n\n"
        );
    }

    let _ = write!(
        prompt,
        "Focus ONLY on the {count} MOST historically significant events of {year} in {region}.\n\
         Ensure historical accuracy and compelling storytelling.\n"
    );
    prompt
}

/// Illustration prompt for a single event.
pub fn image_prompt(event: &HistoricalEvent) -> String {
    let context: String = event.short_content.chars().take(IMAGE_CONTEXT_CHARS).collect();
    let decade = event.year.div_euclid(10) * 10;
    let HistoricalEvent {
        title,
        year,
        region,
        topic,
        ..
    } = event;

    format!(
        "Create a historically accurate, high-quality image representing: \"{title}\" from {year}.\n\n\
         Context: {context}\n\n\
         Image requirements:\n\
         - Style: Realistic historical photograph or realistic artistic representation\n\
         - Era: {decade}s aesthetic and visual style\n\
         - Region: {region} cultural and geographical context\n\
         - Subject: {topic} theme\n\
         - Mood: Historically significant, respectful, and dramatic\n\
         - Colors: Period-appropriate color palette for {year}\n\
         - Avoid: Modern elements, anachronisms, offensive content\n\n\
         Focus on capturing the historical importance and atmosphere of this {year} event in {region}.\n"
    )
}
