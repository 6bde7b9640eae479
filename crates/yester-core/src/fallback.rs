//! Deterministic fallback imagery and fallback result sets.
//!
//! Every event shown to the user carries an image. When AI imagery is skipped,
//! times out, or fails, the image comes from a curated cascade:
//!
//! 1. keywords in the event title (wars, elections, space, named events, ...)
//! 2. region + topic combination
//! 3. decade bucket + region
//! 4. region alone, then topic alone
//! 5. a single default
//!
//! Each tier is a pure lookup. The same `(params, title, index)` always yields
//! the same image, and the cascade always terminates in one.

use crate::types::{GenerationParams, HistoricalEvent};

// Curated image references
const WAR_MEMORIAL: &str = "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=800&h=400&fit=crop";
const HISTORICAL_CONFLICT: &str = "https://images.unsplash.com/photo-1627908295637-e871c1ad93b8?w=800&h=400&fit=crop";
const MILITARY_EQUIPMENT: &str = "https://images.unsplash.com/photo-1574454146206-9e2a69e4feec?w=800&h=400&fit=crop";
const US_CAPITOL: &str = "https://images.unsplash.com/photo-1564459031751-689edc739817?w=800&h=400&fit=crop";
const GOVERNMENT_BUILDING: &str = "https://images.unsplash.com/photo-1529107386315-e1a2ed48a620?w=800&h=400&fit=crop";
const CITY_SKYLINE: &str = "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=800&h=400&fit=crop";
const EUROPEAN_ARCHITECTURE: &str = "https://images.unsplash.com/photo-1467269204594-9661b134dd2b?w=800&h=400&fit=crop";
const EUROPEAN_CITY: &str = "https://images.unsplash.com/photo-1560969184-10fe8719e047?w=800&h=400&fit=crop";
const EUROPEAN_CULTURE: &str = "https://images.unsplash.com/photo-1472214103451-9374bd1c798e?w=800&h=400&fit=crop";
const EARTH_FROM_SPACE: &str = "https://images.unsplash.com/photo-1446776653964-20c1d3a81b06?w=800&h=400&fit=crop";
const SPACE_MISSION: &str = "https://images.unsplash.com/photo-1464822759844-d150baec0494?w=800&h=400&fit=crop";
const LABORATORY: &str = "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=800&h=400&fit=crop";
const MODERN_TECHNOLOGY: &str = "https://images.unsplash.com/photo-1451187580459-43490279c0fa?w=800&h=400&fit=crop";
const MOSCOW: &str = "https://images.unsplash.com/photo-1547036967-23d11aacaee0?w=800&h=400&fit=crop";
const FINANCIAL_DISTRICT: &str = "https://images.unsplash.com/photo-1611974789855-9c2a0a7236a3?w=800&h=400&fit=crop";
const NATURE: &str = "https://images.unsplash.com/photo-1470071459604-3b5ec3a7fe05?w=800&h=400&fit=crop";
const MEDICAL_SCIENCE: &str = "https://images.unsplash.com/photo-1559757148-5c350d0d3c56?w=800&h=400&fit=crop";
const CONCERT: &str = "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=800&h=400&fit=crop";
const CLASSIC_MUSIC: &str = "https://images.unsplash.com/photo-1471478331149-c72f17e33c73?w=800&h=400&fit=crop";
const SPORTS: &str = "https://images.unsplash.com/photo-1461896836934-ffe607ba8211?w=800&h=400&fit=crop";
const ART_GALLERY: &str = "https://images.unsplash.com/photo-1541961017774-22349e4a1262?w=800&h=400&fit=crop";
const ASIAN_LANDSCAPE: &str = "https://images.unsplash.com/photo-1528164344705-47542687000d?w=800&h=400&fit=crop";
const ASIAN_CITY: &str = "https://images.unsplash.com/photo-1542931287-023b922fa89b?w=800&h=400&fit=crop";
const ASIAN_CULTURE: &str = "https://images.unsplash.com/photo-1490818387583-1baba5e638af?w=800&h=400&fit=crop";
const AFRICAN_LANDSCAPE: &str = "https://images.unsplash.com/photo-1516026672322-bc52d61a55d5?w=800&h=400&fit=crop";
const OCEANIA_LANDSCAPE: &str = "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=800&h=400&fit=crop";
const HISTORICAL_ARCHIVE: &str = "https://images.unsplash.com/photo-1461749280684-dccba630e2f6?w=800&h=400&fit=crop";

/// Image used when nothing more specific applies
pub const DEFAULT_IMAGE: &str = HISTORICAL_ARCHIVE;

/// Which cascade tier produced an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTier {
    Keyword,
    RegionTopic,
    DecadeRegion,
    Region,
    Topic,
    Default,
}

/// Pick a deterministic fallback image for an event.
pub fn fallback_image(params: &GenerationParams, title: &str, index: usize) -> &'static str {
    resolve_fallback_image(params, title, index).1
}

/// Same as [`fallback_image`], also reporting the tier that matched.
pub fn resolve_fallback_image(
    params: &GenerationParams,
    title: &str,
    index: usize,
) -> (FallbackTier, &'static str) {
    let region = canonical_region(&params.region);
    let title = TitleWords::new(title);

    if let Some(set) = keyword_images(&title, params.year, region) {
        return (FallbackTier::Keyword, pick(set, index));
    }

    if let Some(set) = region_topic_images(region, &params.topic, params.decade()) {
        return (FallbackTier::RegionTopic, pick(set, index));
    }

    if let Some(set) = decade_region_images(params.decade(), region) {
        return (FallbackTier::DecadeRegion, pick(set, index));
    }

    if let Some(image) = region_image(region) {
        return (FallbackTier::Region, image);
    }

    if let Some(image) = topic_image(&params.topic) {
        return (FallbackTier::Topic, image);
    }

    (FallbackTier::Default, DEFAULT_IMAGE)
}

/// The selector offers "America"; older clients sent "Americas".
fn canonical_region(region: &str) -> &str {
    match region {
        "Americas" => "America",
        other => other,
    }
}

fn pick(set: &'static [&'static str], index: usize) -> &'static str {
    set[index % set.len()]
}

/// Lowercased title split into words, for whole-word keyword matching.
struct TitleWords {
    words: Vec<String>,
    joined: String,
}

impl TitleWords {
    fn new(title: &str) -> Self {
        let words: Vec<String> = title
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        let joined = format!(" {} ", words.join(" "));
        Self { words, joined }
    }

    /// Whole word (or simple plural) match; phrases match as a word sequence.
    fn mentions(&self, keyword: &str) -> bool {
        if keyword.contains(' ') {
            return self.joined.contains(&format!(" {} ", keyword));
        }
        self.words.iter().any(|w| {
            w == keyword
                || w.strip_suffix('s') == Some(keyword)
                || w.strip_suffix("es") == Some(keyword)
        })
    }

    fn mentions_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.mentions(k))
    }
}

fn keyword_images(title: &TitleWords, year: i32, region: &str) -> Option<&'static [&'static str]> {
    if title.mentions_any(&["war", "conflict", "battle"]) {
        return Some(&[WAR_MEMORIAL, HISTORICAL_CONFLICT, MILITARY_EQUIPMENT]);
    }

    if title.mentions("operation") && title.mentions("desert") {
        return Some(&[WAR_MEMORIAL, US_CAPITOL, HISTORICAL_CONFLICT]);
    }

    if title.mentions_any(&["ada", "disabilities", "civil rights"]) {
        return Some(&[GOVERNMENT_BUILDING, US_CAPITOL, CITY_SKYLINE]);
    }

    if title.mentions_any(&["election", "vote", "democracy", "president"]) {
        return Some(if region == "America" {
            &[US_CAPITOL, GOVERNMENT_BUILDING, CITY_SKYLINE]
        } else {
            &[GOVERNMENT_BUILDING, EUROPEAN_ARCHITECTURE, EUROPEAN_CITY]
        });
    }

    if title.mentions_any(&["space", "satellite", "rocket", "nasa"]) {
        return Some(&[EARTH_FROM_SPACE, SPACE_MISSION, LABORATORY]);
    }

    if title.mentions_any(&["technology", "computer", "internet", "software"]) {
        return Some(if year >= 1990 {
            &[MODERN_TECHNOLOGY, LABORATORY, CITY_SKYLINE]
        } else {
            &[CITY_SKYLINE, LABORATORY, SPACE_MISSION]
        });
    }

    if title.mentions_any(&["berlin", "wall", "reunification", "germany"]) {
        return Some(&[EUROPEAN_CITY, EUROPEAN_ARCHITECTURE, EUROPEAN_CULTURE]);
    }

    if title.mentions_any(&["soviet", "ussr", "russia", "moscow"]) {
        return Some(&[MOSCOW, EUROPEAN_ARCHITECTURE, HISTORICAL_CONFLICT]);
    }

    if title.mentions_any(&["economic", "economy", "financial", "market"]) {
        return Some(&[FINANCIAL_DISTRICT, CITY_SKYLINE, US_CAPITOL]);
    }

    if title.mentions_any(&["environmental", "climate", "disaster", "earthquake"]) {
        return Some(&[NATURE]);
    }

    if title.mentions_any(&["medical", "disease", "health", "aids"]) {
        return Some(&[MEDICAL_SCIENCE]);
    }

    if title.mentions_any(&["music", "concert", "album", "song"]) {
        return Some(if year >= 1980 { &[CONCERT] } else { &[CLASSIC_MUSIC] });
    }

    if title.mentions_any(&["sport", "olympic", "championship", "world cup"]) {
        return Some(&[SPORTS]);
    }

    if title.mentions_any(&["art", "museum", "painting", "exhibition"]) {
        return Some(&[ART_GALLERY]);
    }

    None
}

fn region_topic_images(region: &str, topic: &str, decade: i32) -> Option<&'static [&'static str]> {
    let set: &'static [&'static str] = match (region, topic) {
        ("America", "History") if decade >= 1990 => &[US_CAPITOL, CITY_SKYLINE, WAR_MEMORIAL],
        ("America", "History") => &[WAR_MEMORIAL, CITY_SKYLINE, SPACE_MISSION],
        ("America", "Science") => &[LABORATORY, SPACE_MISSION, MODERN_TECHNOLOGY],
        ("Europe", "History") => &[EUROPEAN_ARCHITECTURE, EUROPEAN_CITY, EUROPEAN_CULTURE],
        ("Asia", "History") => &[ASIAN_LANDSCAPE, ASIAN_CITY, ASIAN_CULTURE],
        ("Africa", "History") => &[AFRICAN_LANDSCAPE, MOSCOW, WAR_MEMORIAL],
        ("Global", "History") => &[HISTORICAL_ARCHIVE, EARTH_FROM_SPACE, MODERN_TECHNOLOGY],
        ("Global", "Science") => &[LABORATORY, EARTH_FROM_SPACE, MEDICAL_SCIENCE],
        _ => return None,
    };
    Some(set)
}

fn decade_region_images(decade: i32, region: &str) -> Option<&'static [&'static str]> {
    let set: &'static [&'static str] = if decade >= 1990 {
        match region {
            "America" => &[US_CAPITOL, WAR_MEMORIAL, CITY_SKYLINE],
            "Europe" => &[EUROPEAN_CITY, EUROPEAN_ARCHITECTURE, EUROPEAN_CULTURE],
            "Global" => &[MODERN_TECHNOLOGY, EARTH_FROM_SPACE, LABORATORY],
            _ => return None,
        }
    } else if decade >= 1900 {
        match region {
            "America" => &[WAR_MEMORIAL, CITY_SKYLINE, SPACE_MISSION],
            "Europe" => &[EUROPEAN_ARCHITECTURE, EUROPEAN_CULTURE, OCEANIA_LANDSCAPE],
            _ => return None,
        }
    } else {
        return None;
    };
    Some(set)
}

fn region_image(region: &str) -> Option<&'static str> {
    match region {
        "Global" => Some(EARTH_FROM_SPACE),
        "America" => Some(US_CAPITOL),
        "Europe" => Some(EUROPEAN_ARCHITECTURE),
        "Asia" => Some(ASIAN_LANDSCAPE),
        "Africa" => Some(AFRICAN_LANDSCAPE),
        "Oceania" => Some(OCEANIA_LANDSCAPE),
        _ => None,
    }
}

fn topic_image(topic: &str) -> Option<&'static str> {
    match topic {
        "History" => Some(HISTORICAL_ARCHIVE),
        "Science" => Some(LABORATORY),
        "Art" => Some(ART_GALLERY),
        "Music" => Some(CONCERT),
        "Sports" => Some(SPORTS),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fallback Result Sets
// ─────────────────────────────────────────────────────────────────────────────

struct FallbackTemplate {
    title: fn(&GenerationParams) -> String,
    short: fn(&GenerationParams) -> String,
    full: fn(&GenerationParams) -> String,
}

const TEMPLATES: [FallbackTemplate; 5] = [
    FallbackTemplate {
        title: |p| format!("Major Events of {}", p.year),
        short: |p| {
            format!(
                "🏛️ Explore the most significant events of {} in {}.\n\nThis year marked important moments in {} that shaped what came next.",
                p.year,
                p.region,
                p.topic.to_lowercase()
            )
        },
        full: |p| {
            format!(
                "Important historical events from {} in the {} region, related to {}.",
                p.year, p.region, p.topic
            )
        },
    },
    FallbackTemplate {
        title: |_| "Secondary Historic Event".to_string(),
        short: |p| {
            format!(
                "📚 Another important event from {}.\n\nIt left a lasting mark on the history of {}.",
                p.year, p.region
            )
        },
        full: |p| format!("Secondary event from {}", p.year),
    },
    FallbackTemplate {
        title: |_| "Noteworthy Development".to_string(),
        short: |p| {
            format!(
                "🌟 A third relevant event from {}.\n\nIt completes the picture of this year.",
                p.year
            )
        },
        full: |p| format!("Third event from {}", p.year),
    },
    FallbackTemplate {
        title: |_| "Cultural Milestone".to_string(),
        short: |p| format!("🎭 Culture and society in {} during {}.", p.region, p.year),
        full: |p| format!("Cultural developments of {} in {}", p.year, p.region),
    },
    FallbackTemplate {
        title: |_| "Lasting Legacy".to_string(),
        short: |p| format!("🔭 How {} still echoes in {} today.", p.year, p.topic.to_lowercase()),
        full: |p| format!("Long-term consequences of {}", p.year),
    },
];

/// Synthesize a deterministic result set used when generation fails outright.
///
/// The first event is primary. `count` is clamped to the supported template range.
pub fn fallback_events(params: &GenerationParams, count: usize) -> Vec<HistoricalEvent> {
    let count = count.clamp(1, TEMPLATES.len());

    TEMPLATES
        .iter()
        .take(count)
        .enumerate()
        .map(|(index, template)| {
            let title = (template.title)(params);
            let image_url = fallback_image(params, &title, index).to_string();
            HistoricalEvent {
                id: format!("{}-fallback-{}", params.year, index + 1),
                short_content: (template.short)(params),
                full_content: (template.full)(params),
                title,
                year: params.year,
                region: params.region.clone(),
                topic: params.topic.clone(),
                image_url: Some(image_url),
                is_primary: index == 0,
            }
        })
        .collect()
}
