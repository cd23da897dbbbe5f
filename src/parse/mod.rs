use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Which side of the first delimiter on a line holds the candidate place.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// `경복궁 - 서울의 대표 고궁` → `경복궁`
    #[default]
    NameFirst,
    /// `경복궁 - 서울의 대표 고궁` → `서울의 대표 고궁`
    DescriptionFirst,
}

/// Result of a parse: zero places is a distinct outcome, not an empty success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Empty,
    Found(Vec<String>),
}

impl Extraction {
    pub fn len(&self) -> usize {
        match self {
            Extraction::Empty => 0,
            Extraction::Found(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Extraction::Empty)
    }

    pub fn places(&self) -> &[String] {
        match self {
            Extraction::Empty => &[],
            Extraction::Found(v) => v,
        }
    }

    pub fn into_places(self) -> Vec<String> {
        match self {
            Extraction::Empty => Vec::new(),
            Extraction::Found(v) => v,
        }
    }
}

/// Line-oriented place extraction from free model text.
#[derive(Debug, Clone)]
pub struct ItineraryParser {
    pub strategy: Strategy,
    pub delimiter: char,
    pub min_chars: usize,
}

impl Default for ItineraryParser {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl ItineraryParser {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy, delimiter: '-', min_chars: 3 }
    }

    /// Split one line on the first delimiter, returning (before, after) trimmed.
    fn split_line<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        line.split_once(self.delimiter)
            .map(|(before, after)| (before.trim(), after.trim()))
    }

    fn pick<'a>(&self, line: &'a str) -> Option<&'a str> {
        let (before, after) = self.split_line(line)?;
        let candidate = match self.strategy {
            Strategy::NameFirst => before,
            Strategy::DescriptionFirst => after,
        };
        (candidate.chars().count() >= self.min_chars).then_some(candidate)
    }

    /// Lazy candidate stream in source-line order. No dedup.
    pub fn places<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.lines().filter_map(move |line| self.pick(line))
    }

    pub fn parse(&self, text: &str) -> Extraction {
        let found: Vec<String> = self.places(text).map(str::to_string).collect();
        if found.is_empty() {
            Extraction::Empty
        } else {
            Extraction::Found(found)
        }
    }
}

/// One place in the structured schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: Option<u32>,
    pub section: String,
    pub place: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The places in schedule order, as the parser's result type.
    pub fn extraction(&self) -> Extraction {
        if self.entries.is_empty() {
            Extraction::Empty
        } else {
            Extraction::Found(self.entries.iter().map(|e| e.place.clone()).collect())
        }
    }

    pub fn days(&self) -> Vec<u32> {
        let mut days: Vec<u32> = self.entries.iter().filter_map(|e| e.day).collect();
        days.dedup();
        days
    }
}

pub const DEFAULT_SECTION: &str = "일정";

fn day_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:#+\s*)?(?:(\d+)\s*일차|[Dd]ay\s*(\d+))(?:\s*$|\s*[.):\-]|\s+)").expect("day header regex")
    })
}

fn section_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:\[([^\]]+)\]|([^\s:\-\[\]][^:\-\[\]]{0,9}):)\s*(.*)$").expect("section header regex")
    })
}

/// Structured reading of the prompt's format: day headers, `[segment]`
/// headers (or `segment:` prefixes) and `place - description` lines.
pub fn schedule(text: &str, parser: &ItineraryParser) -> Schedule {
    let mut entries = Vec::new();
    let mut day = None;
    let mut section = DEFAULT_SECTION.to_string();

    for raw in text.lines() {
        let line = raw
            .trim()
            .trim_start_matches(['*', '•'])
            .trim_end_matches('*')
            .trim();
        if line.is_empty() {
            continue;
        }
        if let Some(c) = day_header().captures(line) {
            day = c.get(1).or_else(|| c.get(2)).and_then(|m| m.as_str().parse().ok());
            section = DEFAULT_SECTION.to_string();
            continue;
        }

        // Leading bullet hyphens are list markers, not the delimiter.
        let line = line.strip_prefix("- ").unwrap_or(line);
        let mut body = line;
        if let Some(c) = section_header().captures(line) {
            let name = c.get(1).or_else(|| c.get(2)).map(|m| m.as_str().trim()).unwrap_or("");
            if !name.is_empty() {
                section = name.to_string();
                body = c.get(3).map(|m| m.as_str()).unwrap_or("");
            }
        }
        if body.trim().is_empty() {
            continue;
        }

        let Some(place) = parser.pick(body).map(|p| p.trim_matches('*').trim()) else { continue };
        if place.chars().count() < parser.min_chars {
            continue;
        }
        let description = parser
            .split_line(body)
            .map(|(before, after)| match parser.strategy {
                Strategy::NameFirst => after,
                Strategy::DescriptionFirst => before,
            })
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        entries.push(ScheduleEntry {
            day,
            section: section.clone(),
            place: place.to_string(),
            description,
        });
    }

    Schedule { entries }
}
