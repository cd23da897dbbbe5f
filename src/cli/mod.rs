use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::parse::Strategy;
use crate::wire::Companion;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "open-ai", alias = "openai")]
    OpenAI,
    #[value(alias = "anthropic")]
    Anthropic,
    #[value(alias = "ollama")]
    Ollama,
    /// Offline canned itinerary, no network.
    #[value(alias = "sample", alias = "offline")]
    Sample,
}

#[derive(Parser, Debug)]
#[command(name = "vibe_trip", version, about = "AI trip recommender: trip parameters in, annotated itinerary out")]
pub struct Args {
    /// Destination city, e.g. 부산
    #[arg(long)]
    pub city: String,

    /// Departure date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,

    /// Trip length label: 당일치기, 1박2일, 2박3일, 3박4일, or a number of days
    #[arg(long, default_value = "당일치기")]
    pub trip: String,

    #[arg(long, value_enum, default_value_t = Companion::Alone)]
    pub companion: Companion,

    #[arg(long, default_value_t = 1)]
    pub adults: u8,

    #[arg(long, default_value_t = 0)]
    pub children: u8,

    #[arg(long, default_value_t = 0)]
    pub infants: u8,

    #[arg(long, default_value_t = false)]
    pub pet: bool,

    /// Vibe tag (repeatable): 힐링, 핫플, 감성, 자연, 로맨틱 ...
    #[arg(long = "vibe")]
    pub vibes: Vec<String>,

    /// Food tag (repeatable): 한식, 중식, 일식 ...
    #[arg(long = "food")]
    pub foods: Vec<String>,

    /// Hearted food category (repeatable, each occurrence adds weight)
    #[arg(long = "heart")]
    pub hearts: Vec<String>,

    /// Budget in KRW
    #[arg(long, default_value_t = 300_000)]
    pub budget: u64,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Which side of the hyphen holds the place name
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Reorder places by distance from the first one (needs a maps key)
    #[arg(long, default_value_t = false)]
    pub order_by_distance: bool,

    /// Write {city}_{date}_itinerary.txt into this directory
    #[arg(long)]
    pub export: Option<String>,

    /// Like the result without asking
    #[arg(long, default_value_t = false)]
    pub like: bool,

    #[arg(long)]
    pub out_dir: Option<String>,

    #[arg(long, default_value_t = false)]
    pub save_request: bool,

    #[arg(long, default_value_t = false)]
    pub save_response: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Disable the spinner
    #[arg(long = "no-progress", action = clap::ArgAction::SetFalse)]
    pub progress: bool,

    #[arg(long)]
    pub config: Option<String>,
}
