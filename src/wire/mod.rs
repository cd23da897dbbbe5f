use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::TripError;

/// ========================================
/// Trip parameters and generated itinerary
/// ========================================

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Companion {
    Alone,
    Couple,
    Family,
    Friends,
}

impl Companion {
    pub fn label(&self) -> &'static str {
        match self {
            Companion::Alone => "혼자",
            Companion::Couple => "연인",
            Companion::Family => "가족",
            Companion::Friends => "친구",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    pub adults: u8,
    pub children: u8,
    pub infants: u8,
    pub pet: bool,
}

impl Default for Party {
    fn default() -> Self {
        Self { adults: 1, children: 0, infants: 0, pet: false }
    }
}

impl Party {
    pub fn describe(&self) -> String {
        format!(
            "성인 {}, 어린이 {}, 유아 {}, 반려동물 {}",
            self.adults,
            self.children,
            self.infants,
            if self.pet { "있음" } else { "없음" }
        )
    }
}

/// Trip length as offered by the form: `당일치기` or `N박M일`.
pub struct TripLength;

impl TripLength {
    pub fn parse_label(label: &str) -> Result<u32, TripError> {
        let label = label.trim();
        if label == "당일치기" {
            return Ok(1);
        }
        if let Ok(days) = label.parse::<u32>() {
            return if days >= 1 {
                Ok(days)
            } else {
                Err(TripError::InvalidRequest("trip must last at least one day".into()))
            };
        }
        // N박M일: the day count follows the 박 marker.
        let days = label
            .split_once('박')
            .and_then(|(_, rest)| rest.strip_suffix('일'))
            .and_then(|d| d.trim().parse::<u32>().ok())
            .filter(|d| *d >= 1);
        days.ok_or_else(|| TripError::InvalidRequest(format!("unrecognized trip length: {label}")))
    }
}

/// `days` is private so every way in, serde included, goes through the
/// at-least-one-day check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTripRequest")]
pub struct TripRequest {
    pub city: String,
    pub date: NaiveDate,
    days: u32,
    pub companion: Companion,
    pub party: Party,
    pub vibes: BTreeSet<String>,
    pub foods: BTreeSet<String>,
    /// Food category → number of hearted restaurants in it.
    pub food_weights: BTreeMap<String, u32>,
    pub budget: u64,
}

#[derive(Deserialize)]
struct RawTripRequest {
    city: String,
    date: NaiveDate,
    days: u32,
    companion: Companion,
    party: Party,
    #[serde(default)]
    vibes: BTreeSet<String>,
    #[serde(default)]
    foods: BTreeSet<String>,
    #[serde(default)]
    food_weights: BTreeMap<String, u32>,
    budget: u64,
}

impl TryFrom<RawTripRequest> for TripRequest {
    type Error = TripError;

    fn try_from(raw: RawTripRequest) -> Result<Self, Self::Error> {
        let mut req = TripRequest::new(raw.city, raw.date, raw.days)?;
        req.companion = raw.companion;
        req.party = raw.party;
        req.vibes = raw.vibes;
        req.foods = raw.foods;
        req.food_weights = raw.food_weights;
        req.budget = raw.budget;
        Ok(req)
    }
}

impl TripRequest {
    pub const DEFAULT_BUDGET: u64 = 300_000;

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn new(city: impl Into<String>, date: NaiveDate, days: u32) -> Result<Self, TripError> {
        if days == 0 {
            return Err(TripError::InvalidRequest("trip must last at least one day".into()));
        }
        Ok(Self {
            city: city.into(),
            date,
            days,
            companion: Companion::Alone,
            party: Party::default(),
            vibes: BTreeSet::new(),
            foods: BTreeSet::new(),
            food_weights: BTreeMap::new(),
            budget: Self::DEFAULT_BUDGET,
        })
    }

    pub fn with_companion(mut self, companion: Companion) -> Self {
        self.companion = companion;
        self
    }

    pub fn with_party(mut self, party: Party) -> Self {
        self.party = party;
        self
    }

    pub fn with_vibe(mut self, vibe: impl Into<String>) -> Self {
        self.vibes.insert(vibe.into());
        self
    }

    pub fn with_food(mut self, food: impl Into<String>) -> Self {
        self.foods.insert(food.into());
        self
    }

    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    pub fn heart(mut self, category: impl Into<String>) -> Self {
        *self.food_weights.entry(category.into()).or_insert(0) += 1;
        self
    }

    /// Hearted categories, heaviest first, ties by name.
    pub fn weighted_foods(&self) -> Vec<(&str, u32)> {
        let mut v: Vec<(&str, u32)> = self
            .food_weights
            .iter()
            .map(|(k, w)| (k.as_str(), *w))
            .collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        v
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedItinerary {
    pub raw: String,
    pub places: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceLink {
    pub name: String,
    pub url: String,
}

/// Role-tagged chat message sent to the completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self { role: "system".into(), content: content.to_string() }
    }

    pub fn user(content: &str) -> Self {
        Self { role: "user".into(), content: content.to_string() }
    }
}

/// What we asked the model, as saved next to its reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
    pub trip: TripRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub places: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    #[test]
    fn zero_days_rejected() {
        assert!(matches!(
            TripRequest::new("부산", date(), 0),
            Err(TripError::InvalidRequest(_))
        ));
    }

    #[test]
    fn empty_city_is_allowed() {
        let req = TripRequest::new("", date(), 1).unwrap();
        assert_eq!(req.city, "");
        assert_eq!(req.budget, TripRequest::DEFAULT_BUDGET);
    }

    #[test]
    fn trip_length_labels() {
        assert_eq!(TripLength::parse_label("당일치기").unwrap(), 1);
        assert_eq!(TripLength::parse_label("1박2일").unwrap(), 2);
        assert_eq!(TripLength::parse_label("3박4일").unwrap(), 4);
        assert_eq!(TripLength::parse_label("5").unwrap(), 5);
        assert!(TripLength::parse_label("0").is_err());
        assert!(TripLength::parse_label("주말").is_err());
    }

    #[test]
    fn party_description() {
        let party = Party { adults: 2, children: 1, infants: 0, pet: true };
        assert_eq!(party.describe(), "성인 2, 어린이 1, 유아 0, 반려동물 있음");
        assert_eq!(Party::default().describe(), "성인 1, 어린이 0, 유아 0, 반려동물 없음");
    }

    #[test]
    fn hearts_accumulate_and_sort() {
        let req = TripRequest::new("부산", date(), 2)
            .unwrap()
            .heart("해산물")
            .heart("중식")
            .heart("해산물")
            .heart("분식");
        assert_eq!(req.weighted_foods(), vec![("해산물", 2), ("분식", 1), ("중식", 1)]);
    }

    #[test]
    fn deserializing_zero_days_is_rejected() {
        let req = TripRequest::new("부산", date(), 3).unwrap().with_vibe("바다");
        let mut json = serde_json::to_value(&req).unwrap();
        let back: TripRequest = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, req);
        assert_eq!(back.days(), 3);

        json["days"] = serde_json::json!(0);
        let err = serde_json::from_value::<TripRequest>(json).unwrap_err();
        assert!(err.to_string().contains("at least one day"));
    }
}
