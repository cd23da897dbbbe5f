use std::sync::Arc;

use crate::config::Config;
use crate::errors::TripError;
use crate::links::{Annotation, LinkAnnotator};
use crate::parse::{self, Extraction, ItineraryParser, Schedule};
use crate::prompt::{self, PromptCache};
use crate::provider::CompletionClient;
use crate::route::{self, DistanceLookup};
use crate::wire::{ChatMessage, CompletionRequest, CompletionResponse, GeneratedItinerary, TripRequest};

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub prompt: Arc<str>,
    pub itinerary: GeneratedItinerary,
    /// The model answered but no place could be extracted.
    pub extraction_empty: bool,
    pub schedule: Schedule,
    pub links: Vec<Annotation>,
}

impl Recommendation {
    /// Put places, links and schedule entries in `ordered` order. Repeated
    /// names are matched in their original order; anything not named in
    /// `ordered` keeps its place at the end.
    pub fn apply_order(&mut self, ordered: &[String]) {
        self.itinerary.places = arrange(std::mem::take(&mut self.itinerary.places), ordered, |p| p.as_str());
        self.links = arrange(std::mem::take(&mut self.links), ordered, |a| a.name.as_str());
        self.schedule.entries = arrange(std::mem::take(&mut self.schedule.entries), ordered, |e| e.place.as_str());
    }

    /// Request/response pair for artifact saving.
    pub fn artifacts(&self, client: &str, cfg: &Config, req: &TripRequest) -> (CompletionRequest, CompletionResponse) {
        (
            CompletionRequest {
                provider: client.to_string(),
                model: cfg.model.clone(),
                temperature: cfg.temperature,
                max_tokens: cfg.max_tokens,
                messages: vec![ChatMessage::system(prompt::system_prompt()), ChatMessage::user(&self.prompt)],
                trip: req.clone(),
            },
            CompletionResponse {
                text: self.itinerary.raw.clone(),
                places: self.itinerary.places.clone(),
            },
        )
    }
}

fn arrange<T, F>(items: Vec<T>, ordered: &[String], name: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(slots.len());
    for want in ordered {
        let hit = slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|item| name(item) == want.as_str()));
        if let Some(i) = hit {
            out.extend(slots[i].take());
        }
    }
    out.extend(slots.into_iter().flatten());
    out
}

/// Reorder the recommendation by distance from its first place. A failed
/// lookup is logged and leaves the order untouched; returns whether it moved.
pub async fn order_by_distance(rec: &mut Recommendation, lookup: &dyn DistanceLookup) -> bool {
    if rec.itinerary.places.is_empty() {
        return false;
    }
    match route::reorder(rec.itinerary.places.clone(), lookup).await {
        Ok(ordered) => {
            rec.apply_order(&ordered);
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "distance ordering skipped");
            false
        }
    }
}

/// TripRequest → prompt → completion → places → links, start to finish on
/// the calling task. Service errors are returned as-is; nothing is retried.
pub async fn recommend(
    req: &TripRequest,
    cfg: &Config,
    client: &dyn CompletionClient,
    cache: &PromptCache,
) -> Result<Recommendation, TripError> {
    let user_prompt = cache.get_or_build(req);
    tracing::info!(city = %req.city, days = req.days(), client = client.name(), "requesting itinerary");

    let raw = client
        .complete(prompt::system_prompt(), &user_prompt, cfg.temperature, cfg.max_tokens)
        .await?;

    // One reading feeds the place list, the links and the schedule.
    let parser = ItineraryParser::new(cfg.strategy);
    let schedule = parse::schedule(&raw, &parser);
    let extraction = schedule.extraction();
    let extraction_empty = extraction.is_empty();
    match &extraction {
        Extraction::Empty => tracing::warn!(bytes = raw.len(), "no places found in model output"),
        Extraction::Found(p) => tracing::info!(places = p.len(), "places extracted"),
    }

    let places = extraction.into_places();
    let annotator = LinkAnnotator::new(cfg);
    let links = annotator.annotate_all(places.iter().map(String::as_str));

    Ok(Recommendation {
        prompt: user_prompt,
        itinerary: GeneratedItinerary { raw, places },
        extraction_empty,
        schedule,
        links,
    })
}
