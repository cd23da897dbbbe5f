//! Distance-from-start ordering.
//!
//! Not a route optimizer: the first place stays first and the rest are sorted
//! by their distance from it. A shortest-path tour would need the full
//! pairwise matrix; this only reads the first row.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::errors::TripError;

const DISTANCE_MATRIX: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Distances in meters from `origin` to each destination, `None` when unknown.
#[async_trait]
pub trait DistanceLookup: Send + Sync {
    async fn distances_from(
        &self,
        origin: &str,
        destinations: &[String],
    ) -> Result<Vec<Option<u64>>, TripError>;
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    distance: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: u64,
}

/// Read `rows[0].elements[i].distance.value`, padding to `expected` entries.
fn first_row_distances(body: &str, expected: usize) -> Result<Vec<Option<u64>>, TripError> {
    let parsed: MatrixResponse = serde_json::from_str(body)
        .map_err(|e| TripError::Service(format!("distance matrix parse error: {e}")))?;
    if !parsed.status.is_empty() && parsed.status != "OK" {
        return Err(TripError::Service(format!("distance matrix status {}", parsed.status)));
    }
    let mut out: Vec<Option<u64>> = parsed
        .rows
        .into_iter()
        .next()
        .map(|row| {
            row.elements
                .into_iter()
                .map(|e| e.distance.map(|d| d.value))
                .collect()
        })
        .unwrap_or_default();
    out.resize(expected, None);
    Ok(out)
}

pub struct DistanceMatrixClient {
    api_key: String,
    client: Client,
}

impl DistanceMatrixClient {
    pub fn new(cfg: &Config) -> Result<Self, TripError> {
        let api_key = cfg
            .maps_api_key
            .clone()
            .ok_or_else(|| TripError::Configuration("GOOGLE_MAPS_API_KEY is not set".into()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TripError::Service(format!("http client init failed: {e}")))?;
        Ok(Self { api_key, client })
    }
}

#[async_trait]
impl DistanceLookup for DistanceMatrixClient {
    async fn distances_from(
        &self,
        origin: &str,
        destinations: &[String],
    ) -> Result<Vec<Option<u64>>, TripError> {
        if destinations.is_empty() {
            return Ok(Vec::new());
        }
        let dest = destinations.join("|");
        let resp = self
            .client
            .get(DISTANCE_MATRIX)
            .query(&[("origins", origin), ("destinations", dest.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| TripError::Service(format!("distance matrix request failed: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| TripError::Service(format!("distance matrix read failed: {e}")))?;
        if !status.is_success() {
            return Err(TripError::Service(format!("distance matrix error ({status})")));
        }
        first_row_distances(&body, destinations.len())
    }
}

/// Keep `places[0]` first; stable-sort the rest by `distances[i]` (distance
/// of `places[i + 1]` from the start). Unknown distances go last.
pub fn order_from_start(places: &[String], distances: &[Option<u64>]) -> Vec<String> {
    let Some((start, rest)) = places.split_first() else {
        return Vec::new();
    };
    let mut keyed: Vec<(&String, Option<u64>)> = rest
        .iter()
        .enumerate()
        .map(|(i, p)| (p, distances.get(i).copied().flatten()))
        .collect();
    keyed.sort_by_key(|(_, d)| (d.is_none(), d.unwrap_or(0)));

    let mut out = Vec::with_capacity(places.len());
    out.push(start.clone());
    out.extend(keyed.into_iter().map(|(p, _)| p.clone()));
    out
}

/// Look the distances up and reorder. Fewer than three places are returned as-is.
pub async fn reorder(places: Vec<String>, lookup: &dyn DistanceLookup) -> Result<Vec<String>, TripError> {
    if places.len() < 3 {
        return Ok(places);
    }
    let distances = lookup.distances_from(&places[0], &places[1..]).await?;
    tracing::debug!(known = distances.iter().filter(|d| d.is_some()).count(), "distances fetched");
    Ok(order_from_start(&places, &distances))
}
