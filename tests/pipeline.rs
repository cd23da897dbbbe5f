use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use vibe_trip::cli::ProviderKind;
use vibe_trip::config::Config;
use vibe_trip::errors::TripError;
use vibe_trip::parse::Strategy;
use vibe_trip::pipeline::{order_by_distance, recommend};
use vibe_trip::prompt::{self, PromptCache};
use vibe_trip::provider::{self, sample::SAMPLE_ITINERARY, CompletionClient};
use vibe_trip::route::DistanceLookup;
use vibe_trip::wire::TripRequest;
use vibe_trip::export;

/// Replays canned text and remembers what it was asked.
struct Scripted {
    reply: Result<String, String>,
    calls: Mutex<Vec<(String, String, f32, u32)>>,
}

impl Scripted {
    fn ok(text: &str) -> Self {
        Self { reply: Ok(text.to_string()), calls: Mutex::new(Vec::new()) }
    }

    fn failing(msg: &str) -> Self {
        Self { reply: Err(msg.to_string()), calls: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl CompletionClient for Scripted {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, TripError> {
        self.calls
            .lock()
            .push((system.to_string(), user.to_string(), temperature, max_tokens));
        self.reply.clone().map_err(TripError::Service)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn busan() -> TripRequest {
    TripRequest::new("부산", NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(), 2)
        .unwrap()
        .with_budget(300_000)
}

#[tokio::test]
async fn full_pipeline_extracts_places_and_links() {
    let client = Scripted::ok(SAMPLE_ITINERARY);
    let cfg = Config::default();
    let cache = PromptCache::new();

    let rec = recommend(&busan(), &cfg, &client, &cache).await.unwrap();

    assert!(!rec.extraction_empty);
    assert_eq!(
        rec.itinerary.places,
        vec!["감천문화마을", "부산국밥 거리", "해운대 루프탑", "광안리 포장마차", "광안대교"]
    );
    assert_eq!(rec.links.len(), 5);
    assert_eq!(rec.links[0].name, "감천문화마을");
    assert!(rec.links.iter().all(|l| l.static_map.is_none()));
    assert_eq!(rec.schedule.entries.len(), 5);
    assert_eq!(rec.schedule.entries[4].section, "야경");

    let calls = client.calls.lock();
    assert_eq!(calls.len(), 1);
    let (system, user, temperature, max_tokens) = &calls[0];
    assert_eq!(system, prompt::system_prompt());
    assert_eq!(user, &prompt::build(&busan()));
    assert_eq!(*temperature, 0.7);
    assert_eq!(*max_tokens, cfg.max_tokens);
}

#[tokio::test]
async fn description_first_strategy_is_configurable() {
    let client = Scripted::ok("경복궁 - 서울의 대표 고궁");
    let cfg = Config { strategy: Strategy::DescriptionFirst, ..Config::default() };
    let rec = recommend(&busan(), &cfg, &client, &PromptCache::new()).await.unwrap();
    assert_eq!(rec.itinerary.places, vec!["서울의 대표 고궁"]);
}

#[tokio::test]
async fn empty_reply_degrades_to_no_places_without_error() {
    let client = Scripted::ok("");
    let rec = recommend(&busan(), &Config::default(), &client, &PromptCache::new())
        .await
        .unwrap();
    assert!(rec.extraction_empty);
    assert!(rec.itinerary.places.is_empty());
    assert!(rec.links.is_empty());
    assert!(rec.schedule.is_empty());
}

#[tokio::test]
async fn service_error_surfaces_once_without_retry() {
    let client = Scripted::failing("503 upstream");
    let err = recommend(&busan(), &Config::default(), &client, &PromptCache::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TripError::Service(ref m) if m.contains("503")));
    assert_eq!(client.calls.lock().len(), 1);
}

#[tokio::test]
async fn repeated_requests_reuse_the_memoized_prompt() {
    let client = Scripted::ok(SAMPLE_ITINERARY);
    let cache = PromptCache::new();
    let a = recommend(&busan(), &Config::default(), &client, &cache).await.unwrap();
    let b = recommend(&busan(), &Config::default(), &client, &cache).await.unwrap();
    assert_eq!(a.prompt.as_bytes(), b.prompt.as_bytes());
    assert_eq!(cache.len(), 1);
    let calls = client.calls.lock();
    assert_eq!(calls[0].1, calls[1].1);
}

#[tokio::test]
async fn sample_provider_runs_offline_and_exports() {
    let cfg = Config { provider: ProviderKind::Sample, ..Config::default() };
    let client = provider::make_client(&cfg).unwrap();
    let rec = recommend(&busan(), &cfg, client.as_ref(), &PromptCache::new()).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = export::write_text(dir.path(), &busan(), &rec.schedule).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    assert_eq!(text.lines().next(), Some("1일차 아침: 감천문화마을"));
    assert_eq!(text.lines().count(), 5);
}

#[tokio::test]
async fn missing_llm_key_fails_at_call_time() {
    let cfg = Config { provider: ProviderKind::OpenAI, openai_api_key: None, ..Config::default() };
    assert!(matches!(provider::make_client(&cfg), Err(TripError::Configuration(_))));
}

const BULLETED: &str = "1일차\n- 아침: 감천문화마을 - 골목 산책\n- 점심: 부산국밥 거리 - 국밥\n아침: 해운대 루프탑 - 카페";

#[tokio::test]
async fn bulleted_reply_keeps_places_links_and_schedule_aligned() {
    let client = Scripted::ok(BULLETED);
    let rec = recommend(&busan(), &Config::default(), &client, &PromptCache::new())
        .await
        .unwrap();

    let expected = vec!["감천문화마을", "부산국밥 거리", "해운대 루프탑"];
    assert!(!rec.extraction_empty);
    assert_eq!(rec.itinerary.places, expected);
    let link_names: Vec<&str> = rec.links.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(link_names, expected);
    let scheduled: Vec<&str> = rec.schedule.entries.iter().map(|e| e.place.as_str()).collect();
    assert_eq!(scheduled, expected);
}

/// Distances from the first place, in the order asked.
struct Distances(Vec<Option<u64>>);

#[async_trait]
impl DistanceLookup for Distances {
    async fn distances_from(&self, _origin: &str, _destinations: &[String]) -> Result<Vec<Option<u64>>, TripError> {
        Ok(self.0.clone())
    }
}

struct Unreachable;

#[async_trait]
impl DistanceLookup for Unreachable {
    async fn distances_from(&self, _origin: &str, _destinations: &[String]) -> Result<Vec<Option<u64>>, TripError> {
        Err(TripError::Service("distance matrix status OVER_QUERY_LIMIT".into()))
    }
}

#[tokio::test]
async fn distance_order_reaches_links_schedule_and_export() {
    let client = Scripted::ok(SAMPLE_ITINERARY);
    let mut rec = recommend(&busan(), &Config::default(), &client, &PromptCache::new())
        .await
        .unwrap();

    // From 감천문화마을: 부산국밥 거리, 해운대 루프탑, 광안리 포장마차, 광안대교.
    let lookup = Distances(vec![Some(9_000), Some(20_000), None, Some(1_000)]);
    assert!(order_by_distance(&mut rec, &lookup).await);

    let expected = vec!["감천문화마을", "광안대교", "부산국밥 거리", "해운대 루프탑", "광안리 포장마차"];
    assert_eq!(rec.itinerary.places, expected);
    let link_names: Vec<&str> = rec.links.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(link_names, expected);
    let scheduled: Vec<&str> = rec.schedule.entries.iter().map(|e| e.place.as_str()).collect();
    assert_eq!(scheduled, expected);
    assert_eq!(rec.schedule.entries[1].section, "야경");

    let dir = tempfile::tempdir().unwrap();
    let path = export::write_text(dir.path(), &busan(), &rec.schedule).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    assert_eq!(text.lines().nth(1), Some("1일차 야경: 광안대교"));
}

#[tokio::test]
async fn failed_distance_lookup_keeps_the_model_order() {
    let client = Scripted::ok(SAMPLE_ITINERARY);
    let mut rec = recommend(&busan(), &Config::default(), &client, &PromptCache::new())
        .await
        .unwrap();
    let before = rec.clone();

    assert!(!order_by_distance(&mut rec, &Unreachable).await);
    assert_eq!(rec.itinerary.places, before.itinerary.places);
    assert_eq!(rec.links, before.links);
    assert_eq!(rec.schedule, before.schedule);
}
