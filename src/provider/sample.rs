use async_trait::async_trait;

use crate::errors::TripError;

use super::CompletionClient;

/// The Busan example itinerary, in the prompt's output format.
pub const SAMPLE_ITINERARY: &str = "1일차
[아침]
감천문화마을 - 알록달록한 골목을 따라 걷는 아침 산책
[점심]
부산국밥 거리 - 뜨끈한 돼지국밥 한 그릇
[카페]
해운대 루프탑 - 바다가 내려다보이는 루프탑 카페
[저녁]
광안리 포장마차 - 해변 앞에서 즐기는 해산물
[야경]
광안대교 - 조명이 켜진 다리를 보며 마무리";

/// Offline client; ignores the prompt and never fails.
pub struct SampleClient;

#[async_trait]
impl CompletionClient for SampleClient {
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, TripError> {
        Ok(SAMPLE_ITINERARY.to_string())
    }

    fn name(&self) -> &str {
        "sample"
    }
}
