use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::wire::TripRequest;

/// Segments every day of the itinerary is split into, in order.
pub const SEGMENTS: [&str; 5] = ["아침", "점심", "카페", "저녁", "야경"];

const NO_PREFERENCE: &str = "상관없음";

pub fn system_prompt() -> &'static str {
r#"당신은 한국 여행 전문 플래너입니다.
사용자의 조건에 맞춰 실제로 존재하는 장소만 추천하고, 요청한 출력 형식만 그대로 따르세요.
인사말, 요약, 마크다운 표, 코드 블록은 쓰지 마세요."#
}

fn format_contract(days: u32) -> String {
    let mut s = String::new();
    s.push_str("출력 형식 (반드시 지킬 것):\n");
    s.push_str(&format!("- 1일차부터 {days}일차까지 하루씩, 머리줄은 'N일차' 한 줄로 씁니다.\n"));
    s.push_str("- 하루마다 다음 구간을 순서대로 씁니다: ");
    s.push_str(
        &SEGMENTS
            .iter()
            .map(|seg| format!("[{seg}]"))
            .collect::<Vec<_>>()
            .join(", "),
    );
    s.push_str(".\n");
    s.push_str("- 구간 머리줄 바로 아래에 '장소명 - 한 줄 설명' 한 줄만 씁니다.\n");
    s.push_str("- 장소명에는 하이픈(-)을 넣지 말고, 줄 맨 앞에 글머리 기호를 붙이지 마세요.\n\n");
    s.push_str("예시:\n1일차\n");
    for seg in SEGMENTS {
        s.push_str(&format!("[{seg}]\n장소명 - 한 줄 설명\n"));
    }
    s
}

fn join_tags(tags: &BTreeSet<String>) -> String {
    if tags.is_empty() {
        NO_PREFERENCE.to_string()
    } else {
        tags.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn weighted_foods(req: &TripRequest) -> String {
    let w = req.weighted_foods();
    if w.is_empty() {
        return NO_PREFERENCE.to_string();
    }
    w.iter()
        .map(|(cat, n)| format!("{cat}(×{n})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 300000 → "300,000"
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render the user prompt for a trip. Pure: the same request always yields
/// the same bytes. Fields are interpolated as-is, without escaping.
pub fn build(req: &TripRequest) -> String {
    format!(
"{city} 여행 일정을 추천해 주세요.

여행 조건:
- 도시: {city}
- 출발 날짜: {date}
- 여행 기간: {days}일
- 동행: {companion}
- 인원: {party}
- 여행 분위기: {vibes}
- 음식 취향: {foods}
- 마음에 든 음식 종류(가중치): {weights}
- 총 예산: {budget}원

취향 가중치가 높은 음식 종류를 점심과 저녁에 우선 반영하고, 예산 안에서 동선이 자연스럽게 이어지도록 구성하세요.

{contract}",
        city = req.city,
        date = req.date.format("%Y-%m-%d"),
        days = req.days(),
        companion = req.companion.label(),
        party = req.party.describe(),
        vibes = join_tags(&req.vibes),
        foods = join_tags(&req.foods),
        weights = weighted_foods(req),
        budget = thousands(req.budget),
        contract = format_contract(req.days()),
    )
}

/// Memoizes `build` keyed by the whole request.
#[derive(Default)]
pub struct PromptCache {
    inner: Mutex<HashMap<TripRequest, Arc<str>>>,
}

impl PromptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&self, req: &TripRequest) -> Arc<str> {
        let mut map = self.inner.lock();
        if let Some(hit) = map.get(req) {
            tracing::debug!(city = %req.city, "prompt cache hit");
            return hit.clone();
        }
        let built: Arc<str> = Arc::from(build(req));
        map.insert(req.clone(), built.clone());
        built
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
