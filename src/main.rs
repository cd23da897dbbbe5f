use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use uuid::Uuid;

use vibe_trip::cli::Args;
use vibe_trip::config::Config;
use vibe_trip::errors::TripError;
use vibe_trip::likes::{self, LikeCounter, LikeRecord, LikeStore, WebhookSink};
use vibe_trip::prompt::PromptCache;
use vibe_trip::wire::{Party, TripLength, TripRequest};
use vibe_trip::{export, log, pipeline, provider, route, ux};

fn trip_from_args(args: &Args) -> Result<TripRequest, TripError> {
    let days = TripLength::parse_label(&args.trip)?;
    let date = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut req = TripRequest::new(args.city.trim(), date, days)?
        .with_companion(args.companion)
        .with_party(Party {
            adults: args.adults,
            children: args.children,
            infants: args.infants,
            pet: args.pet,
        })
        .with_budget(args.budget);
    for v in &args.vibes {
        req = req.with_vibe(v.as_str());
    }
    for f in &args.foods {
        req = req.with_food(f.as_str());
    }
    for h in &args.hearts {
        req = req.heart(h.as_str());
    }
    Ok(req)
}

async fn run(args: &Args, cfg: &Config) -> anyhow::Result<()> {
    let req = trip_from_args(args)?;
    if req.city.is_empty() {
        println!("📍 추천 도시: 부산, 강릉, 전주, 여수");
    }
    ux::show_request(&req);

    let client = provider::make_client(cfg)?;
    let cache = PromptCache::new();
    let tx = Uuid::new_v4();

    let pb = ux::spinner(args.progress, "AI가 취향 기반 맞춤 일정을 생성 중입니다...");
    let result = pipeline::recommend(&req, cfg, client.as_ref(), &cache).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let mut rec = result?;

    let (saved_req, saved_resp) = rec.artifacts(client.name(), cfg, &req);
    if let Some(saved) = log::save_stage("recommend", &saved_req, &saved_resp, tx, cfg)? {
        log::trace_saved_paths("recommend", &saved);
    }

    // Ordering is best effort: without a key or on a failed lookup the
    // model's order stands and the run continues.
    if args.order_by_distance && !rec.itinerary.places.is_empty() {
        match route::DistanceMatrixClient::new(cfg) {
            Ok(lookup) => {
                if pipeline::order_by_distance(&mut rec, &lookup).await {
                    ux::show_route(&rec.itinerary.places);
                }
            }
            Err(e) => tracing::warn!(error = %e, "distance ordering skipped"),
        }
    }

    ux::show_recommendation(&rec);

    if let Some(dir) = &args.export {
        let path = export::write_text(Path::new(dir), &req, &rec.schedule)
            .with_context(|| format!("export into {dir} failed"))?;
        ux::show_export(&path);
    }

    if !rec.extraction_empty && (args.like || ux::confirm("이 일정이 마음에 드시나요?")) {
        let store = LikeStore::new(Path::new(&cfg.out_dir));
        let counter = LikeCounter::with_count(store.load()?);
        let sink = WebhookSink::from_config(cfg)?;
        let record = LikeRecord::new(&req, &rec.itinerary.raw);
        let total = likes::like(&counter, sink.as_ref(), &record).await?;
        store.save(total)?;
        println!("♥ {total}");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    log::init_tracing(args.debug);

    let cfg = match Config::load(&args) {
        Ok(c) => c,
        Err(e) => {
            ux::show_error(&format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // One user-visible message; typed errors get their friendly form.
            match e.downcast_ref::<TripError>() {
                Some(te) => ux::show_error(&te.user_message()),
                None => ux::show_error(&format!("{e:#}")),
            }
            tracing::debug!(error = ?e, "recommend failed");
            ExitCode::FAILURE
        }
    }
}
