use colored::Colorize;
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::links::Annotation;
use crate::parse::ScheduleEntry;
use crate::pipeline::Recommendation;
use crate::wire::TripRequest;

pub fn spinner(enabled: bool, msg: &str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Some(pb)
}

pub fn show_request(req: &TripRequest) {
    println!("\n=== {} ===", format!("{} {}일 여행", req.city, req.days()).bold());
    println!(
        "{}  {}  {}  예산 {}원",
        req.date.format("%Y-%m-%d"),
        req.companion.label(),
        req.party.describe(),
        req.budget
    );
}

pub fn show_recommendation(rec: &Recommendation) {
    if rec.extraction_empty {
        println!("\n{}", "일정에서 장소를 찾지 못했습니다. 원문을 그대로 보여드립니다.".yellow().bold());
        println!("{}", rec.itinerary.raw);
        return;
    }

    println!("\n{}", "=== ITINERARY ===".bold());
    let mut last_day = None;
    for e in &rec.schedule.entries {
        if e.day != last_day {
            if let Some(d) = e.day {
                println!("\n{}", format!("{d}일차").green().bold());
            }
            last_day = e.day;
        }
        println!("{}", entry_line(e));
    }

    if !rec.links.is_empty() {
        show_links(&rec.links);
    }
}

fn entry_line(e: &ScheduleEntry) -> String {
    let head = format!("  {}  {}", format!("[{}]", e.section).cyan(), e.place.bold());
    match &e.description {
        Some(desc) => format!("{head}: {desc}"),
        None => head,
    }
}

pub fn show_links(links: &[Annotation]) {
    println!("\n{}", "=== LINKS ===".bold());
    for (i, a) in links.iter().enumerate() {
        println!("{}. {}", i + 1, a.name.bold());
        println!("   {} {}", "map".blue(), a.map.url);
        println!("   {} {}", "img".magenta(), a.image.url);
        if let Some(s) = &a.static_map {
            println!("   {} {}", "static".dimmed(), s.url);
        }
    }
}

pub fn show_route(places: &[String]) {
    println!("\n{}", "=== ROUTE (distance from start) ===".bold());
    println!("{}", places.join(" → "));
}

pub fn show_export(path: &Path) {
    let size = path.metadata().map(|m| m.len()).unwrap_or(0);
    println!(
        "\n{} {} ({})",
        "[EXPORT]".green().bold(),
        path.display(),
        format_size(size, DECIMAL)
    );
}

pub fn show_error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}
