use fs_err as fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::errors::TripError;
use crate::parse::Schedule;
use crate::wire::TripRequest;

/// `{city}_{date}_itinerary.txt`, with characters unsafe in file names replaced.
pub fn file_name(req: &TripRequest) -> String {
    let city: String = req
        .city
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    format!("{}_{}_itinerary.txt", city, req.date.format("%Y-%m-%d"))
}

/// One `"{section}: {place}"` line per entry.
pub fn render_text(schedule: &Schedule) -> String {
    let mut out = String::new();
    for e in &schedule.entries {
        let section = match e.day {
            Some(d) => format!("{d}일차 {}", e.section),
            None => e.section.clone(),
        };
        out.push_str(&format!("{section}: {}\n", e.place));
    }
    out
}

/// Write the text export into `dir`; the file appears atomically.
pub fn write_text(dir: &Path, req: &TripRequest, schedule: &Schedule) -> Result<PathBuf, TripError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(req));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(render_text(schedule).as_bytes())?;
    tmp.flush()?;
    tmp.persist(&path)
        .map_err(|e| TripError::Export(format!("{}: {}", path.display(), e.error)))?;
    tracing::info!(path = %path.display(), entries = schedule.entries.len(), "itinerary exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ScheduleEntry;
    use chrono::NaiveDate;

    fn req(city: &str) -> TripRequest {
        TripRequest::new(city, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(), 2).unwrap()
    }

    fn entry(day: Option<u32>, section: &str, place: &str) -> ScheduleEntry {
        ScheduleEntry { day, section: section.into(), place: place.into(), description: None }
    }

    #[test]
    fn file_name_pattern() {
        assert_eq!(file_name(&req("부산")), "부산_2025-07-01_itinerary.txt");
        assert_eq!(file_name(&req("Seoul/Jongno gu")), "Seoul_Jongno_gu_2025-07-01_itinerary.txt");
    }

    #[test]
    fn lines_are_section_colon_place() {
        let s = Schedule {
            entries: vec![entry(Some(1), "아침", "감천문화마을"), entry(None, "일정", "광안대교")],
        };
        assert_eq!(render_text(&s), "1일차 아침: 감천문화마을\n일정: 광안대교\n");
        assert_eq!(render_text(&Schedule::default()), "");
    }

    #[test]
    fn write_text_creates_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = Schedule { entries: vec![entry(Some(2), "야경", "광안대교")] };
        let path = write_text(dir.path(), &req("부산"), &s).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), "부산_2025-07-01_itinerary.txt");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2일차 야경: 광안대교\n");

        // Overwrites an earlier export of the same trip.
        let again = write_text(dir.path(), &req("부산"), &Schedule::default()).unwrap();
        assert_eq!(again, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
