use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::NaiveDate;

/// Per-item review state for one user. Created lazily on first review and
/// mutated only through `retention::record_outcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReviewState {
    pub streak: u32,
    pub last_reviewed: Option<NaiveDate>,
    pub next_due: Option<NaiveDate>,
}

impl ReviewState {
    pub fn new() -> ReviewState {
        ReviewState {
            streak: 0,
            last_reviewed: None,
            next_due: None,
        }
    }
}

impl Default for ReviewState {
    fn default() -> ReviewState {
        ReviewState::new()
    }
}

/// One user's progress snapshot, keyed by item id.
pub type Progress = HashMap<String, ReviewState>;

fn parse_optional_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }
}

/// Loads a progress CSV. A missing file is an empty progress map, not an
/// error; the file only exists once something has been reviewed.
pub fn load_progress(path: &Path) -> Result<Progress, String> {
    if !path.exists() {
        return Ok(Progress::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("failed to open {}: {}", path.display(), e))?;

    let mut progress = Progress::new();
    for result in reader.records() {
        let record = result.map_err(|e| format!("CSV parse error in {}: {}", path.display(), e))?;

        let item_id = record.get(0).unwrap_or("").trim().to_string();
        if item_id.is_empty() {
            continue;
        }
        let streak = record
            .get(1)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);

        progress.insert(
            item_id,
            ReviewState {
                streak,
                last_reviewed: parse_optional_date(record.get(2).unwrap_or("")),
                next_due: parse_optional_date(record.get(3).unwrap_or("")),
            },
        );
    }
    Ok(progress)
}

/// Writes the progress map sorted by item id, so successive saves of the
/// same state produce identical files.
pub fn save_progress(path: &Path, progress: &Progress) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;

    writer
        .write_record(["item_id", "streak", "last_reviewed", "next_due"])
        .map_err(|e| format!("write error: {e}"))?;

    let sorted: BTreeMap<&String, &ReviewState> = progress.iter().collect();
    for (item_id, state) in sorted {
        writer
            .write_record([
                item_id.as_str(),
                &state.streak.to_string(),
                &state
                    .last_reviewed
                    .map_or(String::new(), |d| d.format("%Y-%m-%d").to_string()),
                &state
                    .next_due
                    .map_or(String::new(), |d| d.format("%Y-%m-%d").to_string()),
            ])
            .map_err(|e| format!("write error: {e}"))?;
    }

    writer.flush().map_err(|e| format!("flush error: {e}"))?;
    Ok(())
}
