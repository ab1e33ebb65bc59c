use std::path::{Path, PathBuf};

/// One catalog entry. The catalog is loaded once and never mutated by the
/// scheduler; `prompt` and `answer` are presentation payload only.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Item {
    pub id: String,
    pub category: String,
    pub kind: String,
    pub prompt: String,
    pub answer: String,
}

fn get_field(record: &csv::StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").to_string()
}

pub fn load_catalog(path: &Path) -> Result<Vec<Item>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("failed to open {}: {}", path.display(), e))?;

    let mut items = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| format!("CSV parse error in {}: {}", path.display(), e))?;

        let id_raw = get_field(&record, 0);
        let id = if id_raw.trim().is_empty() {
            // Stable only for the life of this process; catalog files are
            // never written back.
            uuid::Uuid::new_v4().to_string()
        } else {
            id_raw
        };

        items.push(Item {
            id,
            category: get_field(&record, 1),
            kind: get_field(&record, 2),
            prompt: get_field(&record, 3),
            answer: get_field(&record, 4),
        });
    }
    Ok(items)
}

/// Distinct categories in catalog order-independent (sorted) form, used as
/// the default interleaving configuration.
pub fn distinct_categories(catalog: &[Item]) -> Vec<String> {
    let set: std::collections::BTreeSet<&String> = catalog.iter().map(|i| &i.category).collect();
    set.into_iter().cloned().collect()
}

pub fn distinct_kinds(catalog: &[Item]) -> Vec<String> {
    let set: std::collections::BTreeSet<&String> = catalog.iter().map(|i| &i.kind).collect();
    set.into_iter().cloned().collect()
}

pub fn discover_files(paths: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for p in paths {
        let path = PathBuf::from(p);
        if path.is_dir() {
            collect_csv_recursive(&path, &mut files);
        } else if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files
}

fn collect_csv_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_csv_recursive(&path, files);
        } else if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }
}
