// Session assembly pipeline: due-set selection, cross-category
// interleaving, and the due-first merge with dedup and truncation.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::item::Item;
use crate::progress::Progress;

/// Session size used when the caller does not ask for one.
pub const DEFAULT_SESSION_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("session size must be at least 1")]
    ZeroSessionSize,
    #[error("no categories configured")]
    NoCategories,
    #[error("no kinds configured")]
    NoKinds,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub target_size: usize,
    pub categories: Vec<String>,
    pub kinds: Vec<String>,
}

impl SessionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.target_size == 0 {
            return Err(ConfigError::ZeroSessionSize);
        }
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        if self.kinds.is_empty() {
            return Err(ConfigError::NoKinds);
        }
        Ok(())
    }
}

/// Items whose scheduled review date has passed, most overdue first, ties
/// broken by id. Items never reviewed have no state and are not due; first
/// exposure is the interleaver's job.
pub fn select_due<'a>(catalog: &'a [Item], progress: &Progress, today: NaiveDate) -> Vec<&'a Item> {
    let mut due: Vec<(&Item, NaiveDate)> = catalog
        .iter()
        .filter_map(|item| {
            let next_due = progress.get(&item.id)?.next_due?;
            (next_due <= today).then_some((item, next_due))
        })
        .collect();
    due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.id.cmp(&b.0.id)));
    due.into_iter().map(|(item, _)| item).collect()
}

fn take_next<'a>(
    group: &[&'a Item],
    cursor: &mut usize,
    emitted: &HashSet<&str>,
) -> Option<&'a Item> {
    while *cursor < group.len() {
        let item = group[*cursor];
        *cursor += 1;
        if !emitted.contains(item.id.as_str()) {
            return Some(item);
        }
    }
    None
}

/// Round-robin mix across category and kind partitions of the catalog.
///
/// Step `i` draws the next unseen item from the category group `i mod
/// |categories|`, then from the kind group `i mod |kinds|`. Exhausted
/// groups are skipped; the walk ends once `count` distinct items are out or
/// a full round of group visits yields nothing. Output depends only on
/// catalog order and the supplied lists, so identical inputs always
/// produce identical sequences.
pub fn interleave<'a>(
    catalog: &'a [Item],
    categories: &[String],
    kinds: &[String],
    count: usize,
) -> Result<Vec<&'a Item>, ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::NoCategories);
    }
    if kinds.is_empty() {
        return Err(ConfigError::NoKinds);
    }

    let category_groups: Vec<Vec<&Item>> = categories
        .iter()
        .map(|c| catalog.iter().filter(|item| item.category == *c).collect())
        .collect();
    let kind_groups: Vec<Vec<&Item>> = kinds
        .iter()
        .map(|k| catalog.iter().filter(|item| item.kind == *k).collect())
        .collect();

    let mut category_cursors = vec![0usize; category_groups.len()];
    let mut kind_cursors = vec![0usize; kind_groups.len()];
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut out: Vec<&Item> = Vec::new();

    // After max(|categories|, |kinds|) consecutive steps with no emission,
    // every group has been visited unchanged: all are exhausted.
    let max_idle = category_groups.len().max(kind_groups.len());
    let mut idle_steps = 0;
    let mut step = 0usize;

    while out.len() < count && idle_steps < max_idle {
        let mut progressed = false;

        let ci = step % category_groups.len();
        if let Some(item) = take_next(&category_groups[ci], &mut category_cursors[ci], &emitted) {
            emitted.insert(item.id.as_str());
            out.push(item);
            progressed = true;
        }

        if out.len() < count {
            let ki = step % kind_groups.len();
            if let Some(item) = take_next(&kind_groups[ki], &mut kind_cursors[ki], &emitted) {
                emitted.insert(item.id.as_str());
                out.push(item);
                progressed = true;
            }
        }

        idle_steps = if progressed { 0 } else { idle_steps + 1 };
        step += 1;
    }

    Ok(out)
}

/// Assembles one session: due items first (truncated to the target size),
/// then interleaved fill for the remainder. Fill items that duplicate a due
/// item are dropped, so the plan never repeats an id. A plan shorter than
/// the target is a valid outcome, not an error.
pub fn plan<'a>(
    catalog: &'a [Item],
    progress: &Progress,
    config: &SessionConfig,
    today: NaiveDate,
) -> Result<Vec<&'a Item>, ConfigError> {
    config.validate()?;

    let mut session = select_due(catalog, progress, today);
    session.truncate(config.target_size);

    if session.len() < config.target_size {
        let fill = interleave(
            catalog,
            &config.categories,
            &config.kinds,
            config.target_size - session.len(),
        )?;
        let due_ids: HashSet<&str> = session.iter().map(|item| item.id.as_str()).collect();
        session.extend(
            fill.into_iter()
                .filter(|item| !due_ids.contains(item.id.as_str())),
        );
    }

    session.truncate(config.target_size);
    Ok(session)
}
