// Spaced-repetition retention model: a fixed ascending interval ladder
// indexed by the consecutive-correct streak.

use chrono::NaiveDate;

use crate::progress::ReviewState;

/// Days until the next review, indexed by streak. Streaks past the end of
/// the table reuse the longest interval.
pub const INTERVALS_DAYS: [u64; 5] = [1, 3, 7, 14, 30];

/// Highest streak value a correct outcome can reach.
pub const MAX_STREAK: u32 = (INTERVALS_DAYS.len() - 1) as u32;

pub fn interval_days(streak: u32) -> u64 {
    INTERVALS_DAYS[(streak as usize).min(INTERVALS_DAYS.len() - 1)]
}

pub fn next_due_date(last_reviewed: NaiveDate, streak: u32) -> NaiveDate {
    last_reviewed + chrono::Days::new(interval_days(streak))
}

/// Applies one review outcome. Correct bumps the streak (capped at
/// `MAX_STREAK`), incorrect resets it to zero; either way the review date
/// is stamped and the next due date recomputed from the new streak.
pub fn record_outcome(state: ReviewState, correct: bool, today: NaiveDate) -> ReviewState {
    let streak = if correct {
        state.streak.saturating_add(1).min(MAX_STREAK)
    } else {
        0
    };
    ReviewState {
        streak,
        last_reviewed: Some(today),
        next_due: Some(next_due_date(today, streak)),
    }
}
