// Advisory wellness nudges, decoupled from item selection. The timer is
// owned by the session and dies with it.

use chrono::{DateTime, Duration, Timelike, Utc};

/// Minutes of elapsed session time before the one-shot movement nudge.
pub const MOVEMENT_BREAK_AFTER_MIN: i64 = 45;

/// Width of one hydration slot in hours; nudges fire during the even hour
/// that opens each slot.
pub const HYDRATION_SLOT_HOURS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WellnessKind {
    Hydration,
    MovementBreak,
}

impl WellnessKind {
    pub fn message(self) -> &'static str {
        match self {
            WellnessKind::Hydration => "Time to hydrate! Drink a glass of water.",
            WellnessKind::MovementBreak => "Take a movement or mindfulness break!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct WellnessSignal {
    pub kind: WellnessKind,
    pub at: DateTime<Utc>,
}

/// Session-scoped nudge timer. Both triggers are advisory overlays: they
/// can be pending at the same time, and a missed poll only delays a signal.
#[derive(Debug)]
pub struct WellnessTimer {
    started_at: DateTime<Utc>,
    last_hydration_slot: Option<i64>,
    movement_fired: bool,
}

impl WellnessTimer {
    pub fn start(now: DateTime<Utc>) -> WellnessTimer {
        WellnessTimer {
            started_at: now,
            last_hydration_slot: None,
            movement_fired: false,
        }
    }

    /// Checks both triggers against the clock and returns whatever fired.
    /// Hydration fires at most once per slot, movement at most once per
    /// session.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<WellnessSignal> {
        let mut signals = Vec::new();

        let slot = now.timestamp().div_euclid(HYDRATION_SLOT_HOURS * 3600);
        if now.hour() % 2 == 0 && self.last_hydration_slot != Some(slot) {
            self.last_hydration_slot = Some(slot);
            signals.push(WellnessSignal {
                kind: WellnessKind::Hydration,
                at: now,
            });
        }

        if !self.movement_fired
            && now - self.started_at > Duration::minutes(MOVEMENT_BREAK_AFTER_MIN)
        {
            self.movement_fired = true;
            signals.push(WellnessSignal {
                kind: WellnessKind::MovementBreak,
                at: now,
            });
        }

        signals
    }
}
