use std::time::{Duration, Instant};

/// Taps needed to open the admin screen.
pub const ADMIN_TAP_COUNT: u32 = 10;
/// Longest allowed gap between consecutive taps.
pub const ADMIN_TAP_WINDOW: Duration = Duration::from_millis(2000);

/// Hidden admin gesture: tapping the logo repeatedly in quick succession.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TapGate {
    /// Taps counted so far in the current run.
    pub count: u32,
    /// Instant of the previous tap.
    pub last_tap: Option<Instant>,
}

impl TapGate {
    /// Record one tap at `now`; see [`register_tap`].
    pub fn tap(&mut self, now: Instant) -> bool {
        let (next, crossed) = register_tap(*self, now);
        *self = next;
        crossed
    }
}

/// Pure tap transition.
///
/// A tap more than [`ADMIN_TAP_WINDOW`] after the previous one starts a new run. The tap that
/// brings the run to [`ADMIN_TAP_COUNT`] returns `true` and resets the gate.
pub fn register_tap(state: TapGate, now: Instant) -> (TapGate, bool) {
    let in_window = state
        .last_tap
        .is_some_and(|last| now.saturating_duration_since(last) <= ADMIN_TAP_WINDOW);
    let count = if in_window { state.count + 1 } else { 1 };
    if count >= ADMIN_TAP_COUNT {
        tracing::info!("admin gesture recognised");
        return (TapGate::default(), true);
    }
    (
        TapGate {
            count,
            last_tap: Some(now),
        },
        false,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/kiosk/tap_gate.rs"]
mod tests;
