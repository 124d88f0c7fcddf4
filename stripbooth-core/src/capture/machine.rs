use crate::foundation::core::{COUNTDOWN_SECONDS, PHOTO_COUNT};

/// Where a capture session currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Initial pause before the first countdown.
    ReadyPause,
    /// Counting down; `remaining` is what the screen shows.
    Counting {
        /// Seconds left before the flash.
        remaining: u32,
    },
    /// Flash is up and the capture lock is held.
    Flashing,
    /// The capture instant has passed; the flash is still up.
    Capturing,
    /// Flash is down; waiting to move to the next slot.
    Advancing,
    /// Every slot holds a photo.
    Complete,
}

impl Phase {
    /// `true` while a flash/capture cycle is in flight.
    pub fn is_locked(self) -> bool {
        matches!(self, Self::Flashing | Self::Capturing | Self::Advancing)
    }
}

/// Events the driver feeds into [`transition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    /// The ready pause has elapsed.
    ReadyElapsed,
    /// One countdown second has elapsed.
    Tick,
    /// Countdown hit zero; raise the flash.
    StartFlash,
    /// Capture instant reached; `captured` reports whether a photo was produced.
    FlashPeak {
        /// A photo was stored for the current slot.
        captured: bool,
    },
    /// Flash duration elapsed.
    FlashEnd,
    /// Post-flash margin elapsed.
    AdvanceDue,
}

/// Full session state: everything a transition depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineState {
    /// Current phase.
    pub phase: Phase,
    /// Slot being filled, `0..=PHOTO_COUNT`.
    pub photo_index: usize,
    /// Whether the in-flight cycle produced a photo.
    pub slot_filled: bool,
}

impl MachineState {
    /// Fresh session in [`Phase::ReadyPause`].
    pub const fn initial() -> Self {
        Self {
            phase: Phase::ReadyPause,
            photo_index: 0,
            slot_filled: false,
        }
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::initial()
    }
}

/// The single transition function of the capture sequence.
///
/// Returns `None` when `input` is not valid in `state`; the caller must leave the state
/// unchanged. In particular `StartFlash` is only accepted from `Counting { remaining: 0 }`, so
/// a second cycle can never start while one is in flight. A slot whose capture failed is
/// counted down again rather than skipped.
pub fn transition(state: MachineState, input: Input, countdown: u32) -> Option<MachineState> {
    let next = match (state.phase, input) {
        (Phase::ReadyPause, Input::ReadyElapsed) => MachineState {
            phase: Phase::Counting {
                remaining: countdown,
            },
            ..state
        },
        (Phase::Counting { remaining }, Input::Tick) if remaining > 0 => MachineState {
            phase: Phase::Counting {
                remaining: remaining - 1,
            },
            ..state
        },
        (Phase::Counting { remaining: 0 }, Input::StartFlash) => MachineState {
            phase: Phase::Flashing,
            slot_filled: false,
            ..state
        },
        (Phase::Flashing, Input::FlashPeak { captured }) => MachineState {
            phase: Phase::Capturing,
            slot_filled: captured,
            ..state
        },
        (Phase::Capturing, Input::FlashEnd) => MachineState {
            phase: Phase::Advancing,
            ..state
        },
        (Phase::Advancing, Input::AdvanceDue) => {
            let photo_index = state.photo_index + usize::from(state.slot_filled);
            let phase = if photo_index >= PHOTO_COUNT {
                Phase::Complete
            } else {
                Phase::Counting {
                    remaining: countdown,
                }
            };
            MachineState {
                phase,
                photo_index,
                slot_filled: false,
            }
        }
        _ => return None,
    };
    Some(next)
}

/// Result of feeding one input to a [`CaptureMachine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The state moved.
    Applied {
        /// State before the input.
        from: MachineState,
        /// State after the input.
        to: MachineState,
    },
    /// The input was not valid here and was dropped.
    Ignored,
}

/// Owned capture state plus the countdown it restarts from.
#[derive(Clone, Debug)]
pub struct CaptureMachine {
    state: MachineState,
    countdown: u32,
}

impl Default for CaptureMachine {
    fn default() -> Self {
        Self::new(COUNTDOWN_SECONDS)
    }
}

impl CaptureMachine {
    /// New machine counting down from `countdown` for every slot.
    pub fn new(countdown: u32) -> Self {
        Self {
            state: MachineState::initial(),
            countdown,
        }
    }

    /// Current state.
    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Slot currently being filled.
    pub fn photo_index(&self) -> usize {
        self.state.photo_index
    }

    /// Feed one input.
    pub fn apply(&mut self, input: Input) -> Step {
        match transition(self.state, input, self.countdown) {
            Some(next) => {
                let from = self.state;
                self.state = next;
                tracing::debug!(
                    ?input,
                    from = ?from.phase,
                    to = ?next.phase,
                    photo_index = next.photo_index,
                    "capture transition"
                );
                Step::Applied { from, to: next }
            }
            None => {
                tracing::debug!(?input, phase = ?self.state.phase, "capture input ignored");
                Step::Ignored
            }
        }
    }

    /// Back to a fresh session.
    pub fn reset(&mut self) {
        self.state = MachineState::initial();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/machine.rs"]
mod tests;
