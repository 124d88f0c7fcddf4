use super::*;

fn run_cycle(m: &mut CaptureMachine, captured: bool) {
    for _ in 0..COUNTDOWN_SECONDS {
        assert!(matches!(m.apply(Input::Tick), Step::Applied { .. }));
    }
    assert!(matches!(m.apply(Input::StartFlash), Step::Applied { .. }));
    assert!(matches!(
        m.apply(Input::FlashPeak { captured }),
        Step::Applied { .. }
    ));
    assert!(matches!(m.apply(Input::FlashEnd), Step::Applied { .. }));
    assert!(matches!(m.apply(Input::AdvanceDue), Step::Applied { .. }));
}

#[test]
fn three_successful_cycles_reach_complete() {
    let mut m = CaptureMachine::default();
    assert_eq!(m.phase(), Phase::ReadyPause);
    m.apply(Input::ReadyElapsed);
    assert_eq!(m.phase(), Phase::Counting { remaining: 3 });

    for expected_index in 1..=PHOTO_COUNT {
        run_cycle(&mut m, true);
        assert_eq!(m.photo_index(), expected_index);
    }
    assert_eq!(m.phase(), Phase::Complete);
}

#[test]
fn ready_pause_ignores_ticks() {
    let mut m = CaptureMachine::default();
    assert_eq!(m.apply(Input::Tick), Step::Ignored);
    assert_eq!(m.apply(Input::StartFlash), Step::Ignored);
    assert_eq!(m.phase(), Phase::ReadyPause);
}

#[test]
fn flash_cannot_start_twice_or_before_zero() {
    let mut m = CaptureMachine::default();
    m.apply(Input::ReadyElapsed);
    assert_eq!(m.apply(Input::StartFlash), Step::Ignored);

    for _ in 0..3 {
        m.apply(Input::Tick);
    }
    assert_eq!(m.apply(Input::Tick), Step::Ignored);
    assert!(matches!(m.apply(Input::StartFlash), Step::Applied { .. }));
    assert!(m.phase().is_locked());

    // Every entry point for a new cycle is closed while one is in flight.
    for input in [Input::StartFlash, Input::Tick, Input::ReadyElapsed, Input::AdvanceDue] {
        assert_eq!(m.apply(input), Step::Ignored, "{input:?}");
    }
    assert_eq!(m.phase(), Phase::Flashing);
}

#[test]
fn sub_events_only_apply_in_order() {
    let mut m = CaptureMachine::default();
    m.apply(Input::ReadyElapsed);
    for _ in 0..3 {
        m.apply(Input::Tick);
    }
    m.apply(Input::StartFlash);
    assert_eq!(m.apply(Input::FlashEnd), Step::Ignored);
    m.apply(Input::FlashPeak { captured: true });
    assert_eq!(m.apply(Input::AdvanceDue), Step::Ignored);
    m.apply(Input::FlashEnd);
    assert_eq!(m.phase(), Phase::Advancing);
}

#[test]
fn failed_capture_retries_the_same_slot() {
    let mut m = CaptureMachine::default();
    m.apply(Input::ReadyElapsed);
    run_cycle(&mut m, true);
    run_cycle(&mut m, false);
    assert_eq!(m.photo_index(), 1);
    assert_eq!(m.phase(), Phase::Counting { remaining: 3 });
    run_cycle(&mut m, true);
    run_cycle(&mut m, true);
    assert_eq!(m.phase(), Phase::Complete);
    assert_eq!(m.photo_index(), PHOTO_COUNT);
}

#[test]
fn complete_is_terminal_until_reset() {
    let mut m = CaptureMachine::default();
    m.apply(Input::ReadyElapsed);
    for _ in 0..PHOTO_COUNT {
        run_cycle(&mut m, true);
    }
    for input in [Input::ReadyElapsed, Input::Tick, Input::StartFlash, Input::AdvanceDue] {
        assert_eq!(m.apply(input), Step::Ignored);
    }
    m.reset();
    assert_eq!(m.state(), MachineState::initial());
}

#[test]
fn transition_is_pure() {
    let s = MachineState {
        phase: Phase::Counting { remaining: 2 },
        photo_index: 1,
        slot_filled: false,
    };
    let a = transition(s, Input::Tick, 3);
    let b = transition(s, Input::Tick, 3);
    assert_eq!(a, b);
    assert_eq!(
        a,
        Some(MachineState {
            phase: Phase::Counting { remaining: 1 },
            ..s
        })
    );
}
