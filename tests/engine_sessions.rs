use std::time::{Duration, Instant};

use spar::engine::SessionEngine;
use spar::session::{Direction, Move, Phase, SessionConfig, SessionEvent};

/// Integration tests for whole training sessions. The engine takes `now` as
/// a parameter, so these drive hours of session time through the reference
/// 100ms tick cadence without sleeping.

fn mv(text: &str, pause: u32) -> Move {
    Move {
        text: text.into(),
        base_pause_ms: pause,
        direction: Direction::Pulse,
        tilt_magnitude: 0.5,
    }
}

fn config(round_ms: u32, rest_ms: u32, rounds: u32, speed: f32) -> SessionConfig {
    SessionConfig {
        round_duration_ms: round_ms,
        rest_duration_ms: rest_ms,
        total_rounds: rounds,
        speed_multiplier: speed,
        moves: vec![mv("A", 1_000), mv("B", 1_000)],
    }
}

/// Tick every 100ms from `from_ms` through `to_ms` (inclusive, offsets from
/// `t0`), collecting every event.
fn drive(
    engine: &mut SessionEngine,
    t0: Instant,
    from_ms: u64,
    to_ms: u64,
) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    let mut at = from_ms;
    while at <= to_ms {
        events.extend(engine.tick(t0 + Duration::from_millis(at)));
        at += 100;
    }
    events
}

#[test]
fn round_ends_into_rest_after_exactly_the_round_duration() {
    let t0 = Instant::now();
    let mut engine = SessionEngine::new(config(60_000, 30_000, 2, 1.0)).unwrap();
    engine.start(t0);

    let events = drive(&mut engine, t0, 100, 59_900);
    assert!(events
        .iter()
        .all(|e| matches!(e, SessionEvent::MoveAdvanced(_))));
    assert_eq!(engine.phase(), Phase::RoundActive);
    assert_eq!(engine.current_round(), 0);

    let events = drive(&mut engine, t0, 60_000, 60_000);
    assert_eq!(engine.phase(), Phase::RestActive);
    assert_eq!(engine.current_round(), 1);
    assert!(events.contains(&SessionEvent::RoundEnded(1)));
    assert!(events.contains(&SessionEvent::PhaseEntered {
        phase: Phase::RestActive,
        round: 1
    }));
}

#[test]
fn last_round_ends_into_complete() {
    let t0 = Instant::now();
    let mut engine = SessionEngine::new(config(60_000, 30_000, 1, 1.0)).unwrap();
    engine.start(t0);

    let events = drive(&mut engine, t0, 100, 60_000);
    assert_eq!(engine.phase(), Phase::Complete);
    assert_eq!(engine.current_round(), 1);
    assert!(events.contains(&SessionEvent::SessionCompleted));

    let snap = engine.snapshot(t0 + Duration::from_millis(60_000));
    assert!(snap.is_complete);
    assert!(snap.is_paused);
}

#[test]
fn rest_returns_to_a_full_round_at_move_zero() {
    let t0 = Instant::now();
    let mut engine = SessionEngine::new(config(60_000, 30_000, 2, 1.0)).unwrap();
    engine.start(t0);
    drive(&mut engine, t0, 100, 60_000);
    assert_eq!(engine.phase(), Phase::RestActive);

    let events = drive(&mut engine, t0, 60_100, 90_000);
    assert_eq!(engine.phase(), Phase::RoundActive);
    assert!(events.contains(&SessionEvent::RestEnded));

    let snap = engine.snapshot(t0 + Duration::from_millis(90_000));
    assert_eq!(snap.move_index, 0);
    assert_eq!(snap.remaining_ms, 60_000);
    assert_eq!(snap.current_round, 1);
}

#[test]
fn pause_preserves_remaining_time_regardless_of_wall_clock() {
    let t0 = Instant::now();
    let mut engine = SessionEngine::new(config(60_000, 30_000, 2, 1.0)).unwrap();
    engine.start(t0);
    drive(&mut engine, t0, 100, 25_300);

    engine.toggle_pause(t0 + Duration::from_millis(25_300));

    // An hour passes in the real world; ticks keep arriving.
    let much_later = 25_300 + 3_600_000;
    drive(&mut engine, t0, 25_400, 26_000);
    let snap = engine.snapshot(t0 + Duration::from_millis(much_later));
    assert_eq!(snap.remaining_ms, 60_000 - 25_300);

    engine.toggle_pause(t0 + Duration::from_millis(much_later));
    let snap = engine.snapshot(t0 + Duration::from_millis(much_later));
    assert_eq!(snap.remaining_ms, 60_000 - 25_300);

    // The phase still runs its full course from the re-based clock.
    drive(&mut engine, t0, much_later, much_later + 34_600);
    assert_eq!(engine.phase(), Phase::RoundActive);
    drive(
        &mut engine,
        t0,
        much_later + 34_700,
        much_later + 34_700,
    );
    assert_eq!(engine.phase(), Phase::RestActive);
}

#[test]
fn complete_is_terminal_and_silent() {
    let t0 = Instant::now();
    let mut engine = SessionEngine::new(config(60_000, 30_000, 1, 1.0)).unwrap();
    engine.start(t0);
    drive(&mut engine, t0, 100, 60_000);
    assert_eq!(engine.phase(), Phase::Complete);

    let before = engine.snapshot(t0 + Duration::from_millis(60_000));
    let events = drive(&mut engine, t0, 60_100, 120_000);
    assert!(events.is_empty());
    assert!(engine
        .toggle_pause(t0 + Duration::from_millis(120_000))
        .is_empty());
    let after = engine.snapshot(t0 + Duration::from_millis(60_000));
    assert_eq!(before, after);
}

#[test]
fn moves_cycle_on_their_own_cadence_and_never_during_rest() {
    let t0 = Instant::now();
    // 1000ms base pause at 2.0x: an advance every 500ms of active time.
    let mut engine = SessionEngine::new(config(10_000, 5_000, 2, 2.0)).unwrap();
    engine.start(t0);

    let events = drive(&mut engine, t0, 100, 9_900);
    let advances = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::MoveAdvanced(_)))
        .count();
    // Advances land at 500, 1000, ..., 9500.
    assert_eq!(advances, 19);

    // Round ends at 10_000; rest runs to 15_000 with ticks still arriving.
    let events = drive(&mut engine, t0, 10_000, 14_900);
    assert_eq!(engine.phase(), Phase::RestActive);
    assert!(!events
        .iter()
        .any(|e| matches!(e, SessionEvent::MoveAdvanced(_))));
}

#[test]
fn round_counter_never_exceeds_total_rounds() {
    let t0 = Instant::now();
    let mut engine = SessionEngine::new(config(5_000, 2_000, 3, 1.0)).unwrap();
    engine.start(t0);

    let mut max_round = 0;
    for at in (100..=120_000).step_by(100) {
        engine.tick(t0 + Duration::from_millis(at));
        max_round = max_round.max(engine.current_round());
        assert!(engine.current_round() <= 3);
    }
    assert_eq!(max_round, 3);
    assert_eq!(engine.phase(), Phase::Complete);
}

#[test]
fn two_round_example_scenario_plays_out_exactly() {
    // 2:00 rounds, 0:30 rest, 2 rounds, 1.0x.
    let t0 = Instant::now();
    let mut engine = SessionEngine::new(config(120_000, 30_000, 2, 1.0)).unwrap();
    engine.start(t0);

    drive(&mut engine, t0, 100, 120_000);
    assert_eq!(engine.phase(), Phase::RestActive);
    assert_eq!(engine.current_round(), 1);

    drive(&mut engine, t0, 120_100, 150_000);
    assert_eq!(engine.phase(), Phase::RoundActive);
    assert_eq!(engine.current_round(), 1);
    let snap = engine.snapshot(t0 + Duration::from_millis(150_000));
    assert_eq!(snap.move_index, 0);
    assert_eq!(snap.remaining_ms, 120_000);

    drive(&mut engine, t0, 150_100, 270_000);
    assert_eq!(engine.phase(), Phase::Complete);
    assert_eq!(engine.current_round(), 2);
}

#[test]
fn forced_pause_interrupts_and_only_the_user_resumes() {
    let t0 = Instant::now();
    let mut engine = SessionEngine::new(config(60_000, 30_000, 2, 1.0)).unwrap();
    engine.start(t0);
    drive(&mut engine, t0, 100, 10_000);

    let events = engine.on_external_interrupt(t0 + Duration::from_millis(10_050));
    assert_eq!(events, vec![SessionEvent::Interrupted]);
    assert!(engine.is_paused());

    // Focus returning does not restart the clocks.
    engine.on_external_resume_allowed();
    assert!(engine.is_paused());
    let events = drive(&mut engine, t0, 10_100, 20_000);
    assert!(events.is_empty());

    engine.toggle_pause(t0 + Duration::from_millis(20_000));
    assert!(!engine.is_paused());
    let snap = engine.snapshot(t0 + Duration::from_millis(20_000));
    assert_eq!(snap.remaining_ms, 60_000 - 10_050);
}
