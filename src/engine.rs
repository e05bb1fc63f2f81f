use std::time::{Duration, Instant};

use crate::clock::CountdownClock;
use crate::cursor::MoveCursor;
use crate::session::{
    is_supported_speed, Move, Phase, SessionConfig, SessionError, SessionEvent, SessionSnapshot,
};

/// Fight session engine: the phase state machine plus its public lifecycle
/// surface.
///
/// The engine is a pure state transducer: all waiting is expressed as
/// deadlines compared against the `now` passed into `tick`, and every side
/// effect is returned as a `SessionEvent` for consumers to act on. It holds
/// no locks, spawns nothing, and performs no I/O beyond `log` diagnostics.
///
/// A session is created in the ready state: first round loaded, paused,
/// round counter at zero. The round counter increments when a round ends,
/// so the first round plays with `current_round == 0`; displays add one at
/// the UI boundary.
#[derive(Debug)]
pub struct SessionEngine {
    config: SessionConfig,
    phase: Phase,
    current_round: u32,
    clock: CountdownClock,
    cursor: MoveCursor,
    started: bool,
    is_paused: bool,
    is_complete: bool,
    interrupted: bool,
    torn_down: bool,
}

impl SessionEngine {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let mut clock = CountdownClock::new();
        clock.load(Duration::from_millis(config.round_duration_ms as u64));
        Ok(Self {
            config,
            phase: Phase::RoundActive,
            current_round: 0,
            clock,
            cursor: MoveCursor::new(),
            started: false,
            is_paused: true,
            is_complete: false,
            interrupted: false,
            torn_down: false,
        })
    }

    /// Replace the whole session with a fresh ready state for `config`.
    /// Progress is discarded, never migrated.
    pub fn configure(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        *self = Self::new(config)?;
        Ok(())
    }

    /// Leave the ready state and begin the first round.
    pub fn start(&mut self, now: Instant) -> Vec<SessionEvent> {
        if self.torn_down || self.started {
            log::debug!("start ignored: session already started or torn down");
            return Vec::new();
        }
        self.started = true;
        self.is_paused = false;
        self.interrupted = false;
        let remaining = self.clock.remaining(now);
        self.clock.start(now, remaining);
        self.arm_cursor(now);
        vec![SessionEvent::PhaseEntered {
            phase: Phase::RoundActive,
            round: self.current_round,
        }]
    }

    /// User pause/resume. Starts the session if it has not started yet; a
    /// no-op once complete.
    pub fn toggle_pause(&mut self, now: Instant) -> Vec<SessionEvent> {
        if self.torn_down {
            log::debug!("pause toggle ignored after teardown");
            return Vec::new();
        }
        if self.is_complete {
            log::debug!("resume ignored: session is complete");
            return Vec::new();
        }
        if !self.started {
            return self.start(now);
        }
        if self.is_paused {
            self.is_paused = false;
            self.interrupted = false;
            let remaining = self.clock.remaining(now);
            self.clock.start(now, remaining);
            if self.phase == Phase::RoundActive {
                self.arm_cursor(now);
            }
        } else {
            self.freeze(now);
        }
        Vec::new()
    }

    /// Forced pause from host lifecycle (backgrounding) or focus loss.
    /// Audio consumers are told to stop immediately. There is no automatic
    /// resume counterpart; only a later `toggle_pause` resumes.
    pub fn on_external_interrupt(&mut self, now: Instant) -> Vec<SessionEvent> {
        if self.torn_down || self.is_complete {
            return Vec::new();
        }
        self.interrupted = true;
        if !self.is_paused {
            self.freeze(now);
        }
        vec![SessionEvent::Interrupted]
    }

    /// Focus regained / foregrounded. Clears the interrupted marker so the
    /// UI can tell "backgrounded" from "paused by you"; the session itself
    /// stays paused until the user resumes.
    pub fn on_external_resume_allowed(&mut self) {
        self.interrupted = false;
    }

    /// Change the speed multiplier. Only accepted while paused, and only to
    /// one of the discrete steps; takes effect on the next cursor arming,
    /// never retroactively on an in-flight wait.
    pub fn set_speed(&mut self, multiplier: f32) -> Result<(), SessionError> {
        if !self.is_paused {
            log::debug!("speed change ignored while running");
            return Err(SessionError::NotPaused);
        }
        if !is_supported_speed(multiplier) {
            return Err(SessionError::UnsupportedSpeed(multiplier));
        }
        self.config.speed_multiplier = multiplier;
        Ok(())
    }

    /// Advance the engine to `now`. Applies at most one phase transition
    /// and at most one cursor advance; phase events are emitted strictly
    /// before any move-advance event from the same tick.
    pub fn tick(&mut self, now: Instant) -> Vec<SessionEvent> {
        if self.torn_down {
            log::debug!("tick after teardown ignored");
            return Vec::new();
        }
        if self.is_paused || self.is_complete {
            return Vec::new();
        }

        let mut events = Vec::new();
        if self.clock.is_expired(now) {
            match self.phase {
                Phase::RoundActive => self.end_round(now, &mut events),
                Phase::RestActive => self.end_rest(now, &mut events),
                Phase::Complete => {}
            }
        }

        if self.phase == Phase::RoundActive && !self.is_paused && self.cursor.is_due(now) {
            let idx = self.cursor.advance(self.config.moves.len());
            let mv = self.config.moves[idx].clone();
            self.arm_cursor(now);
            events.push(SessionEvent::MoveAdvanced(mv));
        }
        events
    }

    /// Cancel all pending scheduled work. Idempotent; ticks and lifecycle
    /// calls after this produce no events and no state changes.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.is_paused = true;
        self.cursor.cancel();
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current_round: self.current_round,
            total_rounds: self.config.total_rounds,
            remaining_ms: self.clock.remaining(now).as_millis() as u64,
            move_index: self.cursor.index(),
            current_move: self.config.moves[self.cursor.index()].clone(),
            speed_multiplier: self.config.speed_multiplier,
            started: self.started,
            is_paused: self.is_paused,
            is_complete: self.is_complete,
            interrupted: self.interrupted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn current_move(&self) -> &Move {
        &self.config.moves[self.cursor.index()]
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn end_round(&mut self, now: Instant, events: &mut Vec<SessionEvent>) {
        self.current_round += 1;
        events.push(SessionEvent::RoundEnded(self.current_round));
        if self.current_round + 1 > self.config.total_rounds {
            self.phase = Phase::Complete;
            self.is_complete = true;
            self.is_paused = true;
            self.clock.freeze(now);
            self.cursor.cancel();
            events.push(SessionEvent::SessionCompleted);
            events.push(SessionEvent::PhaseEntered {
                phase: Phase::Complete,
                round: self.current_round,
            });
        } else {
            self.phase = Phase::RestActive;
            self.clock
                .start(now, Duration::from_millis(self.config.rest_duration_ms as u64));
            self.cursor.cancel();
            events.push(SessionEvent::PhaseEntered {
                phase: Phase::RestActive,
                round: self.current_round,
            });
        }
    }

    fn end_rest(&mut self, now: Instant, events: &mut Vec<SessionEvent>) {
        self.phase = Phase::RoundActive;
        self.clock
            .start(now, Duration::from_millis(self.config.round_duration_ms as u64));
        self.cursor.rewind();
        events.push(SessionEvent::RestEnded);
        events.push(SessionEvent::PhaseEntered {
            phase: Phase::RoundActive,
            round: self.current_round,
        });
        self.arm_cursor(now);
    }

    fn freeze(&mut self, now: Instant) {
        self.is_paused = true;
        self.clock.freeze(now);
        self.cursor.cancel();
    }

    fn arm_cursor(&mut self, now: Instant) {
        let pace = self.pace_for(&self.config.moves[self.cursor.index()]);
        self.cursor.arm(now, pace);
    }

    fn pace_for(&self, mv: &Move) -> Duration {
        let ms = mv.base_pause_ms as f32 / self.config.speed_multiplier;
        Duration::from_millis(ms.round() as u64)
    }
}
