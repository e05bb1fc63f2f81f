use serde::Deserialize;
use thiserror::Error;

/// Discrete speed settings offered to the user. The multiplier divides each
/// move's base pause, so 2.0 presents moves twice as fast.
pub const SPEED_STEPS: [f32; 5] = [1.0, 1.5, 2.0, 2.5, 3.0];

pub fn is_supported_speed(value: f32) -> bool {
    SPEED_STEPS.iter().any(|s| (s - value).abs() < f32::EPSILON)
}

/// Next step up/down from `current`, clamped at the ends of the range.
pub fn speed_step(current: f32, up: bool) -> f32 {
    let idx = SPEED_STEPS
        .iter()
        .position(|s| (s - current).abs() < f32::EPSILON)
        .unwrap_or(0);
    let idx = if up {
        (idx + 1).min(SPEED_STEPS.len() - 1)
    } else {
        idx.saturating_sub(1)
    };
    SPEED_STEPS[idx]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    Pulse,
}

/// A single prompt shown during a round: the text to display, how long it
/// stays up at 1.0x speed, and how the UI should lean into it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Move {
    pub text: String,
    pub base_pause_ms: u32,
    pub direction: Direction,
    pub tilt_magnitude: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RoundActive,
    RestActive,
    Complete,
}

/// Immutable parameters of one session instance. Replacing the config
/// replaces the whole session; it is never patched in place.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub round_duration_ms: u32,
    pub rest_duration_ms: u32,
    pub total_rounds: u32,
    pub speed_multiplier: f32,
    pub moves: Vec<Move>,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.moves.is_empty() {
            return Err(SessionError::EmptyMoves);
        }
        if self.round_duration_ms == 0 || self.rest_duration_ms == 0 || self.total_rounds == 0 {
            return Err(SessionError::NonPositiveDuration);
        }
        if !is_supported_speed(self.speed_multiplier) {
            return Err(SessionError::UnsupportedSpeed(self.speed_multiplier));
        }
        Ok(())
    }
}

/// Notifications handed to cue/UI consumers. Fire-and-forget: the engine
/// never waits on a consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseEntered { phase: Phase, round: u32 },
    MoveAdvanced(Move),
    RoundEnded(u32),
    RestEnded,
    SessionCompleted,
    /// Forced pause from the host; audio consumers stop immediately.
    Interrupted,
}

/// Read-only view of the session for rendering. Assembled on demand; no
/// external writer ever touches engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub current_round: u32,
    pub total_rounds: u32,
    pub remaining_ms: u64,
    pub move_index: usize,
    pub current_move: Move,
    pub speed_multiplier: f32,
    pub started: bool,
    pub is_paused: bool,
    pub is_complete: bool,
    pub interrupted: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("drill has no moves")]
    EmptyMoves,
    #[error("rounds, round duration and rest duration must all be positive")]
    NonPositiveDuration,
    #[error("speed multiplier {0} is not one of the supported steps")]
    UnsupportedSpeed(f32),
    #[error("speed can only change while paused")]
    NotPaused,
}
