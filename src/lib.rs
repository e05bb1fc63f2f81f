// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod clock;
pub mod config;
pub mod cues;
pub mod cursor;
pub mod engine;
pub mod moves;
pub mod runtime;
pub mod session;
pub mod ui;

/// Reference cadence of the external tick source, in milliseconds. The
/// engine recomputes remaining time from absolute timestamps, so this rate
/// bounds display latency, not correctness.
pub const TICK_RATE_MS: u64 = 100;
