use rand::seq::SliceRandom;
use rand::Rng;
use std::io::Write;

use crate::session::{Direction, SessionEvent};

/// Where audible cues land. The engine never touches this; the app routes
/// engine events here and the sink does the I/O. A sink must tolerate being
/// silenced at any moment (forced pause).
pub trait CueSink {
    fn bell(&mut self);
    fn silence(&mut self);
}

/// Rings the terminal bell by writing BEL straight to stdout.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl CueSink for TerminalBell {
    fn bell(&mut self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }

    fn silence(&mut self) {
        // BEL has no sustained playback to cut.
    }
}

/// Records cues for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub bells: usize,
    pub silences: usize,
}

impl CueSink for RecordingSink {
    fn bell(&mut self) {
        self.bells += 1;
    }

    fn silence(&mut self) {
        self.silences += 1;
    }
}

const FLASH_SECS: f64 = 0.35;

/// Short visual emphasis after a move advance; decays over ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseFlash {
    direction: Option<Direction>,
    ttl: f64,
}

impl PulseFlash {
    pub fn trigger(&mut self, direction: Direction) {
        self.direction = Some(direction);
        self.ttl = FLASH_SECS;
    }

    pub fn clear(&mut self) {
        self.direction = None;
        self.ttl = 0.0;
    }

    pub fn update(&mut self, dt: f64) {
        if self.ttl > 0.0 {
            self.ttl -= dt;
            if self.ttl <= 0.0 {
                self.clear();
            }
        }
    }

    /// Direction to emphasize right now, if a flash is live.
    pub fn active(&self) -> Option<Direction> {
        self.direction
    }
}

/// Particle in the completion burst.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    vel_x: f64,
    vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    age: f64,
    max_age: f64,
}

impl Particle {
    fn new(x: f64, y: f64) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            x,
            y,
            vel_x: rng.gen_range(-6.0..6.0),
            vel_y: rng.gen_range(-5.0..-1.0),
            symbol: *['*', '+', '•', '✦'].choose(&mut rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += 9.0 * dt;
        self.age += dt;
        self.age < self.max_age
    }
}

const BURST_SECS: f64 = 3.0;
const BURST_PARTICLES: usize = 40;

const BANNERS: [&str; 5] = [
    "SESSION COMPLETE",
    "GOOD WORK",
    "HANDS DOWN, TIME OFF",
    "THAT'S THE BELL",
    "STRONG FINISH",
];

/// Particle burst shown when the final round ends.
#[derive(Debug)]
pub struct CompletionBurst {
    particles: Vec<Particle>,
    banner: &'static str,
    elapsed: f64,
    pub is_active: bool,
}

impl CompletionBurst {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            banner: BANNERS[0],
            elapsed: 0.0,
            is_active: false,
        }
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();
        self.particles.clear();
        self.elapsed = 0.0;
        self.is_active = true;
        self.banner = BANNERS.choose(&mut rng).copied().unwrap_or(BANNERS[0]);

        let center_x = width as f64 / 2.0;
        let center_y = height as f64 / 2.0;
        for _ in 0..BURST_PARTICLES {
            let x = center_x + rng.gen_range(-10.0..10.0);
            let y = center_y + rng.gen_range(-3.0..3.0);
            self.particles.push(Particle::new(x, y));
        }
    }

    pub fn update(&mut self, dt: f64) {
        if !self.is_active {
            return;
        }
        self.elapsed += dt;
        self.particles.retain_mut(|p| p.update(dt));
        if self.elapsed >= BURST_SECS && self.particles.is_empty() {
            self.is_active = false;
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn banner(&self) -> &'static str {
        self.banner
    }
}

impl Default for CompletionBurst {
    fn default() -> Self {
        Self::new()
    }
}

/// Event-stream consumer bundle: bell sink, pulse flash, completion burst.
/// One bell per phase transition (every transition emits exactly one
/// `PhaseEntered`).
#[derive(Debug)]
pub struct Cues<S: CueSink> {
    sink: S,
    pub flash: PulseFlash,
    pub burst: CompletionBurst,
}

impl<S: CueSink> Cues<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            flash: PulseFlash::default(),
            burst: CompletionBurst::new(),
        }
    }

    /// Route a tick's worth of engine events. `width`/`height` size the
    /// completion burst to the terminal.
    pub fn handle(&mut self, events: &[SessionEvent], width: u16, height: u16) {
        for event in events {
            match event {
                SessionEvent::PhaseEntered { .. } => self.sink.bell(),
                SessionEvent::MoveAdvanced(mv) => self.flash.trigger(mv.direction),
                SessionEvent::SessionCompleted => self.burst.start(width, height),
                SessionEvent::Interrupted => {
                    self.sink.silence();
                    self.flash.clear();
                }
                SessionEvent::RoundEnded(_) | SessionEvent::RestEnded => {}
            }
        }
    }

    pub fn on_tick(&mut self, dt: f64) {
        self.flash.update(dt);
        self.burst.update(dt);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
