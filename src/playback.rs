use std::time::Duration;

use crate::step::Step;

pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 2.0;

/// Configuration for timed playback of a trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Playback speed multiplier, clamped to `MIN_SPEED..=MAX_SPEED`.
    pub speed: f64,
    /// Pause between steps at speed 1.0.
    pub step_delay: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            step_delay: Duration::from_millis(500),
        }
    }
}

/// Cursor over an already-computed trace.
///
/// All mutation goes through the transition methods; nothing here runs the
/// simulation, so seeking in either direction is just moving an index.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    steps: Vec<Step>,
    current: usize,
    playing: bool,
    speed: f64,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            current: 0,
            playing: false,
            speed: 1.0,
        }
    }
}

impl Playback {
    /// Paused at the first step.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Discard the current trace and start over on `steps`. Speed is kept.
    pub fn load(&mut self, steps: Vec<Step>) {
        self.steps = steps;
        self.current = 0;
        self.playing = false;
    }

    /// Back to the empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_at_end(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    /// Start advancing on [`Playback::tick`]. Has no effect at the last step.
    pub fn play(&mut self) {
        self.playing = !self.is_at_end();
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn step_forward(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    pub fn step_back(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Jump to `index`, clamped to the trace.
    pub fn seek(&mut self, index: usize) {
        self.current = index.min(self.steps.len().saturating_sub(1));
    }

    /// Non-finite speeds are ignored.
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() {
            self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        }
    }

    /// Advance one step if playing. Playback pauses itself on reaching the
    /// last step. Returns the newly revealed step.
    pub fn tick(&mut self) -> Option<&Step> {
        if !self.playing {
            return None;
        }
        if self.is_at_end() {
            self.playing = false;
            return None;
        }
        self.current += 1;
        if self.is_at_end() {
            self.playing = false;
        }
        self.steps.get(self.current)
    }

    /// Wall-clock pause before the next tick at the current speed.
    pub fn delay(&self, base: Duration) -> Duration {
        base.div_f64(self.speed)
    }
}
