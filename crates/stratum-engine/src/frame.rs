//! Fixed-timestep frame loop.
//!
//! The [`FrameLoop`] is the clock that drives a [`World`]. Each frame:
//!
//! 1. Key events queued with [`push_input`](FrameLoop::push_input) are
//!    dispatched to the world in arrival order.
//! 2. [`World::update`] runs with the fixed `dt`.
//! 3. The frame counter advances and diagnostics are recorded.
//!
//! A windowed host calls [`advance`](FrameLoop::advance) with the wall time
//! elapsed since its last call; headless runs call
//! [`run_frames`](FrameLoop::run_frames) directly.
//!
//! # Example
//!
//! ```
//! use stratum_engine::prelude::*;
//!
//! let mut frames = FrameLoop::new(World::new(), EngineConfig::default()).unwrap();
//! let layer = frames.world_mut().add_layer();
//! frames
//!     .world_mut()
//!     .spawn_into(layer, Entity::from_shape(Shape::circle((0.0, 0.0), 1.0)))
//!     .unwrap();
//!
//! frames.run_frames(10);
//! assert_eq!(frames.frame_count(), 10);
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use stratum_scene::input::{KeyAction, KeyEvent};
use stratum_scene::world::{World, WorldReport};
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::EngineError;

// ---------------------------------------------------------------------------
// FrameDiagnostics
// ---------------------------------------------------------------------------

/// Timing and activity for the last frame.
#[derive(Debug, Clone, Default)]
pub struct FrameDiagnostics {
    /// Key events dispatched before the update.
    pub inputs: usize,
    /// Wall time spent dispatching input.
    pub input_time: Duration,
    /// Wall time spent in `World::update`.
    pub update_time: Duration,
    /// Total wall time for the frame.
    pub total_time: Duration,
    /// `on_collision` calls across all layers.
    pub collisions: usize,
    /// Entities removed across all layers.
    pub removed: usize,
}

// ---------------------------------------------------------------------------
// FrameLoop
// ---------------------------------------------------------------------------

/// Drives a [`World`] one fixed step at a time.
///
/// Simulation time is `frame_count * fixed_dt`, never an accumulated sum, so
/// it does not drift over long runs.
pub struct FrameLoop {
    world: World,
    config: EngineConfig,
    frame_counter: u64,
    pending_input: VecDeque<(KeyAction, KeyEvent)>,
    /// Wall time not yet consumed by [`advance`](Self::advance).
    accumulator: f64,
    last_diagnostics: FrameDiagnostics,
    last_report: WorldReport,
}

impl FrameLoop {
    /// Wrap `world`. The world's debug flag is taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is unusable.
    pub fn new(mut world: World, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        world.set_debug(config.debug);
        debug!(fixed_dt = config.fixed_dt, headless = config.headless, "frame loop created");
        Ok(Self {
            world,
            config,
            frame_counter: 0,
            pending_input: VecDeque::new(),
            accumulator: 0.0,
            last_diagnostics: FrameDiagnostics::default(),
            last_report: WorldReport::default(),
        })
    }

    /// Queue a key event for the next frame.
    pub fn push_input(&mut self, action: KeyAction, event: KeyEvent) {
        self.pending_input.push_back((action, event));
    }

    /// Run exactly one frame.
    pub fn frame(&mut self) -> &WorldReport {
        let frame_start = Instant::now();

        let inputs = self.pending_input.len();
        while let Some((action, event)) = self.pending_input.pop_front() {
            self.world.dispatch_key(action, event);
        }
        let input_time = frame_start.elapsed();

        let update_start = Instant::now();
        self.last_report = self.world.update(self.config.fixed_dt);
        let update_time = update_start.elapsed();

        self.frame_counter += 1;
        self.last_diagnostics = FrameDiagnostics {
            inputs,
            input_time,
            update_time,
            total_time: frame_start.elapsed(),
            collisions: self.last_report.collisions(),
            removed: self.last_report.removed(),
        };
        trace!(
            frame = self.frame_counter,
            collisions = self.last_diagnostics.collisions,
            removed = self.last_diagnostics.removed,
            "frame complete"
        );
        &self.last_report
    }

    /// Run `count` frames back to back. Returns the total number of
    /// collision notifications dispatched.
    pub fn run_frames(&mut self, count: u64) -> u64 {
        let mut total = 0u64;
        for _ in 0..count {
            total += self.frame().collisions() as u64;
        }
        total
    }

    /// Feed `elapsed` seconds of wall time and run as many whole frames as
    /// fit, capped at `max_catch_up_frames`. Returns the frames run.
    ///
    /// Time beyond the cap is discarded rather than carried over.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }
        let mut ran = 0;
        while self.accumulator >= self.config.fixed_dt && ran < self.config.max_catch_up_frames {
            self.frame();
            self.accumulator -= self.config.fixed_dt;
            ran += 1;
        }
        if ran == self.config.max_catch_up_frames && self.accumulator >= self.config.fixed_dt {
            debug!(
                dropped_seconds = self.accumulator,
                "frame loop fell behind, dropping time"
            );
            self.accumulator = 0.0;
        }
        ran
    }

    // -- accessors ----------------------------------------------------------

    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    /// Simulated seconds so far.
    pub fn sim_time(&self) -> f64 {
        self.frame_counter as f64 * self.config.fixed_dt
    }

    pub fn fixed_dt(&self) -> f64 {
        self.config.fixed_dt
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Give the world back, ending the simulation.
    pub fn into_world(self) -> World {
        self.world
    }

    pub fn last_diagnostics(&self) -> &FrameDiagnostics {
        &self.last_diagnostics
    }

    pub fn last_report(&self) -> &WorldReport {
        &self.last_report
    }

    pub fn pending_inputs(&self) -> usize {
        self.pending_input.len()
    }

    pub fn is_headless(&self) -> bool {
        self.config.headless
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
