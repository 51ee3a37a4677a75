#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Lifecycle driver that wires the world to the emission and particle systems.
//!
//! [`Simulation`] owns the authoritative [`World`] together with one instance
//! of every system. Each public operation submits a command to the world and
//! then pumps the resulting events through the systems until no further
//! commands are produced. Everything the world and systems emit is buffered
//! until [`Simulation::drain_events`] hands it to the presentation layer.

mod config;

pub use config::SimulationConfig;

use std::time::Duration;

use fuel_blend_core::{
    BlendPercentage, Command, ConfigurationError, EmissionValues, EmitterKind, Event,
    ParticleView,
};
use fuel_blend_system_ambient::{self as ambient, Ambient};
use fuel_blend_system_emissions::{EmissionProfile, Emissions};
use fuel_blend_system_exhaust::{self as exhaust, Exhaust, SchedulerState};
use fuel_blend_world::{self as world, query, World};
use sha2::{Digest, Sha256};

const RNG_STREAM_EXHAUST: &str = "exhaust";
const RNG_STREAM_AMBIENT: &str = "ambient";

/// Headless fuel blend simulation driven by a virtual clock.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    emissions: Emissions,
    exhaust: Exhaust,
    ambient: Ambient,
    pending_events: Vec<Event>,
}

impl Simulation {
    /// Builds a stopped simulation at pure gasoline and publishes its initial emissions.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        log::info!(
            "building simulation: {} control points, seed {:#x}, viewport width {}",
            config.profile.len(),
            config.seed,
            config.viewport_width
        );
        let profile = EmissionProfile::new(config.profile)?;

        let mut simulation = Self {
            world: World::new(),
            emissions: Emissions::new(profile),
            exhaust: Exhaust::new(exhaust::Config::new(
                config.exhaust,
                derive_stream_seed(config.seed, RNG_STREAM_EXHAUST),
            )),
            ambient: Ambient::new(ambient::Config::new(
                config.ambient,
                derive_stream_seed(config.seed, RNG_STREAM_AMBIENT),
            )),
            pending_events: Vec::new(),
        };

        simulation.execute(Command::ConfigureViewport {
            width: config.viewport_width,
        });
        let initial = query::blend_percentage(&simulation.world);
        let mut published = Vec::new();
        simulation.emissions.publish(initial, &mut published);
        simulation.pending_events.append(&mut published);

        Ok(simulation)
    }

    /// Starts both emitters. Each fires once immediately.
    pub fn start(&mut self) {
        self.execute(Command::StartEmitters);
    }

    /// Stops both emitters and discards every live particle.
    pub fn stop(&mut self) {
        self.execute(Command::StopEmitters);
    }

    /// Adopts a new blend percentage, clamping out-of-range input.
    pub fn set_percentage(&mut self, value: i64) {
        self.execute(Command::SetBlendPercentage { value });
    }

    /// Moves the blend percentage by whole steps, saturating at the range ends.
    pub fn nudge_percentage(&mut self, steps: i64) {
        self.execute(Command::NudgeBlendPercentage { steps });
    }

    /// Updates the width ambient particles are scattered across.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.execute(Command::ConfigureViewport { width });
    }

    /// Advances the virtual clock by `dt`.
    ///
    /// The step is split at every timer deadline it crosses so each firing and
    /// expiry is observed at its exact due time.
    pub fn advance(&mut self, dt: Duration) {
        let target = query::now(&self.world).saturating_add(dt);

        while let Some(deadline) = query::next_deadline(&self.world).filter(|due| *due <= target)
        {
            let step = deadline.saturating_sub(query::now(&self.world));
            self.execute(Command::Tick { dt: step });
        }

        let remaining = target.saturating_sub(query::now(&self.world));
        if !remaining.is_zero() {
            self.execute(Command::Tick { dt: remaining });
        }
    }

    /// Hands over every event buffered since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending_events)
    }

    /// Blend percentage currently in effect.
    #[must_use]
    pub fn percentage(&self) -> BlendPercentage {
        query::blend_percentage(&self.world)
    }

    /// Most recently published emission indices.
    #[must_use]
    pub fn emissions(&self) -> Option<EmissionValues> {
        self.emissions.last_published().map(|(_, values)| values)
    }

    /// Snapshot of the live particles.
    #[must_use]
    pub fn particles(&self) -> ParticleView {
        query::particle_view(&self.world)
    }

    /// Current position of the virtual clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        query::now(&self.world)
    }

    /// Reports whether the emitters are running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        EmitterKind::ALL
            .into_iter()
            .all(|emitter| query::is_running(&self.world, emitter))
    }

    /// Rate-relevant state of the exhaust scheduler.
    #[must_use]
    pub fn exhaust_state(&self) -> SchedulerState {
        self.exhaust.state()
    }

    /// Simulated time of an emitter's pending firing, if any.
    #[must_use]
    pub fn pending_emission(&self, emitter: EmitterKind) -> Option<Duration> {
        query::pending_emission(&self.world, emitter)
    }

    /// Number of firing and expiry timers still pending.
    #[must_use]
    pub fn pending_timer_count(&self) -> usize {
        query::pending_timer_count(&self.world)
    }

    fn execute(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pump(events);
    }

    fn pump(&mut self, mut events: Vec<Event>) {
        while !events.is_empty() {
            let mut commands = Vec::new();
            let mut published = Vec::new();

            self.emissions.handle(&events, &mut published);
            self.exhaust.handle(&events, &mut commands);
            self.ambient.handle(
                &events,
                query::viewport_width(&self.world),
                &mut commands,
            );

            self.pending_events.append(&mut events);
            self.pending_events.append(&mut published);

            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }
}

fn derive_stream_seed(seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
