#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the fuel blend simulator.

mod parameter;
mod timers;

use std::{collections::BTreeMap, time::Duration};

use fuel_blend_core::{Command, EmitterKind, Event, Particle, ParticleId, ParticleSpec};

use self::{
    parameter::ParameterController,
    timers::{TimerHandle, TimerQueue, TimerTask},
};

const DEFAULT_VIEWPORT_WIDTH: f32 = 1_280.0;

/// Represents the authoritative simulator state.
#[derive(Debug)]
pub struct World {
    clock: Duration,
    viewport_width: f32,
    parameter: ParameterController,
    exhaust: EmitterState,
    ambient: EmitterState,
    timers: TimerQueue,
    particles: BTreeMap<ParticleId, Particle>,
    next_particle_id: u64,
}

impl World {
    /// Creates a new world with stopped emitters, pure gasoline and a zeroed clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Duration::ZERO,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            parameter: ParameterController::new(),
            exhaust: EmitterState::default(),
            ambient: EmitterState::default(),
            timers: TimerQueue::new(),
            particles: BTreeMap::new(),
            next_particle_id: 0,
        }
    }

    fn emitter(&self, kind: EmitterKind) -> &EmitterState {
        match kind {
            EmitterKind::Exhaust => &self.exhaust,
            EmitterKind::Ambient => &self.ambient,
        }
    }

    fn emitter_mut(&mut self, kind: EmitterKind) -> &mut EmitterState {
        match kind {
            EmitterKind::Exhaust => &mut self.exhaust,
            EmitterKind::Ambient => &mut self.ambient,
        }
    }

    fn emitters_running(&self) -> bool {
        self.exhaust.running && self.ambient.running
    }

    fn start_emitters(&mut self, out_events: &mut Vec<Event>) {
        if self.emitters_running() {
            return;
        }

        log::info!("starting emitters at {:?}", self.clock);
        let now = self.clock;
        for kind in EmitterKind::ALL {
            self.emitter_mut(kind).running = true;
            out_events.push(Event::EmitterStarted { emitter: kind });
            out_events.push(Event::EmitterFired {
                emitter: kind,
                at: now,
            });
        }
    }

    fn stop_emitters(&mut self, out_events: &mut Vec<Event>) {
        if !self.exhaust.running && !self.ambient.running {
            return;
        }

        for kind in EmitterKind::ALL {
            let state = self.emitter_mut(kind);
            state.running = false;
            let pending = state.pending.take();
            if let Some(handle) = pending {
                let _ = self.timers.cancel(handle);
            }
            out_events.push(Event::EmitterStopped { emitter: kind });
        }

        let cancelled = self
            .timers
            .cancel_where(|task| matches!(task, TimerTask::Expire(_)));
        let discarded = self.particles.len();
        self.particles.clear();
        log::info!(
            "stopped emitters at {:?}; cancelled {cancelled} expiry timers",
            self.clock
        );

        if discarded > 0 {
            out_events.push(Event::ParticlesDiscarded { count: discarded });
        }
    }

    fn schedule_emission(&mut self, kind: EmitterKind, delay: Duration) {
        if !self.emitter(kind).running {
            log::trace!("ignoring {kind:?} reschedule while stopped");
            return;
        }

        let due = self.clock.saturating_add(delay);
        let previous = self.emitter_mut(kind).pending.take();
        if let Some(handle) = previous {
            let _ = self.timers.cancel(handle);
        }
        let handle = self.timers.schedule(due, TimerTask::Fire(kind));
        self.emitter_mut(kind).pending = Some(handle);
        log::trace!("{kind:?} emitter due at {:?}", handle.due());
    }

    fn spawn_particle(&mut self, spec: ParticleSpec, out_events: &mut Vec<Event>) {
        if !self.emitter(spec.kind).running {
            log::trace!("ignoring {:?} spawn while stopped", spec.kind);
            return;
        }

        let id = ParticleId::new(self.next_particle_id);
        self.next_particle_id = self.next_particle_id.wrapping_add(1);

        let particle = Particle::from_spec(id, spec, self.clock);
        let _ = self
            .timers
            .schedule(particle.expires_at(), TimerTask::Expire(id));
        let _ = self.particles.insert(id, particle);
        out_events.push(Event::ParticleSpawned { particle });
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        while let Some((due, task)) = self.timers.pop_due(self.clock) {
            match task {
                TimerTask::Fire(kind) => {
                    let state = self.emitter_mut(kind);
                    state.pending = None;
                    if state.running {
                        out_events.push(Event::EmitterFired {
                            emitter: kind,
                            at: due,
                        });
                    }
                }
                TimerTask::Expire(id) => {
                    if self.particles.remove(&id).is_some() {
                        out_events.push(Event::ParticleExpired { id, at: due });
                    }
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureViewport { width } => {
            if width.is_finite() && width >= 0.0 {
                world.viewport_width = width;
            } else {
                log::warn!("ignoring unusable viewport width {width}");
            }
        }
        Command::SetBlendPercentage { value } => {
            if let Some(percentage) = world.parameter.set_percentage(value) {
                out_events.push(Event::BlendPercentageChanged { percentage });
            }
        }
        Command::NudgeBlendPercentage { steps } => {
            if let Some(percentage) = world.parameter.nudge(steps) {
                out_events.push(Event::BlendPercentageChanged { percentage });
            }
        }
        Command::StartEmitters => world.start_emitters(out_events),
        Command::StopEmitters => world.stop_emitters(out_events),
        Command::Tick { dt } => world.advance(dt, out_events),
        Command::ScheduleEmission { emitter, delay } => world.schedule_emission(emitter, delay),
        Command::SpawnParticle { spec } => world.spawn_particle(spec, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use fuel_blend_core::{BlendPercentage, EmitterKind, ParticleView};

    /// Current position of the simulation clock.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.clock
    }

    /// Blend percentage currently held by the parameter controller.
    #[must_use]
    pub fn blend_percentage(world: &World) -> BlendPercentage {
        world.parameter.current()
    }

    /// Width of the viewport used to position ambient particles.
    #[must_use]
    pub fn viewport_width(world: &World) -> f32 {
        world.viewport_width
    }

    /// Reports whether the provided emitter is running.
    #[must_use]
    pub fn is_running(world: &World, emitter: EmitterKind) -> bool {
        world.emitter(emitter).running
    }

    /// Simulated time of the emitter's pending firing, if one is scheduled.
    #[must_use]
    pub fn pending_emission(world: &World, emitter: EmitterKind) -> Option<Duration> {
        world.emitter(emitter).pending.map(|handle| handle.due())
    }

    /// Earliest simulated time at which any timer elapses.
    #[must_use]
    pub fn next_deadline(world: &World) -> Option<Duration> {
        world.timers.next_deadline()
    }

    /// Number of firing and expiry timers still pending.
    #[must_use]
    pub fn pending_timer_count(world: &World) -> usize {
        world.timers.len()
    }

    /// Captures a read-only view of the live particles.
    #[must_use]
    pub fn particle_view(world: &World) -> ParticleView {
        ParticleView::from_particles(world.particles.values().copied().collect())
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct EmitterState {
    running: bool,
    pending: Option<TimerHandle>,
}
