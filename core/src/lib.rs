#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the fuel blend simulator.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams and respond with
//! new command batches, or in the case of the emissions system, with published
//! metric events.
//!
//! All time is virtual. One unit of simulated time is one millisecond and is
//! carried as a [`Duration`] measured from the moment the world was created.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest ethanol share accepted by the blend control.
pub const MIN_BLEND_PERCENTAGE: u8 = 0;

/// Highest ethanol share accepted by the blend control.
pub const MAX_BLEND_PERCENTAGE: u8 = 20;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Updates the width of the viewport used to position ambient particles.
    ConfigureViewport {
        /// Width of the rendering surface measured in pixels.
        width: f32,
    },
    /// Requests that the blend control adopt the provided percentage.
    ///
    /// Values outside the supported range are clamped rather than rejected.
    SetBlendPercentage {
        /// Raw percentage supplied by the input source.
        value: i64,
    },
    /// Moves the blend control by a relative number of whole percentage steps.
    NudgeBlendPercentage {
        /// Signed number of percentage points to move.
        steps: i64,
    },
    /// Starts both particle emitters. Each emitter fires immediately once.
    StartEmitters,
    /// Stops both particle emitters and discards every live particle.
    StopEmitters,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Schedules the next firing of an emitter after the provided delay.
    ScheduleEmission {
        /// Emitter whose chain should fire again.
        emitter: EmitterKind,
        /// Simulated time to wait before the firing.
        delay: Duration,
    },
    /// Requests that the world spawn a particle with the provided parameters.
    SpawnParticle {
        /// Description of the particle to create.
        spec: ParticleSpec,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the blend control accepted a new percentage.
    BlendPercentageChanged {
        /// Percentage that became current.
        percentage: BlendPercentage,
    },
    /// Publishes the emission indices computed for a blend percentage.
    EmissionsUpdated {
        /// Percentage the values were computed for.
        percentage: BlendPercentage,
        /// Emission indices for the percentage.
        values: EmissionValues,
    },
    /// Announces that an emitter began running.
    EmitterStarted {
        /// Emitter that started.
        emitter: EmitterKind,
    },
    /// Signals that an emitter's pending timer elapsed.
    EmitterFired {
        /// Emitter whose timer elapsed.
        emitter: EmitterKind,
        /// Simulated time at which the timer was due.
        at: Duration,
    },
    /// Announces that an emitter stopped and its pending timer was cancelled.
    EmitterStopped {
        /// Emitter that stopped.
        emitter: EmitterKind,
    },
    /// Confirms that a particle joined the live set.
    ParticleSpawned {
        /// Full description of the new particle.
        particle: Particle,
    },
    /// Confirms that a particle reached the end of its lifetime.
    ParticleExpired {
        /// Identifier of the expired particle.
        id: ParticleId,
        /// Simulated time at which the particle expired.
        at: Duration,
    },
    /// Reports that live particles were dropped during teardown without expiring.
    ParticlesDiscarded {
        /// Number of particles that were dropped.
        count: usize,
    },
}

/// Ethanol share of the fuel blend, guaranteed to lie within the supported range.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlendPercentage(u8);

impl BlendPercentage {
    /// Pure gasoline with no ethanol.
    pub const PURE_GASOLINE: Self = Self(MIN_BLEND_PERCENTAGE);

    /// The richest blend supported by the simulator.
    pub const MAXIMUM: Self = Self(MAX_BLEND_PERCENTAGE);

    /// Clamps an arbitrary integer into the supported percentage range.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let bounded = value.clamp(
            i64::from(MIN_BLEND_PERCENTAGE),
            i64::from(MAX_BLEND_PERCENTAGE),
        );
        Self(bounded as u8)
    }

    /// Reports whether the raw value already lies within the supported range.
    #[must_use]
    pub fn is_in_range(value: i64) -> bool {
        (i64::from(MIN_BLEND_PERCENTAGE)..=i64::from(MAX_BLEND_PERCENTAGE)).contains(&value)
    }

    /// Retrieves the whole percentage.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Share of gasoline relative to the richest blend.
    ///
    /// Evaluates to `1.0` for pure gasoline and `0.0` at the maximum blend.
    #[must_use]
    pub fn exhaust_factor(self) -> f64 {
        f64::from(MAX_BLEND_PERCENTAGE - self.0) / f64::from(MAX_BLEND_PERCENTAGE)
    }
}

/// Pollutants tracked by the emission model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    /// Carbon dioxide.
    Co2,
    /// Carbon monoxide.
    Co,
    /// Unburned hydrocarbons.
    Hc,
    /// Particulate matter.
    Pm,
}

impl Pollutant {
    /// Every pollutant in display order.
    pub const ALL: [Self; 4] = [Self::Co2, Self::Co, Self::Hc, Self::Pm];

    /// Short label used when presenting the pollutant.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Co2 => "CO2",
            Self::Co => "CO",
            Self::Hc => "HC",
            Self::Pm => "PM",
        }
    }

    /// One-line explanation of the pollutant suitable for a tooltip.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Co2 => "Carbon Dioxide - Main greenhouse gas from fuel combustion",
            Self::Co => "Carbon Monoxide - Toxic gas reduced significantly with ethanol",
            Self::Hc => "Hydrocarbons - Unburned fuel components that cause smog",
            Self::Pm => "Particulate Matter - Fine particles harmful to respiratory health",
        }
    }
}

/// Emission indices relative to the pure gasoline baseline of 100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmissionValues {
    /// Carbon dioxide index.
    pub co2: u8,
    /// Carbon monoxide index.
    pub co: u8,
    /// Hydrocarbon index.
    pub hc: u8,
    /// Particulate matter index.
    pub pm: u8,
}

impl EmissionValues {
    /// Index that represents pure gasoline emissions.
    pub const BASELINE: u8 = 100;

    /// Creates a new set of emission indices.
    #[must_use]
    pub const fn new(co2: u8, co: u8, hc: u8, pm: u8) -> Self {
        Self { co2, co, hc, pm }
    }

    /// Retrieves the index recorded for a single pollutant.
    #[must_use]
    pub const fn get(&self, pollutant: Pollutant) -> u8 {
        match pollutant {
            Pollutant::Co2 => self.co2,
            Pollutant::Co => self.co,
            Pollutant::Hc => self.hc,
            Pollutant::Pm => self.pm,
        }
    }

    /// Reduction relative to the baseline, never negative.
    #[must_use]
    pub const fn reduction(&self, pollutant: Pollutant) -> u8 {
        Self::BASELINE.saturating_sub(self.get(pollutant))
    }
}

/// Table row pinning exact emission indices at a blend percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Blend percentage the row applies to.
    pub percentage: u8,
    /// Emission indices recorded for the percentage.
    #[serde(flatten)]
    pub values: EmissionValues,
}

impl ControlPoint {
    /// Creates a new control point.
    #[must_use]
    pub const fn new(percentage: u8, values: EmissionValues) -> Self {
        Self { percentage, values }
    }
}

/// Identifies a particle process and the kind of particle it produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmitterKind {
    /// Exhaust smoke whose cadence depends on the blend percentage.
    Exhaust,
    /// Decorative background particles unrelated to the blend.
    Ambient,
}

impl EmitterKind {
    /// Every emitter in start-up order.
    pub const ALL: [Self; 2] = [Self::Exhaust, Self::Ambient];
}

/// Unique identifier assigned to a particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(u64);

impl ParticleId {
    /// Creates a new particle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Parameters a scheduler chooses for a particle before the world admits it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleSpec {
    /// Emitter responsible for the particle.
    pub kind: EmitterKind,
    /// Horizontal spawn position in pixels.
    pub origin_x: f32,
    /// Vertical spawn position in pixels.
    pub origin_y: f32,
    /// Diameter of the particle in pixels.
    pub size: f32,
    /// Opacity in the range 0.0..=1.0.
    pub opacity: f32,
    /// Horizontal distance travelled over the particle's lifetime.
    pub drift_x: f32,
    /// Lifetime of the particle.
    pub ttl: Duration,
}

/// Particle admitted into the live set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Identifier allocated by the world.
    pub id: ParticleId,
    /// Emitter responsible for the particle.
    pub kind: EmitterKind,
    /// Horizontal spawn position in pixels.
    pub origin_x: f32,
    /// Vertical spawn position in pixels.
    pub origin_y: f32,
    /// Diameter of the particle in pixels.
    pub size: f32,
    /// Opacity in the range 0.0..=1.0.
    pub opacity: f32,
    /// Horizontal distance travelled over the particle's lifetime.
    pub drift_x: f32,
    /// Simulated time at which the particle spawned.
    pub spawn_time: Duration,
    /// Lifetime of the particle.
    pub ttl: Duration,
}

impl Particle {
    /// Admits a particle spec into the live set.
    #[must_use]
    pub const fn from_spec(id: ParticleId, spec: ParticleSpec, spawn_time: Duration) -> Self {
        Self {
            id,
            kind: spec.kind,
            origin_x: spec.origin_x,
            origin_y: spec.origin_y,
            size: spec.size,
            opacity: spec.opacity,
            drift_x: spec.drift_x,
            spawn_time,
            ttl: spec.ttl,
        }
    }

    /// Simulated time at which the particle must be removed.
    #[must_use]
    pub fn expires_at(&self) -> Duration {
        self.spawn_time.saturating_add(self.ttl)
    }
}

/// Read-only snapshot of the live particle set.
#[derive(Clone, Debug, Default)]
pub struct ParticleView {
    particles: Vec<Particle>,
}

impl ParticleView {
    /// Creates a new view from the provided particles.
    #[must_use]
    pub fn from_particles(mut particles: Vec<Particle>) -> Self {
        particles.sort_by_key(|particle| particle.id);
        Self { particles }
    }

    /// Iterator over the live particles in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Number of live particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Reports whether no particles are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of live particles spawned by the provided emitter.
    #[must_use]
    pub fn count_of(&self, kind: EmitterKind) -> usize {
        self.particles
            .iter()
            .filter(|particle| particle.kind == kind)
            .count()
    }

    /// Consumes the view, yielding the underlying particles.
    #[must_use]
    pub fn into_vec(self) -> Vec<Particle> {
        self.particles
    }
}

/// Malformed or insufficient configuration detected at start-up.
///
/// These indicate programming errors rather than bad input and are never
/// recovered from.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    /// The emission profile holds fewer than two control points.
    #[error("emission profile needs at least two control points (found {count})")]
    TooFewControlPoints {
        /// Number of points supplied.
        count: usize,
    },
    /// Two control points share a percentage.
    #[error("emission profile defines {percentage}% more than once")]
    DuplicateControlPoint {
        /// Percentage that appeared more than once.
        percentage: u8,
    },
    /// A control point lies outside the supported percentage range.
    #[error("control point {percentage}% lies outside 0..=20")]
    ControlPointOutOfDomain {
        /// Offending percentage.
        percentage: u8,
    },
    /// The profile does not pin one of the domain boundaries.
    #[error("emission profile is missing the {percentage}% boundary point")]
    MissingBoundary {
        /// Boundary percentage that is absent.
        percentage: u8,
    },
    /// An emission index exceeds the baseline scale.
    #[error("{pollutant:?} index {value} at {percentage}% exceeds 100")]
    IndexOutOfRange {
        /// Percentage of the offending control point.
        percentage: u8,
        /// Pollutant carrying the offending value.
        pollutant: Pollutant,
        /// Offending value.
        value: u8,
    },
    /// Two adjacent control points would produce a zero-width bracket.
    #[error("control points bracketing {percentage} share the same percentage")]
    DegenerateBracket {
        /// Percentage that was being interpolated.
        percentage: f64,
    },
    /// No pair of control points covers the requested percentage.
    #[error("no control points bracket {percentage}")]
    UncoveredPercentage {
        /// Percentage that was being interpolated.
        percentage: f64,
    },
    /// A scheduler tuning value cannot drive a valid process.
    #[error("invalid tuning `{field}`: {reason}")]
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value is unusable.
        reason: String,
    },
}
