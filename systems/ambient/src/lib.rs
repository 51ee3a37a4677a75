#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ambient background emitter that drifts decorative particles across the viewport.
//!
//! The ambient chain is independent of the blend. Each firing spawns exactly
//! one particle at a random horizontal position along the top edge and then
//! schedules itself again after a uniformly random delay.

use std::time::Duration;

use fuel_blend_core::{Command, ConfigurationError, EmitterKind, Event, ParticleSpec};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Tuning knobs for ambient particles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientTuning {
    /// Shortest delay between firings, in milliseconds.
    pub min_interval_ms: u64,
    /// Upper bound (exclusive) of the delay between firings, in milliseconds.
    pub max_interval_ms: u64,
    /// Smallest particle diameter.
    pub min_size: f64,
    /// Largest particle diameter.
    pub max_size: f64,
    /// Maximum horizontal drift in either direction.
    pub drift_range: f64,
    /// Lifetime of every particle, in milliseconds.
    pub ttl_ms: u64,
    /// Opacity of every particle.
    pub opacity: f64,
}

impl Default for AmbientTuning {
    fn default() -> Self {
        Self {
            min_interval_ms: 1_000,
            max_interval_ms: 4_000,
            min_size: 2.0,
            max_size: 6.0,
            drift_range: 50.0,
            ttl_ms: 20_000,
            opacity: 1.0,
        }
    }
}

impl AmbientTuning {
    /// Rejects values that cannot drive a well-formed emitter.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.min_interval_ms == 0 {
            return Err(invalid("ambient.min_interval_ms", "must be positive"));
        }
        if self.max_interval_ms <= self.min_interval_ms {
            return Err(invalid(
                "ambient.max_interval_ms",
                "must exceed ambient.min_interval_ms",
            ));
        }
        if self.ttl_ms == 0 {
            return Err(invalid("ambient.ttl_ms", "must be positive"));
        }
        let finite_non_negative = [
            ("ambient.min_size", self.min_size),
            ("ambient.max_size", self.max_size),
            ("ambient.drift_range", self.drift_range),
        ];
        for (field, value) in finite_non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be finite and non-negative"));
            }
        }
        if self.max_size < self.min_size {
            return Err(invalid("ambient.max_size", "must not be below ambient.min_size"));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(invalid("ambient.opacity", "must lie within 0..=1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidTuning {
        field,
        reason: reason.to_owned(),
    }
}

/// Configuration parameters required to construct the ambient system.
#[derive(Clone, Debug)]
pub struct Config {
    tuning: AmbientTuning,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided tuning and seed.
    #[must_use]
    pub fn new(tuning: AmbientTuning, rng_seed: u64) -> Self {
        Self { tuning, rng_seed }
    }
}

/// Pure system that answers ambient firings with one particle and the next schedule.
#[derive(Debug)]
pub struct Ambient {
    tuning: AmbientTuning,
    rng: ChaCha8Rng,
}

impl Ambient {
    /// Creates a new ambient system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tuning: config.tuning,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and answers every ambient firing.
    ///
    /// `viewport_width` bounds the horizontal spawn position.
    pub fn handle(&mut self, events: &[Event], viewport_width: f32, out: &mut Vec<Command>) {
        for event in events {
            if let Event::EmitterFired {
                emitter: EmitterKind::Ambient,
                ..
            } = event
            {
                self.fire(viewport_width, out);
            }
        }
    }

    fn fire(&mut self, viewport_width: f32, out: &mut Vec<Command>) {
        let tuning = &self.tuning;
        let origin_x = self.rng.gen::<f64>() * f64::from(viewport_width.max(0.0));
        let size = tuning.min_size + self.rng.gen::<f64>() * (tuning.max_size - tuning.min_size);
        let drift_x = (self.rng.gen::<f64>() - 0.5) * 2.0 * tuning.drift_range;

        out.push(Command::SpawnParticle {
            spec: ParticleSpec {
                kind: EmitterKind::Ambient,
                origin_x: origin_x as f32,
                origin_y: 0.0,
                size: size as f32,
                opacity: tuning.opacity as f32,
                drift_x: drift_x as f32,
                ttl: Duration::from_millis(tuning.ttl_ms),
            },
        });

        let delay_ms = self
            .rng
            .gen_range(self.tuning.min_interval_ms..self.tuning.max_interval_ms);
        out.push(Command::ScheduleEmission {
            emitter: EmitterKind::Ambient,
            delay: Duration::from_millis(delay_ms),
        });
    }
}
