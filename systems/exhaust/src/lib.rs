#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Exhaust smoke emitter whose cadence and particle look follow the blend.
//!
//! More ethanol means cleaner combustion: the emitter fires less often, and the
//! puffs it produces are smaller and fainter. The emitter never stops entirely,
//! because the cadence and size scale bottom out at a fixed floor rather than
//! zero.

use std::time::Duration;

use fuel_blend_core::{
    BlendPercentage, Command, ConfigurationError, EmitterKind, Event, ParticleSpec,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Share of the base cadence and particle size that survives at the richest blend.
const SCALE_FLOOR: f64 = 0.3;
/// Share of the base cadence and particle size that tracks the exhaust factor.
const SCALE_SPAN: f64 = 0.7;

/// Spawn position of one tail pipe.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExhaustOrigin {
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
}

impl ExhaustOrigin {
    /// Creates a new origin.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Tuning knobs for exhaust smoke.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhaustTuning {
    /// Cadence at pure gasoline, in milliseconds. Richer blends scale this down to 30%.
    pub base_interval_ms: u64,
    /// Independent chance that each tail pipe puffs on a given firing.
    pub spawn_probability: f64,
    /// Tail pipe positions.
    pub origins: Vec<ExhaustOrigin>,
    /// Smallest unscaled puff diameter.
    pub base_size: f64,
    /// Random extra diameter added on top of `base_size`.
    pub size_jitter: f64,
    /// Opacity of puffs at the richest blend.
    pub opacity_floor: f64,
    /// Extra opacity gained at pure gasoline.
    pub opacity_span: f64,
    /// Maximum horizontal drift in either direction.
    pub drift_range: f64,
    /// Lifetime of every puff, in milliseconds.
    pub ttl_ms: u64,
}

impl Default for ExhaustTuning {
    fn default() -> Self {
        Self {
            base_interval_ms: 200,
            spawn_probability: 0.7,
            origins: vec![ExhaustOrigin::new(320.0, 127.0), ExhaustOrigin::new(320.0, 152.0)],
            base_size: 5.0,
            size_jitter: 10.0,
            opacity_floor: 0.3,
            opacity_span: 0.5,
            drift_range: 20.0,
            ttl_ms: 3_000,
        }
    }
}

impl ExhaustTuning {
    /// Rejects values that cannot drive a well-formed emitter.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.base_interval_ms == 0 {
            return Err(invalid("exhaust.base_interval_ms", "must be positive"));
        }
        if self.ttl_ms == 0 {
            return Err(invalid("exhaust.ttl_ms", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(invalid("exhaust.spawn_probability", "must lie within 0..=1"));
        }
        let finite_non_negative = [
            ("exhaust.base_size", self.base_size),
            ("exhaust.size_jitter", self.size_jitter),
            ("exhaust.opacity_floor", self.opacity_floor),
            ("exhaust.opacity_span", self.opacity_span),
            ("exhaust.drift_range", self.drift_range),
        ];
        for (field, value) in finite_non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be finite and non-negative"));
            }
        }
        if self.opacity_floor + self.opacity_span > 1.0 {
            return Err(invalid(
                "exhaust.opacity_span",
                "opacity_floor + opacity_span must not exceed 1",
            ));
        }
        if self
            .origins
            .iter()
            .any(|origin| !origin.x.is_finite() || !origin.y.is_finite())
        {
            return Err(invalid("exhaust.origins", "coordinates must be finite"));
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

/// Configuration parameters required to construct the exhaust system.
#[derive(Clone, Debug)]
pub struct Config {
    tuning: ExhaustTuning,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided tuning and seed.
    #[must_use]
    pub fn new(tuning: ExhaustTuning, rng_seed: u64) -> Self {
        Self { tuning, rng_seed }
    }
}

/// Rate-relevant state, re-derived whenever the blend changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerState {
    /// Blend percentage the next firing will use.
    pub current_percentage: BlendPercentage,
    /// Delay that will separate the next firing from the one after it.
    pub next_fire_delay: Duration,
}

/// Computes the exhaust cadence for a blend.
///
/// `base * (0.3 + factor * 0.7)`, where `factor` is the share of gasoline in
/// the blend range. Rounded to whole microseconds.
#[must_use]
pub fn interval_for(base: Duration, percentage: BlendPercentage) -> Duration {
    let scale = SCALE_FLOOR + percentage.exhaust_factor() * SCALE_SPAN;
    let micros = (base.as_secs_f64() * 1_000_000.0 * scale).round();
    Duration::from_micros(micros as u64)
}

/// Pure system that answers exhaust firings with puffs and the next schedule.
#[derive(Debug)]
pub struct Exhaust {
    tuning: ExhaustTuning,
    state: SchedulerState,
    rng: ChaCha8Rng,
}

impl Exhaust {
    /// Creates a new exhaust system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let base = Duration::from_millis(config.tuning.base_interval_ms);
        let current_percentage = BlendPercentage::PURE_GASOLINE;
        Self {
            state: SchedulerState {
                current_percentage,
                next_fire_delay: interval_for(base, current_percentage),
            },
            tuning: config.tuning,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Adopts a new blend for every subsequent firing.
    pub fn update_rate(&mut self, percentage: BlendPercentage) {
        self.state = SchedulerState {
            current_percentage: percentage,
            next_fire_delay: interval_for(self.base_interval(), percentage),
        };
    }

    /// Snapshot of the rate-relevant state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Consumes events to track the blend and answer exhaust firings.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::BlendPercentageChanged { percentage } => self.update_rate(*percentage),
                Event::EmitterFired {
                    emitter: EmitterKind::Exhaust,
                    ..
                } => self.fire(out),
                _ => {}
            }
        }
    }

    fn fire(&mut self, out: &mut Vec<Command>) {
        let factor = self.state.current_percentage.exhaust_factor();
        let scale = SCALE_FLOOR + factor * SCALE_SPAN;
        let opacity = self.tuning.opacity_floor + factor * self.tuning.opacity_span;
        let ttl = Duration::from_millis(self.tuning.ttl_ms);

        for index in 0..self.tuning.origins.len() {
            if self.rng.gen::<f64>() >= self.tuning.spawn_probability {
                continue;
            }

            let origin = self.tuning.origins[index];
            let size = (self.tuning.base_size + self.rng.gen::<f64>() * self.tuning.size_jitter)
                * scale;
            let drift_x = (self.rng.gen::<f64>() - 0.5) * 2.0 * self.tuning.drift_range;

            out.push(Command::SpawnParticle {
                spec: ParticleSpec {
                    kind: EmitterKind::Exhaust,
                    origin_x: origin.x,
                    origin_y: origin.y,
                    size: size as f32,
                    opacity: opacity as f32,
                    drift_x: drift_x as f32,
                    ttl,
                },
            });
        }

        let delay = interval_for(self.base_interval(), self.state.current_percentage);
        self.state.next_fire_delay = delay;
        out.push(Command::ScheduleEmission {
            emitter: EmitterKind::Exhaust,
            delay,
        });
    }

    fn base_interval(&self) -> Duration {
        Duration::from_millis(self.tuning.base_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_spans_thirty_to_one_hundred_percent_of_base() {
        let base = Duration::from_millis(200);
        assert_eq!(
            interval_for(base, BlendPercentage::PURE_GASOLINE),
            Duration::from_millis(200)
        );
        assert_eq!(
            interval_for(base, BlendPercentage::MAXIMUM),
            Duration::from_millis(60)
        );
        assert_eq!(
            interval_for(base, BlendPercentage::clamped(10)),
            Duration::from_millis(130)
        );
    }

    #[test]
    fn default_tuning_validates() {
        assert_eq!(ExhaustTuning::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_probability_above_one() {
        let tuning = ExhaustTuning {
            spawn_probability: 1.5,
            ..ExhaustTuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigurationError::InvalidTuning {
                field: "exhaust.spawn_probability",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_base_interval() {
        let tuning = ExhaustTuning {
            base_interval_ms: 0,
            ..ExhaustTuning::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn update_rate_rederives_the_delay() {
        let mut exhaust = Exhaust::new(Config::new(ExhaustTuning::default(), 9));
        assert_eq!(exhaust.state().next_fire_delay, Duration::from_millis(200));

        exhaust.update_rate(BlendPercentage::MAXIMUM);
        assert_eq!(
            exhaust.state(),
            SchedulerState {
                current_percentage: BlendPercentage::MAXIMUM,
                next_fire_delay: Duration::from_millis(60),
            }
        );
    }
}
