#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for fuel blend adapters.
//!
//! The simulation never draws anything itself. Adapters implement
//! [`RenderingBackend`] and feed drained events through [`present`], which
//! converts them into presentation descriptors: an [`EmissionPanel`] for the
//! metric cards, a [`BlendGauge`] for the slider, and one [`ParticleVisual`]
//! per live particle.

use std::{collections::BTreeMap, time::Duration};

use anyhow::Result as AnyResult;
use fuel_blend_core::{
    BlendPercentage, EmissionValues, EmitterKind, Event, Particle, ParticleId, Pollutant,
    MAX_BLEND_PERCENTAGE,
};
use glam::Vec2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha, clamped to 0.0..=1.0.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// How a pollutant index compares with the pure gasoline baseline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Index at or below 70.
    Low,
    /// Index above 70 and at or below 85.
    Medium,
    /// Index above 85.
    High,
}

impl Severity {
    /// Classifies an emission index.
    #[must_use]
    pub const fn from_value(value: u8) -> Self {
        if value <= 70 {
            Self::Low
        } else if value <= 85 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Color used for the value text of a card with this severity.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Low => Color::from_rgb_u8(46, 204, 113),
            Self::Medium => Color::from_rgb_u8(241, 196, 15),
            Self::High => Color::from_rgb_u8(231, 76, 60),
        }
    }
}

/// Presentation of a single pollutant metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmissionCard {
    /// Pollutant the card describes.
    pub pollutant: Pollutant,
    /// Emission index relative to the baseline of 100.
    pub value: u8,
}

impl EmissionCard {
    /// Creates a new card.
    #[must_use]
    pub const fn new(pollutant: Pollutant, value: u8) -> Self {
        Self { pollutant, value }
    }

    /// Share of the bar that is filled.
    #[must_use]
    pub fn bar_fraction(&self) -> f32 {
        f32::from(self.value) / f32::from(EmissionValues::BASELINE)
    }

    /// Reduction relative to pure gasoline, never negative.
    #[must_use]
    pub const fn reduction(&self) -> u8 {
        EmissionValues::BASELINE.saturating_sub(self.value)
    }

    /// Value text shown on the card.
    #[must_use]
    pub fn value_label(&self) -> String {
        format!("{}%", self.value)
    }

    /// Reduction text shown below the bar.
    #[must_use]
    pub fn reduction_label(&self) -> String {
        format!("-{}% vs Pure Petrol", self.reduction())
    }

    /// Severity class used to color the value.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        Severity::from_value(self.value)
    }
}

/// Metric cards for every pollutant at one blend percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmissionPanel {
    /// Percentage the cards were computed for.
    pub percentage: BlendPercentage,
    /// Cards in [`Pollutant::ALL`] order.
    pub cards: [EmissionCard; 4],
}

impl EmissionPanel {
    /// Builds the panel from published emission indices.
    #[must_use]
    pub fn from_values(percentage: BlendPercentage, values: EmissionValues) -> Self {
        Self {
            percentage,
            cards: Pollutant::ALL
                .map(|pollutant| EmissionCard::new(pollutant, values.get(pollutant))),
        }
    }

    /// Card for the provided pollutant.
    #[must_use]
    pub fn card(&self, pollutant: Pollutant) -> EmissionCard {
        self.cards[pollutant_index(pollutant)]
    }
}

fn pollutant_index(pollutant: Pollutant) -> usize {
    match pollutant {
        Pollutant::Co2 => 0,
        Pollutant::Co => 1,
        Pollutant::Hc => 2,
        Pollutant::Pm => 3,
    }
}

/// Glow tier applied to the engine illustration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineEfficiency {
    /// Below 10% ethanol.
    Standard,
    /// 10% ethanol and above.
    Medium,
    /// 15% ethanol and above.
    High,
}

impl EngineEfficiency {
    /// Classifies a blend percentage.
    #[must_use]
    pub const fn from_percentage(percentage: BlendPercentage) -> Self {
        let value = percentage.get();
        if value >= 15 {
            Self::High
        } else if value >= 10 {
            Self::Medium
        } else {
            Self::Standard
        }
    }

    /// Glow drawn around the engine, if any.
    #[must_use]
    pub const fn glow(self) -> Option<Color> {
        match self {
            Self::Standard => None,
            Self::Medium => Some(Color::from_rgb_u8(241, 196, 15)),
            Self::High => Some(Color::from_rgb_u8(46, 204, 113)),
        }
    }
}

/// Engine shake period at pure gasoline.
const BASE_VIBRATION_PERIOD: Duration = Duration::from_millis(100);
/// Share of the shake amplitude removed at the richest blend.
const VIBRATION_DAMPING: f64 = 0.3;

/// Presentation of the blend slider and engine illustration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendGauge {
    /// Percentage currently selected.
    pub percentage: BlendPercentage,
}

impl BlendGauge {
    /// Creates a new gauge.
    #[must_use]
    pub const fn new(percentage: BlendPercentage) -> Self {
        Self { percentage }
    }

    /// Fuel grade label, for example `E10`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("E{}", self.percentage.get())
    }

    /// Caption below the label, for example `10% Ethanol`.
    #[must_use]
    pub fn caption(&self) -> String {
        format!("{}% Ethanol", self.percentage.get())
    }

    /// Share of the slider track that is filled.
    #[must_use]
    pub fn fill_fraction(&self) -> f32 {
        f32::from(self.percentage.get()) / f32::from(MAX_BLEND_PERCENTAGE)
    }

    /// Engine glow tier.
    #[must_use]
    pub const fn efficiency(&self) -> EngineEfficiency {
        EngineEfficiency::from_percentage(self.percentage)
    }

    /// Period of one engine shake cycle. Cleaner blends shake less and slower.
    #[must_use]
    pub fn vibration_period(&self) -> Duration {
        let efficiency = f64::from(self.percentage.get()) / f64::from(MAX_BLEND_PERCENTAGE);
        let intensity = 1.0 - efficiency * VIBRATION_DAMPING;
        BASE_VIBRATION_PERIOD.div_f64(intensity)
    }
}

/// Particle ready to be drawn, expressed in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleVisual {
    /// Identifier of the simulated particle.
    pub id: ParticleId,
    /// Emitter that produced the particle.
    pub kind: EmitterKind,
    /// Spawn position in pixels.
    pub origin: Vec2,
    /// Horizontal and vertical travel over the particle's lifetime.
    pub drift: Vec2,
    /// Diameter in pixels.
    pub size: f32,
    /// Opacity in the range 0.0..=1.0.
    pub opacity: f32,
    /// Simulated time at which the particle spawned.
    pub spawn_time: Duration,
    /// Lifetime of the particle.
    pub ttl: Duration,
}

impl ParticleVisual {
    /// Converts a simulated particle into its visual.
    #[must_use]
    pub fn from_particle(particle: &Particle) -> Self {
        Self {
            id: particle.id,
            kind: particle.kind,
            origin: Vec2::new(particle.origin_x, particle.origin_y),
            drift: Vec2::new(particle.drift_x, 0.0),
            size: particle.size,
            opacity: particle.opacity,
            spawn_time: particle.spawn_time,
            ttl: particle.ttl,
        }
    }

    /// Share of the lifetime that has elapsed at `now`, clamped to 0.0..=1.0.
    #[must_use]
    pub fn progress_at(&self, now: Duration) -> f32 {
        if self.ttl.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.spawn_time);
        (elapsed.as_secs_f32() / self.ttl.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Eased position at `now`.
    #[must_use]
    pub fn position_at(&self, now: Duration) -> Vec2 {
        self.origin + self.drift * ease_in_out_cubic(self.progress_at(now))
    }

    /// Fill color including the particle's opacity.
    #[must_use]
    pub fn color(&self) -> Color {
        let base = match self.kind {
            EmitterKind::Exhaust => Color::from_rgb_u8(120, 120, 120),
            EmitterKind::Ambient => Color::from_rgb_u8(255, 255, 255),
        };
        base.with_alpha(self.opacity)
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

/// Rendering backend capable of presenting fuel blend frames.
pub trait RenderingBackend {
    /// Adds a particle visual to the scene.
    fn spawn_visual(&mut self, visual: ParticleVisual) -> AnyResult<()>;

    /// Removes a particle visual that reached the end of its lifetime.
    ///
    /// Unknown identifiers must be ignored.
    fn remove_visual(&mut self, id: ParticleId) -> AnyResult<()>;

    /// Drops every particle visual at once during teardown.
    fn discard_visuals(&mut self) -> AnyResult<()>;

    /// Replaces the displayed emission metrics.
    fn present_emissions(&mut self, panel: &EmissionPanel) -> AnyResult<()>;

    /// Replaces the displayed blend gauge.
    fn present_blend(&mut self, gauge: &BlendGauge) -> AnyResult<()>;
}

/// Forwards drained simulation events to the backend in order.
pub fn present<B>(events: &[Event], backend: &mut B) -> AnyResult<()>
where
    B: RenderingBackend + ?Sized,
{
    for event in events {
        match event {
            Event::BlendPercentageChanged { percentage } => {
                backend.present_blend(&BlendGauge::new(*percentage))?;
            }
            Event::EmissionsUpdated { percentage, values } => {
                backend.present_emissions(&EmissionPanel::from_values(*percentage, *values))?;
            }
            Event::ParticleSpawned { particle } => {
                backend.spawn_visual(ParticleVisual::from_particle(particle))?;
            }
            Event::ParticleExpired { id, .. } => backend.remove_visual(*id)?,
            Event::ParticlesDiscarded { .. } => backend.discard_visuals()?,
            Event::TimeAdvanced { .. }
            | Event::EmitterStarted { .. }
            | Event::EmitterFired { .. }
            | Event::EmitterStopped { .. } => {}
        }
    }
    Ok(())
}

/// Backend that records what it was asked to draw without drawing anything.
#[derive(Clone, Debug, Default)]
pub struct HeadlessBackend {
    visuals: BTreeMap<ParticleId, ParticleVisual>,
    spawned: usize,
    removed: usize,
    discarded: usize,
    panel: Option<EmissionPanel>,
    panels_presented: usize,
    gauge: Option<BlendGauge>,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Visuals currently on screen, in identifier order.
    pub fn visuals(&self) -> impl Iterator<Item = &ParticleVisual> {
        self.visuals.values()
    }

    /// Number of visuals currently on screen.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.visuals.len()
    }

    /// Number of visuals on screen for the provided emitter.
    #[must_use]
    pub fn live_count_of(&self, kind: EmitterKind) -> usize {
        self.visuals
            .values()
            .filter(|visual| visual.kind == kind)
            .count()
    }

    /// Total visuals ever spawned.
    #[must_use]
    pub const fn spawned_count(&self) -> usize {
        self.spawned
    }

    /// Total visuals removed after expiring.
    #[must_use]
    pub const fn removed_count(&self) -> usize {
        self.removed
    }

    /// Total visuals dropped during teardown.
    #[must_use]
    pub const fn discarded_count(&self) -> usize {
        self.discarded
    }

    /// Most recently presented emission panel.
    #[must_use]
    pub const fn panel(&self) -> Option<&EmissionPanel> {
        self.panel.as_ref()
    }

    /// Number of emission panels presented so far.
    #[must_use]
    pub const fn panels_presented(&self) -> usize {
        self.panels_presented
    }

    /// Most recently presented blend gauge.
    #[must_use]
    pub const fn gauge(&self) -> Option<&BlendGauge> {
        self.gauge.as_ref()
    }
}

impl RenderingBackend for HeadlessBackend {
    fn spawn_visual(&mut self, visual: ParticleVisual) -> AnyResult<()> {
        self.spawned += 1;
        let _ = self.visuals.insert(visual.id, visual);
        Ok(())
    }

    fn remove_visual(&mut self, id: ParticleId) -> AnyResult<()> {
        if self.visuals.remove(&id).is_some() {
            self.removed += 1;
        }
        Ok(())
    }

    fn discard_visuals(&mut self) -> AnyResult<()> {
        self.discarded += self.visuals.len();
        self.visuals.clear();
        Ok(())
    }

    fn present_emissions(&mut self, panel: &EmissionPanel) -> AnyResult<()> {
        self.panel = Some(*panel);
        self.panels_presented += 1;
        Ok(())
    }

    fn present_blend(&mut self, gauge: &BlendGauge) -> AnyResult<()> {
        self.gauge = Some(*gauge);
        Ok(())
    }
}
