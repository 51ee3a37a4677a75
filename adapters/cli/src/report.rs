//! Plain-text rendering backend that prints panels as they change.

use std::io::Write;

use anyhow::{Context, Result};
use fuel_blend_core::{EmitterKind, ParticleId};
use fuel_blend_rendering::{
    BlendGauge, EmissionPanel, HeadlessBackend, ParticleVisual, RenderingBackend, Severity,
};

const BAR_WIDTH: usize = 20;

/// Prints blend and emission updates while tracking visuals headlessly.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
    scene: HeadlessBackend,
}

impl<W: Write> TextBackend<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            scene: HeadlessBackend::new(),
        }
    }

    /// Prints the particle counters accumulated over the run.
    pub(crate) fn write_summary(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "particles: {} spawned, {} expired, {} discarded, {} live ({} exhaust, {} ambient)",
            self.scene.spawned_count(),
            self.scene.removed_count(),
            self.scene.discarded_count(),
            self.scene.live_count(),
            self.scene.live_count_of(EmitterKind::Exhaust),
            self.scene.live_count_of(EmitterKind::Ambient),
        )
        .context("failed to write run summary")
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn spawn_visual(&mut self, visual: ParticleVisual) -> Result<()> {
        self.scene.spawn_visual(visual)
    }

    fn remove_visual(&mut self, id: ParticleId) -> Result<()> {
        self.scene.remove_visual(id)
    }

    fn discard_visuals(&mut self) -> Result<()> {
        self.scene.discard_visuals()
    }

    fn present_emissions(&mut self, panel: &EmissionPanel) -> Result<()> {
        self.scene.present_emissions(panel)?;
        writeln!(self.out, "emissions at E{}:", panel.percentage.get())
            .context("failed to write emission panel")?;
        for card in &panel.cards {
            let filled = (card.bar_fraction() * BAR_WIDTH as f32).round() as usize;
            writeln!(
                self.out,
                "  {:<4}{:>5}  [{}{}]  {}  ({})",
                card.pollutant.label(),
                card.value_label(),
                "#".repeat(filled.min(BAR_WIDTH)),
                "-".repeat(BAR_WIDTH.saturating_sub(filled)),
                card.reduction_label(),
                severity_label(card.severity()),
            )
            .context("failed to write emission panel")?;
        }
        Ok(())
    }

    fn present_blend(&mut self, gauge: &BlendGauge) -> Result<()> {
        self.scene.present_blend(gauge)?;
        writeln!(
            self.out,
            "{} ({}), engine efficiency {:?}, shake period {:?}",
            gauge.label(),
            gauge.caption(),
            gauge.efficiency(),
            gauge.vibration_period(),
        )
        .context("failed to write blend gauge")
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "low",
        Severity::Medium => "medium",
        Severity::High => "high",
    }
}
