//! Blend percentage ownership and input clamping.

use fuel_blend_core::BlendPercentage;

/// Owns the current blend percentage and filters redundant updates.
#[derive(Debug, Default)]
pub(crate) struct ParameterController {
    current: BlendPercentage,
}

impl ParameterController {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) const fn current(&self) -> BlendPercentage {
        self.current
    }

    /// Clamps `value` and adopts it. Returns the new percentage only when it changed.
    pub(crate) fn set_percentage(&mut self, value: i64) -> Option<BlendPercentage> {
        if !BlendPercentage::is_in_range(value) {
            log::debug!("blend input {value} outside supported range; clamping");
        }

        let clamped = BlendPercentage::clamped(value);
        if clamped == self.current {
            return None;
        }

        self.current = clamped;
        Some(clamped)
    }

    /// Moves the percentage by a relative number of steps.
    pub(crate) fn nudge(&mut self, steps: i64) -> Option<BlendPercentage> {
        let target = i64::from(self.current.get()).saturating_add(steps);
        self.set_percentage(target)
    }
}
