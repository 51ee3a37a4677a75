#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Emission metrics system that publishes interpolated indices on blend changes.

mod profile;

pub use profile::EmissionProfile;

use fuel_blend_core::{BlendPercentage, EmissionValues, Event};

/// Pure system that answers blend changes with published emission indices.
///
/// A failed computation leaves the last published values in place so the
/// presentation layer keeps showing the most recent good metrics.
#[derive(Debug)]
pub struct Emissions {
    profile: EmissionProfile,
    last_published: Option<(BlendPercentage, EmissionValues)>,
}

impl Emissions {
    /// Creates a new emissions system backed by the provided profile.
    #[must_use]
    pub fn new(profile: EmissionProfile) -> Self {
        Self {
            profile,
            last_published: None,
        }
    }

    /// Profile used for every computation.
    #[must_use]
    pub fn profile(&self) -> &EmissionProfile {
        &self.profile
    }

    /// Most recently published percentage and values, if any.
    #[must_use]
    pub fn last_published(&self) -> Option<(BlendPercentage, EmissionValues)> {
        self.last_published
    }

    /// Consumes world events and publishes emission updates for blend changes.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Event>) {
        for event in events {
            if let Event::BlendPercentageChanged { percentage } = event {
                self.publish(*percentage, out);
            }
        }
    }

    /// Computes and publishes the indices for `percentage` unconditionally.
    pub fn publish(&mut self, percentage: BlendPercentage, out: &mut Vec<Event>) {
        match self.profile.compute(f64::from(percentage.get())) {
            Ok(values) => {
                self.last_published = Some((percentage, values));
                out.push(Event::EmissionsUpdated { percentage, values });
            }
            Err(error) => {
                log::error!(
                    "emission lookup for {}% failed, keeping last values: {error}",
                    percentage.get()
                );
            }
        }
    }
}

impl Default for Emissions {
    fn default() -> Self {
        Self::new(EmissionProfile::default())
    }
}
