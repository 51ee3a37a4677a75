//! Validated emission lookup table and the interpolation over it.

use fuel_blend_core::{
    ConfigurationError, ControlPoint, EmissionValues, Pollutant, MAX_BLEND_PERCENTAGE,
    MIN_BLEND_PERCENTAGE,
};

const DEFAULT_POINTS: [ControlPoint; 5] = [
    ControlPoint::new(0, EmissionValues::new(100, 100, 100, 100)),
    ControlPoint::new(5, EmissionValues::new(95, 85, 90, 95)),
    ControlPoint::new(10, EmissionValues::new(90, 70, 80, 90)),
    ControlPoint::new(15, EmissionValues::new(85, 60, 75, 85)),
    ControlPoint::new(20, EmissionValues::new(70, 50, 67, 80)),
];

/// Control points ordered by ascending blend percentage.
///
/// Construction enforces that the table pins both ends of the blend range,
/// that percentages are unique, and that every index stays on the 0..=100
/// scale. [`EmissionProfile::compute`] still reports a
/// [`ConfigurationError`] instead of panicking if a bracket cannot be found.
#[derive(Clone, Debug, PartialEq)]
pub struct EmissionProfile {
    points: Vec<ControlPoint>,
}

impl Default for EmissionProfile {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS.to_vec(),
        }
    }
}

impl EmissionProfile {
    /// Validates and sorts the provided control points.
    pub fn new(mut points: Vec<ControlPoint>) -> Result<Self, ConfigurationError> {
        if points.len() < 2 {
            return Err(ConfigurationError::TooFewControlPoints {
                count: points.len(),
            });
        }

        points.sort_by_key(|point| point.percentage);

        for pair in points.windows(2) {
            if pair[0].percentage == pair[1].percentage {
                return Err(ConfigurationError::DuplicateControlPoint {
                    percentage: pair[0].percentage,
                });
            }
        }

        for point in &points {
            if point.percentage > MAX_BLEND_PERCENTAGE {
                return Err(ConfigurationError::ControlPointOutOfDomain {
                    percentage: point.percentage,
                });
            }

            for pollutant in Pollutant::ALL {
                let value = point.values.get(pollutant);
                if value > EmissionValues::BASELINE {
                    return Err(ConfigurationError::IndexOutOfRange {
                        percentage: point.percentage,
                        pollutant,
                        value,
                    });
                }
            }
        }

        for boundary in [MIN_BLEND_PERCENTAGE, MAX_BLEND_PERCENTAGE] {
            if !points.iter().any(|point| point.percentage == boundary) {
                return Err(ConfigurationError::MissingBoundary {
                    percentage: boundary,
                });
            }
        }

        Ok(Self { points })
    }

    /// Wraps points as given, bypassing validation.
    #[cfg(test)]
    pub(crate) fn from_points_unchecked(points: Vec<ControlPoint>) -> Self {
        Self { points }
    }

    /// Control points in ascending percentage order.
    #[must_use]
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Computes the emission indices for an arbitrary blend percentage.
    ///
    /// Out-of-range input (including NaN) is clamped to the nearest end of the
    /// blend range; the table is never extrapolated. Percentages that land on a
    /// control point return that point's values untouched. Anything else is
    /// linearly interpolated between the adjacent pair and rounded half away
    /// from zero.
    pub fn compute(&self, percentage: f64) -> Result<EmissionValues, ConfigurationError> {
        let percentage = clamp_to_domain(percentage);

        if let Some(point) = self
            .points
            .iter()
            .find(|point| f64::from(point.percentage) == percentage)
        {
            return Ok(point.values);
        }

        if self.points.len() < 2 {
            return Err(ConfigurationError::TooFewControlPoints {
                count: self.points.len(),
            });
        }

        let (lower, upper) = self
            .points
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .find(|(lower, upper)| {
                f64::from(lower.percentage) <= percentage
                    && percentage <= f64::from(upper.percentage)
            })
            .ok_or(ConfigurationError::UncoveredPercentage { percentage })?;

        if lower.percentage == upper.percentage {
            return Err(ConfigurationError::DegenerateBracket { percentage });
        }

        let span = f64::from(upper.percentage) - f64::from(lower.percentage);
        let ratio = (percentage - f64::from(lower.percentage)) / span;
        let blend = |pollutant| {
            lerp_index(
                lower.values.get(pollutant),
                upper.values.get(pollutant),
                ratio,
            )
        };

        Ok(EmissionValues::new(
            blend(Pollutant::Co2),
            blend(Pollutant::Co),
            blend(Pollutant::Hc),
            blend(Pollutant::Pm),
        ))
    }
}

fn clamp_to_domain(percentage: f64) -> f64 {
    let min = f64::from(MIN_BLEND_PERCENTAGE);
    let max = f64::from(MAX_BLEND_PERCENTAGE);
    if percentage.is_nan() {
        return min;
    }
    percentage.clamp(min, max)
}

fn lerp_index(lower: u8, upper: u8, ratio: f64) -> u8 {
    let lower = f64::from(lower);
    let upper = f64::from(upper);
    let value = (lower + (upper - lower) * ratio).round();
    value.clamp(0.0, f64::from(EmissionValues::BASELINE)) as u8
}
