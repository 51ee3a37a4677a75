use fuel_blend_core::{BlendPercentage, Command, EmissionValues, Event, Pollutant};
use fuel_blend_system_emissions::{EmissionProfile, Emissions};
use fuel_blend_world::{self as world, World};

fn sweep() -> impl Iterator<Item = f64> {
    (0..=80).map(|step| f64::from(step) * 0.25)
}

#[test]
fn control_points_are_returned_verbatim() {
    let profile = EmissionProfile::default();
    for point in profile.points() {
        let computed = profile
            .compute(f64::from(point.percentage))
            .expect("anchor is covered");
        assert_eq!(computed, point.values, "drift at {}%", point.percentage);
    }
}

#[test]
fn boundary_values_match_the_table() {
    let profile = EmissionProfile::default();
    assert_eq!(
        profile.compute(0.0).expect("covered"),
        EmissionValues::new(100, 100, 100, 100)
    );
    assert_eq!(
        profile.compute(20.0).expect("covered"),
        EmissionValues::new(70, 50, 67, 80)
    );
}

#[test]
fn midpoints_round_half_away_from_zero() {
    let profile = EmissionProfile::default();
    let values = profile.compute(7.5).expect("covered");
    assert_eq!(values.co, 78);
    assert_eq!(values, EmissionValues::new(93, 78, 85, 93));

    let values = profile.compute(17.5).expect("covered");
    assert_eq!(values, EmissionValues::new(78, 55, 71, 83));
}

#[test]
fn interpolation_never_leaves_its_bracket() {
    let profile = EmissionProfile::default();
    let points = profile.points();

    for percentage in sweep() {
        let values = profile.compute(percentage).expect("covered");
        let pair = points
            .windows(2)
            .find(|pair| {
                f64::from(pair[0].percentage) <= percentage
                    && percentage <= f64::from(pair[1].percentage)
            })
            .expect("default profile covers the range");

        for pollutant in Pollutant::ALL {
            let a = pair[0].values.get(pollutant);
            let b = pair[1].values.get(pollutant);
            let value = values.get(pollutant);
            assert!(
                a.min(b) <= value && value <= a.max(b),
                "{pollutant:?} overshoots at {percentage}: {value} not within {a}..{b}"
            );
        }
    }
}

#[test]
fn indices_fall_monotonically_with_more_ethanol() {
    let profile = EmissionProfile::default();
    let mut previous = profile.compute(0.0).expect("covered");

    for percentage in sweep().skip(1) {
        let current = profile.compute(percentage).expect("covered");
        for pollutant in Pollutant::ALL {
            assert!(
                current.get(pollutant) <= previous.get(pollutant),
                "{pollutant:?} rose at {percentage}"
            );
        }
        previous = current;
    }
}

#[test]
fn compute_is_pure() {
    let profile = EmissionProfile::default();
    for percentage in sweep() {
        let first = profile.compute(percentage);
        let second = profile.compute(percentage);
        assert_eq!(first, second);
    }
}

#[test]
fn redundant_blend_input_publishes_once() {
    let mut world = World::new();
    let mut emissions = Emissions::default();
    let mut published = Vec::new();

    for value in [10, 10, 10, 10] {
        let mut events = Vec::new();
        world::apply(&mut world, Command::SetBlendPercentage { value }, &mut events);
        emissions.handle(&events, &mut published);
    }

    assert_eq!(
        published,
        vec![Event::EmissionsUpdated {
            percentage: BlendPercentage::clamped(10),
            values: EmissionValues::new(90, 70, 80, 90),
        }]
    );
    assert_eq!(
        emissions.last_published(),
        Some((
            BlendPercentage::clamped(10),
            EmissionValues::new(90, 70, 80, 90)
        ))
    );
}

#[test]
fn clamped_input_publishes_boundary_metrics() {
    let mut world = World::new();
    let mut emissions = Emissions::default();
    let mut published = Vec::new();

    for value in [999, -5] {
        let mut events = Vec::new();
        world::apply(&mut world, Command::SetBlendPercentage { value }, &mut events);
        emissions.handle(&events, &mut published);
    }

    assert_eq!(
        published,
        vec![
            Event::EmissionsUpdated {
                percentage: BlendPercentage::MAXIMUM,
                values: EmissionValues::new(70, 50, 67, 80),
            },
            Event::EmissionsUpdated {
                percentage: BlendPercentage::PURE_GASOLINE,
                values: EmissionValues::new(100, 100, 100, 100),
            },
        ]
    );
}
