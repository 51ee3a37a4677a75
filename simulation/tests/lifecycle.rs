use std::time::Duration;

use fuel_blend_core::{BlendPercentage, EmissionValues, EmitterKind, Event, ParticleId};
use fuel_blend_simulation::{Simulation, SimulationConfig};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn simulation() -> Simulation {
    let mut simulation =
        Simulation::new(SimulationConfig::default()).expect("default config is valid");
    let _ = simulation.drain_events();
    simulation
}

fn emission_updates(events: &[Event]) -> Vec<(BlendPercentage, EmissionValues)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::EmissionsUpdated { percentage, values } => Some((*percentage, *values)),
            _ => None,
        })
        .collect()
}

#[test]
fn start_fires_both_emitters_immediately() {
    let mut simulation = simulation();
    simulation.start();

    let events = simulation.drain_events();
    for emitter in EmitterKind::ALL {
        assert!(events.contains(&Event::EmitterFired {
            emitter,
            at: Duration::ZERO,
        }));
    }
    assert!(simulation.is_running());
    assert_eq!(
        simulation.pending_emission(EmitterKind::Exhaust),
        Some(ms(200))
    );
    assert!(simulation.particles().count_of(EmitterKind::Ambient) == 1);
}

#[test]
fn starting_twice_is_a_no_op() {
    let mut simulation = simulation();
    simulation.start();
    let _ = simulation.drain_events();

    simulation.start();
    assert!(simulation.drain_events().is_empty());
}

#[test]
fn blend_changes_publish_emissions_and_retune_the_exhaust() {
    let mut simulation = simulation();
    simulation.set_percentage(10);

    let events = simulation.drain_events();
    assert_eq!(
        events,
        vec![
            Event::BlendPercentageChanged {
                percentage: BlendPercentage::clamped(10),
            },
            Event::EmissionsUpdated {
                percentage: BlendPercentage::clamped(10),
                values: EmissionValues::new(90, 70, 80, 90),
            },
        ]
    );
    assert_eq!(simulation.exhaust_state().next_fire_delay, ms(130));
    assert_eq!(simulation.emissions(), Some(EmissionValues::new(90, 70, 80, 90)));
}

#[test]
fn out_of_range_input_is_clamped_and_deduplicated() {
    let mut simulation = simulation();
    simulation.set_percentage(-5);
    assert!(simulation.drain_events().is_empty(), "already at 0");

    simulation.set_percentage(999);
    simulation.set_percentage(999);
    simulation.nudge_percentage(3);

    let updates = emission_updates(&simulation.drain_events());
    assert_eq!(
        updates,
        vec![(BlendPercentage::MAXIMUM, EmissionValues::new(70, 50, 67, 80))]
    );
    assert_eq!(simulation.percentage(), BlendPercentage::MAXIMUM);
}

#[test]
fn nudging_walks_the_blend_one_step_at_a_time() {
    let mut simulation = simulation();
    simulation.nudge_percentage(1);
    simulation.nudge_percentage(1);
    simulation.nudge_percentage(-1);

    let percentages: Vec<u8> = emission_updates(&simulation.drain_events())
        .into_iter()
        .map(|(percentage, _)| percentage.get())
        .collect();
    assert_eq!(percentages, vec![1, 2, 1]);
}

#[test]
fn stop_leaves_no_timers_and_no_particles() {
    let mut simulation = simulation();
    simulation.start();
    simulation.advance(ms(2_500));
    assert!(!simulation.particles().is_empty());

    let _ = simulation.drain_events();
    simulation.stop();

    let events = simulation.drain_events();
    assert!(events.contains(&Event::EmitterStopped {
        emitter: EmitterKind::Exhaust
    }));
    assert!(events.contains(&Event::EmitterStopped {
        emitter: EmitterKind::Ambient
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ParticleExpired { .. })));
    assert_eq!(simulation.pending_timer_count(), 0);
    assert!(simulation.particles().is_empty());

    simulation.advance(ms(30_000));
    assert!(simulation
        .drain_events()
        .iter()
        .all(|event| matches!(event, Event::TimeAdvanced { .. })));
}

#[test]
fn stopping_a_stopped_simulation_is_a_no_op() {
    let mut simulation = simulation();
    simulation.stop();
    assert!(simulation.drain_events().is_empty());
}

#[test]
fn restart_after_stop_resumes_both_chains() {
    let mut simulation = simulation();
    simulation.start();
    simulation.advance(ms(1_000));
    simulation.stop();
    let _ = simulation.drain_events();

    simulation.start();
    let now = simulation.now();
    let events = simulation.drain_events();
    for emitter in EmitterKind::ALL {
        assert!(events.contains(&Event::EmitterFired { emitter, at: now }));
    }
    assert_eq!(
        simulation.pending_emission(EmitterKind::Exhaust),
        Some(now + ms(200))
    );
}

#[test]
fn coarse_steps_observe_every_deadline() {
    let mut coarse = simulation();
    coarse.start();
    coarse.advance(ms(10_000));

    let mut fine = simulation();
    fine.start();
    for _ in 0..625 {
        fine.advance(ms(16));
    }

    let fired = |events: Vec<Event>| -> Vec<(EmitterKind, Duration)> {
        events
            .into_iter()
            .filter_map(|event| match event {
                Event::EmitterFired { emitter, at } => Some((emitter, at)),
                _ => None,
            })
            .collect()
    };
    assert_eq!(fired(coarse.drain_events()), fired(fine.drain_events()));
    assert_eq!(coarse.now(), fine.now());
}

#[test]
fn particles_expire_exactly_once() {
    let mut simulation = simulation();
    simulation.start();
    simulation.advance(ms(30_000));
    let events = simulation.drain_events();

    let mut expired: Vec<ParticleId> = events
        .iter()
        .filter_map(|event| match event {
            Event::ParticleExpired { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    let total = expired.len();
    expired.sort();
    expired.dedup();
    assert_eq!(expired.len(), total, "a particle expired more than once");

    for event in &events {
        if let Event::ParticleSpawned { particle } = event {
            let removal = events.iter().find_map(|candidate| match candidate {
                Event::ParticleExpired { id, at } if *id == particle.id => Some(*at),
                _ => None,
            });
            match removal {
                Some(at) => assert_eq!(at, particle.expires_at()),
                None => assert!(particle.expires_at() > simulation.now()),
            }
        }
    }
}

#[test]
fn identical_configs_replay_identically() {
    let run = || {
        let mut simulation = simulation();
        simulation.start();
        simulation.advance(ms(3_000));
        simulation.set_percentage(15);
        simulation.advance(ms(3_000));
        simulation.set_viewport_width(640.0);
        simulation.advance(ms(3_000));
        simulation.drain_events()
    };
    assert_eq!(run(), run());
}

#[test]
fn different_seeds_diverge() {
    let run = |seed| {
        let config = SimulationConfig {
            seed,
            ..SimulationConfig::default()
        };
        let mut simulation = Simulation::new(config).expect("valid config");
        simulation.start();
        simulation.advance(ms(5_000));
        simulation.drain_events()
    };
    assert_ne!(run(1), run(2));
}
