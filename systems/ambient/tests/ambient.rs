use std::time::Duration;

use fuel_blend_core::{Command, EmitterKind, Event, Particle};
use fuel_blend_system_ambient::{Ambient, AmbientTuning, Config};
use fuel_blend_world::{self as world, query, World};

const SEED: u64 = 0xa4b1_e47;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn pump(world: &mut World, ambient: &mut Ambient, pending: Vec<Event>, log: &mut Vec<Event>) {
    let mut events = pending;

    while !events.is_empty() {
        let mut commands = Vec::new();
        ambient.handle(&events, query::viewport_width(world), &mut commands);
        log.append(&mut events);

        for command in commands {
            world::apply(world, command, &mut events);
        }
    }
}

fn execute(world: &mut World, ambient: &mut Ambient, command: Command, log: &mut Vec<Event>) {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    pump(world, ambient, events, log);
}

fn advance(world: &mut World, ambient: &mut Ambient, dt: Duration, log: &mut Vec<Event>) {
    let target = query::now(world) + dt;
    while let Some(deadline) = query::next_deadline(world).filter(|due| *due <= target) {
        let step = deadline.saturating_sub(query::now(world));
        execute(world, ambient, Command::Tick { dt: step }, log);
    }
    let remaining = target.saturating_sub(query::now(world));
    if !remaining.is_zero() {
        execute(world, ambient, Command::Tick { dt: remaining }, log);
    }
}

fn ambient_fire_times(log: &[Event]) -> Vec<Duration> {
    log.iter()
        .filter_map(|event| match event {
            Event::EmitterFired {
                emitter: EmitterKind::Ambient,
                at,
            } => Some(*at),
            _ => None,
        })
        .collect()
}

fn spawned(log: &[Event]) -> Vec<Particle> {
    log.iter()
        .filter_map(|event| match event {
            Event::ParticleSpawned { particle } => Some(*particle),
            _ => None,
        })
        .collect()
}

fn run(width: f32, duration: Duration) -> (World, Vec<Event>) {
    let mut world = World::new();
    let mut ambient = Ambient::new(Config::new(AmbientTuning::default(), SEED));
    let mut log = Vec::new();
    execute(
        &mut world,
        &mut ambient,
        Command::ConfigureViewport { width },
        &mut log,
    );
    execute(&mut world, &mut ambient, Command::StartEmitters, &mut log);
    advance(&mut world, &mut ambient, duration, &mut log);
    (world, log)
}

#[test]
fn first_particle_appears_at_start() {
    let (_, log) = run(1_280.0, Duration::ZERO);
    let particles = spawned(&log);
    assert_eq!(particles.len(), 1);
    assert_eq!(particles[0].spawn_time, Duration::ZERO);
    assert_eq!(particles[0].kind, EmitterKind::Ambient);
}

#[test]
fn delays_stay_within_the_configured_range() {
    let (_, log) = run(1_280.0, ms(120_000));
    let fires = ambient_fire_times(&log);
    assert!(fires.len() > 20, "only {} firings", fires.len());

    for pair in fires.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= ms(1_000) && gap < ms(4_000), "gap {gap:?}");
    }
}

#[test]
fn every_firing_spawns_exactly_one_particle() {
    let (_, log) = run(1_280.0, ms(60_000));
    assert_eq!(spawned(&log).len(), ambient_fire_times(&log).len());
}

#[test]
fn particles_respect_viewport_and_appearance_ranges() {
    let (_, log) = run(640.0, ms(120_000));
    for particle in spawned(&log) {
        assert!((0.0..=640.0).contains(&particle.origin_x));
        assert_eq!(particle.origin_y, 0.0);
        assert!((2.0..=6.0).contains(&particle.size), "size {}", particle.size);
        assert!((-50.0..=50.0).contains(&particle.drift_x));
        assert_eq!(particle.opacity, 1.0);
        assert_eq!(particle.ttl, ms(20_000));
    }
}

#[test]
fn zero_width_viewport_pins_particles_to_the_left_edge() {
    let (_, log) = run(0.0, ms(10_000));
    let particles = spawned(&log);
    assert!(!particles.is_empty());
    assert!(particles.iter().all(|particle| particle.origin_x == 0.0));
}

#[test]
fn live_set_only_holds_unexpired_particles() {
    let (world, log) = run(1_280.0, ms(60_000));
    let now = query::now(&world);
    let view = query::particle_view(&world);

    let expected = spawned(&log)
        .into_iter()
        .filter(|particle| particle.expires_at() > now)
        .count();
    assert_eq!(view.len(), expected);
    assert_eq!(view.count_of(EmitterKind::Exhaust), 0);
}

#[test]
fn identical_seeds_replay_identically() {
    let (_, first) = run(1_280.0, ms(30_000));
    let (_, second) = run(1_280.0, ms(30_000));
    assert_eq!(first, second);
}
