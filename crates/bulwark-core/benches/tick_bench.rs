use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;

use bulwark_core::config::{EnemyProfile, QuotaRounding, SessionConfig, TurretProfile, WaveConfig};
use bulwark_core::path::PathCatalog;
use bulwark_core::session::Session;

fn winding_path() -> PathCatalog {
    // Zig-zag across a 100x100 field
    let waypoints = (0..10)
        .map(|i| {
            let y = i as f32 * 10.0;
            let x = if i % 2 == 0 { 0.0 } else { 100.0 };
            Vec2::new(x, y)
        })
        .collect();
    PathCatalog::new(waypoints).unwrap()
}

fn busy_config() -> SessionConfig {
    SessionConfig {
        wave: WaveConfig {
            base_enemies: 200,
            enemies_per_second: 60.0,
            time_between_waves: 0.5,
            difficulty_scaling_factor: 1.0,
            rounding: QuotaRounding::Ceiling,
        },
        roster: vec![EnemyProfile::fast(), EnemyProfile::tank()],
        seed: 42,
        ..SessionConfig::default()
    }
}

fn populated_session(turrets: usize) -> Session {
    let mut session = Session::new(busy_config(), winding_path()).unwrap();
    for i in 0..turrets {
        let x = (i % 10) as f32 * 10.0 + 5.0;
        let y = (i / 10) as f32 * 10.0 + 5.0;
        let profile = if i % 2 == 0 {
            TurretProfile::fire()
        } else {
            TurretProfile::ice().with_rotation_speed(4.0)
        };
        session.place_turret(profile, Vec2::new(x, y)).unwrap();
    }
    // Let the first wave fill the path
    for _ in 0..240 {
        session.tick(1.0 / 60.0);
    }
    session
}

fn bench_tick_without_turrets(c: &mut Criterion) {
    let mut session = Session::new(busy_config(), winding_path()).unwrap();

    c.bench_function("tick_without_turrets", |b| {
        b.iter(|| session.tick(black_box(1.0 / 60.0)))
    });
}

fn bench_tick_populated(c: &mut Criterion) {
    let mut session = populated_session(40);

    c.bench_function("tick_populated_session", |b| {
        b.iter(|| session.tick(black_box(1.0 / 60.0)))
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let session = populated_session(40);

    c.bench_function("snapshot", |b| b.iter(|| black_box(session.snapshot())));
}

criterion_group!(benches, bench_tick_without_turrets, bench_tick_populated, bench_snapshot);
criterion_main!(benches);
