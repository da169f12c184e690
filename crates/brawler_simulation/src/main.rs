//! Headless симуляция BRAWLER
//!
//! Scripted прогон: игрок идёт вправо через уровень и бьёт всё, что рядом.
//! Опционально принимает путь к RON конфигу первым аргументом.

use bevy::prelude::*;
use brawler_simulation::{
    combat_snapshot, create_headless_app_with_config, log_error, log_info, step_simulation, CombatEvent,
    CombatWorld, PlayerCommand, SimulationConfig,
};

fn load_config() -> SimulationConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SimulationConfig::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(source) => match SimulationConfig::from_ron_str(&source) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("Bad config {}: {}", path, err));
                SimulationConfig::default()
            }
        },
        Err(err) => {
            log_error(&format!("Can't read {}: {}", path, err));
            SimulationConfig::default()
        }
    }
}

fn main() {
    let seed = 42;
    let config = load_config();
    println!("Starting BRAWLER headless simulation (seed: {})", seed);

    let mut app = create_headless_app_with_config(config, seed);
    let mut kills = 0;
    let mut game_over = false;

    // 3000 тиков ≈ 48 sec симуляции
    for tick in 0..3000 {
        let world = app.world_mut();
        world.send_event(PlayerCommand::Move {
            direction: Vec2::new(1.0, 0.0),
        });
        if tick % 20 == 0 {
            world.send_event(PlayerCommand::Attack);
        }

        step_simulation(&mut app, 1);

        let events: Vec<CombatEvent> = app
            .world_mut()
            .resource_mut::<Events<CombatEvent>>()
            .drain()
            .collect();
        for event in events {
            match event {
                CombatEvent::EnemyDied(_) => kills += 1,
                CombatEvent::PlayerDied => game_over = true,
                _ => {}
            }
        }

        if tick % 100 == 0 {
            let world = app.world().resource::<CombatWorld>();
            println!(
                "Tick {}: player hp={}/{} x={:.0} lvl={}, live enemies={}, kills={}",
                tick,
                world.player.actor.health.current,
                world.player.actor.health.max,
                world.player.position().x,
                world.player.level,
                world.spawner.live_count(),
                kills
            );
        }
        if tick % 500 == 0 {
            log_info(&format!("Tick {}:\n{}", tick, combat_snapshot(app.world().resource::<CombatWorld>())));
        }
        if game_over {
            println!("Game over at tick {}", tick);
            break;
        }
    }

    let world = app.world().resource::<CombatWorld>();
    println!(
        "Simulation complete! kills={} level={} total_xp={}",
        kills, world.player.level, world.player.total_experience
    );
}
