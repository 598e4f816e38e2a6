//! Falling stack example
//!
//! Three crates dropped from different heights land on a platform and pile
//! up into a stack. Run with `RUST_LOG=debug` to see the engine's contact
//! logging.

use glam::DVec2;
use rigid2d::prelude::*;

fn main() {
    env_logger::init();

    println!("rigid2d - Falling Stack Example");
    println!("================================\n");

    // Build the scene: a wide platform and three crates above it.
    let mut world = World::new();
    world
        .create_body(
            world.root(),
            BodyDesc::platform(Rect::from_xywh(-200.0, 0.0, 400.0, 20.0)).with_name("platform"),
        )
        .expect("platform under root");
    println!("Created platform with top surface at y=0");

    let mut crates = Vec::new();
    for (i, height) in [-100.0, -250.0, -400.0].into_iter().enumerate() {
        let node = world
            .create_body(
                world.root(),
                BodyDesc::dynamic()
                    .with_rect(Rect::from_xywh(0.0, 0.0, 30.0, 30.0))
                    .with_mass(10.0)
                    .with_position(DVec2::new(0.0, height))
                    .with_name(format!("crate-{i}")),
            )
            .expect("crate under root");
        crates.push(node);
        println!("Created crate-{i} at y={height}");
    }

    // Register the bodies with the engine.
    let mut engine = PhysicsEngine::default();
    engine.update_metadata(&world);

    // Simulation parameters
    let dt = 1.0 / 60.0;
    let total_time = 3.0;
    let steps = (total_time / dt) as usize;

    println!("\nSimulating {total_time} seconds ({steps} steps at 60Hz)...\n");

    for i in 0..steps {
        if let Err(err) = engine.step(&mut world, dt) {
            eprintln!("simulation stopped: {err}");
            return;
        }

        // Print the stack every half second.
        if i % 30 == 0 {
            print!("t={:.2}s:", i as f64 * dt);
            for &node in &crates {
                let pos = world.position(node).unwrap_or(DVec2::ZERO);
                let standing = engine.is_standing(node).unwrap_or(false);
                print!(
                    " y={:.1}{}",
                    pos.y,
                    if standing { " (standing)" } else { "" }
                );
            }
            println!();
        }
    }

    println!("\nFinal stack, bottom to top:");
    for &node in &crates {
        let name = world.name(node).unwrap_or("?");
        let pos = world.position(node).unwrap_or(DVec2::ZERO);
        let state = if engine.is_static(node).unwrap_or(false) {
            "static"
        } else if engine.is_standing(node).unwrap_or(false) {
            "standing"
        } else {
            "moving"
        };
        println!("  {name}: y={:.1} ({state})", pos.y);
    }
    println!("Expected: crates resting at y=-30, -60, -90 (30 units tall each)");
}
