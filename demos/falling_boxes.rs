use phys2d::{
    core::BroadPhaseKind,
    forces::DragForce,
    Material, PhysicsWorld, Shape, SimulationConfig, Vector2,
};
use std::time::Instant;

const TIME_STEP: f32 = 1.0 / 60.0;
const SECONDS: usize = 5;

fn main() {
    let broad_phase = match std::env::args().nth(1).as_deref() {
        Some("brute") => BroadPhaseKind::BruteForce,
        _ => BroadPhaseKind::AabbTree,
    };
    let config = SimulationConfig { broad_phase, ..SimulationConfig::default() };
    let mut world = PhysicsWorld::with_config(config);

    // Floor and two walls
    let floor = world.create_body(&Shape::rectangle(40.0, 1.0), Vector2::new(0.0, -0.5), 0.0);
    world.create_body(&Shape::rectangle(1.0, 30.0), Vector2::new(-20.5, 15.0), 0.0);
    world.create_body(&Shape::rectangle(1.0, 30.0), Vector2::new(20.5, 15.0), 0.0);
    if let Ok(body) = world.get_body_mut(floor) {
        body.set_material(Material::wood());
    }

    let mut drag = DragForce::new(0.002);
    let mut boxes = Vec::new();
    for row in 0..6 {
        for column in 0..8 {
            let x = -14.0 + column as f32 * 4.0 + (row % 2) as f32;
            let y = 4.0 + row as f32 * 3.0;
            let (handle, material) = if (row + column) % 3 == 0 {
                (world.create_body(&Shape::circle(0.8), Vector2::new(x, y), 1.0), Material::rubber())
            } else if row % 2 == 0 {
                (world.create_body(&Shape::rectangle(1.5, 1.5), Vector2::new(x, y), 1.0), Material::ice())
            } else {
                (world.create_body(&Shape::rectangle(1.5, 1.5), Vector2::new(x, y), 2.0), Material::metal())
            };
            if let Ok(body) = world.get_body_mut(handle) {
                body.set_material(material);
            }
            drag.add_body(handle);
            boxes.push(handle);
        }
    }
    world.add_force_generator(Box::new(drag));

    println!("Falling Boxes ({})", world.broad_phase().name());
    println!("-------------------");

    let start = Instant::now();
    for second in 1..=SECONDS {
        for _ in 0..60 {
            world.step(TIME_STEP);
        }

        let lowest = boxes
            .iter()
            .filter_map(|handle| world.get_body(*handle).ok())
            .map(|body| body.get_position().y)
            .fold(f32::INFINITY, f32::min);
        println!(
            "t={}s contacts={:>3} lowest body y={:.3}",
            second,
            world.contacts().len(),
            lowest
        );
    }

    let elapsed = start.elapsed().as_secs_f32();
    println!("Simulated {} steps in {:.3}s", SECONDS * 60, elapsed);
}
