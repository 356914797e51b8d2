//! Headless asteroid field: a turret fires at drifting rocks for ten seconds
//! of simulated time and prints what happened.
//!
//! Run with:
//!   RUST_LOG=stratum_scene=debug cargo run --example asteroid_field -p stratum-engine

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use stratum_engine::prelude::*;

const FIRE: KeyCode = KeyCode(32);
const FIELD: f64 = 400.0;

// ---------------------------------------------------------------------------
// Behaviors
// ---------------------------------------------------------------------------

/// Drifts and wraps around the field edges. Shatters when hit by a bullet.
struct Rock {
    velocity: Vec2,
}

impl Behavior for Rock {
    fn update(&mut self, body: &mut Body, _cmds: &mut LayerCommands, dt: f64) {
        body.translate(self.velocity * dt);
        let p = body.position();
        body.set_position((p.x.rem_euclid(FIELD), p.y.rem_euclid(FIELD)));
    }

    fn on_collision(&mut self, body: &mut Body, other: &Contact<'_>, _cmds: &mut LayerCommands) {
        if other.label() == Some("bullet") {
            body.destroy();
        }
    }
}

/// Flies straight until it leaves the field or hits a rock.
struct Bullet {
    velocity: Vec2,
}

impl Behavior for Bullet {
    fn update(&mut self, body: &mut Body, _cmds: &mut LayerCommands, dt: f64) {
        body.translate(self.velocity * dt);
        let p = body.position();
        if !(0.0..FIELD).contains(&p.x) || !(0.0..FIELD).contains(&p.y) {
            body.destroy();
        }
    }

    fn on_collision(&mut self, body: &mut Body, other: &Contact<'_>, _cmds: &mut LayerCommands) {
        if other.label() == Some("rock") {
            body.destroy();
        }
    }
}

/// Fires a bullet on every key press, rotating its aim each shot.
struct Turret {
    shots: u32,
}

impl Behavior for Turret {
    fn on_key_down(&mut self, body: &mut Body, event: KeyEvent, cmds: &mut LayerCommands) {
        if event.key != FIRE {
            return;
        }
        let angle = self.shots as f64 * 0.7;
        self.shots += 1;
        let velocity = Vec2::new(angle.cos(), angle.sin()) * 300.0;
        cmds.spawn(
            Entity::new(body.position(), Visual::new(4.0, 4.0).with_anchor((2.0, 2.0)), ShapeKind::Circle)
                .with_label("bullet")
                .with_behavior(Bullet { velocity }),
        );
    }
}

// ---------------------------------------------------------------------------
// Scene setup
// ---------------------------------------------------------------------------

fn main() -> Result<(), anyhow::Error> {
    let config = EngineConfig {
        headless: true,
        log_filter: "info".to_owned(),
        ..Default::default()
    };
    init_tracing(&config.log_filter)?;

    let mut rng = Pcg64::seed_from_u64(0x5eed);
    let mut world = World::with_config(config.world_config());
    let play = world.add_layer();
    let hud = world.add_layer();

    world.spawn_into(
        play,
        Entity::new(
            (FIELD / 2.0, FIELD / 2.0),
            Visual::new(24.0, 24.0).with_anchor((12.0, 12.0)),
            "rectangle".parse::<ShapeKind>()?,
        )
        .with_label("turret")
        .with_behavior(Turret { shots: 0 }),
    )?;

    for _ in 0..40 {
        let position = (rng.gen_range(0.0..FIELD), rng.gen_range(0.0..FIELD));
        let velocity = Vec2::new(rng.gen_range(-40.0..40.0), rng.gen_range(-40.0..40.0));
        let size = rng.gen_range(12.0..32.0);
        world.spawn_into(
            play,
            Entity::new(position, Visual::new(size, size), "circle".parse::<ShapeKind>()?)
                .with_label("rock")
                .with_behavior(Rock { velocity }),
        )?;
    }

    let score = world.spawn_into(
        hud,
        Decoration::new("rocks: 40", (10.0, FIELD - 10.0))
            .with_anchor(Anchor::default())
            .with_color([255, 220, 0]),
    )?;

    let mut frames = FrameLoop::new(world, config)?;
    let seconds = 10;
    let frames_per_second = (1.0 / frames.fixed_dt()).round() as u64;

    for frame in 0..seconds * frames_per_second {
        if frame % 6 == 0 {
            frames.push_input(KeyAction::Down, KeyEvent::plain(FIRE));
            frames.push_input(KeyAction::Up, KeyEvent::plain(FIRE));
        }
        frames.frame();

        let rocks = frames
            .world()
            .layer(play)
            .map(|layer| {
                layer
                    .entities()
                    .iter()
                    .filter(|&&id| {
                        frames.world().entity(id).and_then(|e| e.body().label()) == Some("rock")
                    })
                    .count()
            })
            .unwrap_or(0);
        if let Some(label) = frames.world_mut().decoration_mut(score) {
            label.set_text(format!("rocks: {rocks}"));
        }
    }

    let remaining = frames
        .world()
        .decoration(score)
        .map(|d| d.text().to_owned())
        .unwrap_or_default();
    println!(
        "{} frames, {:.1}s simulated, {remaining}",
        frames.frame_count(),
        frames.sim_time()
    );

    let mut world = frames.into_world();
    world.remove_all_layers();
    Ok(())
}
