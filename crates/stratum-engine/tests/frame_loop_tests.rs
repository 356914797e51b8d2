//! Frame loop driving a small scene: input routing, collision timing across
//! frames, and config loading from disk.

use std::cell::Cell;
use std::rc::Rc;

use stratum_engine::prelude::*;

const LEFT: KeyCode = KeyCode(0x25);
const RIGHT: KeyCode = KeyCode(0x27);

// -- Behaviors --------------------------------------------------------------

/// Moves while an arrow key is held.
struct Paddle {
    direction: f64,
    speed: f64,
    wall_hits: Rc<Cell<u32>>,
}

impl Behavior for Paddle {
    fn update(&mut self, body: &mut Body, _cmds: &mut LayerCommands, dt: f64) {
        body.translate(Vec2::new(self.direction * self.speed * dt, 0.0));
    }

    fn on_collision(&mut self, _body: &mut Body, other: &Contact<'_>, _cmds: &mut LayerCommands) {
        if other.label() == Some("wall") {
            self.wall_hits.set(self.wall_hits.get() + 1);
        }
    }

    fn on_key_down(&mut self, _body: &mut Body, event: KeyEvent, _cmds: &mut LayerCommands) {
        match event.key {
            LEFT => self.direction = -1.0,
            RIGHT => self.direction = 1.0,
            _ => {}
        }
    }

    fn on_key_up(&mut self, _body: &mut Body, event: KeyEvent, _cmds: &mut LayerCommands) {
        if event.key == LEFT || event.key == RIGHT {
            self.direction = 0.0;
        }
    }
}

/// Counts down frames, then destroys itself.
struct Fuse {
    frames_left: u32,
}

impl Behavior for Fuse {
    fn update(&mut self, body: &mut Body, _cmds: &mut LayerCommands, _dt: f64) {
        if self.frames_left == 0 {
            body.destroy();
        } else {
            self.frames_left -= 1;
        }
    }
}

fn headless(dt: f64) -> EngineConfig {
    EngineConfig {
        fixed_dt: dt,
        headless: true,
        ..Default::default()
    }
}

// -- Tests ------------------------------------------------------------------

#[test]
fn held_key_moves_paddle_into_wall() {
    let wall_hits = Rc::new(Cell::new(0));
    let mut frames = FrameLoop::new(World::new(), headless(0.1)).unwrap();
    let layer = frames.world_mut().add_layer();

    let paddle = frames
        .world_mut()
        .spawn_into(
            layer,
            Entity::from_shape(Shape::rect((0.0, 0.0), 5.0, 1.0))
                .with_label("paddle")
                .with_behavior(Paddle {
                    direction: 0.0,
                    speed: 100.0,
                    wall_hits: wall_hits.clone(),
                }),
        )
        .unwrap();
    frames
        .world_mut()
        .spawn_into(
            layer,
            Entity::from_shape(Shape::rect((40.0, 0.0), 1.0, 10.0)).with_label("wall"),
        )
        .unwrap();

    frames.run_frames(3);
    assert_eq!(wall_hits.get(), 0);

    frames.push_input(KeyAction::Down, KeyEvent::plain(RIGHT));
    // Frames 1-3 move the paddle to x = 30; its edge (35) meets the wall's (39)
    // only once it reaches x = 34.
    frames.run_frames(3);
    assert_eq!(wall_hits.get(), 0);
    frames.frame();
    assert_eq!(wall_hits.get(), 1, "overlap must be seen in the frame it happens");

    frames.push_input(KeyAction::Up, KeyEvent::plain(RIGHT));
    frames.frame();
    let x = frames.world().entity(paddle).unwrap().body().position().x;
    assert!((x - 40.0).abs() < 1e-9);
    assert_eq!(wall_hits.get(), 2);
}

#[test]
fn fused_entity_leaves_on_schedule() {
    let mut frames = FrameLoop::new(World::new(), headless(1.0 / 60.0)).unwrap();
    let layer = frames.world_mut().add_layer();
    let bomb = frames
        .world_mut()
        .spawn_into(
            layer,
            Entity::from_shape(Shape::circle((0.0, 0.0), 1.0)).with_behavior(Fuse { frames_left: 2 }),
        )
        .unwrap();

    frames.run_frames(2);
    assert!(frames.world().entity(bomb).is_some());
    frames.frame();
    assert!(frames.world().entity(bomb).is_none());
    assert_eq!(frames.last_diagnostics().removed, 1);
}

#[test]
fn diagnostics_count_collisions() {
    let mut frames = FrameLoop::new(World::new(), headless(1.0 / 60.0)).unwrap();
    let layer = frames.world_mut().add_layer();
    for x in [0.0, 8.0] {
        frames
            .world_mut()
            .spawn_into(layer, Entity::from_shape(Shape::circle((x, 0.0), 5.0)))
            .unwrap();
    }
    assert_eq!(frames.run_frames(4), 8);
    assert_eq!(frames.last_diagnostics().collisions, 2);
}

#[test]
fn config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("stratum-config-{}.json", std::process::id()));
    let config = EngineConfig {
        fixed_dt: 0.05,
        debug: true,
        log_filter: "stratum_scene=trace".to_owned(),
        ..Default::default()
    };
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = EngineConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, config);

    let frames = FrameLoop::new(World::with_config(loaded.world_config()), loaded).unwrap();
    assert!(frames.world().debug());
    assert_eq!(frames.fixed_dt(), 0.05);
}
