//! End-to-end frame pipeline scenarios: update order, collision freshness,
//! deferred destruction, and commands issued from hooks.

use std::cell::RefCell;
use std::rc::Rc;

use stratum_scene::prelude::*;

// -- Test behaviors ---------------------------------------------------------

type Hits = Rc<RefCell<Vec<(String, String)>>>;

fn name(body: &Body) -> String {
    body.label().unwrap_or("?").to_owned()
}

/// Moves at a constant velocity and records every collision it receives.
struct Mover {
    velocity: Vec2,
    hits: Hits,
}

impl Behavior for Mover {
    fn update(&mut self, body: &mut Body, _cmds: &mut LayerCommands, dt: f64) {
        body.translate(self.velocity * dt);
    }

    fn on_collision(&mut self, body: &mut Body, other: &Contact<'_>, _cmds: &mut LayerCommands) {
        self.hits
            .borrow_mut()
            .push((name(body), other.label().unwrap_or("?").to_owned()));
    }
}

/// Teleports to a queued position on its next update.
struct Teleport {
    to: Option<Vec2>,
    hits: Hits,
}

impl Behavior for Teleport {
    fn update(&mut self, body: &mut Body, _cmds: &mut LayerCommands, _dt: f64) {
        if let Some(p) = self.to.take() {
            body.set_position(p);
        }
    }

    fn on_collision(&mut self, body: &mut Body, other: &Contact<'_>, _cmds: &mut LayerCommands) {
        self.hits
            .borrow_mut()
            .push((name(body), other.label().unwrap_or("?").to_owned()));
    }
}

/// Spawns a bullet when space is pressed.
struct Gun;

impl Behavior for Gun {
    fn on_key_down(&mut self, body: &mut Body, event: KeyEvent, cmds: &mut LayerCommands) {
        if event.key == KeyCode(32) {
            cmds.spawn(
                Entity::from_shape(Shape::circle(body.position(), 0.5)).with_label("bullet"),
            );
        }
    }
}

/// Destroys whatever it touches.
struct Hazard;

impl Behavior for Hazard {
    fn on_collision(&mut self, _body: &mut Body, other: &Contact<'_>, cmds: &mut LayerCommands) {
        cmds.destroy(other.id);
    }
}

fn still(label: &str, shape: Shape, hits: &Hits) -> Entity {
    Entity::from_shape(shape).with_label(label).with_behavior(Mover {
        velocity: Vec2::ZERO,
        hits: hits.clone(),
    })
}

fn hits() -> Hits {
    Rc::new(RefCell::new(Vec::new()))
}

const DT: f64 = 1.0 / 60.0;

// -- Scenarios --------------------------------------------------------------

#[test]
fn circle_overlap_then_separation() {
    let log = hits();
    let mut world = World::new();
    let layer = world.add_layer();

    world
        .spawn_into(layer, still("a", Shape::circle((0.0, 0.0), 5.0), &log))
        .unwrap();
    let b = world
        .spawn_into(
            layer,
            Entity::from_shape(Shape::circle((8.0, 0.0), 5.0))
                .with_label("b")
                .with_behavior(Teleport {
                    to: None,
                    hits: log.clone(),
                }),
        )
        .unwrap();

    // distance 8 < 10
    world.update(DT);
    assert_eq!(
        *log.borrow(),
        vec![
            ("a".to_owned(), "b".to_owned()),
            ("b".to_owned(), "a".to_owned())
        ]
    );

    // distance 12 > 10
    log.borrow_mut().clear();
    world.entity_mut(b).unwrap().body_mut().set_position((12.0, 0.0));
    let report = world.update(DT);
    assert_eq!(report.collisions(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn separated_rectangles_do_not_collide() {
    let log = hits();
    let mut world = World::new();
    let layer = world.add_layer();
    world
        .spawn_into(layer, still("a", Shape::rect((0.0, 0.0), 2.0, 2.0), &log))
        .unwrap();
    world
        .spawn_into(layer, still("b", Shape::rect((5.0, 0.0), 2.0, 2.0), &log))
        .unwrap();

    let report = world.update(DT);
    assert_eq!(report.collisions(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn movement_in_update_is_seen_by_same_frame_collisions() {
    let log = hits();
    let mut world = World::new();
    let layer = world.add_layer();
    world
        .spawn_into(layer, still("target", Shape::circle((0.0, 0.0), 5.0), &log))
        .unwrap();
    world
        .spawn_into(
            layer,
            Entity::from_shape(Shape::circle((50.0, 0.0), 5.0))
                .with_label("jumper")
                .with_behavior(Teleport {
                    to: Some(Vec2::new(6.0, 0.0)),
                    hits: log.clone(),
                }),
        )
        .unwrap();

    let report = world.update(DT);
    assert_eq!(report.collisions(), 2);
    assert!(log
        .borrow()
        .contains(&("target".to_owned(), "jumper".to_owned())));
}

#[test]
fn visual_entities_collide_by_derived_shape() {
    let log = hits();
    let mut world = World::new();
    let layer = world.add_layer();
    // 10x10 sprites anchored bottom-left; shapes centered at (5,5) and (13,5).
    for (label, x) in [("left", 0.0), ("right", 8.0)] {
        let e = Entity::new((x, 0.0), Visual::new(10.0, 10.0), ShapeKind::Rectangle)
            .with_label(label)
            .with_behavior(Mover {
                velocity: Vec2::ZERO,
                hits: log.clone(),
            });
        world.spawn_into(layer, e).unwrap();
    }
    assert_eq!(world.update(DT).collisions(), 2);
}

#[test]
fn destroyed_entity_never_collides_again() {
    let log = hits();
    let mut world = World::new();
    let layer = world.add_layer();
    let a = world
        .spawn_into(layer, still("a", Shape::circle((0.0, 0.0), 5.0), &log))
        .unwrap();
    world
        .spawn_into(layer, still("b", Shape::circle((1.0, 0.0), 5.0), &log))
        .unwrap();

    world.entity_mut(a).unwrap().destroy();
    assert_eq!(
        world.entity(a).unwrap().lifecycle(),
        Lifecycle::MarkedForRemoval
    );

    let report = world.update(DT);
    assert_eq!(report.removed(), 1);
    assert!(log.borrow().is_empty());
    assert!(world.entity(a).is_none());
    assert_eq!(world.layer(layer).unwrap().entities().len(), 1);
}

#[test]
fn spawned_items_join_on_the_next_frame() {
    let mut world = World::new();
    let layer = world.add_layer();
    world
        .spawn_into(
            layer,
            Entity::from_shape(Shape::circle((0.0, 0.0), 1.0))
                .with_label("gun")
                .with_behavior(Gun),
        )
        .unwrap();

    world.key_down(KeyEvent::plain(KeyCode(32)));
    assert_eq!(world.layer(layer).unwrap().entities().len(), 2);

    // Bullet spawned on top of the gun: both see each other on the next frame.
    let report = world.update(DT);
    assert_eq!(report.collisions(), 2);
}

#[test]
fn destroy_command_removes_target_next_frame() {
    let log = hits();
    let mut world = World::new();
    let layer = world.add_layer();
    world
        .spawn_into(
            layer,
            Entity::from_shape(Shape::rect((0.0, 0.0), 10.0, 10.0))
                .with_label("lava")
                .with_behavior(Hazard),
        )
        .unwrap();
    let victim = world
        .spawn_into(layer, still("victim", Shape::circle((0.0, 0.0), 1.0), &log))
        .unwrap();

    let first = world.update(DT);
    assert_eq!(first.collisions(), 2);
    assert!(world.entity(victim).unwrap().body().is_destroyed());

    let second = world.update(DT);
    assert_eq!(second.removed(), 1);
    assert_eq!(second.collisions(), 0);
    assert!(world.entity(victim).is_none());
}

#[test]
fn layers_keep_their_collisions_separate() {
    let log = hits();
    let mut world = World::new();
    let front = world.add_layer();
    let back = world.add_layer();
    world
        .spawn_into(front, still("a", Shape::circle((0.0, 0.0), 5.0), &log))
        .unwrap();
    world
        .spawn_into(back, still("b", Shape::circle((0.0, 0.0), 5.0), &log))
        .unwrap();
    assert_eq!(world.update(DT).collisions(), 0);
}

#[test]
fn moving_an_entity_between_layers() {
    let log = hits();
    let mut world = World::new();
    let first = world.add_layer();
    let second = world.add_layer();
    let a = world
        .spawn_into(first, still("a", Shape::circle((0.0, 0.0), 1.0), &log))
        .unwrap();

    assert!(matches!(
        world.layer_mut(second).unwrap().add(a),
        Err(SceneError::AttachedElsewhere { .. })
    ));
    world.layer_mut(first).unwrap().remove(a).unwrap();
    world.layer_mut(second).unwrap().add(a).unwrap();
    assert_eq!(world.entity(a).unwrap().body().layer(), Some(second));
    assert_eq!(world.entity(a).unwrap().lifecycle(), Lifecycle::Active);
}
