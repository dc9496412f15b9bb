//! Instance tests - full play field scenarios

use std::cell::Cell;

use tui_puyo::core::{Instance, InstanceState, PuyoPool, SimConfig, PIVOT};
use tui_puyo::types::{
    NullController, PuyoColor, PuyoController, GRID_WIDTH, SPAWN_X, SPAWN_Y,
};

/// Fixed intents, with flip as a one-shot so a "held" rotate key does not
/// spin the unit every tick.
#[derive(Default)]
struct ScriptedController {
    left: bool,
    right: bool,
    fall: bool,
    flip_once: Cell<bool>,
}

impl ScriptedController {
    fn holding_fall() -> Self {
        Self {
            fall: true,
            ..Self::default()
        }
    }

    fn holding_left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }

    fn holding_right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }
}

impl PuyoController for ScriptedController {
    fn move_left(&self) -> bool {
        self.left
    }
    fn move_right(&self) -> bool {
        self.right
    }
    fn flip(&self) -> bool {
        self.flip_once.take()
    }
    fn fall(&self) -> bool {
        self.fall
    }
}

fn setup() -> (PuyoPool, Instance) {
    let mut pool = PuyoPool::new(128);
    let instance = Instance::new(&mut pool, 42, SimConfig::default()).unwrap();
    (pool, instance)
}

fn run_until<F>(pool: &mut PuyoPool, instance: &mut Instance, ctrl: &dyn PuyoController, done: F)
where
    F: Fn(&Instance) -> bool,
{
    for _ in 0..2000 {
        instance.update(pool, ctrl, 0.05).unwrap();
        if done(instance) {
            return;
        }
    }
    panic!("scenario did not converge");
}

#[test]
fn test_simple_drop_settles_at_the_floor() {
    let (mut pool, mut instance) = setup();

    // First update dispenses the unit at the spawn point.
    instance
        .update(&mut pool, &NullController, 0.016)
        .unwrap();
    assert_eq!(instance.state(), InstanceState::PlayerControl);
    let unit = instance.active_unit().unwrap();
    assert_eq!(unit.position(PIVOT), (SPAWN_X as f32, SPAWN_Y));
    let pair = (unit.puyo(0), unit.puyo(1));

    // Hold fast fall until the pair has settled and the next unit is out.
    let ctrl = ScriptedController::holding_fall();
    run_until(&mut pool, &mut instance, &ctrl, |i| {
        i.state() == InstanceState::PlayerControl && i.grid().occupied() == 2
    });

    assert_eq!(instance.grid().piece_at(SPAWN_X, 0), Some(pair.0));
    assert_eq!(instance.grid().piece_at(SPAWN_X, 1), Some(pair.1));
    assert_eq!(instance.falling_count(), 0);
}

#[test]
fn test_directly_inserted_square_clears_as_a_combo() {
    let (mut pool, mut instance) = setup();
    let live_before = pool.live();

    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        let h = pool.alloc(PuyoColor::Red).unwrap();
        instance.grid_mut().add_piece(&mut pool, h, x, y);
    }

    // The instance starts resolving, so the very next tick clears the square.
    let outcome = instance
        .update(&mut pool, &NullController, 0.016)
        .unwrap();
    assert_eq!(outcome.pieces_cleared, 4);
    assert_eq!(instance.grid().occupied(), 0);
    assert_eq!(pool.live(), live_before);
}

#[test]
fn test_cascade_drops_pieces_left_above_a_combo() {
    let (mut pool, mut instance) = setup();

    // A clearable column of four reds with two greens stacked on top.
    for (x, y, color) in [
        (2, 0, PuyoColor::Red),
        (2, 1, PuyoColor::Red),
        (2, 2, PuyoColor::Red),
        (2, 3, PuyoColor::Red),
        (2, 4, PuyoColor::Green),
        (2, 5, PuyoColor::Green),
    ] {
        let h = pool.alloc(color).unwrap();
        instance.grid_mut().add_piece(&mut pool, h, x, y);
    }

    let outcome = instance
        .update(&mut pool, &NullController, 0.016)
        .unwrap();
    assert_eq!(outcome.pieces_cleared, 4);
    // The greens were released and are falling again.
    assert_eq!(instance.falling_count(), 2);

    run_until(&mut pool, &mut instance, &NullController, |i| {
        i.falling_count() == 0 && i.grid().piece_at(2, 0).is_some()
    });
    assert!(instance.grid().piece_at(2, 1).is_some());
    assert!(instance.grid().is_open(2, 2));
}

#[test]
fn test_moves_into_the_wall_are_dropped() {
    let (mut pool, mut instance) = setup();
    instance
        .update(&mut pool, &NullController, 0.016)
        .unwrap();

    let ctrl = ScriptedController::holding_left();
    // Far more ticks than needed to reach the wall; dt small enough that
    // the unit stays airborne throughout.
    for _ in 0..30 {
        instance.update(&mut pool, &ctrl, 0.01).unwrap();
        let (x, _) = instance.active_unit().unwrap().position(PIVOT);
        assert!(x >= 0.0, "unit pushed through the left wall");
    }
    assert_eq!(instance.active_unit().unwrap().position(PIVOT).0, 0.0);
}

#[test]
fn test_rotation_at_the_right_wall_kicks_inward() {
    let (mut pool, mut instance) = setup();
    instance
        .update(&mut pool, &NullController, 0.016)
        .unwrap();

    // Walk to the right wall.
    let right = ScriptedController::holding_right();
    for _ in 0..10 {
        instance.update(&mut pool, &right, 0.01).unwrap();
    }
    let (x, _) = instance.active_unit().unwrap().position(PIVOT);
    assert_eq!(x, (GRID_WIDTH - 1) as f32);

    // Clockwise from Up puts the orbit to the right, outside the field, so
    // the whole unit must shift one column left instead of losing the spin.
    let flip = ScriptedController::default();
    flip.flip_once.set(true);
    instance.update(&mut pool, &flip, 0.01).unwrap();

    let unit = instance.active_unit().unwrap();
    let (px, _) = unit.position(PIVOT);
    let (ox, _) = unit.position(1);
    assert_eq!(px, (GRID_WIDTH - 2) as f32);
    assert_eq!(ox, (GRID_WIDTH - 1) as f32);
}

#[test]
fn test_spawn_blocked_ends_the_game() {
    let (mut pool, mut instance) = setup();

    // Fill the spawn column to the top, in runs too short to ever combo.
    for y in 0..13 {
        let color = if (y / 2) % 2 == 0 {
            PuyoColor::Red
        } else {
            PuyoColor::Blue
        };
        let h = pool.alloc(color).unwrap();
        instance.grid_mut().add_piece(&mut pool, h, SPAWN_X, y);
    }

    let outcome = instance
        .update(&mut pool, &NullController, 0.016)
        .unwrap();
    assert!(!outcome.running);
    assert_eq!(instance.state(), InstanceState::GameOver);
    assert!(instance.active_unit().is_none());

    // Further updates stay terminal.
    let outcome = instance
        .update(&mut pool, &NullController, 0.016)
        .unwrap();
    assert!(!outcome.running);
}

#[test]
fn test_two_instances_share_one_pool() {
    let mut pool = PuyoPool::new(128);
    let mut a = Instance::new(&mut pool, 1, SimConfig::default()).unwrap();
    let mut b = Instance::new(&mut pool, 2, SimConfig::default()).unwrap();

    let ctrl = ScriptedController::holding_fall();
    for _ in 0..600 {
        a.update(&mut pool, &ctrl, 0.05).unwrap();
        b.update(&mut pool, &ctrl, 0.05).unwrap();
        if a.state() == InstanceState::GameOver && b.state() == InstanceState::GameOver {
            break;
        }
    }

    // Whatever happened, every grid cell still points at a live pool piece.
    for instance in [&a, &b] {
        for y in 0..instance.grid().height() {
            for x in 0..instance.grid().width() {
                if let Some(h) = instance.grid().piece_at(x, y) {
                    assert!(pool.contains(h));
                }
            }
        }
    }
}
