//! Queue tests - dispense ring behavior

use tui_puyo::core::{PuyoPool, SimpleRng, UnitQueue};
use tui_puyo::types::QUEUE_UNITS;

#[test]
fn test_dispensed_slot_is_restocked_one_call_later() {
    let mut pool = PuyoPool::new(64);
    let mut rng = SimpleRng::new(5);
    let mut queue = UnitQueue::new(&mut pool, &mut rng, (7.5, 12.0)).unwrap();

    for _ in 0..QUEUE_UNITS * 3 {
        let slot = queue.next_unit(&mut pool, &mut rng).unwrap();
        let pair = (queue.unit(slot).puyo(0), queue.unit(slot).puyo(1));

        // Stand in for the pair landing and leaving the board.
        pool.free(pair.0);
        pool.free(pair.1);

        let _ = queue.next_unit(&mut pool, &mut rng).unwrap();
        let restocked = (queue.unit(slot).puyo(0), queue.unit(slot).puyo(1));
        assert!(pool.contains(restocked.0));
        assert!(pool.contains(restocked.1));
        assert_ne!(restocked.0, pair.0);
    }
}

#[test]
fn test_pool_usage_stays_bounded() {
    let mut pool = PuyoPool::new(64);
    let mut rng = SimpleRng::new(23);
    let mut queue = UnitQueue::new(&mut pool, &mut rng, (7.5, 12.0)).unwrap();
    assert_eq!(pool.live(), QUEUE_UNITS * 2);

    // Dispense forever while the "player" immediately discards each pair;
    // the queue itself must not leak.
    for _ in 0..100 {
        let slot = queue.next_unit(&mut pool, &mut rng).unwrap();
        pool.free(queue.unit(slot).puyo(0));
        pool.free(queue.unit(slot).puyo(1));
    }
    assert!(pool.live() <= QUEUE_UNITS * 2);
}

#[test]
fn test_same_seed_produces_same_colors() {
    let mut pool = PuyoPool::new(128);

    let mut rng_a = SimpleRng::new(77);
    let mut rng_b = SimpleRng::new(77);
    let mut queue_a = UnitQueue::new(&mut pool, &mut rng_a, (7.5, 12.0)).unwrap();
    let mut queue_b = UnitQueue::new(&mut pool, &mut rng_b, (7.5, 12.0)).unwrap();

    for _ in 0..20 {
        let a = queue_a.next_unit(&mut pool, &mut rng_a).unwrap();
        let b = queue_b.next_unit(&mut pool, &mut rng_b).unwrap();

        let colors_a = (
            pool.get(queue_a.unit(a).puyo(0)).color,
            pool.get(queue_a.unit(a).puyo(1)).color,
        );
        let colors_b = (
            pool.get(queue_b.unit(b).puyo(0)).color,
            pool.get(queue_b.unit(b).puyo(1)).color,
        );
        assert_eq!(colors_a, colors_b);

        // Hand the pairs straight back so the shared pool stays bounded.
        pool.free(queue_a.unit(a).puyo(0));
        pool.free(queue_a.unit(a).puyo(1));
        pool.free(queue_b.unit(b).puyo(0));
        pool.free(queue_b.unit(b).puyo(1));
    }
}

#[test]
fn test_future_units_sit_above_each_other() {
    let mut pool = PuyoPool::new(64);
    let mut rng = SimpleRng::new(3);
    let mut queue = UnitQueue::new(&mut pool, &mut rng, (7.5, 12.0)).unwrap();

    for _ in 0..6 {
        let _ = queue.next_unit(&mut pool, &mut rng).unwrap();
        let ys: Vec<f32> = queue.future_units().map(|u| u.position(0).1).collect();
        assert!(ys.len() >= QUEUE_UNITS - 1);
        for pair in ys.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }
}
