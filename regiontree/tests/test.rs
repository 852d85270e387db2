use common::shapes::{Point, Rectangle};
use regiontree::{Config, EntitySource, NodeId, RegionTree, RegionTreeError, NODE_CAPACITY};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

struct Body {
    position: Point,
    // Hitbox relative to position.
    hitbox: Rectangle,
    anchor: Option<NodeId>,
}

#[derive(Default)]
struct Bodies {
    bodies: Vec<Body>,
}

impl Bodies {
    fn add(&mut self, x: f32, y: f32, hitbox: Rectangle) -> u32 {
        self.bodies.push(Body {
            position: Point::new(x, y),
            hitbox,
            anchor: None,
        });
        (self.bodies.len() - 1) as u32
    }

    fn add_point(&mut self, x: f32, y: f32) -> u32 {
        self.add(x, y, Rectangle::new(0.0, 0.0, 1.0, 1.0))
    }

    fn move_to(&mut self, key: u32, x: f32, y: f32) {
        self.bodies[key as usize].position = Point::new(x, y);
    }

    fn brute_force(&self, keys: &HashSet<u32>, query: Rectangle) -> HashSet<u32> {
        keys.iter()
            .copied()
            .filter(|key| self.hitbox(*key).intersects(&query))
            .collect()
    }
}

impl EntitySource<u32> for Bodies {
    fn position(&self, key: u32) -> Point {
        self.bodies[key as usize].position
    }

    fn hitbox(&self, key: u32) -> Rectangle {
        let body = &self.bodies[key as usize];
        body.hitbox.translate(body.position.x, body.position.y)
    }

    fn anchor(&self, key: u32) -> Option<NodeId> {
        self.bodies[key as usize].anchor
    }

    fn set_anchor(&mut self, key: u32, anchor: Option<NodeId>) {
        self.bodies[key as usize].anchor = anchor;
    }
}

fn fetch_set(qt: &RegionTree<u32>, bodies: &Bodies, query: Rectangle) -> HashSet<u32> {
    let found = qt.fetch(bodies, query);
    let set: HashSet<u32> = found.iter().copied().collect();
    assert_eq!(set.len(), found.len(), "fetch reported a key twice");
    set
}

fn shape(qt: &RegionTree<u32>) -> Vec<(Rectangle, usize)> {
    let mut nodes: Vec<(Rectangle, usize)> = qt
        .live_nodes()
        .map(|id| (qt.rect(id), qt.slots(id).len()))
        .collect();
    nodes.sort_by(|a, b| {
        (a.0.x, a.0.y, a.0.width, a.1)
            .partial_cmp(&(b.0.x, b.0.y, b.0.width, b.1))
            .unwrap()
    });
    nodes
}

#[test]
fn test_fifth_insert_subdivides() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 4.0, 4.0)).unwrap();
    let keys: Vec<u32> = (0..5).map(|i| bodies.add_point(i as f32, 0.0)).collect();

    for key in &keys[..4] {
        qt.insert(&mut bodies, *key);
    }
    assert_eq!(qt.slots(qt.root()).len(), 4);
    assert!(qt.is_leaf(qt.root()));
    assert_eq!(qt.node_count(), 1);

    qt.insert(&mut bodies, keys[4]);
    assert!(qt.slots(qt.root()).is_empty());
    assert!(!qt.is_leaf(qt.root()));
    let children: Vec<NodeId> = qt.children(qt.root()).iter().flatten().copied().collect();
    assert!(!children.is_empty() && children.len() <= 4);
    assert_eq!(qt.len(), 5);
    for key in &keys {
        assert!(qt.contains(*key));
        assert_ne!(qt.owner(*key), Some(qt.root()));
    }
    qt.check_invariants(&bodies).unwrap();
}

#[test]
fn test_anchor_is_root_and_cleared_on_remove() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let keys: Vec<u32> = (0..20)
        .map(|i| bodies.add_point((i * 5) as f32, (i * 3) as f32))
        .collect();
    for key in &keys {
        qt.insert(&mut bodies, *key);
    }
    for key in &keys {
        assert_eq!(bodies.anchor(*key), Some(qt.root()));
    }

    assert!(qt.remove(&mut bodies, keys[7]));
    assert_eq!(bodies.anchor(keys[7]), None);
    assert!(!qt.contains(keys[7]));
    assert!(!qt.remove(&mut bodies, keys[7]));
    qt.check_invariants(&bodies).unwrap();
}

#[test]
fn test_remove_unknown_is_not_found() {
    let mut bodies = Bodies::default();
    let mut qt: RegionTree<u32> = RegionTree::new(Rectangle::new(0.0, 0.0, 10.0, 10.0)).unwrap();
    let key = bodies.add_point(1.0, 1.0);
    assert!(!qt.remove(&mut bodies, key));
    assert!(qt.is_empty());
}

#[test]
fn test_fetch_hitbox_scenario() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let key = bodies.add(5.0, 5.0, Rectangle::new(0.0, 0.0, 2.0, 2.0));
    qt.insert(&mut bodies, key);

    let hits = qt.fetch(&bodies, Rectangle::new(4.0, 4.0, 10.0, 10.0));
    assert_eq!(hits.iter().copied().collect::<Vec<_>>(), vec![key]);

    let misses = qt.fetch(&bodies, Rectangle::new(100.0, 100.0, 1.0, 1.0));
    assert!(misses.is_empty());
}

#[test]
fn test_fetch_finds_hitboxes_hanging_outside_their_node() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 64.0, 64.0)).unwrap();
    // Crowd the top-left quadrant so the tree subdivides.
    for i in 0..8 {
        let key = bodies.add_point(1.0 + i as f32, 1.0);
        qt.insert(&mut bodies, key);
    }
    // Position in the top-left quadrant, hitbox far to the right of it.
    let wide = bodies.add(2.0, 2.0, Rectangle::new(40.0, 0.0, 10.0, 10.0));
    qt.insert(&mut bodies, wide);
    assert!(!qt.is_leaf(qt.root()));

    let found = fetch_set(&qt, &bodies, Rectangle::new(45.0, 5.0, 2.0, 2.0));
    assert_eq!(found, HashSet::from([wide]));
}

#[test]
fn test_fetch_matches_brute_force() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(7);
    let bounds = Rectangle::new(0.0, 0.0, 1000.0, 1000.0);
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(bounds).unwrap();
    let mut keys = HashSet::new();

    for _ in 0..2000 {
        let point = bounds.get_random_point_inside(&mut rng);
        let hitbox = Rectangle::new(
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0),
            rng.gen_range(0.5..40.0),
            rng.gen_range(0.5..40.0),
        );
        let key = bodies.add(point.x, point.y, hitbox);
        qt.insert(&mut bodies, key);
        keys.insert(key);
    }
    qt.check_invariants(&bodies).unwrap();
    assert!(qt.depth() > 1);

    for _ in 0..200 {
        let query = Rectangle::new(
            rng.gen_range(-50.0..1000.0),
            rng.gen_range(-50.0..1000.0),
            rng.gen_range(1.0..200.0),
            rng.gen_range(1.0..200.0),
        );
        assert_eq!(fetch_set(&qt, &bodies, query), bodies.brute_force(&keys, query));
    }
}

#[test]
fn test_fetch_independent_of_tree_shape() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(99);
    let bounds = Rectangle::new(0.0, 0.0, 256.0, 256.0);
    let mut bodies = Bodies::default();
    let mut keys = Vec::new();
    for _ in 0..300 {
        let point = bounds.get_random_point_inside(&mut rng);
        keys.push(bodies.add(point.x, point.y, Rectangle::new(-2.0, -2.0, 4.0, 4.0)));
    }

    let mut deep = RegionTree::new(bounds).unwrap();
    let shallow_config = Config {
        max_depth: 1,
        ..Config::default()
    };
    let mut shallow = RegionTree::new_with_config(bounds, shallow_config).unwrap();
    for key in &keys {
        deep.insert(&mut bodies, *key);
    }
    // Anchors are already set; the shallow tree files the same keys independently.
    for key in &keys {
        shallow.insert(&mut bodies, *key);
    }
    assert!(deep.depth() > shallow.depth());

    for _ in 0..100 {
        let query = Rectangle::new(
            rng.gen_range(0.0..256.0),
            rng.gen_range(0.0..256.0),
            rng.gen_range(1.0..64.0),
            rng.gen_range(1.0..64.0),
        );
        assert_eq!(
            fetch_set(&deep, &bodies, query),
            fetch_set(&shallow, &bodies, query)
        );
    }
}

#[test]
fn test_invariants_hold_through_inserts_and_removes() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(3);
    let bounds = Rectangle::new(-500.0, -500.0, 1000.0, 1000.0);
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(bounds).unwrap();
    let mut tracked: Vec<u32> = Vec::new();

    for step in 0..3000 {
        if tracked.is_empty() || rng.gen_bool(0.6) {
            let point = bounds.get_random_point_inside(&mut rng);
            let key = bodies.add_point(point.x, point.y);
            qt.insert(&mut bodies, key);
            tracked.push(key);
        } else {
            let index = rng.gen_range(0..tracked.len());
            let key = tracked.swap_remove(index);
            assert!(qt.remove(&mut bodies, key));
        }
        if step % 50 == 0 {
            qt.check_invariants(&bodies).unwrap();
        }
    }
    qt.check_invariants(&bodies).unwrap();
    assert_eq!(qt.len(), tracked.len());
    for id in qt.live_nodes() {
        if qt.is_leaf(id) {
            assert!(qt.slots(id).len() <= NODE_CAPACITY);
        } else {
            assert!(qt.slots(id).is_empty());
        }
    }
}

#[test]
fn test_update_collapses_sparse_children() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 4.0, 4.0)).unwrap();
    let keys: Vec<u32> = (0..5).map(|i| bodies.add_point(i as f32 * 0.75, 0.0)).collect();
    for key in &keys {
        qt.insert(&mut bodies, *key);
    }
    assert!(!qt.is_leaf(qt.root()));

    assert!(qt.remove(&mut bodies, keys[0]));
    assert!(qt.remove(&mut bodies, keys[3]));
    let stats = qt.update(&mut bodies);
    assert_eq!(stats.escaped, 0);
    assert!(stats.collapsed > 0);
    assert_eq!(stats.reinserted, 3);

    assert!(qt.is_leaf(qt.root()));
    assert_eq!(qt.slots(qt.root()).len(), 3);
    assert_eq!(qt.node_count(), 1);
    qt.check_invariants(&bodies).unwrap();
}

#[test]
fn test_update_keeps_busy_children() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 4.0, 4.0)).unwrap();
    for i in 0..5 {
        let key = bodies.add_point(i as f32 * 0.75, 3.0);
        qt.insert(&mut bodies, key);
    }
    let before = shape(&qt);
    let stats = qt.update(&mut bodies);
    assert!(stats.is_noop());
    assert_eq!(before, shape(&qt));
}

#[test]
fn test_update_refiles_escaped_entities() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let mut keys = Vec::new();
    for i in 0..6 {
        let key = bodies.add_point(5.0 + i as f32, 5.0);
        qt.insert(&mut bodies, key);
        keys.push(key);
    }
    for i in 0..6 {
        let key = bodies.add_point(80.0 + i as f32, 80.0);
        qt.insert(&mut bodies, key);
        keys.push(key);
    }
    let wanderer = keys[0];
    let old_owner = qt.owner(wanderer).unwrap();
    bodies.move_to(wanderer, 90.0, 90.0);

    let stats = qt.update(&mut bodies);
    assert_eq!(stats.escaped, 1);
    let new_owner = qt.owner(wanderer).unwrap();
    assert_ne!(old_owner, new_owner);
    assert!(qt.rect(new_owner).contains_point(Point::new(90.0, 90.0)));
    assert_eq!(bodies.anchor(wanderer), Some(qt.root()));
    qt.check_invariants(&bodies).unwrap();
}

#[test]
fn test_update_twice_is_stable() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(11);
    let bounds = Rectangle::new(0.0, 0.0, 500.0, 500.0);
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(bounds).unwrap();
    let mut keys = Vec::new();
    for _ in 0..400 {
        let point = bounds.get_random_point_inside(&mut rng);
        let key = bodies.add_point(point.x, point.y);
        qt.insert(&mut bodies, key);
        keys.push(key);
    }

    for round in 0..20 {
        // Jitter everyone, some wander off the map, a few get removed.
        for key in &keys {
            let position = bodies.position(*key);
            bodies.move_to(
                *key,
                position.x + rng.gen_range(-30.0..30.0),
                position.y + rng.gen_range(-30.0..30.0),
            );
        }
        if round % 3 == 0 {
            for _ in 0..15 {
                let index = rng.gen_range(0..keys.len());
                let key = keys.swap_remove(index);
                assert!(qt.remove(&mut bodies, key));
            }
        }

        qt.update(&mut bodies);
        qt.check_invariants(&bodies).unwrap();
        let settled = shape(&qt);

        let second = qt.update(&mut bodies);
        assert!(second.is_noop(), "round {}: second update changed {:?}", round, second);
        assert_eq!(settled, shape(&qt));
        assert_eq!(qt.len(), keys.len());
    }
}

#[test]
fn test_relocate_keeps_fetch_exact_between_sweeps() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(31);
    let bounds = Rectangle::new(0.0, 0.0, 512.0, 512.0);
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(bounds).unwrap();
    let mut keys = HashSet::new();
    for _ in 0..400 {
        let point = bounds.get_random_point_inside(&mut rng);
        let key = bodies.add(point.x, point.y, Rectangle::new(-4.0, -4.0, 8.0, 8.0));
        qt.insert(&mut bodies, key);
        keys.insert(key);
    }
    let nodes_before = qt.node_count();

    // Long jumps, no sweep in between.
    let mut refiled = 0;
    for key in 0..200u32 {
        let point = bounds.get_random_point_inside(&mut rng);
        bodies.move_to(key, point.x, point.y);
        if qt.relocate(&mut bodies, key) {
            refiled += 1;
        }
        let owner = qt.owner(key).unwrap();
        assert!(qt.rect(owner).contains_point(point));
        assert_eq!(bodies.anchor(key), Some(NodeId::ROOT));
    }
    assert!(refiled > 100);
    assert!(qt.node_count() >= nodes_before);
    qt.check_invariants(&bodies).unwrap();

    for _ in 0..100 {
        let query = Rectangle::new(
            rng.gen_range(0.0..500.0),
            rng.gen_range(0.0..500.0),
            rng.gen_range(1.0..60.0),
            rng.gen_range(1.0..60.0),
        );
        assert_eq!(fetch_set(&qt, &bodies, query), bodies.brute_force(&keys, query));
    }

    // Staying inside the node, or not being tracked at all, refiles nothing.
    let stayer = 300u32;
    let position = bodies.position(stayer);
    let owner_rect = qt.rect(qt.owner(stayer).unwrap());
    let center = owner_rect.center();
    bodies.move_to(stayer, (position.x + center.x) / 2.0, (position.y + center.y) / 2.0);
    assert!(!qt.relocate(&mut bodies, stayer));
    let loose = bodies.add_point(1.0, 1.0);
    assert!(!qt.relocate(&mut bodies, loose));
    assert!(!qt.contains(loose));
}

#[test]
fn test_update_shrinks_hitbox_reach() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(5);
    let bounds = Rectangle::new(0.0, 0.0, 256.0, 256.0);
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(bounds).unwrap();
    let mut keys = HashSet::new();
    let small = Rectangle::new(-2.0, -3.0, 5.0, 7.0);
    for _ in 0..150 {
        // Whole coordinates keep the reach arithmetic exact.
        let point = bounds.get_random_point_inside(&mut rng);
        let key = bodies.add(point.x.floor(), point.y.floor(), small);
        qt.insert(&mut bodies, key);
        keys.insert(key);
    }
    assert_eq!(qt.hitbox_reach(), small);

    let giant = bodies.add(128.0, 128.0, Rectangle::new(-100.0, -100.0, 200.0, 200.0));
    qt.insert(&mut bodies, giant);
    assert_eq!(qt.hitbox_reach(), Rectangle::new(-100.0, -100.0, 200.0, 200.0));

    assert!(qt.remove(&mut bodies, giant));
    // Removal alone leaves the reach wide; the sweep narrows it.
    assert_eq!(qt.hitbox_reach().width, 200.0);
    qt.update(&mut bodies);
    assert_eq!(qt.hitbox_reach(), small);

    for _ in 0..100 {
        let query = Rectangle::new(
            rng.gen_range(-10.0..250.0),
            rng.gen_range(-10.0..250.0),
            rng.gen_range(1.0..40.0),
            rng.gen_range(1.0..40.0),
        );
        assert_eq!(fetch_set(&qt, &bodies, query), bodies.brute_force(&keys, query));
    }
}

#[test]
fn test_out_of_bounds_entities_are_kept() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 10.0, 10.0)).unwrap();
    let mut keys = Vec::new();
    for i in 0..10 {
        let key = bodies.add_point(i as f32, i as f32);
        qt.insert(&mut bodies, key);
        keys.push(key);
    }
    let west = bodies.add_point(-50.0, 5.0);
    let far = bodies.add_point(400.0, 400.0);
    qt.insert(&mut bodies, west);
    qt.insert(&mut bodies, far);
    assert_eq!(qt.len(), 12);

    let found = fetch_set(&qt, &bodies, Rectangle::new(399.0, 399.0, 5.0, 5.0));
    assert_eq!(found, HashSet::from([far]));
    let found = fetch_set(&qt, &bodies, Rectangle::new(-51.0, 4.0, 3.0, 3.0));
    assert_eq!(found, HashSet::from([west]));

    qt.update(&mut bodies);
    assert!(qt.update(&mut bodies).is_noop());
    assert!(qt.contains(west) && qt.contains(far));
    qt.check_invariants(&bodies).unwrap();
}

#[test]
fn test_stacked_entities_stop_at_depth_floor() {
    let mut bodies = Bodies::default();
    let config = Config {
        max_depth: 6,
        ..Config::default()
    };
    let mut qt = RegionTree::new_with_config(Rectangle::new(0.0, 0.0, 64.0, 64.0), config).unwrap();
    for _ in 0..20 {
        let key = bodies.add_point(10.0, 10.0);
        qt.insert(&mut bodies, key);
    }
    assert_eq!(qt.len(), 20);
    assert_eq!(qt.depth(), 6);
    let owner = qt.owner(0).unwrap();
    assert_eq!(qt.slots(owner).len(), 20);
    qt.check_invariants(&bodies).unwrap();

    let found = qt.fetch(&bodies, Rectangle::new(10.0, 10.0, 0.5, 0.5));
    assert_eq!(found.len(), 20);
}

#[test]
fn test_destroy_hands_back_every_key() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let mut keys = HashSet::new();
    for i in 0..50 {
        let key = bodies.add_point((i * 2) as f32, (i % 7) as f32 * 10.0);
        qt.insert(&mut bodies, key);
        keys.insert(key);
    }
    let kept = 3;
    assert!(qt.remove(&mut bodies, kept));
    keys.remove(&kept);

    let released: HashSet<u32> = qt.destroy().into_iter().collect();
    assert_eq!(released, keys);
}

#[test]
fn test_draw_outlines_every_node() {
    let mut bodies = Bodies::default();
    let mut qt = RegionTree::new(Rectangle::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    for i in 0..40 {
        let key = bodies.add_point((i * 2) as f32, (i * 2) as f32);
        qt.insert(&mut bodies, key);
    }
    let mut outlines = Vec::new();
    qt.draw(|rect| outlines.push(rect));
    assert_eq!(outlines.len(), qt.node_count());
    assert_eq!(outlines[0], qt.bounds());

    let mut rects = Vec::new();
    qt.all_node_rects(&mut rects);
    assert_eq!(rects, outlines);
}

#[test]
fn test_invalid_bounds() {
    let err = RegionTree::<u32>::new(Rectangle::new(0.0, 0.0, -1.0, 10.0)).err();
    assert!(matches!(err, Some(RegionTreeError::InvalidBounds { .. })));
    assert!(RegionTree::<u32>::new(Rectangle::new(0.0, f32::NAN, 1.0, 1.0)).is_err());
}
