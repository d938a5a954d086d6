//! Whole-level resize scenarios: bounds, fill, edge locks and budget splitting

use delver_map_editor::delver_map_core::{Axis, GridElement};
use delver_map_editor::{
    Edge, EditorConfig, GridSize, Level, LevelFactory, MixedMap, Position, DELVER,
    ESSENTIALS_LAYER,
};

fn config(start: GridSize, max: GridSize) -> EditorConfig {
    EditorConfig {
        start_grid_size: start,
        min_grid_size: GridSize::new(3, 3),
        max_grid_size: max,
        start_delver_position: Position::new(1, 1),
        start_goal_position: Position::new(3, 3),
        ..EditorConfig::default()
    }
}

fn level(start: GridSize, max: GridSize) -> Level {
    LevelFactory::new(&config(start, max)).create_level().unwrap()
}

fn delver_position(map: &MixedMap) -> Position {
    map.get_world_objects_layer(ESSENTIALS_LAYER)
        .unwrap()
        .elements()
        .find(|object| object.name == DELVER)
        .unwrap()
        .position
}

/// Sizes in range, sub-maps in step, locks exactly on axes at max
fn assert_consistent(map: &MixedMap) {
    let size = map.grid_size();
    assert!(map.min_grid_size().fits_within(&size), "{size} below min");
    assert!(size.fits_within(&map.max_grid_size()), "{size} above max");
    assert_eq!(map.tilemap().grid_size(), size);
    assert_eq!(map.world_objects_map().grid_size(), size);

    for edge in Edge::ALL {
        let at_max = map.bounds().is_at_max(edge.axis());
        assert_eq!(map.is_edge_locked(edge), at_max, "{edge} lock out of step");
    }

    let on_locked_edge = |position: Position| {
        Edge::ALL
            .into_iter()
            .any(|edge| map.is_edge_locked(edge) && map.bounds().is_on_edge(edge, position))
    };
    for tile in map.tilemap().grid().all_elements() {
        assert_eq!(tile.is_locked(), on_locked_edge(tile.position), "tile at {}", tile.position);
    }
    for object in map.world_objects_map().all_world_objects() {
        assert_eq!(object.locked, on_locked_edge(object.position));
    }
}

#[test]
fn test_expand_right_to_max() {
    let mut level = level(GridSize::new(5, 5), GridSize::new(7, 7));
    let map = level.map_mut();

    let added = map.expand_towards(Edge::Right, 2);
    assert_eq!(map.grid_size(), GridSize::new(7, 5));
    assert_eq!(added.len(), 10);
    for position in &added {
        assert!(position.x == 5 || position.x == 6);
        let walls = map.tilemap().get_tile_at("walls", *position).is_some();
        let floor = map.tilemap().get_tile_at("floor", *position).is_some();
        assert!(walls != floor, "{position} should hold one default tile");
    }
    assert!(map.is_edge_locked(Edge::Right));
    assert_consistent(map);

    assert!(map.expand_towards(Edge::Right, 1).is_empty());
    assert_eq!(map.grid_size(), GridSize::new(7, 5));
}

#[test]
fn test_expand_budget_split_evenly() {
    let mut level = level(GridSize::new(5, 5), GridSize::new(9, 9));
    let map = level.map_mut();
    let delver = delver_position(map);

    map.multidirectional_expand_towards(&[Edge::Right, Edge::Left], 3);
    assert_eq!(map.grid_size().along(Axis::Horizontal), 9);
    assert_eq!(delver_position(map), delver.offset(2, 0));
    assert_consistent(map);
}

#[test]
fn test_expand_remainder_goes_right_and_bottom() {
    let mut level = level(GridSize::new(5, 5), GridSize::new(10, 10));
    let map = level.map_mut();
    let delver = delver_position(map);

    map.multidirectional_expand_towards(&[Edge::Left, Edge::Right], 3);
    assert_eq!(map.grid_size(), GridSize::new(10, 5));
    assert_eq!(delver_position(map), delver.offset(2, 0));

    map.multidirectional_expand_towards(&[Edge::Bottom, Edge::Top], 3);
    assert_eq!(map.grid_size(), GridSize::new(10, 10));
    assert_eq!(delver_position(map), delver.offset(2, 2));
    assert_consistent(map);
}

#[test]
fn test_expand_on_both_axes_reports_final_positions() {
    let mut level = level(GridSize::new(5, 5), GridSize::new(9, 9));
    let map = level.map_mut();

    let added = map.multidirectional_expand_towards(&[Edge::Left, Edge::Top], 1);
    assert_eq!(map.grid_size(), GridSize::new(6, 6));
    // a new column and a new row sharing one corner
    assert_eq!(added.len(), 11);
    assert!(added.iter().all(|p| p.x == 0 || p.y == 0));
    assert!(added.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_reduce_budget_clamped_to_min() {
    let mut level = level(GridSize::new(7, 7), GridSize::new(9, 9));
    let map = level.map_mut();

    map.multidirectional_reduce_towards(&[Edge::Left, Edge::Right], 5);
    assert_eq!(map.grid_size(), GridSize::new(3, 7));
    assert_consistent(map);
    assert!(map.reduce_towards(Edge::Left, 1).is_empty());
}

#[test]
fn test_reduce_returns_removed_objects() {
    let mut level = level(GridSize::new(5, 5), GridSize::new(9, 9));
    let map = level.map_mut();

    let removed = map.reduce_towards(Edge::Top, 2);
    assert_eq!(map.grid_size(), GridSize::new(5, 3));
    assert!(removed
        .iter()
        .any(|occupant| occupant.layer == ESSENTIALS_LAYER && occupant.element.name() == DELVER));
    for x in 0..5 {
        assert!(map.tilemap().get_tile_at("walls", Position::new(x, 0)).is_some());
    }
    assert_consistent(map);
}

#[test]
fn test_zero_size_is_noop() {
    let mut level = level(GridSize::new(5, 5), GridSize::new(9, 9));
    let before = level.clone();
    let map = level.map_mut();

    assert!(map.expand_towards(Edge::Left, 0).is_empty());
    assert!(map.reduce_towards(Edge::Bottom, 0).is_empty());
    assert!(map.multidirectional_expand_towards(&[Edge::Top], 0).is_empty());
    let paths = EditorConfig::default().asset_paths();
    assert_eq!(level.to_hash(&paths).unwrap(), before.to_hash(&paths).unwrap());
}

#[test]
fn test_bounds_and_locks_hold_across_sequence() {
    let mut level = level(GridSize::new(5, 5), GridSize::new(8, 7));
    let map = level.map_mut();

    let steps: [(bool, &[Edge], u32); 8] = [
        (true, &[Edge::Left], 2),
        (true, &[Edge::Right, Edge::Bottom], 4),
        (false, &[Edge::Top], 1),
        (true, &[Edge::Top, Edge::Bottom], 9),
        (false, &[Edge::Left, Edge::Right], 3),
        (false, &[Edge::Bottom], 10),
        (true, &[Edge::Right], 1),
        (false, &[Edge::Left, Edge::Top], 1),
    ];
    for (expand, directions, size) in steps {
        if expand {
            map.multidirectional_expand_towards(directions, size);
        } else {
            map.multidirectional_reduce_towards(directions, size);
        }
        assert_consistent(map);
    }
}

#[test]
fn test_boundary_edits_grow_and_collapse() {
    let mut level = level(GridSize::new(5, 5), GridSize::new(9, 9));
    let map = level.map_mut();

    map.tilemap_editor()
        .remove_wall_at(Position::new(2, 4), true)
        .unwrap();
    assert_eq!(map.grid_size(), GridSize::new(5, 6));
    assert_consistent(map);

    let mut editor = map.tilemap_editor();
    for x in 1..4 {
        editor.create_basic_wall_at(Position::new(x, 4), true).unwrap();
    }
    assert_eq!(map.grid_size(), GridSize::new(5, 5));
    assert_consistent(map);
}
