use super::*;

use crate::def::{new_obj, ClassType, LevelState, MAP_SIZE, VIEW_HEIGHT};
use crate::play::{calc_projection, ProjectionConfig};

fn bordered_map() -> Vec<Vec<u16>> {
    let mut map = vec![vec![0u16; MAP_SIZE]; MAP_SIZE];
    for i in 0..MAP_SIZE {
        map[i][0] = 1;
        map[i][MAP_SIZE - 1] = 1;
        map[0][i] = 1;
        map[MAP_SIZE - 1][i] = 1;
    }
    map
}

fn tile_center(t: usize) -> i32 {
    ((t as i32) << TILESHIFT) + TILEGLOBAL / 2
}

fn mock_level_state(tile_map: Vec<Vec<u16>>, x: i32, y: i32, angle: i32) -> LevelState {
    let mut player = new_obj(ClassType::Player);
    player.x = x;
    player.y = y;
    player.angle = angle;
    player.size = crate::def::PLAYER_SIZE;
    player.calc_bounds();
    let proto = player.clone();
    LevelState {
        tile_map,
        actors: vec![player],
        warp_x: 0,
        warp_y: 0,
        num_refugees: 0,
        player_proto: proto,
    }
}

fn test_prj() -> ProjectionConfig {
    calc_projection(320, VIEW_HEIGHT)
}

#[test]
fn test_transform_point_straight_ahead() {
    let prj = test_prj();
    let level = mock_level_state(bordered_map(), tile_center(5), tile_center(10), 90);
    let vc = init_view_consts(&prj, level.player());

    // five tiles dead ahead lands on the center column
    let (sx, height) = transform_point(&vc, &prj, tile_center(5), tile_center(15));
    assert_eq!(sx, prj.center_x as i32);
    let ratio = 5 * TILEGLOBAL as i64 * prj.scale as i64 / FOCAL_LENGTH as i64;
    assert_eq!(height, (TILEGLOBAL as i64 / ratio) as i32);
}

#[test]
fn test_transform_point_lateral() {
    let prj = test_prj();
    let level = mock_level_state(bordered_map(), tile_center(5), tile_center(10), 90);
    let vc = init_view_consts(&prj, level.player());

    // facing north, east is screen right
    let (right, _) = transform_point(&vc, &prj, tile_center(7), tile_center(15));
    let (left, _) = transform_point(&vc, &prj, tile_center(3), tile_center(15));
    assert!(right > prj.center_x as i32);
    assert!(left < prj.center_x as i32);
}

#[test]
fn test_transform_point_behind_clamps() {
    let prj = test_prj();
    let level = mock_level_state(bordered_map(), tile_center(5), tile_center(10), 90);
    let vc = init_view_consts(&prj, level.player());

    let (_, height) = transform_point(&vc, &prj, tile_center(5), tile_center(5));
    assert_eq!(height, TILEGLOBAL / MIN_RATIO);
}

#[test]
fn test_trace_ray_axis_aligned() {
    let level = mock_level_state(bordered_map(), tile_center(32), tile_center(32), 0);

    let east = trace_ray_dir(&level, tile_center(32), tile_center(32), TILEGLOBAL, 0).unwrap();
    assert_eq!((east.tilex, east.tiley), (63, 32));
    assert_eq!(east.face, DirType::West);
    assert_eq!(east.edgex, 63 << TILESHIFT);

    let north = trace_ray_dir(&level, tile_center(32), tile_center(32), 0, TILEGLOBAL).unwrap();
    assert_eq!((north.tilex, north.tiley), (32, 63));
    assert_eq!(north.face, DirType::South);
    assert_eq!(north.edgey, 63 << TILESHIFT);

    let west = trace_ray_dir(&level, tile_center(32), tile_center(32), -TILEGLOBAL, 0).unwrap();
    assert_eq!((west.tilex, west.tiley), (0, 32));
    assert_eq!(west.face, DirType::East);
}

#[test]
fn test_trace_ray_hits_something_at_any_angle() {
    let prj = test_prj();
    let level = mock_level_state(bordered_map(), tile_center(32), tile_center(32), 0);
    for angle in 0..360usize {
        let dirx = prj.cos(angle).to_tc();
        let diry = prj.sin(angle).to_tc();
        let hit = trace_ray_dir(&level, tile_center(32), tile_center(32), dirx, diry);
        assert!(hit.is_some(), "angle {}", angle);
        let hit = hit.unwrap();
        assert!(level.is_solid(hit.tilex, hit.tiley), "angle {}", angle);
    }
}

#[test]
fn test_trace_ray_exact_diagonal_terminates() {
    let level = mock_level_state(bordered_map(), tile_center(32), tile_center(32), 0);
    // through every tile corner on the way
    let hit = trace_ray_dir(
        &level,
        32 << TILESHIFT,
        32 << TILESHIFT,
        TILEGLOBAL,
        TILEGLOBAL,
    );
    assert!(hit.is_some());
    let hit = hit.unwrap();
    assert!(level.is_solid(hit.tilex, hit.tiley));
}

fn assert_full_coverage(spans: &[WallSpan], view_width: usize) {
    assert!(!spans.is_empty());
    assert_eq!(spans[0].x0, 0);
    for w in spans.windows(2) {
        assert_eq!(w[0].x1, w[1].x0, "gap or overlap at column {}", w[0].x1);
    }
    assert_eq!(spans[spans.len() - 1].x1, view_width);
}

#[test]
fn test_follow_walls_covers_screen_in_empty_room() {
    let prj = test_prj();
    for angle in [0, 33, 45, 90, 137, 180, 270, 359] {
        let level = mock_level_state(bordered_map(), tile_center(32), tile_center(32), angle);
        let vc = init_view_consts(&prj, level.player());
        let spans = follow_walls(&level, &prj, &vc).unwrap();
        assert_full_coverage(&spans, prj.view_width);
        for span in &spans {
            assert_eq!(span.color, 1, "angle {}", angle);
        }
    }
}

#[test]
fn test_follow_walls_single_pillar() {
    let mut map = bordered_map();
    map[5][15] = 2;
    let level = mock_level_state(map, tile_center(5), tile_center(10), 90);
    let prj = test_prj();
    let vc = init_view_consts(&prj, level.player());

    let spans = follow_walls(&level, &prj, &vc).unwrap();
    assert_full_coverage(&spans, prj.view_width);

    // the pillar stands dead ahead and must cover the center column
    let center = prj.center_x;
    let center_span = spans
        .iter()
        .find(|s| s.x0 <= center && center < s.x1)
        .unwrap();
    assert_eq!(center_span.color, 2);

    // the border wall shows at both screen edges
    assert_eq!(spans[0].color, 1);
    assert_eq!(spans[spans.len() - 1].color, 1);

    // the pillar is much nearer than the wall behind it
    let edge_span = &spans[spans.len() - 1];
    assert!(center_span.height_at(center) > edge_span.height_at(edge_span.x0));
}

#[test]
fn test_back_trace_detects_occluder() {
    let mut map = bordered_map();
    map[32][40] = 2;
    let level = mock_level_state(map, tile_center(32), tile_center(32), 90);
    let prj = test_prj();
    let vc = init_view_consts(&prj, level.player());

    // the north border corner behind the pillar is hidden
    let face = Face {
        tilex: 32,
        tiley: 63,
        n: DirType::South,
    };
    let hit = back_trace(&level, &vc, 33 << TILESHIFT, 63 << TILESHIFT, face);
    assert!(hit.is_some());
    let hit = hit.unwrap();
    assert_eq!((hit.tilex, hit.tiley), (32, 40));

    // a corner with a clear line of sight is not
    let clear = back_trace(
        &level,
        &vc,
        tile_center(40),
        tile_center(40),
        Face {
            tilex: 40,
            tiley: 40,
            n: DirType::South,
        },
    );
    assert!(clear.is_none());
}

#[test]
fn test_open_map_renders_background_spans() {
    // no walls at all: every ray ends on the virtual ring around the
    // map and comes back as a background span
    let map = vec![vec![0u16; MAP_SIZE]; MAP_SIZE];
    let level = mock_level_state(map, tile_center(32), tile_center(32), 90);
    let prj = test_prj();
    let vc = init_view_consts(&prj, level.player());

    let spans = wall_refresh(&level, &prj, &vc);
    assert_full_coverage(&spans, prj.view_width);
    for span in &spans {
        assert_eq!(span.color, 0);
    }

    // background spans stay out of the z buffer
    let mut screen = crate::vid::new_screen();
    let wallheight = rasterize_spans(&mut screen, &prj, &spans);
    assert!(wallheight.iter().all(|h| *h == 0));
}

#[test]
fn test_lone_pillar_on_open_map() {
    // a single solid tile with nothing around it still renders, the
    // columns beside it fall through to background
    let mut map = vec![vec![0u16; MAP_SIZE]; MAP_SIZE];
    map[5][15] = 2;
    let level = mock_level_state(map, tile_center(5), tile_center(10), 90);
    let prj = test_prj();
    let vc = init_view_consts(&prj, level.player());

    let spans = follow_walls(&level, &prj, &vc).unwrap();
    assert_full_coverage(&spans, prj.view_width);

    let center = prj.center_x;
    let center_span = spans
        .iter()
        .find(|s| s.x0 <= center && center < s.x1)
        .unwrap();
    assert_eq!(center_span.color, 2);
    assert_eq!(spans[0].color, 0);
    assert_eq!(spans[spans.len() - 1].color, 0);

    let mut screen = crate::vid::new_screen();
    let wallheight = rasterize_spans(&mut screen, &prj, &spans);
    assert!(wallheight[center] > 0);
    assert_eq!(wallheight[0], 0);
}

#[test]
fn test_rasterize_spans_writes_z_buffer() {
    let prj = test_prj();
    let level = mock_level_state(bordered_map(), tile_center(32), tile_center(32), 90);
    let vc = init_view_consts(&prj, level.player());
    let spans = follow_walls(&level, &prj, &vc).unwrap();

    let mut screen = crate::vid::new_screen();
    let wallheight = rasterize_spans(&mut screen, &prj, &spans);
    assert_eq!(wallheight.len(), prj.view_width);
    for (x, h) in wallheight.iter().enumerate() {
        assert!(*h > 0, "column {} has no wall", x);
    }
}
