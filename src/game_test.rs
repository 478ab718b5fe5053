use super::*;

fn tile_center(t: usize) -> i32 {
    ((t as i32) << TILESHIFT) + TILEGLOBAL / 2
}

struct TestLoader {
    level: Vec<u8>,
}

impl Loader for TestLoader {
    fn load_file(&self, file: HtFile) -> Result<Vec<u8>, String> {
        match file {
            HtFile::Level(0) => Ok(self.level.clone()),
            other => Err(format!("unexpected load of {:?}", other)),
        }
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Expanded level image: 32 byte header, wall plane with a solid border
/// ring of color 1, object plane with the given (x, y, code, orient)
/// entries.
fn level_image(width: u16, objects: &[(usize, usize, u16, u16)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, width);
    push_u16(&mut out, 64);
    push_u16(&mut out, 2); // planes
    push_u16(&mut out, 0);
    push_u16(&mut out, 0);
    push_u16(&mut out, (MAP_SIZE * MAP_SIZE * 2) as u16);
    out.resize(32, 0);

    for y in 0..MAP_SIZE {
        for x in 0..MAP_SIZE {
            let solid = x == 0 || y == 0 || x == MAP_SIZE - 1 || y == MAP_SIZE - 1;
            push_u16(&mut out, if solid { 1 } else { 0 });
        }
    }

    let mut object_plane = vec![0u16; MAP_SIZE * MAP_SIZE];
    for &(x, y, code, orient) in objects {
        object_plane[y * MAP_SIZE + x] = code | (orient << 8);
    }
    for value in object_plane {
        push_u16(&mut out, value);
    }
    out
}

/// All-literal RLE stream, the expanded length word up front.
fn compress(expanded: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, expanded.len() as u16);
    out.extend_from_slice(expanded);
    out
}

const OBJ_LIST: &[(usize, usize, u16, u16)] = &[
    (2, 2, 1, 1),   // player looking north
    (3, 3, 2, 0),   // refugee
    (10, 10, 4, 0), // tank
    (20, 20, 6, 0), // shield
    (60, 60, 8, 0), // warp point
];

#[test]
fn test_setup_game_level() {
    let loader = TestLoader {
        level: compress(&level_image(64, OBJ_LIST)),
    };
    let level = setup_game_level(&loader, 0).unwrap();

    assert_eq!(level.tile_map[0][17], 1);
    assert_eq!(level.tile_map[17][0], 1);
    assert_eq!(level.tile_map[63][40], 1);
    assert_eq!(level.tile_map[30][30], 0);

    let player = level.player();
    assert_eq!(player.class, ClassType::Player);
    assert_eq!(player.x, tile_center(2));
    assert_eq!(player.y, tile_center(2));
    assert_eq!(player.angle, 90);
    assert_eq!(player.hitpoints, 3);
    assert_eq!(level.player_proto.hitpoints, 3);

    assert_eq!(level.num_refugees, 1);
    let refugee = level
        .actors
        .iter()
        .find(|o| o.class == ClassType::Refugee)
        .unwrap();
    assert_eq!(refugee.x, tile_center(3));

    assert!(level.actors.iter().any(|o| o.class == ClassType::Tank));
    assert!(level.actors.iter().any(|o| o.class == ClassType::Shield));

    // the warp point is a location, not an actor
    assert_eq!(level.warp_x, tile_center(60));
    assert_eq!(level.warp_y, tile_center(60));
    assert!(level.actors.iter().all(|o| o.class != ClassType::Gate));
}

#[test]
fn test_setup_game_level_rejects_unknown_object() {
    let loader = TestLoader {
        level: compress(&level_image(64, &[(2, 2, 1, 0), (5, 5, 99, 0)])),
    };
    let err = setup_game_level(&loader, 0).unwrap_err();
    assert!(err.contains("unknown object code 99"), "{}", err);
}

#[test]
fn test_setup_game_level_requires_player() {
    let loader = TestLoader {
        level: compress(&level_image(64, &[(3, 3, 2, 0)])),
    };
    let err = setup_game_level(&loader, 0).unwrap_err();
    assert!(err.contains("no player start"), "{}", err);
}

#[test]
fn test_setup_game_level_rejects_wrong_size() {
    let loader = TestLoader {
        level: compress(&level_image(32, OBJ_LIST)),
    };
    assert!(setup_game_level(&loader, 0).is_err());
}

#[test]
fn test_setup_game_level_rejects_short_data() {
    let header_only = level_image(64, OBJ_LIST)[..32].to_vec();
    let loader = TestLoader {
        level: compress(&header_only),
    };
    let err = setup_game_level(&loader, 0).unwrap_err();
    assert!(err.contains("too short"), "{}", err);
}
