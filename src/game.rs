#[cfg(test)]
#[path = "./game_test.rs"]
mod game_test;

use tracing::info;

use crate::assets::rle_expand;
use crate::def::{
    new_obj, ClassType, LevelState, ObjType, MAP_SIZE, PLAYER_SIZE, TILEGLOBAL, TILESHIFT,
};
use crate::loader::{HtFile, Loader};
use crate::state::spawn_actor;
use crate::util::new_data_reader;

const HEADER_BYTES: usize = 32;
const PLANE_WORDS: usize = MAP_SIZE * MAP_SIZE;
const PLANE_BYTES: usize = PLANE_WORDS * 2;

/// Header plus wall plane plus object plane.
pub const MAX_LEVEL_BYTES: usize = HEADER_BYTES + 2 * PLANE_BYTES;

// object plane codes, the orientation nibble sits above the code byte
const OBJ_PLAYER: u16 = 1;
const OBJ_REFUGEE: u16 = 2;
const OBJ_DRONE: u16 = 3;
const OBJ_TANK: u16 = 4;
const OBJ_MUTANT: u16 = 5;
const OBJ_SHIELD: u16 = 6;
const OBJ_GATE: u16 = 7;
const OBJ_WARP: u16 = 8;

pub fn setup_game_level(loader: &dyn Loader, level_on: usize) -> Result<LevelState, String> {
    let compressed = loader.load_file(HtFile::Level(level_on))?;
    let data = rle_expand(&compressed, MAX_LEVEL_BYTES)?;
    if data.len() < HEADER_BYTES + 2 * PLANE_BYTES {
        return Err(format!(
            "level {} expanded to {} bytes, too short",
            level_on,
            data.len()
        ));
    }

    let mut reader = new_data_reader(&data);
    let width = reader.read_u16() as usize;
    let height = reader.read_u16() as usize;
    let planes = reader.read_u16() as usize;
    let _screen_x = reader.read_u16();
    let _screen_y = reader.read_u16();
    let plane_size = reader.read_u16() as usize;
    reader.skip(HEADER_BYTES - reader.offset());

    if width != MAP_SIZE || height != MAP_SIZE {
        return Err(format!("level {} is {}x{}, not 64x64", level_on, width, height));
    }
    if planes != 2 || plane_size != PLANE_BYTES {
        return Err(format!(
            "level {} has {} planes of {} bytes",
            level_on, planes, plane_size
        ));
    }

    let mut tile_map = vec![vec![0u16; MAP_SIZE]; MAP_SIZE];
    for y in 0..MAP_SIZE {
        for x in 0..MAP_SIZE {
            tile_map[x][y] = reader.read_u16();
        }
    }

    // object plane: first find the player, everything else spawns
    // after the level state exists
    let mut objects: Vec<(usize, usize, u16, i32)> = Vec::new();
    let mut player: Option<ObjType> = None;
    for y in 0..MAP_SIZE {
        for x in 0..MAP_SIZE {
            let value = reader.read_u16();
            if value == 0 {
                continue;
            }
            let code = value & 0xFF;
            let angle = (((value >> 8) & 0xF) as i32) * 90;
            if code == OBJ_PLAYER {
                player = Some(spawn_player(x, y, angle));
            } else {
                objects.push((x, y, code, angle));
            }
        }
    }

    let player = player.ok_or(format!("level {} has no player start", level_on))?;
    let player_proto = player.clone();

    let mut level_state = LevelState {
        tile_map,
        actors: vec![player],
        warp_x: 0,
        warp_y: 0,
        num_refugees: 0,
        player_proto,
    };

    for (x, y, code, angle) in objects {
        let class = match code {
            OBJ_REFUGEE => ClassType::Refugee,
            OBJ_DRONE => ClassType::Drone,
            OBJ_TANK => ClassType::Tank,
            OBJ_MUTANT => ClassType::Mutant,
            OBJ_SHIELD => ClassType::Shield,
            OBJ_GATE => ClassType::Gate,
            OBJ_WARP => {
                level_state.warp_x = ((x as i32) << TILESHIFT) + TILEGLOBAL / 2;
                level_state.warp_y = ((y as i32) << TILESHIFT) + TILEGLOBAL / 2;
                continue;
            }
            _ => return Err(format!("level {} has unknown object code {}", level_on, code)),
        };
        if class == ClassType::Refugee {
            level_state.num_refugees += 1;
        }
        spawn_actor(&mut level_state, class, x, y, angle)
            .ok_or(format!("level {} overflows the actor slots", level_on))?;
    }

    info!(
        level = level_on,
        actors = level_state.actors.len(),
        refugees = level_state.num_refugees,
        "level loaded"
    );
    Ok(level_state)
}

fn spawn_player(tilex: usize, tiley: usize, angle: i32) -> ObjType {
    let mut player = new_obj(ClassType::Player);
    player.x = ((tilex as i32) << TILESHIFT) + TILEGLOBAL / 2;
    player.y = ((tiley as i32) << TILESHIFT) + TILEGLOBAL / 2;
    player.angle = angle;
    player.hitpoints = 3;
    player.size = PLAYER_SIZE;
    player.calc_bounds();
    player
}
