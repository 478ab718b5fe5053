#[cfg(test)]
#[path = "./state_test.rs"]
mod state_test;

use crate::def::{
    new_obj, ClassType, DirType, GameState, LevelState, ObjKey, ObjType, PlayState, MAX_ACTORS,
    MIN_CHASE, PLAYER_KEY, TILEGLOBAL, TILESHIFT, WALL_ZONE,
};
use crate::draw::trace_ray_dir;
use crate::rnd::RndT;

pub const SHOT_SIZE: i32 = TILEGLOBAL / 8;

/// Tics one explosion stage stays on screen.
pub const EXPLODE_STAGE_TICS: i64 = 8;

const DRONE_POINTS: i32 = 150;
const MUTANT_POINTS: i32 = 250;
const TANK_POINTS: i32 = 500;

fn class_hitpoints(class: ClassType) -> i32 {
    match class {
        ClassType::Player => 3,
        ClassType::Refugee => 1,
        ClassType::Drone => 2,
        ClassType::Mutant => 3,
        ClassType::Tank => 4,
        _ => 1,
    }
}

fn class_size(class: ClassType) -> i32 {
    match class {
        ClassType::Player => crate::def::PLAYER_SIZE,
        ClassType::Shot | ClassType::BigShot | ClassType::EnemyShot => SHOT_SIZE,
        _ => crate::def::ACTOR_SIZE,
    }
}

/// Place a new actor in the middle of a tile, reusing the first free
/// slot. The slot array never shrinks, a freed slot keeps its place
/// with class Nothing until a spawn reclaims it. None when all slots
/// are taken.
pub fn spawn_actor(
    level_state: &mut LevelState,
    class: ClassType,
    tilex: usize,
    tiley: usize,
    angle: i32,
) -> Option<ObjKey> {
    let mut obj = new_obj(class);
    obj.x = ((tilex as i32) << TILESHIFT) + TILEGLOBAL / 2;
    obj.y = ((tiley as i32) << TILESHIFT) + TILEGLOBAL / 2;
    obj.angle = angle;
    obj.hitpoints = class_hitpoints(class);
    obj.size = class_size(class);
    obj.calc_bounds();

    insert_actor(level_state, obj)
}

/// Spawn at an exact global position, used for shots leaving the
/// muzzle.
pub fn spawn_actor_at(
    level_state: &mut LevelState,
    class: ClassType,
    x: i32,
    y: i32,
    angle: i32,
) -> Option<ObjKey> {
    let mut obj = new_obj(class);
    obj.x = x;
    obj.y = y;
    obj.angle = angle;
    obj.hitpoints = class_hitpoints(class);
    obj.size = class_size(class);
    obj.calc_bounds();

    insert_actor(level_state, obj)
}

fn insert_actor(level_state: &mut LevelState, obj: ObjType) -> Option<ObjKey> {
    for slot in 1..level_state.actors.len() {
        if level_state.actors[slot].class == ClassType::Nothing {
            level_state.actors[slot] = obj;
            return Some(ObjKey(slot));
        }
    }
    if level_state.actors.len() < MAX_ACTORS {
        level_state.actors.push(obj);
        return Some(ObjKey(level_state.actors.len() - 1));
    }
    None
}

pub fn free_actor(level_state: &mut LevelState, k: ObjKey) {
    level_state.update_obj(k, |obj| obj.class = ClassType::Nothing);
}

/// One cardinal step of mov global units. AI movement keeps WALL_ZONE
/// of clearance beyond the hit rectangle so actors do not scrape along
/// walls. Commits the move and remembers the direction on success.
pub fn walk(k: ObjKey, level_state: &mut LevelState, dir: DirType, mov: i32) -> bool {
    let obj = level_state.obj(k);
    let (dx, dy) = match dir {
        DirType::East => (mov, 0),
        DirType::North => (0, mov),
        DirType::West => (-mov, 0),
        DirType::South => (0, -mov),
        DirType::NoDir => return false,
    };
    let x = obj.x + dx;
    let y = obj.y + dy;
    let margin = obj.size + WALL_ZONE;

    let xl = (x - margin) >> TILESHIFT;
    let xh = (x + margin) >> TILESHIFT;
    let yl = (y - margin) >> TILESHIFT;
    let yh = (y + margin) >> TILESHIFT;
    for tx in xl..=xh {
        for ty in yl..=yh {
            if level_state.is_solid(tx, ty) {
                return false;
            }
        }
    }

    level_state.update_obj(k, |obj| {
        obj.x = x;
        obj.y = y;
        obj.dir = dir;
        obj.calc_bounds();
    });
    true
}

fn primary_dirs(dx: i32, dy: i32) -> [DirType; 2] {
    let xdir = if dx.abs() < MIN_CHASE {
        DirType::NoDir
    } else if dx > 0 {
        DirType::East
    } else {
        DirType::West
    };
    let ydir = if dy.abs() < MIN_CHASE {
        DirType::NoDir
    } else if dy > 0 {
        DirType::North
    } else {
        DirType::South
    };
    if dy.abs() > dx.abs() {
        [ydir, xdir]
    } else {
        [xdir, ydir]
    }
}

/// Greedy 4-direction chase toward a target point: the dominant axis
/// first, then the other, then the direction that last worked, then a
/// pseudo-randomly ordered sweep of the rest. Walking backwards is a
/// last resort. Returns whether the actor moved.
pub fn chase_thing(
    k: ObjKey,
    level_state: &mut LevelState,
    rnd: &RndT,
    mov: i32,
    target_x: i32,
    target_y: i32,
) -> bool {
    let obj = level_state.obj(k);
    let old_dir = obj.dir;
    let turn_around = old_dir.opposite();
    let dx = target_x - obj.x;
    let dy = target_y - obj.y;

    let d = primary_dirs(dx, dy);

    for dir in d {
        if dir != DirType::NoDir && dir != turn_around && walk(k, level_state, dir, mov) {
            return true;
        }
    }

    // no direct path, try the last direction that worked
    if old_dir != DirType::NoDir && walk(k, level_state, old_dir, mov) {
        return true;
    }

    let sweep = if rnd.rnd_t() < 128 {
        [DirType::East, DirType::North, DirType::West, DirType::South]
    } else {
        [DirType::South, DirType::West, DirType::North, DirType::East]
    };
    for dir in sweep {
        if dir != turn_around && walk(k, level_state, dir, mov) {
            return true;
        }
    }

    if turn_around != DirType::NoDir && walk(k, level_state, turn_around, mov) {
        return true;
    }

    level_state.update_obj(k, |obj| obj.dir = DirType::NoDir); // can't move
    false
}

/// True when nothing solid stands between the two points.
pub fn check_line(level_state: &LevelState, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
    let dx = x2 - x1;
    let dy = y2 - y1;
    match trace_ray_dir(level_state, x1, y1, dx, dy) {
        None => true,
        Some(hit) => {
            // a wall behind the target does not block
            if dx.abs() >= dy.abs() {
                (hit.edgex - x1).abs() >= dx.abs()
            } else {
                (hit.edgey - y1).abs() >= dy.abs()
            }
        }
    }
}

/// Turn an actor into its shared explosion sequence. The class decides
/// later whether a corpse stays behind, refugees do.
pub fn explode(level_state: &mut LevelState, k: ObjKey) {
    level_state.update_obj(k, |obj| {
        let corpse = obj.class == ClassType::Refugee;
        obj.class = ClassType::Inert;
        obj.stage = 0;
        obj.tic_count = EXPLODE_STAGE_TICS;
        obj.temp1 = if corpse { 1 } else { 0 };
    });
}

pub fn damage_actor(
    k: ObjKey,
    level_state: &mut LevelState,
    game_state: &mut GameState,
    damage: i32,
) {
    let class = level_state.obj(k).class;
    level_state.update_obj(k, |obj| obj.hitpoints -= damage);
    if level_state.obj(k).hitpoints > 0 {
        return;
    }

    if k == PLAYER_KEY {
        game_state.play_state = PlayState::Dead;
        return;
    }

    match class {
        ClassType::Drone => game_state.score += DRONE_POINTS,
        ClassType::Mutant => game_state.score += MUTANT_POINTS,
        ClassType::Tank => game_state.score += TANK_POINTS,
        ClassType::Refugee => {
            game_state.refugees_killed += 1;
            level_state.num_refugees -= 1;
            if level_state.num_refugees <= 0 {
                spawn_warp_gate(level_state);
            }
        }
        _ => {}
    }
    explode(level_state, k);
}

/// The exit appears at the warp point once no refugees remain.
pub fn spawn_warp_gate(level_state: &mut LevelState) {
    let x = level_state.warp_x;
    let y = level_state.warp_y;
    if let Some(k) = spawn_actor_at(level_state, ClassType::Gate, x, y, 0) {
        level_state.update_obj(k, |obj| obj.tic_count = 4);
    }
}
