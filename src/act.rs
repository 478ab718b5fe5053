#[cfg(test)]
#[path = "./act_test.rs"]
mod act_test;

use tracing::debug;

use crate::def::{
    ClassType, DirType, GameState, LevelState, ObjKey, PlayState, EXPLODE_STAGES, MIN_CHASE,
    PLAYER_KEY, TILEGLOBAL,
};
use crate::fixed::fixed_mul_tc;
use crate::play::ProjectionConfig;
use crate::rnd::RndT;
use crate::state::{
    chase_thing, check_line, damage_actor, explode, free_actor, spawn_actor_at, spawn_warp_gate,
    EXPLODE_STAGE_TICS,
};

pub const SHOT_SPEED: i32 = 0x3000;
/// A shot never moves further than this in one frame, whatever the
/// tic count says.
pub const MAX_SHOT_MOVE: i32 = 3 * TILEGLOBAL;
/// Substep length of shot flight, small enough that no tile or target
/// can be skipped over.
const SHOT_STEP: i32 = TILEGLOBAL / 2;

pub const DRONE_SPEED: i32 = 0x1000;
pub const TANK_SPEED: i32 = 0xC00;
pub const MUTANT_SPEED: i32 = 0xE00;

pub const TANK_RELOAD_TICS: i32 = 40;
const MUTANT_ATTACK_TICS: i32 = 15;
const MUTANT_HIT_TICS: i32 = 7;

const REFUGEE_POINTS: i32 = 1000;
const ANIM_TICS: i64 = 20;

pub fn do_active_obj(
    k: ObjKey,
    level_state: &mut LevelState,
    game_state: &mut GameState,
    prj: &ProjectionConfig,
    rnd: &RndT,
    tics: i64,
) {
    match level_state.obj(k).class {
        ClassType::Shot | ClassType::BigShot | ClassType::EnemyShot => {
            t_shot(k, level_state, game_state, prj, tics)
        }
        ClassType::Refugee => t_refugee(k, level_state, game_state, tics),
        ClassType::Drone => t_drone(k, level_state, game_state, rnd, tics),
        ClassType::Tank => t_tank(k, level_state, game_state, rnd, tics),
        ClassType::Mutant => t_mutant(k, level_state, game_state, rnd, tics),
        ClassType::Shield => t_shield(k, level_state, tics),
        ClassType::Gate => t_gate(k, level_state, game_state, tics),
        ClassType::Inert => t_explode(k, level_state, tics),
        ClassType::Player | ClassType::Nothing => {}
    }
}

fn shot_damage(class: ClassType) -> i32 {
    match class {
        ClassType::BigShot => 3,
        _ => 1,
    }
}

/// Fly along the firing angle in substeps, blowing up on walls and
/// damaging whatever the hit rectangle crosses. A full power shot
/// spends temp1 to pass through its first victim.
fn t_shot(
    k: ObjKey,
    level_state: &mut LevelState,
    game_state: &mut GameState,
    prj: &ProjectionConfig,
    tics: i64,
) {
    let class = level_state.obj(k).class;
    let angle = level_state.obj(k).angle.rem_euclid(crate::def::ANGLES) as usize;
    let mut mov = (SHOT_SPEED as i64 * tics).min(MAX_SHOT_MOVE as i64) as i32;

    while mov > 0 {
        let step = mov.min(SHOT_STEP);
        mov -= step;

        let dx = fixed_mul_tc(step, prj.cos(angle));
        let dy = fixed_mul_tc(step, prj.sin(angle));
        level_state.update_obj(k, |obj| {
            obj.x += dx;
            obj.y += dy;
            obj.calc_bounds();
        });

        let obj = level_state.obj(k);
        if level_state.is_solid(obj.tilex() as i32, obj.tiley() as i32) {
            explode(level_state, k);
            return;
        }

        if let Some(victim) = shot_victim(k, level_state, class) {
            damage_actor(victim, level_state, game_state, shot_damage(class));
            let penetrates = level_state.obj(k).temp1 > 0;
            if penetrates {
                level_state.update_obj(k, |obj| obj.temp1 -= 1);
            } else {
                free_actor(level_state, k);
                return;
            }
        }
    }
}

fn shot_victim(k: ObjKey, level_state: &LevelState, class: ClassType) -> Option<ObjKey> {
    let shot = level_state.obj(k);
    for slot in 0..level_state.actors.len() {
        if slot == k.0 {
            continue;
        }
        let other = &level_state.actors[slot];
        let valid = match (class, other.class) {
            (ClassType::EnemyShot, ClassType::Player) => true,
            (ClassType::EnemyShot, _) => false,
            (
                _,
                ClassType::Drone | ClassType::Tank | ClassType::Mutant | ClassType::Refugee,
            ) => true,
            _ => false,
        };
        if valid && shot.touches(other) {
            return Some(ObjKey(slot));
        }
    }
    None
}

fn animate(k: ObjKey, level_state: &mut LevelState, tics: i64, stages: usize) {
    level_state.update_obj(k, |obj| {
        obj.tic_count -= tics;
        if obj.tic_count <= 0 {
            obj.tic_count = ANIM_TICS;
            obj.stage = (obj.stage + 1) % stages;
        }
    });
}

/// Refugees idle in place until the tank touches them. The last rescue
/// (or death) opens the warp gate.
fn t_refugee(k: ObjKey, level_state: &mut LevelState, game_state: &mut GameState, tics: i64) {
    animate(k, level_state, tics, 2);

    let player = level_state.player().clone();
    if level_state.obj(k).touches(&player) {
        free_actor(level_state, k);
        game_state.refugees_saved += 1;
        game_state.score += REFUGEE_POINTS;
        level_state.num_refugees -= 1;
        if level_state.num_refugees <= 0 {
            spawn_warp_gate(level_state);
        }
    }
}

/// Drones lock onto the first unclaimed refugee, or the player when
/// none is left, and detonate on contact. temp1 holds the claimed slot
/// plus one.
fn t_drone(
    k: ObjKey,
    level_state: &mut LevelState,
    game_state: &mut GameState,
    rnd: &RndT,
    tics: i64,
) {
    animate(k, level_state, tics, 4);

    let mut target = level_state.obj(k).temp1 as usize;
    if target != 0 && level_state.actors[target - 1].class != ClassType::Refugee {
        target = 0;
        level_state.update_obj(k, |obj| obj.temp1 = 0);
    }
    if target == 0 {
        for slot in 1..level_state.actors.len() {
            let other = &level_state.actors[slot];
            if other.class == ClassType::Refugee && other.temp2 == 0 {
                level_state.actors[slot].temp2 = 1; // claimed
                level_state.update_obj(k, |obj| obj.temp1 = (slot + 1) as i32);
                target = slot + 1;
                break;
            }
        }
    }

    let target_key = if target == 0 {
        PLAYER_KEY
    } else {
        ObjKey(target - 1)
    };
    let (tx, ty) = {
        let t = level_state.obj(target_key);
        (t.x, t.y)
    };

    let mov = (DRONE_SPEED as i64 * tics).min(TILEGLOBAL as i64) as i32;
    chase_thing(k, level_state, rnd, mov, tx, ty);

    let target_obj = level_state.obj(target_key).clone();
    if level_state.obj(k).touches(&target_obj) {
        damage_actor(target_key, level_state, game_state, 2);
        explode(level_state, k);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AimResult {
    CanShoot(DirType),
    Blocked,
    NoTarget,
}

/// Turret aim, guard clause by guard clause: the player must line up
/// with a cardinal direction within the chase tolerance, and the line
/// of sight must be clear. Anything else is a reason not to shoot this
/// tick.
pub fn aim_at_player(k: ObjKey, level_state: &LevelState) -> AimResult {
    let obj = level_state.obj(k);
    let player = level_state.player();
    let dx = player.x - obj.x;
    let dy = player.y - obj.y;

    // point blank: no axis dominates, so there is nothing to line up
    if dx.abs() < MIN_CHASE && dy.abs() < MIN_CHASE {
        return AimResult::NoTarget;
    }

    let dir = if dy.abs() < MIN_CHASE {
        if dx > 0 {
            DirType::East
        } else {
            DirType::West
        }
    } else if dx.abs() < MIN_CHASE {
        if dy > 0 {
            DirType::North
        } else {
            DirType::South
        }
    } else {
        return AimResult::NoTarget;
    };

    if !check_line(level_state, obj.x, obj.y, player.x, player.y) {
        return AimResult::Blocked;
    }

    AimResult::CanShoot(dir)
}

fn t_tank(
    k: ObjKey,
    level_state: &mut LevelState,
    _game_state: &mut GameState,
    rnd: &RndT,
    tics: i64,
) {
    if level_state.obj(k).temp2 > 0 {
        level_state.update_obj(k, |obj| obj.temp2 -= tics as i32);
    }

    match aim_at_player(k, level_state) {
        AimResult::CanShoot(dir) => {
            if level_state.obj(k).temp2 <= 0 {
                let obj = level_state.obj(k);
                let (ox, oy) = match dir {
                    DirType::East => (obj.size + 1, 0),
                    DirType::North => (0, obj.size + 1),
                    DirType::West => (-obj.size - 1, 0),
                    DirType::South => (0, -obj.size - 1),
                    DirType::NoDir => (0, 0),
                };
                let x = obj.x + ox * 2;
                let y = obj.y + oy * 2;
                spawn_actor_at(level_state, ClassType::EnemyShot, x, y, dir.angle());
                level_state.update_obj(k, |obj| obj.temp2 = TANK_RELOAD_TICS);
            }
        }
        AimResult::Blocked | AimResult::NoTarget => {
            if level_state.obj(k).temp2 <= 0 {
                debug!("tank {} holds fire, no firing line", k.0);
            }
            let (px, py) = {
                let p = level_state.player();
                (p.x, p.y)
            };
            let mov = (TANK_SPEED as i64 * tics).min(TILEGLOBAL as i64) as i32;
            chase_thing(k, level_state, rnd, mov, px, py);
        }
    }
}

/// Melee chaser. The attack runs on temp2 as a countdown with a single
/// damage point partway through, temp1 flags that the hit already
/// landed.
fn t_mutant(
    k: ObjKey,
    level_state: &mut LevelState,
    game_state: &mut GameState,
    rnd: &RndT,
    tics: i64,
) {
    let attacking = level_state.obj(k).temp2 > 0;
    if attacking {
        level_state.update_obj(k, |obj| obj.temp2 -= tics as i32);
        let obj = level_state.obj(k);
        if obj.temp1 == 0 && obj.temp2 <= MUTANT_HIT_TICS {
            let player = level_state.player().clone();
            if level_state.obj(k).touches(&player) {
                damage_actor(PLAYER_KEY, level_state, game_state, 1);
            }
            level_state.update_obj(k, |obj| obj.temp1 = 1);
        }
        if level_state.obj(k).temp2 <= 0 {
            level_state.update_obj(k, |obj| obj.stage = 0);
        }
        return;
    }

    let player = level_state.player().clone();
    if level_state.obj(k).touches(&player) {
        level_state.update_obj(k, |obj| {
            obj.temp2 = MUTANT_ATTACK_TICS;
            obj.temp1 = 0;
            obj.stage = 3; // strike frame
        });
        return;
    }

    animate(k, level_state, tics, 3);
    let mov = (MUTANT_SPEED as i64 * tics).min(TILEGLOBAL as i64) as i32;
    chase_thing(k, level_state, rnd, mov, player.x, player.y);
}

/// Shield pickup: the level-start player record comes back wholesale,
/// only the current pose survives.
fn t_shield(k: ObjKey, level_state: &mut LevelState, tics: i64) {
    animate(k, level_state, tics, 2);

    let player = level_state.player().clone();
    if level_state.obj(k).touches(&player) {
        let mut restored = level_state.player_proto.clone();
        restored.x = player.x;
        restored.y = player.y;
        restored.angle = player.angle;
        restored.calc_bounds();
        level_state.actors[0] = restored;
        free_actor(level_state, k);
    }
}

fn t_gate(k: ObjKey, level_state: &mut LevelState, game_state: &mut GameState, tics: i64) {
    animate(k, level_state, tics, 4);

    let player = level_state.player().clone();
    if level_state.obj(k).touches(&player) {
        game_state.play_state = PlayState::Victory;
    }
}

/// Shared explosion: five stages, then either a corpse that stays
/// around (temp1 set) or a free slot.
fn t_explode(k: ObjKey, level_state: &mut LevelState, tics: i64) {
    let done = level_state.obj(k).stage >= EXPLODE_STAGES;
    if done {
        return; // burnt out corpse
    }
    level_state.update_obj(k, |obj| {
        obj.tic_count -= tics;
    });
    if level_state.obj(k).tic_count > 0 {
        return;
    }
    let next_stage = level_state.obj(k).stage + 1;
    if next_stage >= EXPLODE_STAGES {
        if level_state.obj(k).temp1 != 0 {
            level_state.update_obj(k, |obj| obj.stage = EXPLODE_STAGES);
        } else {
            free_actor(level_state, k);
        }
    } else {
        level_state.update_obj(k, |obj| {
            obj.stage = next_stage;
            obj.tic_count = EXPLODE_STAGE_TICS;
        });
    }
}
