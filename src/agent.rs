#[cfg(test)]
#[path = "./agent_test.rs"]
mod agent_test;

use crate::def::{
    ClassType, GameState, LevelState, ObjKey, WeaponState, ANGLES, PLAYER_KEY, TILEGLOBAL,
    TILESHIFT,
};
use crate::fixed::fixed_mul_tc;
use crate::input::{control_components, ControlInfo};
use crate::play::ProjectionConfig;
use crate::state::spawn_actor_at;

/// Whole angle units the tank turns per tic.
pub const PLAYER_TURN: i32 = 2;
/// Forward speed in global units per tic.
pub const PLAYER_SPEED: i32 = 0x1000;
/// Tics of held fire to reach a full power shot.
pub const MAX_CHARGE: i64 = 60;
/// Tics the cannon needs after a shot.
pub const REARM_TICS: i64 = 20;

/// Distance from the tank center the shot appears at.
const MUZZLE_DIST: i32 = TILEGLOBAL / 2;

/// Per-tick player handling: steering, sliding movement and the
/// charge-and-release cannon.
pub fn player_control(
    level_state: &mut LevelState,
    game_state: &mut GameState,
    prj: &ProjectionConfig,
    control: ControlInfo,
    tics: i64,
) {
    let (xc, yc) = control_components(control.dir);

    if xc != 0 {
        level_state.update_obj(PLAYER_KEY, |obj| {
            // positive x input turns clockwise, angles run counterclockwise
            obj.angle = (obj.angle - xc * PLAYER_TURN * tics as i32).rem_euclid(ANGLES);
        });
    }

    if yc != 0 {
        let player = level_state.player();
        let angle = player.angle as usize;
        let mut mov = yc * PLAYER_SPEED * tics as i32;
        if control.button2 && yc > 0 {
            // afterburner
            mov *= 2;
        }
        let dx = fixed_mul_tc(mov, prj.cos(angle));
        let dy = fixed_mul_tc(mov, prj.sin(angle));
        clip_move(PLAYER_KEY, level_state, dx, dy);
    }

    weapon_control(level_state, game_state, prj, control, tics);
}

/// Move with wall sliding: each axis moves on its own and a blocked
/// axis snaps flush against the wall instead of cancelling the whole
/// move, so driving into a wall at an angle slides along it.
pub fn clip_move(k: ObjKey, level_state: &mut LevelState, dx: i32, dy: i32) {
    let size = level_state.obj(k).size;

    if dx != 0 {
        level_state.update_obj(k, |obj| {
            obj.x += dx;
            obj.calc_bounds();
        });
        if rect_in_wall(level_state, k) {
            level_state.update_obj(k, |obj| {
                if dx > 0 {
                    obj.x = ((obj.xh >> TILESHIFT) << TILESHIFT) - size - 1;
                } else {
                    obj.x = (((obj.xl >> TILESHIFT) + 1) << TILESHIFT) + size;
                }
                obj.calc_bounds();
            });
        }
    }

    if dy != 0 {
        level_state.update_obj(k, |obj| {
            obj.y += dy;
            obj.calc_bounds();
        });
        if rect_in_wall(level_state, k) {
            level_state.update_obj(k, |obj| {
                if dy > 0 {
                    obj.y = ((obj.yh >> TILESHIFT) << TILESHIFT) - size - 1;
                } else {
                    obj.y = (((obj.yl >> TILESHIFT) + 1) << TILESHIFT) + size;
                }
                obj.calc_bounds();
            });
        }
    }
}

/// Any corner of the hit rectangle inside a solid tile?
fn rect_in_wall(level_state: &LevelState, k: ObjKey) -> bool {
    let obj = level_state.obj(k);
    for tx in (obj.xl >> TILESHIFT)..=(obj.xh >> TILESHIFT) {
        for ty in (obj.yl >> TILESHIFT)..=(obj.yh >> TILESHIFT) {
            if level_state.is_solid(tx, ty) {
                return true;
            }
        }
    }
    false
}

fn weapon_control(
    level_state: &mut LevelState,
    game_state: &mut GameState,
    prj: &ProjectionConfig,
    control: ControlInfo,
    tics: i64,
) {
    match game_state.weapon {
        WeaponState::Ready => {
            if control.button1 {
                game_state.weapon = WeaponState::Charging;
                game_state.charge = 0;
            }
        }
        WeaponState::Charging => {
            if control.button1 {
                game_state.charge += tics;
                if game_state.charge >= MAX_CHARGE {
                    game_state.weapon = WeaponState::MaxPower;
                }
            } else {
                fire(level_state, prj, ClassType::Shot);
                start_rearm(game_state);
            }
        }
        WeaponState::MaxPower => {
            if !control.button1 {
                fire(level_state, prj, ClassType::BigShot);
                start_rearm(game_state);
            }
        }
        WeaponState::Rearming => {
            game_state.rearm_count -= tics;
            if game_state.rearm_count <= 0 {
                game_state.weapon = WeaponState::Ready;
            }
        }
    }
}

fn start_rearm(game_state: &mut GameState) {
    game_state.weapon = WeaponState::Rearming;
    game_state.rearm_count = REARM_TICS;
    game_state.charge = 0;
}

fn fire(level_state: &mut LevelState, prj: &ProjectionConfig, class: ClassType) {
    let player = level_state.player();
    let angle = player.angle.rem_euclid(ANGLES);
    let x = player.x + fixed_mul_tc(MUZZLE_DIST, prj.cos(angle as usize));
    let y = player.y + fixed_mul_tc(MUZZLE_DIST, prj.sin(angle as usize));
    if let Some(k) = spawn_actor_at(level_state, class, x, y, angle) {
        if class == ClassType::BigShot {
            // a full power shot punches through one target
            level_state.update_obj(k, |obj| obj.temp1 = 1);
        }
    }
}
