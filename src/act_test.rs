use super::*;

use crate::def::{new_game_state, new_obj, MAP_SIZE, PLAYER_SIZE, TILESHIFT};
use crate::play::calc_projection;
use crate::rnd::new_rnd_t;
use crate::state::spawn_actor;

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

fn mock_level_state(tile_map: Vec<Vec<u16>>, px: i32, py: i32) -> LevelState {
    let mut player = new_obj(ClassType::Player);
    player.x = px;
    player.y = py;
    player.hitpoints = 3;
    player.size = PLAYER_SIZE;
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

#[test]
fn test_shot_explodes_on_wall() {
    let mut map = bordered_map();
    map[12][10] = 1;
    let mut level = mock_level_state(map, tile_center(32), tile_center(32));
    let mut game_state = new_game_state();
    let prj = calc_projection(320, 144);
    let rnd = new_rnd_t(7);

    let k = spawn_actor_at(&mut level, ClassType::Shot, tile_center(10), tile_center(10), 0)
        .unwrap();
    do_active_obj(k, &mut level, &mut game_state, &prj, &rnd, 20);
    assert_eq!(level.obj(k).class, ClassType::Inert);
}

#[test]
fn test_shot_damages_victim_and_vanishes() {
    let mut level = mock_level_state(bordered_map(), tile_center(32), tile_center(32));
    let mut game_state = new_game_state();
    let prj = calc_projection(320, 144);
    let rnd = new_rnd_t(7);

    let drone = spawn_actor(&mut level, ClassType::Drone, 11, 10, 0).unwrap();
    let k = spawn_actor_at(&mut level, ClassType::Shot, tile_center(10), tile_center(10), 0)
        .unwrap();

    do_active_obj(k, &mut level, &mut game_state, &prj, &rnd, 20);
    assert_eq!(level.obj(drone).hitpoints, 1);
    assert_eq!(level.obj(drone).class, ClassType::Drone);
    assert_eq!(level.obj(k).class, ClassType::Nothing);
}

#[test]
fn test_big_shot_penetrates_first_victim() {
    let mut level = mock_level_state(bordered_map(), tile_center(32), tile_center(32));
    let mut game_state = new_game_state();
    let prj = calc_projection(320, 144);
    let rnd = new_rnd_t(7);

    let drone = spawn_actor(&mut level, ClassType::Drone, 11, 10, 0).unwrap();
    level.update_obj(drone, |obj| obj.hitpoints = 1);
    let k = spawn_actor_at(
        &mut level,
        ClassType::BigShot,
        tile_center(10),
        tile_center(10),
        0,
    )
    .unwrap();
    level.update_obj(k, |obj| obj.temp1 = 1);

    do_active_obj(k, &mut level, &mut game_state, &prj, &rnd, 20);
    assert_eq!(level.obj(drone).class, ClassType::Inert);
    assert_eq!(game_state.score, 150);
    // the shot spent its penetration and keeps flying
    assert_eq!(level.obj(k).class, ClassType::BigShot);
    assert_eq!(level.obj(k).temp1, 0);
}

#[test]
fn test_enemy_shot_hits_only_the_player() {
    let mut level = mock_level_state(bordered_map(), tile_center(10), tile_center(10));
    let mut game_state = new_game_state();
    let prj = calc_projection(320, 144);
    let rnd = new_rnd_t(7);

    let k = spawn_actor_at(
        &mut level,
        ClassType::EnemyShot,
        tile_center(11),
        tile_center(10),
        180,
    )
    .unwrap();
    do_active_obj(k, &mut level, &mut game_state, &prj, &rnd, 10);
    assert_eq!(level.player().hitpoints, 2);
    assert_eq!(level.obj(k).class, ClassType::Nothing);
}

#[test]
fn test_refugee_rescue_opens_gate() {
    let mut level = mock_level_state(bordered_map(), tile_center(10), tile_center(10));
    level.warp_x = tile_center(60);
    level.warp_y = tile_center(60);
    level.num_refugees = 1;
    let mut game_state = new_game_state();

    let k = spawn_actor(&mut level, ClassType::Refugee, 10, 10, 0).unwrap();
    t_refugee(k, &mut level, &mut game_state, 1);

    // the gate spawn recycles the slot the rescue just freed
    assert_eq!(level.obj(k).class, ClassType::Gate);
    assert_eq!(level.obj(k).x, tile_center(60));
    assert_eq!(game_state.refugees_saved, 1);
    assert_eq!(game_state.score, 1000);
    assert_eq!(level.num_refugees, 0);
}

#[test]
fn test_drone_claims_refugee_then_falls_back_to_player() {
    let mut level = mock_level_state(bordered_map(), tile_center(32), tile_center(32));
    let mut game_state = new_game_state();
    let rnd = new_rnd_t(7);

    let refugee = spawn_actor(&mut level, ClassType::Refugee, 28, 30, 0).unwrap();
    let drone = spawn_actor(&mut level, ClassType::Drone, 20, 30, 0).unwrap();

    t_drone(drone, &mut level, &mut game_state, &rnd, 1);
    assert_eq!(level.obj(drone).temp1, refugee.0 as i32 + 1);
    assert_eq!(level.obj(refugee).temp2, 1); // claimed

    // once the refugee is gone the drone goes for the player
    level.update_obj(refugee, |obj| obj.class = ClassType::Nothing);
    t_drone(drone, &mut level, &mut game_state, &rnd, 1);
    assert_eq!(level.obj(drone).temp1, 0);
}

#[test]
fn test_drone_detonates_on_contact() {
    let mut level = mock_level_state(bordered_map(), tile_center(10), tile_center(10));
    let mut game_state = new_game_state();
    let rnd = new_rnd_t(7);

    let drone = spawn_actor(&mut level, ClassType::Drone, 10, 10, 0).unwrap();
    t_drone(drone, &mut level, &mut game_state, &rnd, 1);

    assert_eq!(level.player().hitpoints, 1);
    assert_eq!(level.obj(drone).class, ClassType::Inert);
}

#[test]
fn test_aim_at_player() {
    let mut map = bordered_map();
    map[15][20] = 3;
    let mut level = mock_level_state(map, tile_center(20), tile_center(10));

    // horizontally aligned, clear line
    let tank = spawn_actor(&mut level, ClassType::Tank, 10, 10, 0).unwrap();
    assert_eq!(aim_at_player(tank, &level), AimResult::CanShoot(DirType::East));

    // vertically aligned through the pillar
    let blocked = spawn_actor(&mut level, ClassType::Tank, 15, 30, 0).unwrap();
    level.update_obj(PLAYER_KEY, |obj| {
        obj.x = tile_center(15);
        obj.y = tile_center(10);
        obj.calc_bounds();
    });
    assert_eq!(aim_at_player(blocked, &level), AimResult::Blocked);

    // diagonal offset, nothing to line up with
    level.update_obj(PLAYER_KEY, |obj| {
        obj.x = tile_center(20);
        obj.y = tile_center(20);
        obj.calc_bounds();
    });
    assert_eq!(aim_at_player(tank, &level), AimResult::NoTarget);
}

#[test]
fn test_aim_holds_fire_at_point_blank_range() {
    let mut level = mock_level_state(bordered_map(), tile_center(20), tile_center(20));
    let tank = spawn_actor(&mut level, ClassType::Tank, 20, 20, 0).unwrap();

    // both offsets inside the chase tolerance, neither axis dominates
    let (tx, ty) = {
        let t = level.obj(tank);
        (t.x, t.y)
    };
    level.update_obj(PLAYER_KEY, |obj| {
        obj.x = tx + 0x1000;
        obj.y = ty + 0x2000;
        obj.calc_bounds();
    });
    assert_eq!(aim_at_player(tank, &level), AimResult::NoTarget);
}

#[test]
fn test_tank_fires_and_reloads() {
    let mut level = mock_level_state(bordered_map(), tile_center(20), tile_center(10));
    let mut game_state = new_game_state();
    let rnd = new_rnd_t(7);

    let tank = spawn_actor(&mut level, ClassType::Tank, 10, 10, 0).unwrap();
    t_tank(tank, &mut level, &mut game_state, &rnd, 1);

    let shots = level
        .actors
        .iter()
        .filter(|o| o.class == ClassType::EnemyShot)
        .count();
    assert_eq!(shots, 1);
    assert_eq!(level.obj(tank).temp2, TANK_RELOAD_TICS);

    // still reloading, no second shot
    t_tank(tank, &mut level, &mut game_state, &rnd, 5);
    let shots = level
        .actors
        .iter()
        .filter(|o| o.class == ClassType::EnemyShot)
        .count();
    assert_eq!(shots, 1);
    assert_eq!(level.obj(tank).temp2, TANK_RELOAD_TICS - 5);
}

#[test]
fn test_tank_chases_without_firing_line() {
    let mut level = mock_level_state(bordered_map(), tile_center(20), tile_center(20));
    let mut game_state = new_game_state();
    let rnd = new_rnd_t(7);

    let tank = spawn_actor(&mut level, ClassType::Tank, 10, 10, 0).unwrap();
    t_tank(tank, &mut level, &mut game_state, &rnd, 1);

    assert!(level.actors.iter().all(|o| o.class != ClassType::EnemyShot));
    let obj = level.obj(tank);
    assert!(obj.x != tile_center(10) || obj.y != tile_center(10));
}

#[test]
fn test_mutant_attack_lands_one_hit() {
    let mut level = mock_level_state(bordered_map(), tile_center(10), tile_center(10));
    let mut game_state = new_game_state();
    let rnd = new_rnd_t(7);

    let mutant = spawn_actor(&mut level, ClassType::Mutant, 10, 10, 0).unwrap();

    // contact starts the swing
    t_mutant(mutant, &mut level, &mut game_state, &rnd, 1);
    assert_eq!(level.obj(mutant).temp2, 15);
    assert_eq!(level.obj(mutant).stage, 3);
    assert_eq!(level.player().hitpoints, 3);

    // the hit lands partway through
    t_mutant(mutant, &mut level, &mut game_state, &rnd, 8);
    assert_eq!(level.player().hitpoints, 2);
    assert_eq!(level.obj(mutant).temp1, 1);

    // the rest of the swing does no further damage
    t_mutant(mutant, &mut level, &mut game_state, &rnd, 8);
    assert_eq!(level.player().hitpoints, 2);
    assert_eq!(level.obj(mutant).stage, 0);
}

#[test]
fn test_shield_restores_player_keeping_pose() {
    let mut level = mock_level_state(bordered_map(), tile_center(10), tile_center(10));
    level.update_obj(PLAYER_KEY, |obj| {
        obj.hitpoints = 1;
        obj.angle = 45;
    });

    let shield = spawn_actor(&mut level, ClassType::Shield, 10, 10, 0).unwrap();
    t_shield(shield, &mut level, 1);

    let player = level.player();
    assert_eq!(player.hitpoints, 3);
    assert_eq!(player.x, tile_center(10));
    assert_eq!(player.angle, 45);
    assert_eq!(level.obj(shield).class, ClassType::Nothing);
}

#[test]
fn test_gate_contact_wins_the_level() {
    let mut level = mock_level_state(bordered_map(), tile_center(10), tile_center(10));
    let mut game_state = new_game_state();

    let gate = spawn_actor(&mut level, ClassType::Gate, 10, 10, 0).unwrap();
    t_gate(gate, &mut level, &mut game_state, 1);
    assert_eq!(game_state.play_state, PlayState::Victory);
}

#[test]
fn test_explosion_frees_slot_when_no_corpse() {
    let mut level = mock_level_state(bordered_map(), tile_center(32), tile_center(32));
    let k = spawn_actor(&mut level, ClassType::Tank, 10, 10, 0).unwrap();
    explode(&mut level, k);

    for _ in 0..4 {
        t_explode(k, &mut level, EXPLODE_STAGE_TICS);
        assert_eq!(level.obj(k).class, ClassType::Inert);
    }
    t_explode(k, &mut level, EXPLODE_STAGE_TICS);
    assert_eq!(level.obj(k).class, ClassType::Nothing);
}

#[test]
fn test_explosion_leaves_refugee_corpse() {
    let mut level = mock_level_state(bordered_map(), tile_center(32), tile_center(32));
    let k = spawn_actor(&mut level, ClassType::Refugee, 10, 10, 0).unwrap();
    explode(&mut level, k);

    for _ in 0..5 {
        t_explode(k, &mut level, EXPLODE_STAGE_TICS);
    }
    assert_eq!(level.obj(k).class, ClassType::Inert);
    assert_eq!(level.obj(k).stage, EXPLODE_STAGES);

    // a corpse never changes again
    t_explode(k, &mut level, EXPLODE_STAGE_TICS);
    assert_eq!(level.obj(k).stage, EXPLODE_STAGES);
}
