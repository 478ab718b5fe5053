use crate::fixed::{Fixed, ZERO};

pub const MAP_SIZE: usize = 64;

pub const TILESHIFT: i32 = 16;
pub const TILEGLOBAL: i32 = 1 << 16;

pub const ANGLES: i32 = 360;
pub const ANGLE_QUAD: i32 = ANGLES / 4;

pub const GLOBAL1: i32 = 1 << 16;

pub const FOCAL_LENGTH: i32 = 0x6000;
pub const MIN_RATIO: i32 = 16;
pub const PRESTEP: i32 = 0x5800;

/// Height of the 3-D window in scanlines, the rest of the screen is
/// the instrument panel.
pub const VIEW_HEIGHT: usize = 144;

pub const MAX_ACTORS: usize = 100;
pub const MAX_WALL_SPANS: usize = 100;

/// Hit rectangle radius of the player tank.
pub const PLAYER_SIZE: i32 = 0x6000;
/// Default hit rectangle radius of everything else.
pub const ACTOR_SIZE: i32 = 0x5000;
/// Extra clearance AI actors keep from walls when walking tile steps.
pub const WALL_ZONE: i32 = 0x1800;

/// Below this axis delta the chase heuristic ignores an axis entirely.
pub const MIN_CHASE: i32 = 0x8000;

pub const EXPLODE_STAGES: usize = 5;

pub const CEILING_COLOR: u8 = 0x08;
pub const FLOOR_COLOR: u8 = 0x07;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClassType {
    Nothing,
    Player,
    Shot,
    BigShot,
    EnemyShot,
    Refugee,
    Drone,
    Tank,
    Mutant,
    Shield,
    Gate,
    /// Exploding or burnt-out actor (terminal animation, maybe a corpse).
    Inert,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DirType {
    East,
    North,
    West,
    South,
    NoDir,
}

impl DirType {
    pub fn opposite(self) -> DirType {
        match self {
            DirType::East => DirType::West,
            DirType::North => DirType::South,
            DirType::West => DirType::East,
            DirType::South => DirType::North,
            DirType::NoDir => DirType::NoDir,
        }
    }

    pub fn angle(self) -> i32 {
        match self {
            DirType::East => 0,
            DirType::North => 90,
            DirType::West => 180,
            DirType::South => 270,
            DirType::NoDir => 0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ObjKey(pub usize);

pub const PLAYER_KEY: ObjKey = ObjKey(0);

/// One slot of the actor array. Freed slots get class Nothing and are
/// recycled by the next spawn scan, never removed.
#[derive(Clone, Debug)]
pub struct ObjType {
    pub class: ClassType,
    /// World position in 16.16 global units (one tile = 0x10000).
    pub x: i32,
    pub y: i32,
    /// Facing in whole angle units, 0..359, 0 = +x, counterclockwise.
    pub angle: i32,
    pub hitpoints: i32,
    /// View-space projection result of the last frame this actor was drawn.
    pub view_x: i32,
    pub view_height: i32,
    /// Animation stage and the tics left in the current stage.
    pub stage: usize,
    pub tic_count: i64,
    /// Hit rectangle, derived from position +/- size. Must be recomputed
    /// after every position change.
    pub xl: i32,
    pub xh: i32,
    pub yl: i32,
    pub yh: i32,
    pub size: i32,
    /// Last direction a tile step succeeded in (chase memory).
    pub dir: DirType,
    /// Per-class scratch: target slot index for drones, penetration count
    /// for big shots, damage-done flag for mutants.
    pub temp1: i32,
    /// Per-class scratch: claim flag for refugees, reload count for tanks,
    /// attack timer for mutants.
    pub temp2: i32,
}

impl ObjType {
    pub fn calc_bounds(&mut self) {
        self.xl = self.x - self.size;
        self.xh = self.x + self.size;
        self.yl = self.y - self.size;
        self.yh = self.y + self.size;
    }

    pub fn tilex(&self) -> usize {
        (self.x >> TILESHIFT) as usize
    }

    pub fn tiley(&self) -> usize {
        (self.y >> TILESHIFT) as usize
    }

    /// Axis-aligned hit rectangle overlap test.
    pub fn touches(&self, other: &ObjType) -> bool {
        self.xl <= other.xh && self.xh >= other.xl && self.yl <= other.yh && self.yh >= other.yl
    }
}

pub fn new_obj(class: ClassType) -> ObjType {
    let mut obj = ObjType {
        class,
        x: 0,
        y: 0,
        angle: 0,
        hitpoints: 0,
        view_x: 0,
        view_height: 0,
        stage: 0,
        tic_count: 0,
        xl: 0,
        xh: 0,
        yl: 0,
        yh: 0,
        size: ACTOR_SIZE,
        dir: DirType::NoDir,
        temp1: 0,
        temp2: 0,
    };
    obj.calc_bounds();
    obj
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayState {
    StillPlaying,
    Victory,
    Dead,
    Abort,
}

pub struct GameState {
    pub level_on: usize,
    pub score: i32,
    pub refugees_saved: i32,
    pub refugees_killed: i32,
    pub play_state: PlayState,
    pub time_count: u64,
    /// Weapon charge handling, advanced by held-fire duration.
    pub weapon: WeaponState,
    pub charge: i64,
    pub rearm_count: i64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WeaponState {
    Ready,
    Charging,
    MaxPower,
    Rearming,
}

pub fn new_game_state() -> GameState {
    GameState {
        level_on: 0,
        score: 0,
        refugees_saved: 0,
        refugees_killed: 0,
        play_state: PlayState::StillPlaying,
        time_count: 0,
        weapon: WeaponState::Ready,
        charge: 0,
        rearm_count: 0,
    }
}

/// Everything that belongs to the currently loaded level. Replaced
/// wholesale on level transition.
#[derive(Debug)]
pub struct LevelState {
    /// Wall color per tile, indexed [x][y]. 0 = open.
    pub tile_map: Vec<Vec<u16>>,
    /// Slot 0 is always the player.
    pub actors: Vec<ObjType>,
    /// Where the warp gate appears once the last refugee is gone.
    pub warp_x: i32,
    pub warp_y: i32,
    pub num_refugees: i32,
    /// Snapshot of the player record at level start, restored by the
    /// shield pickup.
    pub player_proto: ObjType,
}

impl LevelState {
    pub fn player(&self) -> &ObjType {
        &self.actors[0]
    }

    pub fn mut_player(&mut self) -> &mut ObjType {
        &mut self.actors[0]
    }

    pub fn obj(&self, k: ObjKey) -> &ObjType {
        &self.actors[k.0]
    }

    pub fn mut_obj(&mut self, k: ObjKey) -> &mut ObjType {
        &mut self.actors[k.0]
    }

    pub fn update_obj<F>(&mut self, k: ObjKey, f: F)
    where
        F: FnOnce(&mut ObjType),
    {
        f(&mut self.actors[k.0])
    }

    pub fn tile_at(&self, tx: i32, ty: i32) -> Option<u16> {
        if tx < 0 || ty < 0 || tx >= MAP_SIZE as i32 || ty >= MAP_SIZE as i32 {
            return None;
        }
        Some(self.tile_map[tx as usize][ty as usize])
    }

    /// Off-map counts as solid so nothing can ever clip out of the grid.
    pub fn is_solid(&self, tx: i32, ty: i32) -> bool {
        match self.tile_at(tx, ty) {
            Some(color) => color != 0,
            None => true,
        }
    }
}

/// View transform constants for one frame, derived from the player pose.
/// Computed once before the think pass so every actor projects against
/// the same camera.
pub struct ViewConsts {
    pub view_x: i32,
    pub view_y: i32,
    pub view_angle: i32,
    pub view_cos: Fixed,
    pub view_sin: Fixed,
}

pub fn null_view_consts() -> ViewConsts {
    ViewConsts {
        view_x: 0,
        view_y: 0,
        view_angle: 0,
        view_cos: ZERO,
        view_sin: ZERO,
    }
}
