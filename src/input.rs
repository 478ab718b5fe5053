#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ControlDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    None,
}

/// One tick worth of player input, sampled at the top of the frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ControlInfo {
    pub dir: ControlDirection,
    pub button1: bool,
    pub button2: bool,
}

pub const NO_CONTROL: ControlInfo = ControlInfo {
    dir: ControlDirection::None,
    button1: false,
    button2: false,
};

/// Direction broken into (x, y) components, each -1, 0 or 1.
/// x is turn (positive = right), y is thrust (positive = forward).
pub fn control_components(dir: ControlDirection) -> (i32, i32) {
    match dir {
        ControlDirection::North => (0, 1),
        ControlDirection::NorthEast => (1, 1),
        ControlDirection::East => (1, 0),
        ControlDirection::SouthEast => (1, -1),
        ControlDirection::South => (0, -1),
        ControlDirection::SouthWest => (-1, -1),
        ControlDirection::West => (-1, 0),
        ControlDirection::NorthWest => (-1, 1),
        ControlDirection::None => (0, 0),
    }
}

pub trait Input {
    /// Snapshot of the controls for this tick.
    fn read_control(&mut self) -> ControlInfo;
    /// The player asked to leave the level.
    fn check_abort(&mut self) -> bool;
}

/// Plays back a fixed control script, used by the demo binary and the
/// play-loop tests. After the script runs out every tick reads as
/// no input, and the run aborts.
pub struct ScriptedInput {
    frames: Vec<ControlInfo>,
    ix: usize,
}

pub fn new_scripted_input(frames: Vec<ControlInfo>) -> ScriptedInput {
    ScriptedInput { frames, ix: 0 }
}

impl Input for ScriptedInput {
    fn read_control(&mut self) -> ControlInfo {
        if self.ix < self.frames.len() {
            let frame = self.frames[self.ix];
            self.ix += 1;
            frame
        } else {
            NO_CONTROL
        }
    }

    fn check_abort(&mut self) -> bool {
        self.ix >= self.frames.len()
    }
}
