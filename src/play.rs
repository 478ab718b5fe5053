#[cfg(test)]
#[path = "./play_test.rs"]
mod play_test;

use std::f64::consts::PI;

use tokio::time::{sleep, Duration};

use crate::act::do_active_obj;
use crate::agent::player_control;
use crate::def::{
    ClassType, GameState, LevelState, PlayState, ANGLES, ANGLE_QUAD, FOCAL_LENGTH, GLOBAL1,
    PRESTEP,
};
use crate::draw::three_d_refresh;
use crate::fixed::{new_fixed_u32, Fixed};
use crate::input::Input;
use crate::rnd::RndT;
use crate::scale::{setup_scaling, ScaleSteps, Shape};
use crate::time::Ticker;
use crate::vid::{PlanarScreen, PAGE_1_START, PAGE_2_START, PAGE_3_START};

const RAD_TO_DEG: f64 = 180.0 / PI;

pub struct ProjectionConfig {
    pub view_width: usize,
    pub view_height: usize,
    pub center_x: usize,
    /// Projection constant: ratio = depth * scale / FOCAL_LENGTH.
    pub scale: i32,
    /// Angle units from the view direction to the screen edge.
    pub half_fov: i32,
    pub prestep: i32,
    pub sines: Vec<Fixed>,
    /// Discrete sprite heights the scaler was set up for.
    pub steps: ScaleSteps,
}

impl ProjectionConfig {
    pub fn sin(&self, ix: usize) -> Fixed {
        self.sines[ix]
    }

    /// cos x = sin (x+90), the table carries the extra quadrant.
    pub fn cos(&self, ix: usize) -> Fixed {
        self.sines[ix + ANGLE_QUAD as usize]
    }
}

pub fn calc_projection(width: usize, height: usize) -> ProjectionConfig {
    let view_width = width & !15;
    let view_height = height & !1;
    let center_x = view_width / 2 - 1;
    let half_view = view_width / 2;

    let scale = FOCAL_LENGTH / view_height as i32;

    let tang = (half_view as i32 * scale) as f64 / FOCAL_LENGTH as f64;
    let half_fov = (tang.atan() * RAD_TO_DEG) as i32;

    ProjectionConfig {
        view_width,
        view_height,
        center_x,
        scale,
        half_fov,
        prestep: PRESTEP,
        sines: calc_sines(),
        steps: setup_scaling(view_height),
    }
}

/// Sine table over a full circle plus a cosine quadrant and one guard
/// entry, so cos can read through the same table and an inclusive
/// 90-unit offset never indexes past the end. Negative entries carry
/// the sign bit of the magnitude representation.
fn calc_sines() -> Vec<Fixed> {
    let mut sines: Vec<Fixed> = vec![new_fixed_u32(0); (ANGLES + ANGLE_QUAD + 1) as usize];

    let angles = ANGLES as usize;
    let quad = ANGLE_QUAD as usize;
    let mut angle: f64 = 0.0;
    let angle_step = PI / 2.0 / ANGLE_QUAD as f64;
    for i in 0..=quad {
        let value = (GLOBAL1 as f64 * angle.sin()).round() as u32;
        let v_fixed = new_fixed_u32(value);
        let v_fixed_neg = new_fixed_u32(value | 0x8000_0000);
        sines[i] = v_fixed;
        sines[i + angles] = v_fixed;
        sines[angles / 2 - i] = v_fixed;
        sines[angles - i] = v_fixed_neg;
        sines[angles / 2 + i] = v_fixed_neg;
        angle += angle_step;
    }
    sines
}

const PAGES: [usize; 3] = [PAGE_1_START, PAGE_2_START, PAGE_3_START];

/// Runs one level to its end state. Single-threaded simulation: the
/// player moves first, then every active slot thinks once with the
/// same tic count, then the view is rendered.
#[allow(clippy::too_many_arguments)]
pub async fn play_loop(
    ticker: &Ticker,
    level_state: &mut LevelState,
    game_state: &mut GameState,
    screen: &mut PlanarScreen,
    prj: &ProjectionConfig,
    shapes: &[Shape],
    input: &mut dyn Input,
    rnd: &RndT,
) -> Result<(), String> {
    game_state.play_state = PlayState::StillPlaying;
    let mut page_on = 0;

    while game_state.play_state == PlayState::StillPlaying {
        let tics = ticker.calc_tics() as i64;
        game_state.time_count += tics as u64;

        let control = input.read_control();
        player_control(level_state, game_state, prj, control, tics);

        for slot in 0..level_state.actors.len() {
            if level_state.actors[slot].class == ClassType::Nothing || slot == 0 {
                continue;
            }
            do_active_obj(crate::def::ObjKey(slot), level_state, game_state, prj, rnd, tics);
        }

        screen.set_buffer_offset(PAGES[page_on]);
        three_d_refresh(screen, level_state, game_state, prj, shapes);
        screen.set_display_offset(PAGES[page_on]);
        page_on = (page_on + 1) % 3;

        if input.check_abort() {
            game_state.play_state = PlayState::Abort;
        }

        sleep(Duration::from_millis(1)).await;
    }
    Ok(())
}
