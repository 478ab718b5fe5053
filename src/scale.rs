#[cfg(test)]
#[path = "./scale_test.rs"]
mod scale_test;

use crate::assets::{linearize, Graphic, GraphicNum};
use crate::def::{
    ClassType, LevelState, ViewConsts, EXPLODE_STAGES, MIN_RATIO, TILEGLOBAL,
};
use crate::draw::transform_point;
use crate::play::ProjectionConfig;
use crate::vid::PlanarScreen;

/// Projected height at which a sprite counts as behind the view plane.
/// transform_point clamps to the minimum ratio, so this is the height
/// such sprites all come out at.
pub const TOO_CLOSE: i32 = TILEGLOBAL / MIN_RATIO;

/// One vertical strip of opaque pixels inside a shape column.
#[derive(Clone, Debug)]
pub struct ShapeRun {
    pub start: usize,
    pub pixels: Vec<u8>,
}

/// Sparse column store of a sprite: only opaque runs are kept, color
/// index 0 is the transparent gap between them.
#[derive(Clone, Debug)]
pub struct Shape {
    pub width: usize,
    pub height: usize,
    pub columns: Vec<Vec<ShapeRun>>,
}

pub fn build_shape(g: &Graphic) -> Shape {
    let linear = linearize(g);
    let mut columns = Vec::with_capacity(g.width);
    for x in 0..g.width {
        let mut runs: Vec<ShapeRun> = Vec::new();
        let mut current: Option<ShapeRun> = None;
        for y in 0..g.height {
            let color = linear[y * g.width + x];
            if color == 0 {
                if let Some(run) = current.take() {
                    runs.push(run);
                }
            } else {
                match current.as_mut() {
                    Some(run) => run.pixels.push(color),
                    None => {
                        current = Some(ShapeRun {
                            start: y,
                            pixels: vec![color],
                        })
                    }
                }
            }
        }
        if let Some(run) = current.take() {
            runs.push(run);
        }
        columns.push(runs);
    }
    Shape {
        width: g.width,
        height: g.height,
        columns,
    }
}

/// The discrete sprite heights the scaler supports. Small sizes come in
/// steps of two, larger ones in steps of three, the way the original
/// precompiled one scaler routine per step.
pub struct ScaleSteps {
    heights: Vec<i32>,
}

pub fn setup_scaling(view_height: usize) -> ScaleSteps {
    let mut heights = Vec::new();
    let mut h: i32 = 2;
    while h <= view_height as i32 {
        heights.push(h);
        h += 2;
    }
    let max = (view_height * 3) as i32;
    while h <= max {
        heights.push(h);
        h += 3;
    }
    ScaleSteps { heights }
}

impl ScaleSteps {
    /// Largest step not above the requested height, or the smallest
    /// step for heights below it.
    pub fn quantize(&self, height: i32) -> i32 {
        match self.heights.binary_search(&height) {
            Ok(ix) => self.heights[ix],
            Err(0) => self.heights[0],
            Err(ix) => self.heights[ix - 1],
        }
    }

    pub fn max_height(&self) -> i32 {
        *self.heights.last().unwrap()
    }
}

/// Draw a shape centered on centerx with the given on-screen height,
/// clipped against the screen edges and the per-column wall heights.
/// Columns that map to the same source column are written as one
/// horizontal run. Returns whether any pixel was drawn.
pub fn scale_shape(
    screen: &mut PlanarScreen,
    wallheight: &[i32],
    prj: &ProjectionConfig,
    shape: &Shape,
    centerx: i32,
    height: i32,
) -> bool {
    if height < 2 {
        return false;
    }
    let screen_w = (height as i64 * shape.width as i64 / shape.height as i64) as i32;
    if screen_w < 1 {
        return false;
    }
    let left = centerx - screen_w / 2;
    let right = left + screen_w;
    if right <= 0 || left >= prj.view_width as i32 {
        return false;
    }
    let top = (prj.view_height as i32 - height) / 2;

    let x0 = left.max(0);
    let x1 = right.min(prj.view_width as i32);

    let mut drawn = false;
    let mut x = x0;
    while x < x1 {
        let src_col = ((x - left) as i64 * shape.width as i64 / screen_w as i64) as usize;
        // extent of the screen columns sharing this source column
        let mut x_end = x + 1;
        while x_end < x1
            && ((x_end - left) as i64 * shape.width as i64 / screen_w as i64) as usize == src_col
        {
            x_end += 1;
        }

        // split on the z buffer, walls in front clip the sprite
        let mut seg = x;
        while seg < x_end {
            if wallheight[seg as usize] >= height {
                seg += 1;
                continue;
            }
            let mut seg_end = seg + 1;
            while seg_end < x_end && wallheight[seg_end as usize] < height {
                seg_end += 1;
            }
            if draw_column_runs(screen, prj, shape, src_col, seg, (seg_end - seg) as usize, top, height) {
                drawn = true;
            }
            seg = seg_end;
        }
        x = x_end;
    }
    drawn
}

#[allow(clippy::too_many_arguments)]
fn draw_column_runs(
    screen: &mut PlanarScreen,
    prj: &ProjectionConfig,
    shape: &Shape,
    src_col: usize,
    x: i32,
    width: usize,
    top: i32,
    height: i32,
) -> bool {
    let mut drawn = false;
    for run in &shape.columns[src_col] {
        let y0 = top + (run.start as i64 * height as i64 / shape.height as i64) as i32;
        let y1 = top
            + (((run.start + run.pixels.len()) as i64 * height as i64) / shape.height as i64) as i32;
        for y in y0.max(0)..y1.min(prj.view_height as i32) {
            let src_y = ((y - top) as i64 * shape.height as i64 / height as i64) as usize;
            if src_y < run.start || src_y >= run.start + run.pixels.len() {
                continue;
            }
            let color = run.pixels[src_y - run.start];
            screen.hlin(x as usize, y as usize, width, color);
            drawn = true;
        }
    }
    drawn
}

/// Picture to draw for a class in a given animation stage.
pub fn shape_num(class: ClassType, stage: usize) -> Option<GraphicNum> {
    match class {
        ClassType::Shot => Some(GraphicNum::Shot),
        ClassType::BigShot => Some(GraphicNum::BigShot),
        ClassType::EnemyShot => Some(GraphicNum::TankShot),
        ClassType::Refugee => Some(if stage & 1 == 0 {
            GraphicNum::Refugee1
        } else {
            GraphicNum::Refugee2
        }),
        ClassType::Drone => Some(match stage % 4 {
            0 => GraphicNum::Drone1,
            1 => GraphicNum::Drone2,
            2 => GraphicNum::Drone3,
            _ => GraphicNum::Drone4,
        }),
        ClassType::Tank => Some(GraphicNum::Tank),
        ClassType::Mutant => Some(match stage % 4 {
            0 => GraphicNum::Mutant1,
            1 => GraphicNum::Mutant2,
            2 => GraphicNum::Mutant3,
            _ => GraphicNum::MutantHit,
        }),
        ClassType::Shield => Some(if stage & 1 == 0 {
            GraphicNum::Shield1
        } else {
            GraphicNum::Shield2
        }),
        ClassType::Gate => Some(match stage % 4 {
            0 => GraphicNum::Warp1,
            1 => GraphicNum::Warp2,
            2 => GraphicNum::Warp3,
            _ => GraphicNum::Warp4,
        }),
        ClassType::Inert => Some(match stage {
            0 => GraphicNum::Explosion1,
            1 => GraphicNum::Explosion2,
            2 => GraphicNum::Explosion3,
            3 => GraphicNum::Explosion4,
            s if s < EXPLODE_STAGES => GraphicNum::Explosion5,
            _ => GraphicNum::DeadRefugee,
        }),
        ClassType::Player | ClassType::Nothing => None,
    }
}

/// Shapes are stored in picture chunk order, chunk 0 is the size table.
pub fn shape_index(num: GraphicNum) -> usize {
    num as usize - 1
}

/// Project every live actor, sort far to near by projected height and
/// draw against the wall z buffer. The sort is stable: actors of equal
/// height keep their slot order and the later slot draws last, on top.
pub fn draw_sprites(
    screen: &mut PlanarScreen,
    level_state: &mut LevelState,
    prj: &ProjectionConfig,
    vc: &ViewConsts,
    shapes: &[Shape],
    wallheight: &[i32],
) {
    let mut visible: Vec<(usize, i32, i32)> = Vec::new();
    for slot in 1..level_state.actors.len() {
        let obj = &level_state.actors[slot];
        if obj.class == ClassType::Nothing {
            continue;
        }
        let (screenx, height) = transform_point(vc, prj, obj.x, obj.y);
        level_state.actors[slot].view_x = screenx;
        level_state.actors[slot].view_height = height;
        if height < 2 || height >= TOO_CLOSE {
            continue;
        }
        visible.push((slot, screenx, height));
    }

    visible.sort_by_key(|&(_, _, height)| height);

    for (slot, screenx, height) in visible {
        let obj = &level_state.actors[slot];
        if let Some(num) = shape_num(obj.class, obj.stage) {
            let shape = &shapes[shape_index(num)];
            let step_height = prj.steps.quantize(height);
            scale_shape(screen, wallheight, prj, shape, screenx, step_height);
        }
    }
}
