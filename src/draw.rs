#[cfg(test)]
#[path = "./draw_test.rs"]
mod draw_test;

use tracing::warn;

use crate::def::{
    DirType, GameState, LevelState, ObjType, ViewConsts, CEILING_COLOR, FLOOR_COLOR, FOCAL_LENGTH,
    MAX_WALL_SPANS, MIN_RATIO, TILEGLOBAL, TILESHIFT,
};
use crate::fixed::fixed_mul_tc;
use crate::play::ProjectionConfig;
use crate::scale::{draw_sprites, Shape};
use crate::vid::PlanarScreen;

/// Iterations of the silhouette walk before the frame is declared stuck.
const MAX_FOLLOW: usize = 1000;
/// Bisection rounds spent on a ray that passes exactly through a corner.
const CORNER_ROUNDS: usize = 16;
/// Depth slack below which a back trace hit counts as the same wall.
const DEPTH_SLACK: i32 = TILEGLOBAL / 16;

const MAX_TRACE_STEPS: usize = 128;

/// A run of screen columns covered by one stretch of wall. Raw
/// endpoints keep the unclipped projection for height interpolation.
#[derive(Clone, Debug)]
pub struct WallSpan {
    pub x0: usize,
    pub x1: usize,
    pub color: u16,
    pub x0_raw: i32,
    pub x1_raw: i32,
    pub h0: i32,
    pub h1: i32,
}

impl WallSpan {
    /// Wall height in pixels at screen column x.
    pub fn height_at(&self, x: usize) -> i32 {
        let dx = self.x1_raw - self.x0_raw;
        if dx <= 0 {
            return self.h0;
        }
        self.h0 + ((self.h1 - self.h0) as i64 * (x as i32 - self.x0_raw) as i64 / dx as i64) as i32
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TraceHit {
    pub tilex: i32,
    pub tiley: i32,
    /// Outward normal of the face the ray entered through.
    pub face: DirType,
    pub edgex: i32,
    pub edgey: i32,
}

pub fn init_view_consts(prj: &ProjectionConfig, player: &ObjType) -> ViewConsts {
    let angle = player.angle.rem_euclid(crate::def::ANGLES);
    ViewConsts {
        view_x: player.x,
        view_y: player.y,
        view_angle: angle,
        view_cos: prj.cos(angle as usize),
        view_sin: prj.sin(angle as usize),
    }
}

/// World point to screen column and wall height. Depth is the component
/// along the view direction, lateral offset the component to the right
/// of it. Points at or behind the view plane are clamped to the minimum
/// ratio, which pushes them far off screen with a huge height.
pub fn transform_point(vc: &ViewConsts, prj: &ProjectionConfig, gx: i32, gy: i32) -> (i32, i32) {
    let dx = gx.wrapping_sub(vc.view_x);
    let dy = gy.wrapping_sub(vc.view_y);

    let nx = fixed_mul_tc(dx, vc.view_cos).wrapping_add(fixed_mul_tc(dy, vc.view_sin));
    let ny = fixed_mul_tc(dx, vc.view_sin).wrapping_sub(fixed_mul_tc(dy, vc.view_cos));

    let ratio = ((nx as i64 * prj.scale as i64) / FOCAL_LENGTH as i64).max(MIN_RATIO as i64) as i32;
    let screenx = prj.center_x as i32 + ny / ratio;
    let height = TILEGLOBAL / ratio;
    (screenx, height)
}

/// Depth of a point along the view direction.
fn view_depth(vc: &ViewConsts, gx: i32, gy: i32) -> i32 {
    let dx = gx.wrapping_sub(vc.view_x);
    let dy = gy.wrapping_sub(vc.view_y);
    fixed_mul_tc(dx, vc.view_cos).wrapping_add(fixed_mul_tc(dy, vc.view_sin))
}

fn dir_offset(d: DirType) -> (i32, i32) {
    match d {
        DirType::East => (1, 0),
        DirType::North => (0, 1),
        DirType::West => (-1, 0),
        DirType::South => (0, -1),
        DirType::NoDir => (0, 0),
    }
}

fn rotate_ccw(d: DirType) -> DirType {
    match d {
        DirType::East => DirType::North,
        DirType::North => DirType::West,
        DirType::West => DirType::South,
        DirType::South => DirType::East,
        DirType::NoDir => DirType::NoDir,
    }
}

/// Cast a ray from (x, y) along the unnormalized direction
/// (dirx, diry) until it enters a solid tile. Only the ratio of the
/// components matters, so callers can pass sine table values or raw
/// coordinate deltas alike. Tiles outside the map read as solid with
/// color 0, so a ray off the map hits the virtual ring around it and
/// None is left for rays that exhaust their step limit.
pub fn trace_ray_dir(
    level_state: &LevelState,
    x: i32,
    y: i32,
    dirx: i32,
    diry: i32,
) -> Option<TraceHit> {
    if dirx == 0 && diry == 0 {
        return None;
    }
    let mut px = x;
    let mut py = y;
    let mut tx = px >> TILESHIFT;
    let mut ty = py >> TILESHIFT;

    for _ in 0..MAX_TRACE_STEPS {
        let (ctx, cty, cx, cy, face) = next_crossing(px, py, tx, ty, dirx, diry)?;
        if level_state.is_solid(ctx, cty) {
            return Some(TraceHit {
                tilex: ctx,
                tiley: cty,
                face,
                edgex: cx,
                edgey: cy,
            });
        }
        px = cx;
        py = cy;
        tx = ctx;
        ty = cty;
    }
    None
}

/// One DDA step: the next tile the ray enters, the crossing point and
/// the face normal it entered through.
fn next_crossing(
    px: i32,
    py: i32,
    tx: i32,
    ty: i32,
    dirx: i32,
    diry: i32,
) -> Option<(i32, i32, i32, i32, DirType)> {
    // boundary coordinates ahead of the ray on each axis
    let vx = if dirx > 0 {
        (tx + 1) << TILESHIFT
    } else {
        tx << TILESHIFT
    };
    let hy = if diry > 0 {
        (ty + 1) << TILESHIFT
    } else {
        ty << TILESHIFT
    };

    if dirx == 0 {
        let cy = hy;
        let nty = if diry > 0 { ty + 1 } else { ty - 1 };
        let face = if diry > 0 { DirType::South } else { DirType::North };
        return Some((tx, nty, px, cy, face));
    }
    if diry == 0 {
        let cx = vx;
        let ntx = if dirx > 0 { tx + 1 } else { tx - 1 };
        let face = if dirx > 0 { DirType::West } else { DirType::East };
        return Some((ntx, ty, cx, py, face));
    }

    let tv = ((vx - px) as i64).abs() * (diry as i64).abs();
    let th = ((hy - py) as i64).abs() * (dirx as i64).abs();

    if tv == th {
        return Some(corner_crossing(tx, ty, vx, hy, dirx, diry));
    }

    if tv < th {
        // vertical wall boundary comes first
        let cy = py + ((vx - px) as i64 * diry as i64 / dirx as i64) as i32;
        let ntx = if dirx > 0 { tx + 1 } else { tx - 1 };
        let face = if dirx > 0 { DirType::West } else { DirType::East };
        Some((ntx, ty, vx, cy, face))
    } else {
        let cx = px + ((hy - py) as i64 * dirx as i64 / diry as i64) as i32;
        let nty = if diry > 0 { ty + 1 } else { ty - 1 };
        let face = if diry > 0 { DirType::South } else { DirType::North };
        Some((tx, nty, cx, hy, face))
    }
}

/// The ray runs exactly through a tile corner. Sample the ray a little
/// past the corner with a halving step to see which neighbor it really
/// enters; a perfectly diagonal ray never resolves and falls back to
/// the most clockwise of the two candidate faces.
fn corner_crossing(
    tx: i32,
    ty: i32,
    vx: i32,
    hy: i32,
    dirx: i32,
    diry: i32,
) -> (i32, i32, i32, i32, DirType) {
    let sx = if dirx > 0 { 1 } else { -1 };
    let sy = if diry > 0 { 1 } else { -1 };

    let adx = (dirx as i64).abs();
    let ady = (diry as i64).abs();
    let major = adx.max(ady);

    let mut step = TILEGLOBAL as i64 / 2;
    for _ in 0..CORNER_ROUNDS {
        let ox = (step * adx / major) as i32 * sx;
        let oy = (step * ady / major) as i32 * sy;
        let stx = (vx + ox) >> TILESHIFT;
        let sty = (hy + oy) >> TILESHIFT;
        let dtx = stx != tx;
        let dty = sty != ty;
        if dtx != dty {
            // crossed on exactly one axis, the corner is resolved
            if dtx {
                let face = if dirx > 0 { DirType::West } else { DirType::East };
                return (tx + sx, ty, vx, hy, face);
            } else {
                let face = if diry > 0 { DirType::South } else { DirType::North };
                return (tx, ty + sy, vx, hy, face);
            }
        }
        step /= 2;
        if step == 0 {
            break;
        }
    }

    // true diagonal: take the most clockwise continuation
    let vertical_first = (dirx > 0) == (diry > 0);
    if vertical_first {
        let face = if dirx > 0 { DirType::West } else { DirType::East };
        (tx + sx, ty, vx, hy, face)
    } else {
        let face = if diry > 0 { DirType::South } else { DirType::North };
        (tx, ty + sy, vx, hy, face)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Face {
    pub tilex: i32,
    pub tiley: i32,
    pub n: DirType,
}

/// End corner of a face in its walk direction.
fn face_end_corner(face: Face) -> (i32, i32) {
    let (cx, cy) = match face.n {
        DirType::South => (face.tilex + 1, face.tiley),
        DirType::East => (face.tilex + 1, face.tiley + 1),
        DirType::North => (face.tilex, face.tiley + 1),
        DirType::West => (face.tilex, face.tiley),
        DirType::NoDir => (face.tilex, face.tiley),
    };
    (cx << TILESHIFT, cy << TILESHIFT)
}

fn front_facing(face: Face, vc: &ViewConsts) -> bool {
    match face.n {
        DirType::South => vc.view_y < face.tiley << TILESHIFT,
        DirType::North => vc.view_y > (face.tiley + 1) << TILESHIFT,
        DirType::East => vc.view_x > (face.tilex + 1) << TILESHIFT,
        DirType::West => vc.view_x < face.tilex << TILESHIFT,
        DirType::NoDir => false,
    }
}

/// Check whether a wall corner is actually visible from the viewer or
/// hidden behind nearer geometry. Returns the nearer hit if there is
/// one.
pub fn back_trace(
    level_state: &LevelState,
    vc: &ViewConsts,
    cornerx: i32,
    cornery: i32,
    face: Face,
) -> Option<TraceHit> {
    let dirx = cornerx.wrapping_sub(vc.view_x);
    let diry = cornery.wrapping_sub(vc.view_y);
    let hit = trace_ray_dir(level_state, vc.view_x, vc.view_y, dirx, diry)?;
    if (hit.tilex, hit.tiley) == (face.tilex, face.tiley) {
        return None;
    }
    let corner_depth = view_depth(vc, cornerx, cornery);
    let hit_depth = view_depth(vc, hit.edgex, hit.edgey);
    if hit_depth + DEPTH_SLACK < corner_depth {
        Some(hit)
    } else {
        None
    }
}

/// Walk the visible wall silhouette from the left screen edge to the
/// right, emitting one span per wall stretch. Spans leave the pen at
/// their right end, so coverage has no gaps and no overlaps by
/// construction. Err means the walk did not terminate and the caller
/// should retry from a slightly different pose.
pub fn follow_walls(
    level_state: &LevelState,
    prj: &ProjectionConfig,
    vc: &ViewConsts,
) -> Result<Vec<WallSpan>, String> {
    let left_angle = (vc.view_angle + prj.half_fov).rem_euclid(crate::def::ANGLES) as usize;
    let dirx = prj.cos(left_angle).to_tc();
    let diry = prj.sin(left_angle).to_tc();

    // the trace starts on the view plane, not at the eye, so a wall
    // grazing the player cannot produce a hit behind the projection
    let ox = vc.view_x.wrapping_add(fixed_mul_tc(prj.prestep, vc.view_cos));
    let oy = vc.view_y.wrapping_add(fixed_mul_tc(prj.prestep, vc.view_sin));
    let first =
        trace_ray_dir(level_state, ox, oy, dirx, diry).ok_or("left edge ray did not resolve")?;

    let mut face = Face {
        tilex: first.tilex,
        tiley: first.tiley,
        n: first.face,
    };
    let mut last_point = (first.edgex, first.edgey);
    let mut spans: Vec<WallSpan> = Vec::new();
    let mut pen: usize = 0;
    // normal of the wall plane the last span belongs to, used to merge
    // faces of one straight wall into a single span
    let mut last_n = DirType::NoDir;

    let mut iterations = 0;
    // only the left FOV edge gets a ray of its own, the right edge is
    // implied by the pen reaching view_width
    while pen < prj.view_width {
        iterations += 1;
        if iterations > MAX_FOLLOW {
            return Err(format!(
                "wall walk stuck after {} iterations at tile ({},{})",
                MAX_FOLLOW, face.tilex, face.tiley
            ));
        }
        if spans.len() >= MAX_WALL_SPANS {
            return Err(format!("more than {} wall spans", MAX_WALL_SPANS));
        }

        let t = rotate_ccw(face.n);
        let (ex, ey) = face_end_corner(face);
        let (sx, eheight) = transform_point(vc, prj, ex, ey);

        if sx > pen as i32 {
            // the corner moves the pen, make sure it is not hidden
            // behind nearer geometry first
            if let Some(hit) = back_trace(level_state, vc, ex, ey, face) {
                face = Face {
                    tilex: hit.tilex,
                    tiley: hit.tiley,
                    n: hit.face,
                };
                last_point = (hit.edgex, hit.edgey);
                continue;
            }

            if front_facing(face, vc) {
                let (sx0, h0) = transform_point(vc, prj, last_point.0, last_point.1);
                let x1 = (sx.min(prj.view_width as i32)) as usize;
                // faces of the virtual ring outside the map carry
                // color 0 and rasterize as background
                let color = level_state.tile_at(face.tilex, face.tiley).unwrap_or(0);
                // a face that continues the previous span's wall plane
                // extends that span instead of starting a new one,
                // height stays exact because 1/depth is linear in
                // screen x along a planar wall
                let merged = match spans.last_mut() {
                    Some(last)
                        if last_n == face.n
                            && last.color == color
                            && last.x1 == pen
                            && last.x1_raw == sx0
                            && last.h1 == h0 =>
                    {
                        last.x1 = x1;
                        last.x1_raw = sx;
                        last.h1 = eheight;
                        true
                    }
                    _ => false,
                };
                if !merged {
                    spans.push(WallSpan {
                        x0: pen,
                        x1,
                        color,
                        x0_raw: sx0,
                        x1_raw: sx,
                        h0,
                        h1: eheight,
                    });
                }
                last_n = face.n;
                pen = x1;
                if pen >= prj.view_width {
                    break;
                }
            }
        }

        // decide where the wall goes at this corner
        let (tox, toy) = dir_offset(t);
        let (nox, noy) = dir_offset(face.n);
        let d_tile = (face.tilex + tox + nox, face.tiley + toy + noy);
        let b_tile = (face.tilex + tox, face.tiley + toy);

        if level_state.is_solid(d_tile.0, d_tile.1) {
            // wall turns toward the viewer
            face = Face {
                tilex: d_tile.0,
                tiley: d_tile.1,
                n: t.opposite(),
            };
            last_point = (ex, ey);
        } else if level_state.is_solid(b_tile.0, b_tile.1) {
            // wall continues straight on
            face = Face {
                tilex: b_tile.0,
                tiley: b_tile.1,
                n: face.n,
            };
            last_point = (ex, ey);
        } else {
            let around = Face {
                tilex: face.tilex,
                tiley: face.tiley,
                n: t,
            };
            if front_facing(around, vc) {
                // convex corner of the same tile
                face = around;
                last_point = (ex, ey);
            } else {
                // silhouette edge, pick up the wall behind the corner
                let rdx = ex.wrapping_sub(vc.view_x);
                let rdy = ey.wrapping_sub(vc.view_y);
                let hit = trace_ray_dir(
                    level_state,
                    ex + (rdx >> 8),
                    ey + (rdy >> 8),
                    rdx,
                    rdy,
                )
                .ok_or("silhouette ray did not resolve")?;
                face = Face {
                    tilex: hit.tilex,
                    tiley: hit.tiley,
                    n: hit.face,
                };
                last_point = (hit.edgex, hit.edgey);
            }
        }
    }

    Ok(spans)
}

/// follow_walls with local recovery: a stuck walk is logged and retried
/// from a nudged pose, a frame that still will not resolve is drawn as
/// background only.
pub fn wall_refresh(
    level_state: &LevelState,
    prj: &ProjectionConfig,
    vc: &ViewConsts,
) -> Vec<WallSpan> {
    let mut local = ViewConsts {
        view_x: vc.view_x,
        view_y: vc.view_y,
        view_angle: vc.view_angle,
        view_cos: vc.view_cos,
        view_sin: vc.view_sin,
    };
    for attempt in 0..4 {
        match follow_walls(level_state, prj, &local) {
            Ok(spans) => return spans,
            Err(err) => {
                warn!(attempt, "wall walk failed: {}", err);
                local.view_x = local
                    .view_x
                    .wrapping_add(fixed_mul_tc(TILEGLOBAL / 8, local.view_cos));
                local.view_y = local
                    .view_y
                    .wrapping_add(fixed_mul_tc(TILEGLOBAL / 8, local.view_sin));
                local.view_angle = (local.view_angle + 1).rem_euclid(crate::def::ANGLES);
                local.view_cos = prj.cos(local.view_angle as usize);
                local.view_sin = prj.sin(local.view_angle as usize);
            }
        }
    }
    warn!("wall walk gave up, drawing background only");
    Vec::new()
}

/// Draw the spans as horizontal scanline runs and leave the per-column
/// wall height behind as the z buffer for the sprite pass.
pub fn rasterize_spans(
    screen: &mut PlanarScreen,
    prj: &ProjectionConfig,
    spans: &[WallSpan],
) -> Vec<i32> {
    let w = prj.view_width;
    let h = prj.view_height;
    let mut wallheight = vec![0i32; w];
    let mut colors = vec![0u8; w];

    for span in spans {
        // background spans leave the base colors showing and keep the
        // z buffer open for sprites
        if span.color == 0 {
            continue;
        }
        for x in span.x0..span.x1 {
            wallheight[x] = span.height_at(x).max(0);
            colors[x] = (span.color & 0xFF) as u8;
        }
    }

    for y in 0..h {
        let mut run_start: Option<usize> = None;
        let mut run_color = 0u8;
        for x in 0..=w {
            let covered = if x < w {
                let wh = wallheight[x].min(h as i32);
                let top = (h as i32 - wh) / 2;
                (y as i32) >= top && (y as i32) < top + wh
            } else {
                false
            };
            match run_start {
                Some(start) => {
                    if !covered || colors[x] != run_color {
                        screen.hlin(start, y, x - start, run_color);
                        run_start = if covered { Some(x) } else { None };
                        if covered {
                            run_color = colors[x];
                        }
                    }
                }
                None => {
                    if covered {
                        run_start = Some(x);
                        run_color = colors[x];
                    }
                }
            }
        }
    }

    wallheight
}

/// Render one frame: background, walls, then sprites against the wall
/// z buffer.
pub fn three_d_refresh(
    screen: &mut PlanarScreen,
    level_state: &mut LevelState,
    _game_state: &GameState,
    prj: &ProjectionConfig,
    shapes: &[Shape],
) {
    screen.bar(0, 0, prj.view_width, prj.view_height / 2, CEILING_COLOR);
    screen.bar(
        0,
        prj.view_height / 2,
        prj.view_width,
        prj.view_height - prj.view_height / 2,
        FLOOR_COLOR,
    );

    let vc = init_view_consts(prj, level_state.player());
    let spans = wall_refresh(level_state, prj, &vc);
    let wallheight = rasterize_spans(screen, prj, &spans);

    draw_sprites(screen, level_state, prj, &vc, shapes, &wallheight);
}
