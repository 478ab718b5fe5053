use tracing::{error, info};

use crate::assets;
use crate::config::HtConfig;
use crate::def::{new_game_state, PlayState, VIEW_HEIGHT};
use crate::input::{new_scripted_input, ControlInfo};
use crate::loader::Loader;
use crate::play;
use crate::rnd::new_rnd_t;
use crate::scale::build_shape;
use crate::time;
use crate::vid::new_screen;

const RND_SEED: u32 = 0x1234_5678;

/// Number of level files the game ships with.
pub const NUM_LEVELS: usize = 20;

/// Top level driver: load the assets, then run the level sequence
/// until the player dies, aborts or finishes the last level. Asset
/// failures are fatal and come back as the error, annotated below with
/// where the player was when they happened.
pub fn ht_start(
    loader: &dyn Loader,
    config: HtConfig,
    script: Vec<ControlInfo>,
) -> Result<(), String> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| e.to_string())?;
    rt.block_on(run_game(loader, config, script))
}

async fn run_game(
    loader: &dyn Loader,
    config: HtConfig,
    script: Vec<ControlInfo>,
) -> Result<(), String> {
    let graphics = assets::load_all_graphics(loader)?;
    let shapes: Vec<_> = graphics.pics.iter().map(build_shape).collect();

    let prj = play::calc_projection(config.view_width, VIEW_HEIGHT);
    let ticker = time::new_ticker();
    let rnd = new_rnd_t(RND_SEED);
    let mut screen = new_screen();
    let mut input = new_scripted_input(script);

    let mut game_state = new_game_state();

    while game_state.level_on < NUM_LEVELS {
        let mut level_state = match crate::game::setup_game_level(loader, game_state.level_on) {
            Ok(l) => l,
            Err(err) => {
                // annotate the fatal asset error with the last known pose
                error!(
                    level = game_state.level_on,
                    score = game_state.score,
                    "level load failed: {}",
                    err
                );
                return Err(err);
            }
        };

        let result = play::play_loop(
            &ticker,
            &mut level_state,
            &mut game_state,
            &mut screen,
            &prj,
            &shapes,
            &mut input,
            &rnd,
        )
        .await;

        if let Err(err) = result {
            let player = level_state.player();
            error!(
                level = game_state.level_on,
                x = player.x,
                y = player.y,
                angle = player.angle,
                "play loop failed: {}",
                err
            );
            return Err(err);
        }

        match game_state.play_state {
            PlayState::Victory => {
                info!(
                    level = game_state.level_on,
                    score = game_state.score,
                    saved = game_state.refugees_saved,
                    "level complete"
                );
                game_state.level_on += 1;
            }
            PlayState::Dead => {
                info!(score = game_state.score, "the tank is destroyed");
                return Ok(());
            }
            PlayState::Abort => {
                info!("game aborted");
                return Ok(());
            }
            PlayState::StillPlaying => unreachable!("play loop ended while still playing"),
        }
    }

    info!(score = game_state.score, "all levels cleared");
    Ok(())
}
