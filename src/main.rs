use std::path::PathBuf;

use clap::Parser;
use macroquad::prelude::*;
use microbe::simulation::error::ConfigError;
use microbe::simulation::game::Game;
use microbe::simulation::kinds::{CellKind, Difficulty};
use microbe::simulation::params::Params;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod graphics;
mod ui;

/// Steer a bacterium, grow, split and outlast the immune system.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON parameter file; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// easy, normal or hard
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Skip the menu and start with this kind (coccus, bacillus, spirillum)
    #[arg(long)]
    kind: Option<CellKind>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Microbe".to_owned(),
        window_width: 1100,
        window_height: 650,
        ..Default::default()
    }
}

fn load_params(args: &Args) -> Result<Params, ConfigError> {
    let mut params = Params::load_or_default(args.config.as_deref())?;
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    if let Some(difficulty) = args.difficulty {
        params.difficulty = difficulty;
    }
    Ok(params)
}

/// Arrow keys and WASD as a raw `(dx, dy)` heading.
fn read_input() -> (f32, f32) {
    let mut dx = 0.0;
    let mut dy = 0.0;
    if is_key_down(KeyCode::W) || is_key_down(KeyCode::Up) {
        dy -= 1.0;
    }
    if is_key_down(KeyCode::S) || is_key_down(KeyCode::Down) {
        dy += 1.0;
    }
    if is_key_down(KeyCode::A) || is_key_down(KeyCode::Left) {
        dx -= 1.0;
    }
    if is_key_down(KeyCode::D) || is_key_down(KeyCode::Right) {
        dx += 1.0;
    }
    (dx, dy)
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut params = match load_params(&args) {
        Ok(params) => params,
        Err(err) => {
            let path = args.config.as_deref().map(|p| p.display().to_string());
            error!(%err, ?path, "could not load parameters");
            std::process::exit(1);
        }
    };
    let mut ui_state = ui::UIState::new(args.kind.unwrap_or(CellKind::Coccus));
    let mut game: Option<Game> = None;
    let mut pending_start = args.kind.is_some();

    info!("Starting microbe");

    loop {
        if game.is_none() {
            if !pending_start {
                pending_start = ui::draw_menu_screen(&mut params, &mut ui_state);
            }
            if pending_start {
                pending_start = false;
                match Game::new(params.clone()) {
                    Ok(mut new_game) => match new_game.start(ui_state.selected_kind) {
                        Ok(()) => game = Some(new_game),
                        Err(err) => ui_state.status_message = Some(err.to_string()),
                    },
                    Err(err) => {
                        error!(%err, "invalid parameters");
                        ui_state.status_message = Some(err.to_string());
                    }
                }
            }
            next_frame().await;
            continue;
        }

        clear_background(Color::from_rgba(18, 22, 30, 255));

        if let Some(ref mut game) = game {
            if game.is_game_over() {
                if is_key_pressed(KeyCode::Space) {
                    ui_state.restart_requested = true;
                }
            } else {
                let (dx, dy) = read_input();
                game.handle_input(dx, dy);
                game.update(get_frame_time());
            }

            let snapshot = game.snapshot();
            graphics::draw_dish(&snapshot, game.params());
            ui::draw_ui(&mut ui_state, game);
            ui::process_egui();

            if ui_state.restart_requested {
                ui_state.restart_requested = false;
                let kind = game.kind().unwrap_or(ui_state.selected_kind);
                if let Err(err) = game.start(kind) {
                    ui_state.status_message = Some(err.to_string());
                }
            }
        }

        if ui_state.menu_requested {
            ui_state.menu_requested = false;
            game = None;
        }

        next_frame().await
    }
}
