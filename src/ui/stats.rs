use egui_macroquad::egui;
use egui_plot::{Line, Plot, PlotPoints};
use microbe::simulation::game::Game;
use std::collections::VecDeque;

use super::hud::UIState;

pub(super) fn draw_stats_panel(egui_ctx: &egui::Context, state: &mut UIState, game: &Game) {
    egui::SidePanel::right("stats_panel")
        .default_width(state.stats_panel_width)
        .resizable(false)
        .show(egui_ctx, |ui| {
            ui.heading("Dish");
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("🔄 Restart").clicked() {
                    state.restart_requested = true;
                }
                if ui.button("☰ Menu").clicked() {
                    state.menu_requested = true;
                }
            });

            if let Some(ref msg) = state.status_message {
                ui.label(msg);
            }

            ui.separator();

            let world = game.world();
            ui.label(format!("Score: {:.0}", game.score()));
            ui.label(format!("Time: {:.1}s", game.time()));
            if let Some(player) = game.player() {
                ui.label(format!("Kind: {}", player.kind));
                ui.label(format!("Energy: {:.1}", player.energy));
                ui.label(format!("Size: {:.1}", player.size));
                if player.tagged {
                    ui.colored_label(egui::Color32::from_rgb(255, 120, 220), "Tagged!");
                }
            }
            ui.label(format!(
                "Children: {}/{}",
                world.child_count(),
                game.params().max_children
            ));
            ui.label(format!("Colonies: {}", world.colonies.len()));
            ui.label(format!(
                "Nutrients: {}/{}",
                world.nutrients.len(),
                game.params().max_nutrients
            ));
            ui.label(format!(
                "Immune cells: {}/{}",
                world.agents.len(),
                game.params().max_agents
            ));

            ui.separator();

            let stats = game.stats();
            ui.collapsing("Run Statistics", |ui| {
                ui.label(format!("Nutrients eaten: {}", stats.nutrients_consumed));
                ui.label(format!("Splits: {}", stats.splits));
                ui.label(format!("Colonies formed: {}", stats.colonies_formed));
                ui.label(format!("Colonies dissolved: {}", stats.colonies_dissolved));
                ui.label(format!("Cells lost: {}", stats.cells_lost));
                ui.label(format!("Immune cells met: {}", stats.agents_spawned));
                ui.label(format!("Peak size: {:.1}", stats.peak_player_size));
            });

            ui.separator();
            ui.label("Score");
            draw_plot(ui, "score_plot", &stats.score_history, "Time", "Score");
            ui.label("Friendly cells");
            draw_plot(
                ui,
                "population_plot",
                &stats.population_history,
                "Time",
                "Cells",
            );
        });
}

fn draw_plot(
    ui: &mut egui::Ui,
    id: &str,
    data: &VecDeque<(f64, f64)>,
    x_label: &str,
    y_label: &str,
) {
    if data.is_empty() {
        ui.label("Collecting data...");
        return;
    }

    let points: PlotPoints = data.iter().map(|&(x, y)| [x, y]).collect();
    let line = Line::new(points);

    Plot::new(id)
        .height(120.0)
        .show_axes([true, true])
        .label_formatter(|_name, value| {
            format!("{}: {:.1}\n{}: {:.2}", x_label, value.x, y_label, value.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}
