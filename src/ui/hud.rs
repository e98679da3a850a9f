use egui_macroquad::egui;
use microbe::simulation::game::Game;
use microbe::simulation::kinds::CellKind;

pub struct UIState {
    pub selected_kind: CellKind,
    pub stats_panel_width: f32,
    pub restart_requested: bool,
    pub menu_requested: bool,
    pub status_message: Option<String>,
}

impl UIState {
    pub fn new(selected_kind: CellKind) -> Self {
        Self {
            selected_kind,
            stats_panel_width: 300.0,
            restart_requested: false,
            menu_requested: false,
            status_message: None,
        }
    }
}

pub fn draw_ui(state: &mut UIState, game: &Game) {
    egui_macroquad::ui(|egui_ctx| {
        // Configure brighter text and UI
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::from_rgb(240, 240, 240));
        visuals.widgets.noninteractive.fg_stroke.color = egui::Color32::from_rgb(220, 220, 220);
        visuals.widgets.inactive.fg_stroke.color = egui::Color32::from_rgb(200, 200, 200);
        visuals.widgets.hovered.fg_stroke.color = egui::Color32::WHITE;
        visuals.widgets.active.fg_stroke.color = egui::Color32::WHITE;
        egui_ctx.set_visuals(visuals);

        super::stats::draw_stats_panel(egui_ctx, state, game);
        super::events::draw_events_panel(egui_ctx, game.event_log());

        if game.is_game_over() {
            draw_game_over(egui_ctx, state, game);
        }
    });
}

fn draw_game_over(egui_ctx: &egui::Context, state: &mut UIState, game: &Game) {
    egui::Window::new("Game Over")
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(-150.0, 0.0))
        .collapsible(false)
        .resizable(false)
        .show(egui_ctx, |ui| {
            ui.label(format!("Score: {:.0}", game.score()));
            ui.label(format!(
                "Final score (incl. surviving children): {:.0}",
                game.final_score()
            ));
            ui.label(format!("Survived {:.1}s", game.time()));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Play again (Space)").clicked() {
                    state.restart_requested = true;
                }
                if ui.button("Choose another bacterium").clicked() {
                    state.menu_requested = true;
                }
            });
        });
}

pub fn process_egui() {
    egui_macroquad::draw();
}
