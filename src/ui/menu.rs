use egui_macroquad::egui;
use macroquad::prelude::*;
use microbe::simulation::kinds::Difficulty;
use microbe::simulation::params::Params;

use super::hud::UIState;

pub fn draw_menu_screen(params: &mut Params, state: &mut UIState) -> bool {
    clear_background(LIGHTGRAY);

    let mut start_game = false;

    egui_macroquad::ui(|egui_ctx| {
        egui::CentralPanel::default().show(egui_ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Microbe - Choose your bacterium");
                ui.add_space(10.0);

                for cfg in &params.cell_kinds {
                    let label = format!(
                        "{}  (speed {:.1}, size {:.0}, growth {:.1}, visibility {:.1}{})",
                        cfg.kind,
                        cfg.speed,
                        cfg.size,
                        cfg.growth_rate,
                        cfg.visibility,
                        if cfg.enzymes.is_empty() {
                            String::new()
                        } else {
                            let enzymes: Vec<String> =
                                cfg.enzymes.iter().map(ToString::to_string).collect();
                            format!(", digests {}", enzymes.join(", "))
                        }
                    );
                    ui.radio_value(&mut state.selected_kind, cfg.kind, label);
                }

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    ui.label("Difficulty:");
                    ui.radio_value(&mut params.difficulty, Difficulty::Easy, "Easy");
                    ui.radio_value(&mut params.difficulty, Difficulty::Normal, "Normal");
                    ui.radio_value(&mut params.difficulty, Difficulty::Hard, "Hard");
                });

                ui.collapsing("Dish Parameters", |ui| {
                    ui.add(
                        egui::Slider::new(&mut params.nutrient_spawn_probability, 0.0..=0.5)
                            .text("Nutrient Spawn Chance"),
                    );
                    ui.add(egui::Slider::new(&mut params.max_nutrients, 5..=200).text("Max Nutrients"));
                    ui.add(
                        egui::Slider::new(&mut params.agent_spawn_probability, 0.0..=0.2)
                            .text("Immune Spawn Chance"),
                    );
                    ui.add(egui::Slider::new(&mut params.max_agents, 0..=50).text("Max Immune Cells"));
                    ui.add(egui::Slider::new(&mut params.max_children, 0..=20).text("Max Children"));
                });

                ui.add_space(20.0);
                ui.separator();
                ui.add_space(10.0);

                if let Some(ref msg) = state.status_message {
                    ui.colored_label(egui::Color32::from_rgb(200, 60, 60), msg);
                }

                ui.horizontal(|ui| {
                    if ui.button("Start").clicked() {
                        start_game = true;
                    }
                    ui.label("WASD or arrow keys to steer");
                });
            });
        });
    });

    egui_macroquad::draw();

    if is_key_pressed(KeyCode::Enter) {
        start_game = true;
    }

    start_game
}
