use macroquad::prelude::*;
use microbe::simulation::kinds::{AgentKind, CellKind, NutrientKind};
use microbe::simulation::params::Params;
use microbe::simulation::snapshot::{CellView, Snapshot};
use ndarray::Array1;

/// Width reserved for the egui stats panel on the right.
const PANEL_WIDTH: f32 = 300.0;

trait ToScreen {
    type Output;
    fn to_screen(&self, params: &Params) -> Self::Output;
}

fn dish_scale(params: &Params) -> f32 {
    let scale_x = (screen_width() - PANEL_WIDTH).max(1.0) / params.box_width;
    let scale_y = screen_height() / params.box_height;
    scale_x.min(scale_y)
}

impl ToScreen for Array1<f32> {
    type Output = Array1<f32>;
    fn to_screen(&self, params: &Params) -> Array1<f32> {
        let scale = dish_scale(params);
        Array1::from_vec(vec![self[0] * scale, self[1] * scale])
    }
}

impl ToScreen for f32 {
    type Output = f32;
    fn to_screen(&self, params: &Params) -> f32 {
        self * dish_scale(params)
    }
}

fn point(x: f32, y: f32, params: &Params) -> Array1<f32> {
    Array1::from_vec(vec![x, y]).to_screen(params)
}

fn cell_color(kind: CellKind) -> Color {
    match kind {
        CellKind::Coccus => Color::from_rgba(90, 200, 120, 255),
        CellKind::Bacillus => Color::from_rgba(110, 170, 255, 255),
        CellKind::Spirillum => Color::from_rgba(230, 200, 90, 255),
    }
}

fn nutrient_color(kind: NutrientKind) -> Color {
    match kind {
        NutrientKind::Carbohydrate => Color::from_rgba(255, 220, 120, 255),
        NutrientKind::Protein => Color::from_rgba(255, 150, 200, 255),
        NutrientKind::Lipid => Color::from_rgba(190, 130, 255, 255),
    }
}

fn agent_color(kind: AgentKind) -> Color {
    match kind {
        AgentKind::Neutrophil => Color::from_rgba(235, 80, 80, 220),
        AgentKind::Macrophage => Color::from_rgba(200, 90, 40, 200),
        AgentKind::Antibody => Color::from_rgba(255, 120, 220, 230),
    }
}

/// Draws the dish background, nutrients, colony links, cells and immune cells.
pub fn draw_dish(snapshot: &Snapshot, params: &Params) {
    let corner = point(params.box_width, params.box_height, params);
    draw_rectangle(0.0, 0.0, corner[0], corner[1], Color::from_rgba(28, 34, 46, 255));
    draw_rectangle_lines(0.0, 0.0, corner[0], corner[1], 2.0, GRAY);

    for nutrient in &snapshot.nutrients {
        let pos = point(nutrient.x, nutrient.y, params);
        draw_circle(pos[0], pos[1], nutrient.radius.to_screen(params), nutrient_color(nutrient.kind));
    }

    draw_colony_links(snapshot, params);

    for cell in &snapshot.cells {
        draw_cell(cell, params);
    }

    for agent in &snapshot.agents {
        let pos = point(agent.x, agent.y, params);
        let radius = agent.radius.to_screen(params);
        draw_circle(pos[0], pos[1], radius, agent_color(agent.kind));
        if agent.chasing {
            draw_circle_lines(pos[0], pos[1], radius + 2.0, 1.5, RED);
        }
    }
}

fn draw_colony_links(snapshot: &Snapshot, params: &Params) {
    for members in &snapshot.colonies {
        let positions: Vec<Array1<f32>> = members
            .iter()
            .filter_map(|id| snapshot.cells.iter().find(|c| c.id == *id))
            .map(|c| point(c.x, c.y, params))
            .collect();
        for pair in positions.windows(2) {
            draw_line(
                pair[0][0],
                pair[0][1],
                pair[1][0],
                pair[1][1],
                1.0,
                Color::from_rgba(120, 255, 160, 90),
            );
        }
    }
}

fn draw_cell(cell: &CellView, params: &Params) {
    let pos = point(cell.x, cell.y, params);
    let radius = cell.radius.to_screen(params);
    let mut color = cell_color(cell.kind);
    if !cell.alive {
        color = Color::from_rgba(120, 120, 120, 160);
    }
    draw_circle(pos[0], pos[1], radius, color);

    if cell.role == microbe::simulation::cell::CellRole::Player {
        draw_circle_lines(pos[0], pos[1], radius + 2.0, 2.0, WHITE);
    }
    if cell.tagged {
        draw_circle_lines(pos[0], pos[1], radius + 4.0, 1.0, PINK);
    }
    if cell.colony.is_some() {
        draw_circle_lines(pos[0], pos[1], radius, 1.0, Color::from_rgba(120, 255, 160, 200));
    }
}
