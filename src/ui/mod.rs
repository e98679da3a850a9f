// UI module - menu, HUD panels and egui plumbing

mod events;
mod hud;
mod menu;
mod stats;

// Re-export the public interface
pub use hud::{UIState, draw_ui, process_egui};
pub use menu::draw_menu_screen;
