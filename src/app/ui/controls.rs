use eframe::egui::{self, Ui};

use super::super::CookieGraphApp;

const LINK_DISTANCE_RANGE: std::ops::RangeInclusive<f32> = 30.0..=300.0;
const CHARGE_STRENGTH_RANGE: std::ops::RangeInclusive<f32> = -1000.0..=-10.0;

impl CookieGraphApp {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.add_space(6.0);

        let stats = self.sync.stats();
        ui.label(format!("Total cookies: {}", stats.total_cookies));
        ui.label(format!("Total domains: {}", stats.total_domains));
        ui.label(format!("Connections: {}", stats.connections));
        if let Some(simulation) = self.sync.simulation() {
            ui.small(format!(
                "alpha {:.3}  |  {} ticks",
                simulation.alpha(),
                simulation.ticks()
            ));
        }

        ui.separator();
        ui.label("Search");
        let search_response = ui.text_edit_singleline(&mut self.search);
        if search_response.changed() {
            ui.ctx().request_repaint();
        }
        if !self.search.is_empty() && ui.small_button("Clear search").clicked() {
            self.search.clear();
        }

        ui.separator();
        ui.collapsing("Forces", |ui| {
            let mut config = self.sync.config();
            let mut changed = false;

            changed |= ui
                .add(
                    egui::Slider::new(&mut config.link_distance, LINK_DISTANCE_RANGE)
                        .text("Link distance")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Resting length of every domain to cookie link.")
                .changed();

            changed |= ui
                .add(
                    egui::Slider::new(&mut config.charge_strength, CHARGE_STRENGTH_RANGE)
                        .text("Charge")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("How strongly nodes push away from each other.")
                .changed();

            if ui.button("Restore defaults").clicked() {
                let defaults = crate::physics::SimulationConfig::default();
                config.link_distance = defaults.link_distance;
                config.charge_strength = defaults.charge_strength;
                changed = true;
            }

            if changed {
                self.sync.set_config(config);
                ui.ctx().request_repaint();
            }
        });
    }
}
