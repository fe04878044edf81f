use eframe::egui::{self, Align2, Context};

use super::super::CookieGraphApp;

impl CookieGraphApp {
    pub(in crate::app) fn draw_confirmation(&mut self, ctx: &Context) {
        let Some(prompt) = self.sync.pending_confirmation().map(|action| action.prompt()) else {
            return;
        };

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Confirm")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(prompt);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    confirmed = ui.button("Delete").clicked();
                    cancelled = ui.button("Cancel").clicked();
                });
            });

        if ctx.input(|input| input.key_pressed(egui::Key::Escape)) {
            cancelled = true;
        }

        if confirmed {
            self.sync.confirm();
        } else if cancelled {
            self.sync.cancel_confirmation();
        }
    }
}
