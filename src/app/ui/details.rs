use eframe::egui::{self, RichText, Ui};

use crate::graph::NodeKind;
use crate::util::{format_expiration, plural, truncate_chars};

use super::super::CookieGraphApp;

const VALUE_PREVIEW_CHARS: usize = 100;

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

impl CookieGraphApp {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.interaction.selected().map(str::to_owned) else {
            ui.label("Click a domain or cookie in the graph.");
            return;
        };

        let Some(node) = self
            .sync
            .simulation()
            .and_then(|simulation| simulation.node(&selected_id))
            .cloned()
        else {
            ui.label("The selected node is no longer in the graph.");
            return;
        };

        let mut delete_domain = None;
        match &node.kind {
            NodeKind::Domain { count } => {
                ui.label(RichText::new(&node.name).strong());
                ui.small("Domain");
                ui.add_space(6.0);
                ui.label(format!("Cookies: {}", plural(*count, "cookie", "cookies")));
                ui.add_space(8.0);

                let button = ui.add_enabled(
                    !self.sync.is_deleting(),
                    egui::Button::new("Delete all cookies for this domain"),
                );
                if button.clicked() {
                    delete_domain = Some(node.name.clone());
                }
            }
            NodeKind::Cookie { cookie } => {
                ui.label(RichText::new(&cookie.name).strong());
                ui.small("Cookie");
                ui.add_space(6.0);

                egui::Grid::new("cookie_details")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        ui.label("Value");
                        ui.label(truncate_chars(&cookie.value, VALUE_PREVIEW_CHARS));
                        ui.end_row();

                        ui.label("Domain");
                        ui.label(&cookie.domain);
                        ui.end_row();

                        ui.label("Path");
                        ui.label(&cookie.path);
                        ui.end_row();

                        ui.label("Secure");
                        ui.label(yes_no(cookie.secure));
                        ui.end_row();

                        ui.label("HttpOnly");
                        ui.label(yes_no(cookie.http_only));
                        ui.end_row();

                        ui.label("Expires");
                        ui.label(format_expiration(cookie.expiration_date));
                        ui.end_row();

                        ui.label("SameSite");
                        ui.label(cookie.same_site.as_deref().unwrap_or("Unspecified"));
                        ui.end_row();
                    });
            }
        }

        ui.add_space(8.0);
        if ui.button("Close").clicked() {
            self.interaction.clear_selection();
        }

        if let Some(domain) = delete_domain {
            self.sync.request_delete_domain(&domain);
        }
    }
}
