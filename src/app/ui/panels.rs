use eframe::egui::{self, Align, Context, Layout, Ui};

use crate::util::plural;

use super::super::{ActiveView, CookieGraphApp};

impl CookieGraphApp {
    pub(in crate::app) fn draw_top_bar(&mut self, ctx: &Context, requested_view: &mut ActiveView) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("cookie-graph");
                    ui.separator();
                    ui.selectable_value(requested_view, ActiveView::Browser, "Browser");
                    ui.selectable_value(requested_view, ActiveView::CookieGraph, "Cookie graph");

                    if self.view != ActiveView::CookieGraph {
                        return;
                    }

                    ui.separator();
                    let stats = self.sync.stats();
                    ui.label(plural(stats.total_cookies, "cookie", "cookies"));
                    ui.label(plural(stats.total_domains, "domain", "domains"));
                    ui.label(plural(stats.connections, "connection", "connections"));
                    ui.separator();

                    if ui.button("Reset zoom").clicked() {
                        self.interaction.reset_transform();
                    }

                    let reload_button =
                        ui.add_enabled(!self.sync.is_loading(), egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        self.sync.reload();
                    }

                    let clear_button = ui.add_enabled(
                        !self.sync.is_deleting() && stats.total_cookies > 0,
                        egui::Button::new("Clear all cookies"),
                    );
                    if clear_button.clicked() {
                        self.sync.request_delete_all();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.sync.is_loading() || self.sync.is_deleting() {
                            ui.spinner();
                        }
                    });
                });
            });
    }

    pub(in crate::app) fn draw_browser_placeholder(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.heading("Browsing content");
            ui.add_space(8.0);
            ui.label(format!(
                "Cookies are read from {}",
                self.sync.host().path().display()
            ));
            ui.label("Switch to the cookie graph to inspect them.");
        });
    }
}
