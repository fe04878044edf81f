use std::time::Duration;

use eframe::egui::{self, Context};

use crate::cookies::JsonCookieStore;
use crate::interaction::InteractionController;
use crate::physics::SimulationConfig;
use crate::sync::SyncController;

mod graph_view;
mod render_utils;
mod ui;

const IDLE_REPAINT: Duration = Duration::from_millis(200);
const BUSY_REPAINT: Duration = Duration::from_millis(30);

#[derive(Clone, Copy, Debug)]
pub struct AppSettings {
    pub simulation: SimulationConfig,
    pub preserve_layout: bool,
    pub start_in_graph: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ActiveView {
    Browser,
    CookieGraph,
}

pub struct CookieGraphApp {
    sync: SyncController<JsonCookieStore>,
    interaction: InteractionController,
    view: ActiveView,
    search: String,
}

impl CookieGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        store: JsonCookieStore,
        settings: AppSettings,
    ) -> Self {
        let sync = SyncController::new(store, settings.simulation)
            .with_preserved_layout(settings.preserve_layout);
        let mut app = Self {
            sync,
            interaction: InteractionController::default(),
            view: ActiveView::Browser,
            search: String::new(),
        };
        if settings.start_in_graph {
            app.switch_view(ActiveView::CookieGraph);
        }
        app
    }

    fn switch_view(&mut self, view: ActiveView) {
        if self.view == view {
            return;
        }

        self.view = view;
        match view {
            ActiveView::CookieGraph => self.sync.activate(),
            ActiveView::Browser => {
                self.interaction.cancel_drag();
                self.interaction.clear_selection();
                self.sync.deactivate();
            }
        }
    }
}

impl eframe::App for CookieGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let outcome = self.sync.poll();
        if outcome.rebuilt {
            self.interaction.carry_over(self.sync.simulation_mut());
        }

        let mut requested_view = self.view;
        self.draw_top_bar(ctx, &mut requested_view);

        match self.view {
            ActiveView::CookieGraph => {
                egui::SidePanel::left("controls")
                    .resizable(true)
                    .default_width(280.0)
                    .show(ctx, |ui| self.draw_controls(ui));

                egui::SidePanel::right("details")
                    .resizable(true)
                    .default_width(320.0)
                    .show(ctx, |ui| self.draw_details(ui));

                egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
                self.draw_confirmation(ctx);
            }
            ActiveView::Browser => {
                egui::CentralPanel::default().show(ctx, |ui| self.draw_browser_placeholder(ui));
            }
        }

        self.switch_view(requested_view);

        if self.sync.is_loading() || self.sync.is_deleting() {
            ctx.request_repaint_after(BUSY_REPAINT);
        } else if self.sync.is_active() {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }
}

impl Drop for CookieGraphApp {
    fn drop(&mut self) {
        self.sync.deactivate();
    }
}
