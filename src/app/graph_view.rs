use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::{COOKIE_RADIUS, DOMAIN_RADIUS, GraphNode, NodeKind};
use crate::physics::{ForceSimulation, TickStatus};
use crate::sync::NoticeKind;
use crate::util::{plural, truncate_chars};

use super::CookieGraphApp;
use super::render_utils::{
    COOKIE_COLOR, DOMAIN_COLOR, HOVER_COLOR, LINK_COLOR, MATCH_COLOR, SELECTED_COLOR,
    blend_color, circle_visible, dim_color, draw_background, draw_link, edge_visible,
};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn node_matches(matcher: &SkimMatcherV2, node: &GraphNode, query: &str) -> bool {
    if fuzzy_match_score(matcher, &node.name, query).is_some() {
        return true;
    }

    node.cookie_record().is_some_and(|cookie| {
        fuzzy_match_score(matcher, &cookie.domain, query).is_some()
            || fuzzy_match_score(matcher, &cookie.value, query).is_some()
    })
}

fn search_matches(simulation: &ForceSimulation, query: &str) -> Option<HashSet<String>> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let matcher = SkimMatcherV2::default();
    Some(
        simulation
            .graph()
            .nodes
            .iter()
            .filter(|node| node_matches(&matcher, node, query))
            .map(|node| node.id.clone())
            .collect(),
    )
}

fn centered_message(painter: &egui::Painter, rect: Rect, text: &str) {
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(16.0),
        Color32::from_gray(200),
    );
}

impl CookieGraphApp {
    fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let (scroll, pinch) =
            ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
        let factor = if (pinch - 1.0).abs() > f32::EPSILON {
            pinch
        } else if scroll.abs() > f32::EPSILON {
            1.0 + (scroll * 0.0018)
        } else {
            return;
        };

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        self.interaction
            .zoom_at(rect.center(), pointer, factor.clamp(0.85, 1.15));
    }

    /// Primary drag on a node moves the node; anywhere else it pans.
    fn handle_graph_pointer(&mut self, rect: Rect, response: &egui::Response) {
        let center = rect.center();
        let Some(simulation) = self.sync.simulation_mut() else {
            return;
        };

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
            && let Some(node_id) = self.interaction.hit_test(simulation, center, pointer)
        {
            let world = self.interaction.transform().screen_to_world(center, pointer);
            self.interaction.begin_drag(simulation, &node_id, world);
        }

        if response.dragged() {
            let moved = match response.interact_pointer_pos() {
                Some(pointer) if self.interaction.dragged_node().is_some() => {
                    let world = self.interaction.transform().screen_to_world(center, pointer);
                    self.interaction.drag_to(simulation, world)
                }
                _ => false,
            };
            if !moved {
                self.interaction.pan_by(response.drag_delta());
            }
        }

        if response.drag_stopped() {
            self.interaction.end_drag(simulation);
        }

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.interaction.click(simulation, center, pointer);
        }
    }

    fn draw_notice(&mut self, ui: &mut Ui, rect: Rect) {
        let Some(notice) = self.sync.notice().cloned() else {
            return;
        };

        let fill = match notice.kind {
            NoticeKind::Info => Color32::from_rgba_unmultiplied(36, 64, 44, 230),
            NoticeKind::Failure => Color32::from_rgba_unmultiplied(96, 36, 36, 235),
        };
        let banner = Rect::from_min_size(
            Pos2::new(rect.left() + 10.0, rect.bottom() - 44.0),
            vec2((rect.width() - 20.0).max(0.0), 34.0),
        );

        let mut dismissed = false;
        ui.scope_builder(egui::UiBuilder::new().max_rect(banner), |ui| {
            egui::Frame::new()
                .fill(fill)
                .corner_radius(4.0)
                .inner_margin(6.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(Color32::from_gray(240), &notice.message);
                        if ui.small_button("Dismiss").clicked() {
                            dismissed = true;
                        }
                    });
                });
        });

        if dismissed {
            self.sync.dismiss_notice();
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let animating = self.interaction.advance(frame_delta_seconds);
        draw_background(&painter, rect, self.interaction.transform());

        if !self.sync.has_loaded() {
            centered_message(&painter, rect, "Loading cookies...");
            self.draw_notice(ui, rect);
            return;
        }

        if self.sync.simulation().is_none() {
            centered_message(&painter, rect, "No cookies found");
            if animating {
                ui.ctx().request_repaint();
            }
            self.draw_notice(ui, rect);
            return;
        }

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pointer(rect, &response);

        let running = self.sync.tick() == TickStatus::Running;
        if animating || running || response.dragged() {
            ui.ctx().request_repaint();
        }

        let Some(simulation) = self.sync.simulation() else {
            return;
        };
        let frame = simulation.frame();
        let matches = search_matches(simulation, &self.search);
        let search_active = matches.as_ref().is_some_and(|matches| !matches.is_empty());

        let transform = self.interaction.transform();
        let center = rect.center();
        let zoom_sqrt = transform.scale.sqrt();
        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| self.interaction.hit_test(simulation, center, pointer));

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.interaction.dragged_node().is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::PointingHand
                };
            });
        }

        let link_stroke = Stroke::new((1.4 * zoom_sqrt).clamp(0.6, 3.0), LINK_COLOR);
        for link in &frame.links {
            let start = transform.world_to_screen(center, link.source);
            let end = transform.world_to_screen(center, link.target);
            if !edge_visible(rect, start, end, 4.0) {
                continue;
            }

            draw_link(
                &painter,
                start,
                end,
                DOMAIN_RADIUS * transform.scale,
                COOKIE_RADIUS * transform.scale,
                link_stroke,
            );
        }

        let mut selection_animating = false;
        for node in &frame.nodes {
            let position = transform.world_to_screen(center, node.position);
            let radius = node.radius * transform.scale;
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_selected = self.interaction.selected() == Some(node.id.as_str());
            let is_hovered = hovered.as_deref() == Some(node.id.as_str());
            let is_match = matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&node.id));

            let base_color = if node.is_domain {
                DOMAIN_COLOR
            } else {
                COOKIE_COLOR
            };
            let unselected_color = if is_hovered {
                HOVER_COLOR
            } else if is_match {
                blend_color(base_color, MATCH_COLOR, 0.68)
            } else if search_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("cookie-node-selection", node.id.as_str())),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }

            painter.circle_filled(
                position,
                radius,
                blend_color(unselected_color, SELECTED_COLOR, selection_mix),
            );
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if node.pinned { 2.4 } else { 1.5 } + selection_mix,
                    Color32::from_gray(245),
                ),
            );

            let font_size = if node.is_domain { 12.0 } else { 10.0 };
            painter.text(
                position + vec2(0.0, radius + 4.0),
                Align2::CENTER_TOP,
                &node.label,
                FontId::proportional(font_size * zoom_sqrt.clamp(0.7, 1.4)),
                Color32::from_gray(232),
            );
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(node) = hovered.as_deref().and_then(|id| simulation.node(id)) {
            let panel_text = match &node.kind {
                NodeKind::Cookie { cookie } => format!(
                    "{}  |  {}  |  {}",
                    cookie.name,
                    cookie.domain,
                    truncate_chars(&cookie.value, 40)
                ),
                NodeKind::Domain { count } => format!(
                    "{}  |  {}",
                    node.name,
                    plural(*count, "cookie", "cookies")
                ),
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        self.draw_notice(ui, rect);
    }
}
