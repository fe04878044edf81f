use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::interaction::ViewTransform;

pub(super) const DOMAIN_COLOR: Color32 = Color32::from_rgb(82, 124, 168);
pub(super) const COOKIE_COLOR: Color32 = Color32::from_rgb(149, 165, 166);
pub(super) const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
pub(super) const HOVER_COLOR: Color32 = Color32::from_rgb(255, 164, 101);
pub(super) const MATCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
pub(super) const LINK_COLOR: Color32 = Color32::from_rgba_premultiplied(120, 128, 138, 150);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * transform.scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + transform.translate;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

/// Draws a link from the rim of the source disc to the rim of the target
/// disc with an arrowhead at the target.
pub(super) fn draw_link(
    painter: &Painter,
    start: Pos2,
    end: Pos2,
    start_radius: f32,
    end_radius: f32,
    stroke: Stroke,
) {
    let delta = end - start;
    let length = delta.length();
    if length <= start_radius + end_radius {
        return;
    }

    let direction = delta / length;
    let from = start + direction * start_radius;
    let tip = end - direction * end_radius;
    painter.line_segment([from, tip], stroke);

    let head = (stroke.width * 4.0).clamp(4.0, 9.0);
    let normal = Vec2::new(-direction.y, direction.x);
    let base = tip - direction * head;
    painter.line_segment([tip, base + normal * (head * 0.5)], stroke);
    painter.line_segment([tip, base - normal * (head * 0.5)], stroke);
}
