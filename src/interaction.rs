use eframe::egui::{Pos2, Vec2};

use crate::physics::ForceSimulation;

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 4.0;
const RESET_SECONDS: f32 = 0.75;
/// Extra pick radius so small nodes stay easy to grab.
const HIT_SLACK: f32 = 4.0;

/// Screen offset of the world origin from the viewport center, and a uniform
/// scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn world_to_screen(self, viewport_center: Pos2, world: Vec2) -> Pos2 {
        viewport_center + self.translate + world * self.scale
    }

    pub fn screen_to_world(self, viewport_center: Pos2, screen: Pos2) -> Vec2 {
        (screen - viewport_center - self.translate) / self.scale
    }

    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            translate: self.translate + (other.translate - self.translate) * t,
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn ease_cubic_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Clone, Copy, Debug)]
struct ResetAnimation {
    from: ViewTransform,
    elapsed: f32,
}

/// A node remembered across rebuilds. Cookie ids are positional, so the
/// layout key is what identifies the node in the next graph.
#[derive(Clone, Debug)]
struct TrackedNode {
    id: String,
    layout_key: String,
}

impl TrackedNode {
    fn of(simulation: &ForceSimulation, id: &str) -> Option<Self> {
        simulation.node(id).map(|node| Self {
            id: node.id.clone(),
            layout_key: node.layout_key(),
        })
    }

    fn relocate(self, simulation: &ForceSimulation) -> Option<Self> {
        simulation
            .node_by_layout_key(&self.layout_key)
            .map(|node| Self {
                id: node.id.clone(),
                layout_key: self.layout_key,
            })
    }
}

#[derive(Clone, Debug)]
struct DragState {
    node: TrackedNode,
    pointer_world: Vec2,
}

/// Pointer-driven state of the graph view: viewport transform, the node
/// being dragged, and the selected node.
#[derive(Debug, Default)]
pub struct InteractionController {
    transform: ViewTransform,
    reset: Option<ResetAnimation>,
    dragged: Option<DragState>,
    selected: Option<TrackedNode>,
}

impl InteractionController {
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.reset = None;
        self.transform.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Multiplies the scale by `factor`, keeping the world point under
    /// `pointer` fixed on screen.
    pub fn zoom_at(&mut self, viewport_center: Pos2, pointer: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        self.reset = None;
        let world_before = self.transform.screen_to_world(viewport_center, pointer);
        self.transform.scale = (self.transform.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.transform.translate =
            pointer - viewport_center - (world_before * self.transform.scale);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.reset = None;
        self.transform.translate += delta;
    }

    /// Starts animating back to the identity transform; see [`Self::advance`].
    pub fn reset_transform(&mut self) {
        if self.transform == ViewTransform::IDENTITY {
            self.reset = None;
            return;
        }

        self.reset = Some(ResetAnimation {
            from: self.transform,
            elapsed: 0.0,
        });
    }

    pub fn is_animating(&self) -> bool {
        self.reset.is_some()
    }

    /// Moves the reset animation forward by `delta_seconds`. Returns whether
    /// it is still running.
    pub fn advance(&mut self, delta_seconds: f32) -> bool {
        let Some(reset) = self.reset.as_mut() else {
            return false;
        };

        reset.elapsed += delta_seconds.max(0.0);
        let progress = (reset.elapsed / RESET_SECONDS).min(1.0);
        if progress >= 1.0 {
            self.transform = ViewTransform::IDENTITY;
            self.reset = None;
            return false;
        }

        self.transform = reset
            .from
            .lerp(ViewTransform::IDENTITY, ease_cubic_in_out(progress));
        true
    }

    /// Pins `node_id` under the pointer and warms the simulation so its
    /// neighbours react.
    pub fn begin_drag(
        &mut self,
        simulation: &mut ForceSimulation,
        node_id: &str,
        pointer_world: Vec2,
    ) -> bool {
        let Some(node) = TrackedNode::of(simulation, node_id) else {
            return false;
        };

        simulation.pin(&node.id, pointer_world);
        simulation.set_alpha_target(simulation.config().reheat_alpha);
        self.dragged = Some(DragState {
            node,
            pointer_world,
        });
        true
    }

    pub fn drag_to(&mut self, simulation: &mut ForceSimulation, pointer_world: Vec2) -> bool {
        match self.dragged.as_mut() {
            Some(drag) => {
                drag.pointer_world = pointer_world;
                simulation.pin(&drag.node.id, pointer_world)
            }
            None => false,
        }
    }

    /// Releases the pin and lets the layout cool down again.
    pub fn end_drag(&mut self, simulation: &mut ForceSimulation) {
        let Some(drag) = self.dragged.take() else {
            return;
        };

        simulation.unpin(&drag.node.id);
        simulation.set_alpha_target(0.0);
    }

    /// Forgets the drag without touching a simulation, for when the graph
    /// view is left mid-drag.
    pub fn cancel_drag(&mut self) {
        self.dragged = None;
    }

    pub fn dragged_node(&self) -> Option<&str> {
        self.dragged.as_ref().map(|drag| drag.node.id.as_str())
    }

    pub fn hit_test(
        &self,
        simulation: &ForceSimulation,
        viewport_center: Pos2,
        pointer: Pos2,
    ) -> Option<String> {
        let world = self.transform.screen_to_world(viewport_center, pointer);
        simulation
            .node_at(world, HIT_SLACK / self.transform.scale)
            .map(|node| node.id.clone())
    }

    pub fn select(&mut self, simulation: &ForceSimulation, node_id: &str) {
        self.selected = TrackedNode::of(simulation, node_id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_ref().map(|node| node.id.as_str())
    }

    /// Clicking a node selects it; clicking empty space clears.
    pub fn click(&mut self, simulation: &ForceSimulation, viewport_center: Pos2, pointer: Pos2) {
        self.selected = self
            .hit_test(simulation, viewport_center, pointer)
            .and_then(|id| TrackedNode::of(simulation, &id));
    }

    /// Re-points the selection and any active drag at the same cookie or
    /// domain in a rebuilt graph. A dragged node that still exists is pinned
    /// under the pointer again; state whose node is gone is dropped.
    pub fn carry_over(&mut self, simulation: Option<&mut ForceSimulation>) {
        let Some(simulation) = simulation else {
            self.dragged = None;
            self.selected = None;
            return;
        };

        self.selected = self
            .selected
            .take()
            .and_then(|node| node.relocate(simulation));

        self.dragged = self.dragged.take().and_then(|drag| {
            let node = drag.node.relocate(simulation)?;
            simulation.pin(&node.id, drag.pointer_world);
            simulation.set_alpha_target(simulation.config().reheat_alpha);
            Some(DragState {
                node,
                pointer_world: drag.pointer_world,
            })
        });
    }
}
