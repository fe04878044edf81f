mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::graph::{CookieGraph, GraphError, GraphNode};
use forces::{
    ChargeParams, CollisionParams, ResolvedLink, accumulate_center_force,
    accumulate_charge_for_node, accumulate_collision_pairs, accumulate_link_forces,
    separation_direction,
};
use quadtree::QuadNode;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub link_distance: f32,
    pub charge_strength: f32,
    pub center: Vec2,
    pub center_strength: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub theta: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Alpha target while a node is dragged, and the starting alpha of a
    /// rebuild seeded from a previous layout.
    pub reheat_alpha: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 100.0,
            charge_strength: -300.0,
            center: Vec2::ZERO,
            center_strength: 0.05,
            collision_padding: 8.0,
            collision_strength: 0.7,
            theta: 0.9,
            velocity_decay: 0.4,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            reheat_alpha: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    /// Alpha fell below its threshold on this tick; ticking has stopped.
    Converged,
    /// Nothing happened: the simulation was already stopped.
    Stopped,
}

/// Positions remembered from a previous build, keyed by layout key.
#[derive(Clone, Debug, Default)]
pub struct PriorLayout {
    positions: HashMap<String, Vec2>,
    centroid: Vec2,
}

impl PriorLayout {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameNode {
    pub id: String,
    pub label: String,
    pub position: Vec2,
    pub radius: f32,
    pub is_domain: bool,
    pub pinned: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLink {
    pub source: Vec2,
    pub target: Vec2,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct GraphFrame {
    pub nodes: Vec<FrameNode>,
    pub links: Vec<FrameLink>,
}

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    radii: Vec<f32>,
}

pub struct ForceSimulation {
    graph: CookieGraph,
    index_by_id: HashMap<String, usize>,
    links: Vec<ResolvedLink>,
    config: SimulationConfig,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    ticks: u64,
    scratch: PhysicsScratch,
}

fn phyllotaxis(index: usize) -> Vec2 {
    let radius = 10.0 * (0.5 + index as f32).sqrt();
    let angle = index as f32 * std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    vec2(angle.cos(), angle.sin()) * radius
}

impl ForceSimulation {
    /// Takes ownership of one build. Fails if any link names a node that is
    /// not in the graph; nothing is ticked in that case.
    pub fn new(mut graph: CookieGraph, config: SimulationConfig) -> Result<Self, GraphError> {
        let mut index_by_id = HashMap::with_capacity(graph.nodes.len());
        for (index, node) in graph.nodes.iter().enumerate() {
            if index_by_id.insert(node.id.clone(), index).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let mut endpoints = Vec::with_capacity(graph.links.len());
        let mut degree = vec![0usize; graph.nodes.len()];
        for link in &graph.links {
            let resolve = |id: &str| {
                index_by_id
                    .get(id)
                    .copied()
                    .ok_or_else(|| GraphError::InvalidGraph {
                        source_id: link.source.clone(),
                        target_id: link.target.clone(),
                        missing: id.to_owned(),
                    })
            };
            let source = resolve(&link.source)?;
            let target = resolve(&link.target)?;
            degree[source] += 1;
            degree[target] += 1;
            endpoints.push((source, target));
        }

        let links = endpoints
            .into_iter()
            .map(|(source, target)| {
                let source_degree = degree[source] as f32;
                let target_degree = degree[target] as f32;
                ResolvedLink {
                    source,
                    target,
                    strength: 1.0 / source_degree.min(target_degree),
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect();

        for (index, node) in graph.nodes.iter_mut().enumerate() {
            node.position = config.center + phyllotaxis(index);
            node.velocity = Vec2::ZERO;
        }

        let running = !graph.nodes.is_empty();
        Ok(Self {
            graph,
            index_by_id,
            links,
            config,
            alpha: 1.0,
            alpha_target: 0.0,
            running,
            ticks: 0,
            scratch: PhysicsScratch::default(),
        })
    }

    /// Places nodes where the previous build had them. Cookies new to this
    /// build start next to their domain, or near the old centroid when the
    /// domain is new too.
    pub fn with_prior_layout(mut self, prior: &PriorLayout) -> Self {
        if prior.is_empty() || self.graph.nodes.is_empty() {
            return self;
        }

        let mut seeded = 0usize;
        let spread = self.config.link_distance * 0.5;
        for (index, node) in self.graph.nodes.iter_mut().enumerate() {
            if let Some(&position) = prior.positions.get(&node.layout_key()) {
                node.position = position;
                seeded += 1;
                continue;
            }

            let anchor = node
                .parent_layout_key()
                .and_then(|key| prior.positions.get(&key).copied());
            node.position = match anchor {
                Some(anchor) => anchor + separation_direction(index, 0) * spread,
                None => prior.centroid + phyllotaxis(index),
            };
        }

        debug!(
            seeded,
            total = self.graph.nodes.len(),
            "seeded layout from previous build"
        );
        self.alpha = self.config.reheat_alpha;
        self
    }

    pub fn prior_layout(&self) -> PriorLayout {
        let positions = self
            .graph
            .nodes
            .iter()
            .map(|node| (node.layout_key(), node.position))
            .collect::<HashMap<_, _>>();
        let centroid = if self.graph.nodes.is_empty() {
            Vec2::ZERO
        } else {
            self.graph
                .nodes
                .iter()
                .fold(Vec2::ZERO, |sum, node| sum + node.position)
                / self.graph.nodes.len() as f32
        };

        PriorLayout {
            positions,
            centroid,
        }
    }

    pub fn graph(&self) -> &CookieGraph {
        &self.graph
    }

    pub fn config(&self) -> SimulationConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SimulationConfig) {
        if self.config == config {
            return;
        }
        self.config = config;
        self.reheat();
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Halts ticking. Calling it again is a no-op.
    pub fn stop(&mut self) {
        if self.running {
            debug!(ticks = self.ticks, alpha = self.alpha, "simulation stopped");
        }
        self.running = false;
    }

    pub fn restart(&mut self) {
        if !self.graph.nodes.is_empty() {
            self.running = true;
        }
    }

    /// Alpha moves toward its target by `alpha_decay` each tick.
    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
        if self.alpha_target >= self.config.alpha_min {
            self.restart();
        }
    }

    fn reheat(&mut self) {
        self.alpha = self.alpha.max(self.config.reheat_alpha);
        self.restart();
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_by_id
            .get(id)
            .and_then(|&index| self.graph.nodes.get(index))
    }

    /// Finds a node by [`GraphNode::layout_key`], which survives rebuilds
    /// where positional ids do not.
    pub fn node_by_layout_key(&self, key: &str) -> Option<&GraphNode> {
        self.graph.nodes.iter().find(|node| node.layout_key() == key)
    }

    /// Holds `id` at `position` until [`Self::unpin`].
    pub fn pin(&mut self, id: &str, position: Vec2) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        let node = &mut self.graph.nodes[index];
        node.pinned = Some(position);
        node.position = position;
        node.velocity = Vec2::ZERO;
        true
    }

    pub fn unpin(&mut self, id: &str) -> bool {
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };
        self.graph.nodes[index].pinned.take().is_some()
    }

    /// Nearest node whose disc (grown by `slack`) covers `point`.
    pub fn node_at(&self, point: Vec2, slack: f32) -> Option<&GraphNode> {
        self.graph
            .nodes
            .iter()
            .filter_map(|node| {
                let distance = (node.position - point).length();
                (distance <= node.radius() + slack).then_some((node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }

    pub fn tick(&mut self) -> TickStatus {
        if !self.running {
            return TickStatus::Stopped;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.ticks += 1;
        self.step();

        if self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min {
            self.running = false;
            debug!(ticks = self.ticks, "simulation converged");
            return TickStatus::Converged;
        }

        TickStatus::Running
    }

    fn step(&mut self) {
        let node_count = self.graph.nodes.len();
        let config = self.config;
        let scratch = &mut self.scratch;

        scratch.forces.clear();
        scratch.forces.resize(node_count, Vec2::ZERO);
        scratch.positions.clear();
        scratch.velocities.clear();
        scratch.radii.clear();
        let mut max_radius = 0.0_f32;
        for node in &self.graph.nodes {
            let radius = node.radius() + config.collision_padding;
            scratch.positions.push(node.position);
            scratch.velocities.push(node.velocity);
            scratch.radii.push(radius);
            max_radius = max_radius.max(radius);
        }

        let forces = &mut scratch.forces;
        let positions = &scratch.positions;
        let radii = &scratch.radii;

        accumulate_link_forces(
            &self.links,
            positions,
            &scratch.velocities,
            config.link_distance,
            forces,
        );

        if node_count > 1
            && let Some(quadtree) = QuadNode::build(positions)
        {
            let charge = ChargeParams {
                strength: config.charge_strength,
                distance_min_sq: 1.0,
                theta: config.theta,
            };
            for (index, force) in forces.iter_mut().enumerate() {
                accumulate_charge_for_node(&quadtree, index, positions, charge, force);
            }

            let reach = max_radius * 2.0;
            accumulate_collision_pairs(
                &quadtree,
                &quadtree,
                true,
                positions,
                radii,
                CollisionParams {
                    strength: config.collision_strength,
                    max_collision_distance_sq: reach * reach,
                },
                forces,
            );
        }

        accumulate_center_force(positions, config.center, config.center_strength, forces);

        let retain = 1.0 - config.velocity_decay;
        for (node, force) in self.graph.nodes.iter_mut().zip(forces.iter()) {
            if let Some(pinned) = node.pinned {
                node.position = pinned;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity = (node.velocity + *force * self.alpha) * retain;
            node.position += node.velocity;
        }
    }

    pub fn frame(&self) -> GraphFrame {
        let nodes = self
            .graph
            .nodes
            .iter()
            .map(|node| FrameNode {
                id: node.id.clone(),
                label: node.display_label(),
                position: node.position,
                radius: node.radius(),
                is_domain: node.is_domain(),
                pinned: node.pinned.is_some(),
            })
            .collect();
        let links = self
            .links
            .iter()
            .map(|link| FrameLink {
                source: self.graph.nodes[link.source].position,
                target: self.graph.nodes[link.target].position,
            })
            .collect();

        GraphFrame { nodes, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::test_cookie;
    use crate::graph::{GraphLink, build_graph};

    fn scenario_graph() -> CookieGraph {
        build_graph(&[
            test_cookie("a", "x.com"),
            test_cookie("b", "x.com"),
            test_cookie("c", "y.com"),
            test_cookie("d", "y.com"),
            test_cookie("e", "z.org"),
        ])
    }

    fn simulation() -> ForceSimulation {
        ForceSimulation::new(scenario_graph(), SimulationConfig::default()).unwrap()
    }

    #[test]
    fn dangling_link_is_an_invalid_graph() {
        let mut graph = scenario_graph();
        graph.links.push(GraphLink {
            source: "domain:missing.com".to_owned(),
            target: "cookie:0".to_owned(),
        });

        let error = ForceSimulation::new(graph, SimulationConfig::default())
            .err()
            .unwrap();
        assert_eq!(
            error,
            GraphError::InvalidGraph {
                source_id: "domain:missing.com".to_owned(),
                target_id: "cookie:0".to_owned(),
                missing: "domain:missing.com".to_owned(),
            }
        );
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let mut graph = scenario_graph();
        let duplicate = graph.nodes[0].clone();
        graph.nodes.push(duplicate);
        assert!(matches!(
            ForceSimulation::new(graph, SimulationConfig::default()),
            Err(GraphError::DuplicateNode(_))
        ));
    }

    #[test]
    fn empty_graph_never_runs() {
        let mut simulation =
            ForceSimulation::new(CookieGraph::default(), SimulationConfig::default()).unwrap();
        assert!(!simulation.is_running());
        assert_eq!(simulation.tick(), TickStatus::Stopped);
        simulation.restart();
        assert!(!simulation.is_running());
    }

    #[test]
    fn alpha_decays_monotonically_until_convergence() {
        let mut simulation = simulation();
        let mut previous = simulation.alpha();
        let mut ticks = 0;

        loop {
            let status = simulation.tick();
            ticks += 1;
            assert!(simulation.alpha() <= previous);
            previous = simulation.alpha();
            if status == TickStatus::Converged {
                break;
            }
            assert_eq!(status, TickStatus::Running);
            assert!(ticks < 1_000, "simulation never converged");
        }

        assert!(simulation.alpha() < simulation.config().alpha_min);
        assert!(!simulation.is_running());
        assert_eq!(simulation.tick(), TickStatus::Stopped);
        assert!((290..=310).contains(&ticks));
    }

    #[test]
    fn stop_is_idempotent_and_freezes_positions() {
        let mut simulation = simulation();
        simulation.tick();
        simulation.stop();
        simulation.stop();

        let before = simulation.frame();
        assert_eq!(simulation.tick(), TickStatus::Stopped);
        assert_eq!(simulation.frame().nodes, before.nodes);
    }

    #[test]
    fn layout_settles_with_links_near_rest_length() {
        let mut simulation = simulation();
        while simulation.tick() == TickStatus::Running {}

        let frame = simulation.frame();
        for link in &frame.links {
            let length = (link.target - link.source).length();
            assert!(length > 30.0 && length < 250.0, "link length {length}");
        }

        for (index, a) in frame.nodes.iter().enumerate() {
            for b in &frame.nodes[index + 1..] {
                assert!((a.position - b.position).length() > 1.0);
            }
        }
    }

    #[test]
    fn identical_builds_lay_out_identically() {
        let mut first = simulation();
        let mut second = simulation();
        for _ in 0..50 {
            first.tick();
            second.tick();
        }
        assert_eq!(first.frame().nodes, second.frame().nodes);
    }

    #[test]
    fn pinned_node_holds_every_tick_then_moves_once_released() {
        let mut simulation = simulation();
        let pin = vec2(250.0, -40.0);
        simulation.set_alpha_target(simulation.config().reheat_alpha);
        assert!(simulation.pin("domain:x.com", pin));

        for _ in 0..40 {
            simulation.tick();
            assert_eq!(simulation.node("domain:x.com").unwrap().position, pin);
        }

        assert!(simulation.unpin("domain:x.com"));
        simulation.set_alpha_target(0.0);
        simulation.tick();
        simulation.tick();

        let node = simulation.node("domain:x.com").unwrap();
        assert!(node.pinned.is_none());
        assert_ne!(node.position, pin);
    }

    #[test]
    fn alpha_target_reheats_a_converged_simulation() {
        let mut simulation = simulation();
        while simulation.tick() == TickStatus::Running {}
        let cold = simulation.alpha();

        simulation.set_alpha_target(0.3);
        assert!(simulation.is_running());
        simulation.tick();
        assert!(simulation.alpha() > cold);
    }

    #[test]
    fn prior_layout_keeps_surviving_nodes_in_place() {
        let mut previous = simulation();
        for _ in 0..100 {
            previous.tick();
        }
        let prior = previous.prior_layout();
        let old_domain = previous.node("domain:y.com").unwrap().position;

        let mut cookies = vec![
            test_cookie("c", "y.com"),
            test_cookie("d", "y.com"),
            test_cookie("f", "y.com"),
        ];
        cookies.push(test_cookie("g", "fresh.net"));
        let next = ForceSimulation::new(build_graph(&cookies), SimulationConfig::default())
            .unwrap()
            .with_prior_layout(&prior);

        assert_eq!(next.node("domain:y.com").unwrap().position, old_domain);
        let old_c = previous.node("cookie:2").unwrap().position;
        assert_eq!(next.node("cookie:0").unwrap().position, old_c);

        let newcomer = next.node("cookie:2").unwrap().position;
        assert!((newcomer - old_domain).length() <= 51.0);
        assert_eq!(next.alpha(), next.config().reheat_alpha);
    }

    #[test]
    fn frame_resolves_link_endpoints() {
        let simulation = simulation();
        let frame = simulation.frame();
        assert_eq!(frame.nodes.len(), 8);
        assert_eq!(frame.links.len(), 5);

        let domain = simulation.node("domain:x.com").unwrap().position;
        let cookie = simulation.node("cookie:0").unwrap().position;
        assert!(frame.links.contains(&FrameLink {
            source: domain,
            target: cookie,
        }));
    }

    #[test]
    fn hit_test_prefers_the_closest_node() {
        let mut simulation = simulation();
        simulation.pin("cookie:4", vec2(1000.0, 1000.0));
        let hit = simulation.node_at(vec2(1004.0, 1000.0), 0.0).unwrap();
        assert_eq!(hit.id, "cookie:4");
        assert!(simulation.node_at(vec2(5000.0, 5000.0), 0.0).is_none());
    }
}
