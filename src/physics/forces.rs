use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

/// Direction used when two nodes sit on the same point. Deterministic so
/// that identical inputs always lay out identically.
pub(super) fn separation_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Negative repels.
    pub(super) strength: f32,
    pub(super) distance_min_sq: f32,
    pub(super) theta: f32,
}

fn charge_between(delta: Vec2, mass: f32, params: ChargeParams) -> Vec2 {
    let distance_sq = delta.length_sq().max(params.distance_min_sq);
    delta * (params.strength * mass / distance_sq)
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }

            let mut delta = positions[other_index] - point;
            if delta.length_sq() <= f32::EPSILON {
                delta = separation_direction(index, other_index);
            }
            *force += charge_between(delta, 1.0, params);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance = delta.length().max(0.0001);
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < params.theta
        && node.mass > 1.0;

    if can_approximate {
        *force += charge_between(delta, node.mass, params);
        return;
    }

    for child in node.children() {
        accumulate_charge_for_node(child, index, positions, params, force);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_collision_distance_sq: f32,
}

fn resolve_collision(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    forces: &mut [Vec2],
) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    let min_distance = radii[from] + radii[to];
    if distance >= min_distance {
        return;
    }

    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        separation_direction(from, to)
    };

    // The smaller node gives way.
    let from_weight = radii[from] * radii[from];
    let to_weight = radii[to] * radii[to];
    let total_weight = (from_weight + to_weight).max(f32::EPSILON);
    let push = direction * (min_distance - distance) * strength;
    forces[from] += push * (to_weight / total_weight);
    forces[to] -= push * (from_weight / total_weight);
}

pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_collision_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_collision(from, to, positions, radii, params.strength, forces);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_collision(from, to, positions, radii, params.strength, forces);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (first, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, forces);
            for child_b in &children[first + 1..] {
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, forces,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, forces);
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, forces);
        }
    }
}

/// A link resolved to node indices, with d3-style degree weighting: the
/// strength is shared out by the busier endpoint and the lighter endpoint
/// does most of the moving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct ResolvedLink {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
    pub(super) bias: f32,
}

pub(super) fn accumulate_link_forces(
    links: &[ResolvedLink],
    positions: &[Vec2],
    velocities: &[Vec2],
    distance: f32,
    forces: &mut [Vec2],
) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target {
            continue;
        }

        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta.length_sq() <= f32::EPSILON {
            delta = separation_direction(source, target) * 0.001;
        }
        let length = delta.length();
        let correction = delta * ((length - distance) / length * link.strength);

        forces[target] -= correction * link.bias;
        forces[source] += correction * (1.0 - link.bias);
    }
}

pub(super) fn accumulate_center_force(
    positions: &[Vec2],
    center: Vec2,
    strength: f32,
    forces: &mut [Vec2],
) {
    if positions.is_empty() || strength <= 0.0 {
        return;
    }

    let centroid = positions.iter().copied().fold(Vec2::ZERO, |sum, p| sum + p)
        / positions.len() as f32;
    let pull = (center - centroid) * strength;
    for force in forces.iter_mut() {
        *force += pull;
    }
}
