//! Force-directed layout with a cooling temperature.
//!
//! Every tick applies pairwise charge, a weak pull toward the canvas center and
//! friction to node velocities, then relaxes each link toward `link_distance`.
//! The temperature (`alpha`) scales all forces and decays every tick; the
//! simulation stops once it drops below `alpha_min` and only restarts on
//! request.

use std::collections::HashMap;

use serde::Deserialize;

use super::model::Graph;
use super::types::NodeId;

const RESTART_ALPHA: f64 = 0.1;
const MIN_DISTANCE_SQ: f64 = 1e-6;

/// Force constants, read from the page config.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
	/// Rest length of every link spring.
	pub link_distance: f64,
	/// How hard links pull toward their rest length, 0 to 1.
	pub link_strength: f64,
	/// Negative values repel.
	pub charge: f64,
	/// Pull toward the canvas center.
	pub gravity: f64,
	/// Velocity kept per tick.
	pub friction: f64,
	/// Fraction of `alpha` lost per tick.
	pub alpha_decay: f64,
	/// The simulation stops below this temperature.
	pub alpha_min: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			link_distance: 350.0,
			link_strength: 1.0,
			charge: -500.0,
			gravity: 0.1,
			friction: 0.9,
			alpha_decay: 0.01,
			alpha_min: 0.005,
		}
	}
}

/// Cooling force simulation over a [`Graph`].
#[derive(Clone, Debug)]
pub struct Simulation {
	/// Force constants.
	pub params: LayoutParams,
	alpha: f64,
	center: (f64, f64),
}

impl Simulation {
	/// Cold simulation centered on a `width` x `height` canvas.
	pub fn new(params: LayoutParams, width: f64, height: f64) -> Self {
		Self {
			params,
			alpha: 0.0,
			center: (width / 2.0, height / 2.0),
		}
	}

	/// Whether ticks still move nodes.
	pub fn is_running(&self) -> bool {
		self.alpha >= self.params.alpha_min
	}

	/// Recenters gravity on the resized canvas.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.center = (width / 2.0, height / 2.0);
	}

	/// Re-energizes the simulation after the node or link set changed.
	pub fn restart(&mut self) {
		self.alpha = RESTART_ALPHA;
	}

	/// Keeps the simulation warm while a node is being dragged.
	pub fn resume(&mut self) {
		self.alpha = self.alpha.max(RESTART_ALPHA);
	}

	/// Advances one step. Returns whether the layout is still running afterwards.
	pub fn tick(&mut self, graph: &mut Graph) -> bool {
		if !self.is_running() {
			return false;
		}
		let alpha = self.alpha;
		self.apply_charge_and_gravity(graph, alpha);
		self.relax_links(graph, alpha);

		self.alpha *= 1.0 - self.params.alpha_decay;
		if self.alpha < self.params.alpha_min {
			self.alpha = 0.0;
			for node in graph.nodes_mut() {
				node.vx = 0.0;
				node.vy = 0.0;
			}
			log::debug!("layout settled");
		}
		self.is_running()
	}

	/// Runs ticks until the layout settles or `max_ticks` is reached. Returns ticks run.
	pub fn run_until_settled(&mut self, graph: &mut Graph, max_ticks: usize) -> usize {
		let mut ticks = 0;
		while ticks < max_ticks && self.tick(graph) {
			ticks += 1;
		}
		ticks
	}

	fn apply_charge_and_gravity(&self, graph: &mut Graph, alpha: f64) {
		let positions: Vec<(NodeId, f64, f64)> = graph.nodes().map(|n| (n.id, n.x, n.y)).collect();
		let charge = self.params.charge;
		let gravity = self.params.gravity * alpha;
		let friction = self.params.friction;
		let (cx, cy) = self.center;

		for (index, node) in graph.nodes_mut().enumerate() {
			if node.fixed {
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}
			let (mut fx, mut fy) = (0.0, 0.0);
			if charge != 0.0 {
				for (other_index, &(other_id, ox, oy)) in positions.iter().enumerate() {
					if other_index == index {
						continue;
					}
					let (mut dx, mut dy) = (ox - node.x, oy - node.y);
					if dx * dx + dy * dy < MIN_DISTANCE_SQ {
						(dx, dy) = nudge(node.id, other_id);
					}
					let d2 = (dx * dx + dy * dy).max(1.0);
					// charge < 0 pushes away from the other node
					let k = alpha * charge / d2;
					fx += dx * k;
					fy += dy * k;
				}
			}
			fx += (cx - node.x) * gravity;
			fy += (cy - node.y) * gravity;

			node.vx = (node.vx + fx) * friction;
			node.vy = (node.vy + fy) * friction;
			node.x += node.vx;
			node.y += node.vy;
		}
	}

	fn relax_links(&self, graph: &mut Graph, alpha: f64) {
		let degrees: HashMap<NodeId, f64> = graph
			.node_ids()
			.map(|id| (id, graph.degree(id) as f64))
			.collect();
		let pairs: Vec<(NodeId, NodeId)> = graph.links().map(|l| (l.source, l.target)).collect();
		let strength = self.params.link_strength * alpha;

		for (source_id, target_id) in pairs {
			let (Some(source), Some(target)) = (graph.node(source_id), graph.node(target_id)) else {
				continue;
			};
			let (sx, sy, s_fixed) = (source.x, source.y, source.fixed);
			let (tx, ty, t_fixed) = (target.x, target.y, target.fixed);
			let (mut dx, mut dy) = (tx - sx, ty - sy);
			let mut distance = (dx * dx + dy * dy).sqrt();
			if distance * distance < MIN_DISTANCE_SQ {
				(dx, dy) = nudge(source_id, target_id);
				distance = 1.0;
			}
			let k = strength * (distance - self.params.link_distance) / distance;
			let (cx, cy) = (dx * k, dy * k);

			let source_degree = degrees.get(&source_id).copied().unwrap_or(1.0);
			let target_degree = degrees.get(&target_id).copied().unwrap_or(1.0);
			let mut bias = source_degree / (source_degree + target_degree);
			match (s_fixed, t_fixed) {
				(true, true) => continue,
				(true, false) => bias = 1.0,
				(false, true) => bias = 0.0,
				(false, false) => {}
			}

			if let Some(target) = graph.node_mut(target_id) {
				target.x -= cx * bias;
				target.y -= cy * bias;
			}
			if let Some(source) = graph.node_mut(source_id) {
				source.x += cx * (1.0 - bias);
				source.y += cy * (1.0 - bias);
			}
		}
	}
}

/// Unit vector from `a` toward `b` for coincident nodes. `nudge(b, a)` points the other way.
fn nudge(a: NodeId, b: NodeId) -> (f64, f64) {
	let (lo, hi, sign) = if a < b { (a, b, 1.0) } else { (b, a, -1.0) };
	let angle = ((lo.0 as f64) * 0.618_034 + (hi.0 as f64) * 0.414_214) * std::f64::consts::TAU;
	(angle.cos() * sign, angle.sin() * sign)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn distance(graph: &Graph, a: NodeId, b: NodeId) -> f64 {
		let (a, b) = (graph.node(a).unwrap(), graph.node(b).unwrap());
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	fn springs_only() -> LayoutParams {
		LayoutParams {
			charge: 0.0,
			gravity: 0.0,
			..LayoutParams::default()
		}
	}

	#[test]
	fn idle_until_restarted() {
		let mut graph = Graph::seeded(0.0, 0.0);
		let mut sim = Simulation::new(LayoutParams::default(), 800.0, 600.0);
		assert!(!sim.tick(&mut graph));
		sim.restart();
		assert!(sim.tick(&mut graph));
	}

	#[test]
	fn settles_and_stops() {
		let mut graph = Graph::seeded(400.0, 300.0);
		let mut sim = Simulation::new(LayoutParams::default(), 800.0, 600.0);
		sim.restart();
		let ticks = sim.run_until_settled(&mut graph, 10_000);
		assert!(ticks > 0 && ticks < 10_000);
		assert!(!sim.is_running());
		assert!(graph.nodes().all(|n| n.vx == 0.0 && n.vy == 0.0));
	}

	#[test]
	fn connected_nodes_converge_to_rest_length() {
		let mut graph = Graph::new();
		let a = graph.add_node(0.0, 0.0);
		let b = graph.add_node(100.0, 0.0);
		graph.add_or_toggle_edge(a, b).unwrap();
		let mut sim = Simulation::new(springs_only(), 0.0, 0.0);
		sim.restart();
		sim.run_until_settled(&mut graph, 10_000);
		assert!((distance(&graph, a, b) - 350.0).abs() < 1.0);
	}

	#[test]
	fn disconnected_nodes_repel() {
		let mut graph = Graph::new();
		let a = graph.add_node(0.0, 0.0);
		let b = graph.add_node(10.0, 0.0);
		let c = graph.add_node(0.0, 0.0);
		let params = LayoutParams {
			gravity: 0.0,
			..LayoutParams::default()
		};
		let mut sim = Simulation::new(params, 0.0, 0.0);
		sim.restart();
		for _ in 0..20 {
			sim.tick(&mut graph);
		}
		assert!(distance(&graph, a, b) > 10.0);
		assert!(distance(&graph, a, c) > 0.01);
	}

	#[test]
	fn fixed_nodes_stay_put_until_released() {
		let mut graph = Graph::new();
		let a = graph.add_node(0.0, 0.0);
		let b = graph.add_node(5.0, 0.0);
		graph.add_or_toggle_edge(a, b).unwrap();
		graph.node_mut(a).unwrap().fixed = true;

		let mut sim = Simulation::new(LayoutParams::default(), 0.0, 0.0);
		sim.restart();
		for _ in 0..30 {
			sim.tick(&mut graph);
		}
		let pinned = graph.node(a).unwrap();
		assert_eq!((pinned.x, pinned.y), (0.0, 0.0));
		assert!(distance(&graph, a, b) > 5.0);

		graph.node_mut(a).unwrap().fixed = false;
		sim.restart();
		sim.tick(&mut graph);
		let released = graph.node(a).unwrap();
		assert_ne!((released.x, released.y), (0.0, 0.0));
	}
}
