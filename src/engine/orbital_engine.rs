//! In-thread orbital layout engine.
//!
//! The caller owns the engine and drives it explicitly with `step` or
//! `simulate(steps)`. Each tick applies repulsion (exact or Barnes–Hut),
//! link attraction and center gravity to the velocities, damps them, stops
//! linked nodes from closing past contact, then advances the positions.
//!
//! # Example
//!
//! ```
//! use stardust_orbital::engine::OrbitalEngine;
//! use stardust_orbital::models::{NodeSeed, SimulationSpace};
//! use stardust_orbital::utils::OrbitalConstants;
//!
//! let space = SimulationSpace::new(200.0, 200.0).expect("valid space");
//! let mut engine = OrbitalEngine::new(space, OrbitalConstants::default())
//!     .expect("valid constants");
//! engine.set_state(
//!     vec![
//!         NodeSeed::new("n1").at(0.0, 0.0).with_mass(2.0),
//!         NodeSeed::new("n2").at(100.0, 0.0).with_mass(2.0),
//!     ],
//!     vec![],
//! );
//! engine.simulate(50).expect("simulation failed");
//!
//! let positions = engine.positions();
//! let separation = (positions[1].x - positions[0].x).hypot(positions[1].y - positions[0].y);
//! assert!(separation > 100.0);
//! ```
use std::collections::HashMap;

use log::{debug, info, trace, warn};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::analysis::{find_clusters, find_peripheral, suggest_bridges, BridgeCandidate, Cluster, PeripheralPolicy};
use crate::engine::EngineState;
use crate::forces::{apply_attraction, apply_center_gravity, apply_exact_repulsion, limit_link_closing};
use crate::integrator::{advance_positions, damp_velocities, kinetic_energy};
use crate::mass::{apply_mass_pass, refresh_link_counts};
use crate::models::{EntitySource, Link, NodeId, NodePatch, NodeSeed, OrbitalNode, Position, SimulationSpace};
use crate::protocol::Command;
use crate::spatial::apply_barnes_hut_repulsion;
use crate::utils::{now_ms, OrbitalConstants, OrbitalError, RepulsionMode, DEFAULT_SEED, MIN_MASS};

pub struct OrbitalEngine {
    space: Option<SimulationSpace>,
    constants: OrbitalConstants,
    repulsion: RepulsionMode,
    nodes: Vec<OrbitalNode>,
    links: Vec<Link>,
    index: HashMap<NodeId, usize>,
    state: EngineState,
    rng: StdRng,
    ticks: u64,
}

impl Default for OrbitalEngine {
    fn default() -> Self {
        Self::uninitialized()
    }
}

impl OrbitalEngine {
    /// An engine without a simulation space. Nodes can be loaded, but ticking
    /// fails with `NotInitialized` until `init` is called.
    pub fn uninitialized() -> Self {
        OrbitalEngine {
            space: None,
            constants: OrbitalConstants::default(),
            repulsion: RepulsionMode::default(),
            nodes: Vec::new(),
            links: Vec::new(),
            index: HashMap::new(),
            state: EngineState::Uninitialized,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            ticks: 0,
        }
    }

    /// Creates a ready engine over `space`.
    ///
    /// # Errors
    ///
    /// Returns an error if `constants` fail validation.
    pub fn new(space: SimulationSpace, constants: OrbitalConstants) -> Result<Self, OrbitalError> {
        constants.validate()?;
        let mut engine = Self::uninitialized();
        engine.space = Some(space);
        engine.constants = constants;
        engine.state = EngineState::Ready;
        Ok(engine)
    }

    pub fn with_repulsion(mut self, mode: RepulsionMode) -> Self {
        self.repulsion = mode;
        self
    }

    /// Seeds the placement of nodes that arrive without a position.
    /// Engines start from `DEFAULT_SEED`, so placement is reproducible unless asked otherwise.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Draws the placement seed from the operating system.
    pub fn with_os_seed(mut self) -> Self {
        self.rng = StdRng::from_os_rng();
        self
    }

    /// Sets the simulation space and the force constants.
    ///
    /// Valid in every state and idempotent. Nodes loaded before the first init
    /// are placed now; existing positions are clamped into the new space.
    pub fn init(&mut self, width: f64, height: f64, constants: OrbitalConstants) -> Result<(), OrbitalError> {
        let space = SimulationSpace::new(width, height)?;
        constants.validate()?;
        self.space = Some(space);
        self.constants = constants;
        for i in 0..self.nodes.len() {
            let (x, y) = (self.nodes[i].x, self.nodes[i].y);
            let (x, y) = self.place(finite(x), finite(y));
            self.nodes[i].x = x;
            self.nodes[i].y = y;
            self.nodes[i].radius = constants.radius_for(self.nodes[i].mass);
        }
        if self.state == EngineState::Uninitialized {
            let next = if self.nodes.is_empty() { EngineState::Ready } else { EngineState::Populated };
            self.transition(next);
        }
        debug!("Initialized {}x{} space", width, height);
        Ok(())
    }

    /// Replaces every node and link, then runs the mass/decay pass.
    pub fn set_state(&mut self, nodes: Vec<NodeSeed>, links: Vec<Link>) {
        self.set_state_at(nodes, links, now_ms());
    }

    /// `set_state` with an explicit clock, in epoch milliseconds.
    pub fn set_state_at(&mut self, nodes: Vec<NodeSeed>, links: Vec<Link>, now: i64) {
        self.nodes.clear();
        self.index.clear();
        for seed in nodes {
            self.upsert(seed, now);
        }
        self.links = links.into_iter().map(Link::normalized).collect();
        self.refresh(now);
        self.mark_populated();
        debug!("Loaded {} nodes and {} links", self.nodes.len(), self.links.len());
    }

    /// Loads the full node/link set from a note source.
    pub fn load_from(&mut self, source: &impl EntitySource) {
        let seeds = source.notes().iter().map(NodeSeed::from).collect();
        self.set_state(seeds, source.links());
    }

    /// Adds new nodes and patches existing ones.
    ///
    /// Only new nodes receive a random position (unless the patch has one).
    pub fn update_nodes(&mut self, patches: Vec<NodePatch>) {
        self.update_nodes_at(patches, now_ms());
    }

    pub fn update_nodes_at(&mut self, patches: Vec<NodePatch>, now: i64) {
        let count = patches.len();
        for patch in patches {
            self.upsert(patch, now);
        }
        self.refresh(now);
        self.mark_populated();
        trace!("Applied {} node patches", count);
    }

    /// Adds links, replacing the strength of links joining an already linked pair.
    pub fn update_edges(&mut self, links: Vec<Link>) {
        self.update_edges_at(links, now_ms());
    }

    pub fn update_edges_at(&mut self, links: Vec<Link>, now: i64) {
        for link in links.into_iter().map(Link::normalized) {
            match self.links.iter_mut().find(|l| l.same_pair(&link)) {
                Some(existing) => existing.strength = link.strength,
                None => self.links.push(link),
            }
        }
        self.refresh(now);
    }

    /// Removes nodes and every link touching them. Unknown ids are ignored.
    /// Returns the number of nodes removed.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> usize {
        self.remove_nodes_at(ids, now_ms())
    }

    pub fn remove_nodes_at(&mut self, ids: &[NodeId], now: i64) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| !ids.contains(&n.id));
        self.links.retain(|l| !ids.iter().any(|id| l.touches(id)));
        self.rebuild_index();
        self.refresh(now);
        before - self.nodes.len()
    }

    /// Re-runs the link-count and mass/decay pass against `now`.
    pub fn refresh_masses(&mut self) {
        self.refresh(now_ms());
    }

    pub fn refresh_masses_at(&mut self, now: i64) {
        self.refresh(now);
    }

    /// `Populated -> Running`. Starting a running engine is a no-op.
    pub fn start(&mut self) -> Result<(), OrbitalError> {
        match self.state {
            EngineState::Populated => {
                self.transition(EngineState::Running);
                Ok(())
            }
            EngineState::Running => Ok(()),
            other => Err(OrbitalError::InvalidTransition { from: other.name(), command: "start" }),
        }
    }

    /// `Running -> Populated`. Stopping an engine that is not running is a no-op.
    pub fn stop(&mut self) {
        if self.state == EngineState::Running {
            self.transition(EngineState::Populated);
        }
    }

    /// Drops all nodes and links and returns to `Ready` (or `Uninitialized`).
    pub fn dispose(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.index.clear();
        let next = if self.space.is_some() { EngineState::Ready } else { EngineState::Uninitialized };
        self.transition(next);
    }

    /// Advances the simulation by one tick.
    ///
    /// # Errors
    ///
    /// `NotInitialized` if no simulation space has been set.
    pub fn step(&mut self) -> Result<(), OrbitalError> {
        let space = self.space.ok_or(OrbitalError::NotInitialized)?;
        match self.repulsion {
            RepulsionMode::Exact => apply_exact_repulsion(&mut self.nodes, &self.constants),
            RepulsionMode::BarnesHut => apply_barnes_hut_repulsion(&mut self.nodes, &self.constants),
        }
        apply_attraction(&mut self.nodes, &self.links, &self.index, &self.constants);
        apply_center_gravity(&mut self.nodes, &space, &self.constants);
        damp_velocities(&mut self.nodes, &self.constants);
        limit_link_closing(&mut self.nodes, &self.links, &self.index, &self.constants);
        advance_positions(&mut self.nodes, &space, &self.constants);
        self.ticks += 1;
        Ok(())
    }

    /// Runs the simulation for a specified number of steps.
    pub fn simulate(&mut self, steps: usize) -> Result<(), OrbitalError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Applies one protocol command.
    ///
    /// # Errors
    ///
    /// Invalid dimensions or constants on `INIT`, and `START_SIMULATION` outside
    /// `Populated`/`Running`.
    pub fn apply(&mut self, command: Command) -> Result<(), OrbitalError> {
        match command {
            Command::Init(payload) => {
                let constants = payload.config.apply_to(self.constants);
                self.init(payload.width, payload.height, constants)
            }
            Command::SetInitialState(payload) => {
                self.set_state(payload.nodes, payload.links);
                Ok(())
            }
            Command::UpdateNodes(patches) => {
                self.update_nodes(patches);
                Ok(())
            }
            Command::UpdateLinks(links) => {
                self.update_edges(links);
                Ok(())
            }
            Command::RemoveNodes(payload) => {
                self.remove_nodes(&payload.ids);
                Ok(())
            }
            Command::StartSimulation => self.start(),
            Command::StopSimulation => {
                self.stop();
                Ok(())
            }
        }
    }

    pub fn positions(&self) -> Vec<Position> {
        self.nodes.iter().map(OrbitalNode::position).collect()
    }

    pub fn nodes(&self) -> &[OrbitalNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&OrbitalNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn space(&self) -> Option<SimulationSpace> {
        self.space
    }

    pub fn constants(&self) -> &OrbitalConstants {
        &self.constants
    }

    pub fn repulsion_mode(&self) -> RepulsionMode {
        self.repulsion
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn kinetic_energy(&self) -> f64 {
        kinetic_energy(&self.nodes)
    }

    /// True when no node moves faster than `speed_threshold`.
    pub fn is_settled(&self, speed_threshold: f64) -> bool {
        let limit = speed_threshold * speed_threshold;
        self.nodes.iter().all(|n| n.speed_squared() <= limit)
    }

    pub fn clusters(&self, threshold: f64) -> Vec<Cluster> {
        find_clusters(&self.nodes, &self.links, threshold)
    }

    pub fn bridges(&self, clusters: &[Cluster], top_n: usize) -> Vec<BridgeCandidate> {
        suggest_bridges(&self.nodes, &self.links, clusters, top_n)
    }

    pub fn peripheral(&self, policy: PeripheralPolicy) -> Result<Vec<NodeId>, OrbitalError> {
        find_peripheral(&self.nodes, policy)
    }

    fn upsert(&mut self, seed: NodeSeed, now: i64) {
        match self.index.get(&seed.id) {
            Some(&i) => {
                let (x, y) = match (seed.x, seed.y) {
                    (None, None) => (self.nodes[i].x, self.nodes[i].y),
                    (x, y) => self.place(x.or(finite(self.nodes[i].x)), y.or(finite(self.nodes[i].y))),
                };
                let node = &mut self.nodes[i];
                node.x = x;
                node.y = y;
                if let Some(mass) = seed.mass {
                    node.pinned_mass = Some(mass);
                }
                if let Some(links_count) = seed.links_count {
                    node.links_count = links_count;
                    node.pinned_links = true;
                }
                if let Some(access_count) = seed.access_count {
                    node.access_count = access_count;
                }
                if let Some(last_accessed) = seed.last_accessed {
                    node.last_accessed = last_accessed;
                }
            }
            None => {
                let (x, y) = self.place(seed.x, seed.y);
                let mut node = OrbitalNode::new(seed.id, x, y, MIN_MASS);
                node.pinned_mass = seed.mass;
                node.pinned_links = seed.links_count.is_some();
                node.links_count = seed.links_count.unwrap_or(0);
                node.access_count = seed.access_count.unwrap_or(0);
                node.last_accessed = seed.last_accessed.unwrap_or(now);
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Resolves a coordinate pair inside the space, drawing missing ones at random.
    /// Without a space, missing coordinates stay NaN until `init` places them.
    fn place(&mut self, x: Option<f64>, y: Option<f64>) -> (f64, f64) {
        match self.space {
            Some(space) => {
                let x = x.filter(|v| v.is_finite()).unwrap_or_else(|| self.rng.random_range(0.0..=space.width));
                let y = y.filter(|v| v.is_finite()).unwrap_or_else(|| self.rng.random_range(0.0..=space.height));
                space.clamp(x, y)
            }
            None => (x.unwrap_or(f64::NAN), y.unwrap_or(f64::NAN)),
        }
    }

    fn refresh(&mut self, now: i64) {
        refresh_link_counts(&mut self.nodes, &self.links, &self.index);
        apply_mass_pass(&mut self.nodes, &self.constants, now);
    }

    fn rebuild_index(&mut self) {
        self.index = self.nodes.iter().enumerate().map(|(i, n)| (n.id.clone(), i)).collect();
    }

    fn mark_populated(&mut self) {
        if self.state == EngineState::Ready && !self.nodes.is_empty() {
            self.transition(EngineState::Populated);
        }
    }

    fn transition(&mut self, next: EngineState) {
        if next == self.state {
            return;
        }
        info!("Engine {} -> {}", self.state.name(), next.name());
        if next == EngineState::Running && self.nodes.is_empty() {
            warn!("Running with an empty node set");
        }
        self.state = next;
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
