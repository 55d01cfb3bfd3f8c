//! # Ghost Networks
//!
//! Time-boxed, isolated, extreme-risk networks generated outside the
//! static graph. A ghost has no backbone connections, carries extreme
//! negative security, and is garbage-collected once its lifetime
//! elapses — players still inside at expiry are forcibly evicted by the
//! owning simulation.

use std::collections::HashMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use blackice_shared::{NetworkId, SimTime, ZoneProfile};

use crate::generator::WorldGenerator;
use crate::network::{Network, Owner, World};
use crate::node_graph::NodeGraph;
use crate::seed::{WorldSeed, PURPOSE_GHOSTS};

/// Ghost spawn/expiry parameters.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct GhostConfig {
    /// Lifetime of one ghost network, ms.
    pub lifetime_ms: u64,
    /// Maximum ghosts alive at once.
    pub max_concurrent: usize,
    /// Chance (0-100) that a sweep with free capacity spawns a ghost.
    pub spawn_chance_pct: u8,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            lifetime_ms: 900_000, // 15 minutes
            max_concurrent: 2,
            spawn_chance_pct: 20,
        }
    }
}

/// Registry of live ghost networks.
pub struct GhostRegistry {
    config: GhostConfig,
    rng: ChaCha8Rng,
    /// network id -> expiry time
    expiries: HashMap<NetworkId, SimTime>,
}

impl GhostRegistry {
    /// Creates the registry with its own RNG stream.
    #[must_use]
    pub fn new(seed: WorldSeed, config: GhostConfig) -> Self {
        Self {
            config,
            rng: seed.derive(PURPOSE_GHOSTS).rng(),
            expiries: HashMap::new(),
        }
    }

    /// Number of ghosts currently alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.expiries.len()
    }

    /// Returns true if the network id is a live ghost.
    #[must_use]
    pub fn is_ghost(&self, id: NetworkId) -> bool {
        self.expiries.contains_key(&id)
    }

    /// Rolls the spawn dice and, on success, inserts a new ghost into
    /// the world. Returns the new network id if one spawned.
    pub fn maybe_spawn(&mut self, world: &mut World, now: SimTime) -> Option<NetworkId> {
        if self.expiries.len() >= self.config.max_concurrent {
            return None;
        }
        if self.rng.gen_range(0..100) >= u32::from(self.config.spawn_chance_pct) {
            return None;
        }
        Some(self.spawn(world, now))
    }

    /// Unconditionally spawns a ghost network.
    pub fn spawn(&mut self, world: &mut World, now: SimTime) -> NetworkId {
        let security = (self.rng.gen_range(-9.9_f32..-8.5) * 10.0).round() / 10.0;
        let profile = ZoneProfile::for_security(security);
        let difficulty = WorldGenerator::difficulty(security);

        let id = world.allocate_network_id();
        let address = loop {
            let candidate = format!(
                "0.{}.{}.{}",
                self.rng.gen_range(1..255),
                self.rng.gen_range(1..255),
                self.rng.gen_range(1..255),
            );
            if !world.address_taken(&candidate) {
                break candidate;
            }
        };

        let network = Network {
            id,
            address,
            name: format!("Ghost Relay {id:04x}"),
            sector: 0,
            cluster: None,
            security,
            zone: profile.zone,
            trace_mult: profile.trace_mult,
            reward_mult: profile.reward_mult,
            // Isolated: no backbone connections, by design.
            links: Vec::new(),
            nodes: NodeGraph::generate(difficulty, profile.reward_mult, &mut self.rng),
            owner: Owner::Npc,
            lockdown_until: None,
        };
        world.insert_network(network);
        self.expiries.insert(id, now + self.config.lifetime_ms);
        id
    }

    /// Removes expired ghosts from the world.
    ///
    /// Returns the ids that collapsed; the caller evicts any players
    /// still inside.
    pub fn sweep(&mut self, world: &mut World, now: SimTime) -> Vec<NetworkId> {
        let mut collapsed: Vec<NetworkId> = self
            .expiries
            .iter()
            .filter(|&(_, &expires)| now >= expires)
            .map(|(&id, _)| id)
            .collect();
        collapsed.sort_unstable();

        for &id in &collapsed {
            self.expiries.remove(&id);
            world.remove_network(id);
        }
        collapsed
    }
}
