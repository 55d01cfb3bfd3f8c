//! # World Graph Containers
//!
//! Sectors, clusters and networks, plus the [`World`] registry holding
//! the generated graph and its lookup indices.
//!
//! The world is generated once at process start and is structurally
//! immutable afterwards, with two exceptions: ghost networks are
//! inserted/removed at runtime, and per-node state (breach flags, files,
//! deposits) mutates as players act.

use std::collections::HashMap;

use blackice_shared::{ClusterId, NetworkId, PlayerId, SectorId, SimTime, Zone};

use crate::node_graph::NodeGraph;

/// Who owns a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    /// NPC-owned; connecting never creates an intrusion.
    Npc,
    /// Player-owned; connecting creates an intrusion against them.
    Player(PlayerId),
}

/// A static region of the world.
#[derive(Clone, Debug)]
pub struct Sector {
    /// Sector id (position in the definition table).
    pub id: SectorId,
    /// Display name.
    pub name: String,
    /// Zone classification of the sector.
    pub zone: Zone,
    /// Clusters belonging to this sector.
    pub clusters: Vec<ClusterId>,
}

/// A group of networks forming one connected subgraph.
#[derive(Clone, Debug)]
pub struct Cluster {
    /// Cluster id.
    pub id: ClusterId,
    /// Owning sector.
    pub sector: SectorId,
    /// Member networks.
    pub networks: Vec<NetworkId>,
}

/// A node in the inter-network graph.
#[derive(Clone, Debug)]
pub struct Network {
    /// Network id.
    pub id: NetworkId,
    /// IP-like address, unique across the world.
    pub address: String,
    /// Display name.
    pub name: String,
    /// Owning sector.
    pub sector: SectorId,
    /// Owning cluster. Ghost networks carry no cluster.
    pub cluster: Option<ClusterId>,
    /// Security scalar, one decimal place.
    pub security: f32,
    /// Zone derived from the security scalar.
    pub zone: Zone,
    /// Trace-rate multiplier derived from the zone.
    pub trace_mult: f32,
    /// Reward multiplier derived from the zone.
    pub reward_mult: f32,
    /// Backbone connection ids (graph edges).
    pub links: Vec<NetworkId>,
    /// The internal hacking topology.
    pub nodes: NodeGraph,
    /// Current owner.
    pub owner: Owner,
    /// Active lockdown window, if any. New intrusions are rejected
    /// until this time passes.
    pub lockdown_until: Option<SimTime>,
}

impl Network {
    /// Returns true if a lockdown window is active at `now`.
    #[must_use]
    pub fn in_lockdown(&self, now: SimTime) -> bool {
        self.lockdown_until.is_some_and(|until| now < until)
    }
}

/// The generated world: sectors, clusters, networks and lookup indices.
#[derive(Clone, Debug, Default)]
pub struct World {
    sectors: Vec<Sector>,
    clusters: Vec<Cluster>,
    networks: HashMap<NetworkId, Network>,
    by_address: HashMap<String, NetworkId>,
    next_network_id: NetworkId,
}

impl World {
    /// Creates an empty world. Used by the generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next free network id.
    pub fn allocate_network_id(&mut self) -> NetworkId {
        let id = self.next_network_id;
        self.next_network_id += 1;
        id
    }

    /// Registers a sector.
    pub fn add_sector(&mut self, sector: Sector) {
        self.sectors.push(sector);
    }

    /// Registers a cluster.
    pub fn add_cluster(&mut self, cluster: Cluster) {
        self.clusters.push(cluster);
    }

    /// Inserts a network, indexing its address.
    pub fn insert_network(&mut self, network: Network) {
        self.by_address.insert(network.address.clone(), network.id);
        self.networks.insert(network.id, network);
    }

    /// Removes a network (ghost collapse), dropping its address index.
    pub fn remove_network(&mut self, id: NetworkId) -> Option<Network> {
        let network = self.networks.remove(&id)?;
        self.by_address.remove(&network.address);
        Some(network)
    }

    /// Looks up a network by id.
    #[must_use]
    pub fn network(&self, id: NetworkId) -> Option<&Network> {
        self.networks.get(&id)
    }

    /// Looks up a network mutably.
    pub fn network_mut(&mut self, id: NetworkId) -> Option<&mut Network> {
        self.networks.get_mut(&id)
    }

    /// Resolves an address to a network id.
    #[must_use]
    pub fn resolve_address(&self, address: &str) -> Option<NetworkId> {
        self.by_address.get(address).copied()
    }

    /// Returns true if an address is already taken.
    #[must_use]
    pub fn address_taken(&self, address: &str) -> bool {
        self.by_address.contains_key(address)
    }

    /// All sectors.
    #[must_use]
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// All clusters.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Iterates all networks in unspecified order.
    pub fn networks(&self) -> impl Iterator<Item = &Network> {
        self.networks.values()
    }

    /// Number of networks currently registered.
    #[must_use]
    pub fn network_count(&self) -> usize {
        self.networks.len()
    }
}
