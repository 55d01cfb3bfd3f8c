//! # World Generator
//!
//! Expands the sector definition table into the full world graph, once
//! per server lifetime.
//!
//! ## Connectivity
//!
//! Each cluster's backbone is built as a random spanning structure:
//! network `i > 0` connects to a uniformly chosen earlier network, which
//! guarantees full connectivity, then `⌊0.3 × n⌋` extra random edges are
//! added for route redundancy (duplicates skipped). Clusters are
//! disjoint subgraphs unless explicitly bridged.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use blackice_shared::{ClusterId, NetworkId, SectorId, ZoneProfile};

use crate::network::{Cluster, Network, Owner, Sector, World};
use crate::node_graph::NodeGraph;
use crate::sector::{SectorDef, SECTOR_DEFS};
use crate::seed::{WorldSeed, PURPOSE_NODES, PURPOSE_TOPOLOGY};

/// Minimum networks per cluster.
const MIN_NETWORKS_PER_CLUSTER: usize = 5;

/// Maximum networks per cluster.
const MAX_NETWORKS_PER_CLUSTER: usize = 14;

/// Redundancy edges added per cluster, as a fraction of network count.
const REDUNDANCY_FACTOR: f32 = 0.3;

/// Builds the static world graph from a seed.
pub struct WorldGenerator {
    seed: WorldSeed,
}

impl WorldGenerator {
    /// Creates a generator for the given seed.
    #[must_use]
    pub const fn new(seed: WorldSeed) -> Self {
        Self { seed }
    }

    /// Derives the node-graph difficulty scalar from a security value.
    ///
    /// Security 10.0 maps to 1, security -10.0 maps to 10.
    #[must_use]
    pub fn difficulty(security: f32) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let d = ((10.0 - security) / 2.0).round().clamp(1.0, 10.0) as u8;
        d
    }

    /// Generates the world.
    ///
    /// Deterministic: the same seed yields the same world.
    #[must_use]
    pub fn generate(&self) -> World {
        let mut topo_rng = self.seed.derive(PURPOSE_TOPOLOGY).rng();
        let mut node_rng = self.seed.derive(PURPOSE_NODES).rng();

        let mut world = World::new();
        let mut next_cluster_id: ClusterId = 0;

        for (sector_idx, def) in SECTOR_DEFS.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let sector_id = sector_idx as SectorId;
            let mut sector = Sector {
                id: sector_id,
                name: def.name.to_owned(),
                zone: def.zone,
                clusters: Vec::new(),
            };

            for _ in 0..def.cluster_count {
                let cluster_id = next_cluster_id;
                next_cluster_id += 1;

                let members = self.generate_cluster(
                    &mut world,
                    def,
                    sector_id,
                    cluster_id,
                    &mut topo_rng,
                    &mut node_rng,
                );
                world.add_cluster(Cluster {
                    id: cluster_id,
                    sector: sector_id,
                    networks: members,
                });
                sector.clusters.push(cluster_id);
            }

            world.add_sector(sector);
        }

        world
    }

    /// Generates one cluster's networks and backbone edges.
    fn generate_cluster(
        &self,
        world: &mut World,
        def: &SectorDef,
        sector_id: SectorId,
        cluster_id: ClusterId,
        topo_rng: &mut ChaCha8Rng,
        node_rng: &mut ChaCha8Rng,
    ) -> Vec<NetworkId> {
        let count = topo_rng.gen_range(MIN_NETWORKS_PER_CLUSTER..=MAX_NETWORKS_PER_CLUSTER);
        let mut members = Vec::with_capacity(count);

        for i in 0..count {
            let (lo, hi) = def.security_range;
            let security = (topo_rng.gen_range(lo..hi) * 10.0).round() / 10.0;
            let profile = ZoneProfile::for_security(security);
            let difficulty = Self::difficulty(security);

            let id = world.allocate_network_id();
            let address = Self::unique_address(world, topo_rng);
            let base_name = def.name_pool[topo_rng.gen_range(0..def.name_pool.len())];

            let network = Network {
                id,
                address,
                name: format!("{base_name} {}-{}", cluster_id, i + 1),
                sector: sector_id,
                cluster: Some(cluster_id),
                security,
                zone: profile.zone,
                trace_mult: profile.trace_mult,
                reward_mult: profile.reward_mult,
                links: Vec::new(),
                nodes: NodeGraph::generate(difficulty, profile.reward_mult, node_rng),
                owner: Owner::Npc,
                lockdown_until: None,
            };
            world.insert_network(network);
            members.push(id);
        }

        Self::connect_backbone(world, &members, topo_rng);
        members
    }

    /// Builds the spanning structure plus redundancy edges.
    fn connect_backbone(world: &mut World, members: &[NetworkId], rng: &mut ChaCha8Rng) {
        // Spanning structure: every network after the first attaches to
        // an earlier one. Full connectivity is guaranteed here.
        for i in 1..members.len() {
            let j = rng.gen_range(0..i);
            Self::add_edge(world, members[i], members[j]);
        }

        // Redundancy edges, skipping self-loops and duplicates.
        #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
        #[allow(clippy::cast_possible_truncation)]
        let extra = (members.len() as f32 * REDUNDANCY_FACTOR).floor() as usize;
        let mut added = 0;
        let mut attempts = 0;
        while added < extra && attempts < extra * 10 {
            attempts += 1;
            let a = members[rng.gen_range(0..members.len())];
            let b = members[rng.gen_range(0..members.len())];
            if a == b {
                continue;
            }
            if world
                .network(a)
                .is_some_and(|n| n.links.contains(&b))
            {
                continue;
            }
            Self::add_edge(world, a, b);
            added += 1;
        }
    }

    fn add_edge(world: &mut World, a: NetworkId, b: NetworkId) {
        if let Some(net) = world.network_mut(a) {
            net.links.push(b);
        }
        if let Some(net) = world.network_mut(b) {
            net.links.push(a);
        }
    }

    /// Rolls IP-like addresses until one is free.
    fn unique_address(world: &World, rng: &mut ChaCha8Rng) -> String {
        loop {
            let address = format!(
                "{}.{}.{}.{}",
                rng.gen_range(10..240),
                rng.gen_range(1..255),
                rng.gen_range(1..255),
                rng.gen_range(1..255),
            );
            if !world.address_taken(&address) {
                return address;
            }
        }
    }
}
