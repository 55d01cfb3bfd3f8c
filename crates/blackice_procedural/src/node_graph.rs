//! # Intra-Network Node Topology
//!
//! The hacking surface reachable after connecting to a network: a chain
//! of nodes guarded by ICE, with bonus high-value nodes appended on
//! harder networks.
//!
//! ## Invariants
//!
//! - Exactly one gateway node per network, always pre-breached
//! - The graph is connected: the chain is linked in order and every
//!   bonus node is append-connected to an existing node

use blackice_shared::{NodeId, ResourceKind};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Node type inside a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Entry point. Exactly one per network, pre-breached.
    Gateway,
    /// Barrier node, usually ICE-guarded.
    Firewall,
    /// File and data storage.
    Database,
    /// High-value storage behind the chain.
    Vault,
    /// Compute node, harvestable for CPU cycles.
    ProcessingCore,
    /// Bonus node on hard networks, harvestable for zero-days.
    ResearchLab,
    /// Bonus node on the hardest networks, extreme rewards.
    QuantumCore,
}

impl NodeKind {
    /// Returns the wire identifier for this node type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Firewall => "firewall",
            Self::Database => "database",
            Self::Vault => "vault",
            Self::ProcessingCore => "processing_core",
            Self::ResearchLab => "research_lab",
            Self::QuantumCore => "quantum_core",
        }
    }
}

/// ICE guarding a node. Tagged variants, no ad hoc shape merging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ice {
    /// Plain barrier: a breach attempt must exceed `strength`.
    Sentry {
        /// Breach threshold.
        strength: u32,
    },
    /// Accelerates trace accrual while unbreached.
    Tracker {
        /// Breach threshold.
        strength: u32,
        /// Additive trace-rate boost while active.
        trace_boost: f32,
    },
    /// Damages the attacker's rig on failed breach attempts.
    Black {
        /// Breach threshold.
        strength: u32,
        /// Rig damage dealt on a failed breach.
        feedback_damage: u32,
    },
}

impl Ice {
    /// Breach threshold of this ICE.
    #[must_use]
    pub const fn strength(&self) -> u32 {
        match self {
            Self::Sentry { strength }
            | Self::Tracker { strength, .. }
            | Self::Black { strength, .. } => *strength,
        }
    }

    /// Trace-rate boost contributed while this ICE is unbreached.
    #[must_use]
    pub const fn trace_boost(&self) -> f32 {
        match self {
            Self::Tracker { trace_boost, .. } => *trace_boost,
            Self::Sentry { .. } | Self::Black { .. } => 0.0,
        }
    }
}

/// A file stored on a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// File id, unique within the network.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Size in kilobytes (affects download time on the client side).
    pub size_kb: u32,
    /// Whether the current attacker already downloaded it.
    pub downloaded: bool,
    /// Whether a purge counter-measure destroyed it.
    pub corrupted: bool,
}

/// A harvestable resource deposit on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deposit {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Remaining harvestable amount.
    pub amount: u32,
}

/// A node in the intra-network graph.
#[derive(Clone, Debug)]
pub struct Node {
    /// Node id, unique within the network.
    pub id: NodeId,
    /// Node type.
    pub kind: NodeKind,
    /// ICE guarding this node, if any.
    pub ice: Option<Ice>,
    /// Whether a password gate blocks this node after breach.
    pub password_gate: bool,
    /// Whether the ICE gate has been cleared.
    pub breached: bool,
    /// Whether the password gate has been cleared.
    pub cracked: bool,
    /// Files stored here.
    pub files: Vec<FileEntry>,
    /// Harvestable deposits.
    pub deposits: Vec<Deposit>,
    /// Adjacent node ids.
    pub links: Vec<NodeId>,
}

impl Node {
    /// Returns true if the node's gates are fully cleared.
    ///
    /// A node without a password gate only needs the breach.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.breached && (!self.password_gate || self.cracked)
    }
}

/// File name pool for generated databases and vaults.
const FILE_NAMES: &[&str] = &[
    "payroll_archive.db",
    "ledger_export.enc",
    "keycard_schematics.cad",
    "employee_manifest.csv",
    "prototype_firmware.bin",
    "cold_wallet_shards.dat",
    "surveillance_logs.tar",
    "contract_blacklist.txt",
];

/// The node graph of one network.
#[derive(Clone, Debug, Default)]
pub struct NodeGraph {
    nodes: Vec<Node>,
}

impl NodeGraph {
    /// Generates a node graph for the given difficulty.
    ///
    /// `difficulty` is 1..=10 (derived from security); `reward_mult`
    /// scales deposit sizes. The graph is a chain from the gateway with
    /// bonus nodes appended on hard networks.
    #[must_use]
    pub fn generate(difficulty: u8, reward_mult: f32, rng: &mut ChaCha8Rng) -> Self {
        let difficulty = difficulty.clamp(1, 10);
        let chain_len = 3 + usize::from(difficulty / 2) + rng.gen_range(0..=2);

        let mut graph = Self { nodes: Vec::new() };

        // Gateway is always node 0 and always open.
        graph.push_node(NodeKind::Gateway, None, false);
        graph.nodes[0].breached = true;

        for i in 1..chain_len {
            let kind = if i == chain_len - 1 && difficulty >= 3 {
                NodeKind::Vault
            } else {
                match rng.gen_range(0..3) {
                    0 => NodeKind::Firewall,
                    1 => NodeKind::Database,
                    _ => NodeKind::ProcessingCore,
                }
            };
            let ice = Self::roll_ice(kind, difficulty, rng);
            let id = graph.push_node(kind, ice, false);
            graph.link(id - 1, id);
        }

        // One password gate on a mid-chain node for difficulty 4+.
        if difficulty >= 4 && chain_len > 2 {
            let idx = rng.gen_range(1..chain_len as NodeId);
            graph.nodes[idx as usize].password_gate = true;
        }

        // Bonus nodes are append-connected so the graph stays connected
        // and the gateway remains the unique entry.
        if difficulty >= 6 {
            let attach = rng.gen_range(1..graph.nodes.len() as NodeId);
            let id = graph.push_node(
                NodeKind::ResearchLab,
                Self::roll_ice(NodeKind::ResearchLab, difficulty, rng),
                false,
            );
            graph.link(attach, id);
        }
        if difficulty >= 8 {
            let attach = rng.gen_range(1..graph.nodes.len() as NodeId);
            let id = graph.push_node(
                NodeKind::QuantumCore,
                Self::roll_ice(NodeKind::QuantumCore, difficulty, rng),
                false,
            );
            graph.link(attach, id);
        }

        graph.populate_loot(reward_mult, rng);
        graph
    }

    /// Rolls ICE for a node. Strength scales with difficulty.
    fn roll_ice(kind: NodeKind, difficulty: u8, rng: &mut ChaCha8Rng) -> Option<Ice> {
        let guarded = match kind {
            NodeKind::Gateway => false,
            NodeKind::Firewall | NodeKind::Vault | NodeKind::QuantumCore => true,
            NodeKind::Database | NodeKind::ProcessingCore | NodeKind::ResearchLab => {
                rng.gen_range(0..10) < i32::from(difficulty)
            }
        };
        if !guarded {
            return None;
        }

        let strength = u32::from(difficulty) * 10 + rng.gen_range(0..10);
        Some(match rng.gen_range(0..6) {
            0 | 1 if difficulty >= 3 => Ice::Tracker {
                strength,
                trace_boost: 0.25 * f32::from(difficulty),
            },
            2 if difficulty >= 6 => Ice::Black {
                strength,
                feedback_damage: 5 + u32::from(difficulty),
            },
            _ => Ice::Sentry { strength },
        })
    }

    /// Places deposits and files on storage nodes.
    fn populate_loot(&mut self, reward_mult: f32, rng: &mut ChaCha8Rng) {
        let mut next_file_id = 0;
        for node in &mut self.nodes {
            let (kind, base) = match node.kind {
                NodeKind::Database => (ResourceKind::DataPackets, 40),
                NodeKind::ProcessingCore => (ResourceKind::CpuCycles, 60),
                NodeKind::Vault => (ResourceKind::Bandwidth, 30),
                NodeKind::ResearchLab | NodeKind::QuantumCore => (ResourceKind::ZeroDays, 2),
                NodeKind::Gateway | NodeKind::Firewall => continue,
            };
            let spread = rng.gen_range(0..=base / 2);
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let amount = ((base + spread) as f32 * reward_mult).round() as u32;
            node.deposits.push(Deposit { kind, amount });

            if matches!(node.kind, NodeKind::Database | NodeKind::Vault) {
                let count = rng.gen_range(1..=3);
                for _ in 0..count {
                    let name = FILE_NAMES[rng.gen_range(0..FILE_NAMES.len())];
                    node.files.push(FileEntry {
                        id: next_file_id,
                        name: name.to_owned(),
                        size_kb: rng.gen_range(64..4096),
                        downloaded: false,
                        corrupted: false,
                    });
                    next_file_id += 1;
                }
            }
        }
    }

    fn push_node(&mut self, kind: NodeKind, ice: Option<Ice>, password_gate: bool) -> NodeId {
        #[allow(clippy::cast_possible_truncation)]
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            id,
            kind,
            ice,
            password_gate,
            breached: false,
            cracked: false,
            files: Vec::new(),
            deposits: Vec::new(),
            links: Vec::new(),
        });
        id
    }

    fn link(&mut self, a: NodeId, b: NodeId) {
        self.nodes[a as usize].links.push(b);
        self.nodes[b as usize].links.push(a);
    }

    /// Returns the gateway node id (always 0).
    #[must_use]
    pub const fn gateway_id(&self) -> NodeId {
        0
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Looks up a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    /// Iterates all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Iterates all nodes mutably.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of ICE-guarded nodes.
    #[must_use]
    pub fn ice_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.ice.is_some()).count()
    }
}
