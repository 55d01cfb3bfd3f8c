//! # BLACKICE Procedural Generation
//!
//! Builds the static world graph once per server lifetime and answers
//! reachability queries over it.
//!
//! ## Structure
//!
//! ```text
//! Sector ──> Cluster ──> Network ──> Node
//!  (zone)    (connected   (security,  (ICE, files,
//!            subgraph)    backbone)   resources)
//! ```
//!
//! ## Determinism
//!
//! Given the same [`WorldSeed`], generation produces **exactly** the same
//! world on any platform, any time. Every consumer of randomness derives
//! its own sub-stream from the seed so subsystems cannot perturb each
//! other.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod generator;
pub mod ghost;
pub mod network;
pub mod node_graph;
pub mod route;
pub mod sector;
pub mod seed;

pub use generator::WorldGenerator;
pub use ghost::{GhostConfig, GhostRegistry};
pub use network::{Cluster, Network, Owner, Sector, World};
pub use node_graph::{Deposit, FileEntry, Ice, Node, NodeGraph, NodeKind};
pub use route::{find_route, RouteError};
pub use sector::{SectorDef, SECTOR_DEFS};
pub use seed::WorldSeed;
