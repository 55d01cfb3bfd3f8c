//! # BLACKICE Shared Types
//!
//! Ids, zone classification, resource kinds and the JSON protocol shapes
//! shared between the simulation core and the transport layer.
//!
//! ## Rules
//!
//! - No game logic lives here, only type definitions
//! - Everything serializable here crosses the wire; changes require a
//!   client update

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod ids;
pub mod protocol;
pub mod resources;
pub mod zone;

pub use ids::{ClusterId, IntrusionId, NetworkId, NodeId, OrderId, PlayerId, SectorId, SimTime};
pub use protocol::{Envelope, ErrorPayload};
pub use resources::{ItemType, ResourceKind};
pub use zone::{Zone, ZoneProfile};
