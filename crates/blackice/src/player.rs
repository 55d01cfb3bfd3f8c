//! # Player Records
//!
//! Registry entries for connected and offline players. The market
//! [`Account`] embedded here is the single ledger every escrow and
//! payout flows through.

use blackice_market::Account;
use blackice_shared::{IntrusionId, NetworkId, NodeId, PlayerId};

/// An open session against one network.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// The connected network.
    pub network: NetworkId,
    /// The node the player currently occupies.
    pub current_node: NodeId,
    /// The intrusion record this session created, if the target had a
    /// non-NPC owner.
    pub intrusion: Option<IntrusionId>,
}

/// A player known to the simulation.
#[derive(Clone, Debug)]
pub struct Player {
    /// Player id.
    pub id: PlayerId,
    /// Display handle.
    pub handle: String,
    /// The player's own address, shown to defenders by reveal programs.
    pub address: String,
    /// Whether the player is currently connected to the server.
    pub online: bool,
    /// Credits, resources and gear.
    pub account: Account,
    /// Rig integrity; counter-ICE chips away at it.
    pub rig_integrity: u32,
    /// The network this player owns and calls home.
    pub home_network: NetworkId,
    /// Current position on the backbone graph.
    pub location: NetworkId,
    /// Open session, if connected to a network.
    pub session: Option<Session>,
}

impl Player {
    /// Applies rig damage, saturating at zero.
    pub fn damage_rig(&mut self, damage: u32) -> u32 {
        self.rig_integrity = self.rig_integrity.saturating_sub(damage);
        self.rig_integrity
    }
}
