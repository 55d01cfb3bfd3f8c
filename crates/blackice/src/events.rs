//! # Outbound Event Bus
//!
//! Server-originated notifications flow from the simulation to the
//! transport layer over a bounded channel. The simulation never blocks
//! on a slow consumer: if the channel is full the event is dropped with
//! a warning.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde_json::{json, Value};
use tracing::warn;

use blackice_shared::protocol::{self, Envelope};
use blackice_shared::{IntrusionId, NetworkId, NodeId, OrderId, PlayerId};

/// Default channel capacity.
pub const EVENT_CHANNEL_CAPACITY: usize = 1_024;

/// Server-originated events, each addressed to one player.
#[derive(Clone, Debug)]
pub enum OutboundEvent {
    /// Someone connected to one of your networks (sent immediately on
    /// connect, separately from the delayed detection alert).
    IntrusionAlert {
        /// Recipient (the defender).
        defender: PlayerId,
        /// Your network under intrusion.
        network: NetworkId,
        /// Intrusion id for defense programs.
        intrusion: IntrusionId,
    },
    /// An intrusion crossed the detection delay.
    IntrusionDetected {
        /// Recipient (the defender).
        defender: PlayerId,
        /// Your network under intrusion.
        network: NetworkId,
        /// Intrusion id.
        intrusion: IntrusionId,
        /// The attacker's current node — never their history.
        attacker_node: NodeId,
    },
    /// A backtrace completed.
    AttackerRevealed {
        /// Recipient (the defender).
        defender: PlayerId,
        /// Intrusion id.
        intrusion: IntrusionId,
        /// The attacker's player id.
        attacker: PlayerId,
        /// The attacker's address.
        attacker_address: String,
    },
    /// Counter-ICE hit your rig.
    HardwareDamaged {
        /// Recipient (the attacker).
        player: PlayerId,
        /// Damage applied.
        damage: u32,
        /// Remaining rig integrity.
        integrity: u32,
    },
    /// Your session was force-terminated.
    ConnectionTerminated {
        /// Recipient.
        player: PlayerId,
        /// The network you were thrown off.
        network: NetworkId,
        /// Human-readable reason.
        reason: &'static str,
    },
    /// Undownloaded files on your target were destroyed.
    FilesPurged {
        /// Recipient (the defender who ran the purge).
        defender: PlayerId,
        /// The purged network.
        network: NetworkId,
        /// How many files were corrupted.
        corrupted: usize,
    },
    /// One of your market orders expired; its escrow came back.
    OrderExpired {
        /// Recipient (the originator).
        player: PlayerId,
        /// The expired order.
        order: OrderId,
    },
    /// The ghost network you were inside collapsed.
    GhostCollapsed {
        /// Recipient.
        player: PlayerId,
        /// The collapsed network.
        network: NetworkId,
    },
    /// A scheduled breach or crack finished.
    ActionComplete {
        /// Recipient.
        player: PlayerId,
        /// Network the action ran in.
        network: NetworkId,
        /// Node the action targeted.
        node: NodeId,
        /// `"breach"` or `"crack"`.
        action: &'static str,
    },
}

impl OutboundEvent {
    /// The player this event is addressed to.
    #[must_use]
    pub const fn recipient(&self) -> PlayerId {
        match *self {
            Self::IntrusionAlert { defender, .. }
            | Self::IntrusionDetected { defender, .. }
            | Self::AttackerRevealed { defender, .. }
            | Self::FilesPurged { defender, .. } => defender,
            Self::HardwareDamaged { player, .. }
            | Self::ConnectionTerminated { player, .. }
            | Self::OrderExpired { player, .. }
            | Self::GhostCollapsed { player, .. }
            | Self::ActionComplete { player, .. } => player,
        }
    }

    /// Protocol message type for this event.
    #[must_use]
    pub const fn msg_type(&self) -> &'static str {
        match self {
            Self::IntrusionAlert { .. } => protocol::EVT_INTRUSION_ALERT,
            Self::IntrusionDetected { .. } => protocol::EVT_INTRUSION_DETECTED,
            Self::AttackerRevealed { .. } => protocol::EVT_ATTACKER_REVEALED,
            Self::HardwareDamaged { .. } => protocol::EVT_HARDWARE_DAMAGED,
            Self::ConnectionTerminated { .. } => protocol::EVT_CONNECTION_TERMINATED,
            Self::FilesPurged { .. } => protocol::EVT_FILES_PURGED,
            Self::OrderExpired { .. } => protocol::EVT_ORDER_EXPIRED,
            Self::GhostCollapsed { .. } => protocol::EVT_GHOST_COLLAPSED,
            Self::ActionComplete { .. } => protocol::EVT_ACTION_COMPLETE,
        }
    }

    /// Builds the wire payload.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::IntrusionAlert {
                network, intrusion, ..
            } => json!({"networkId": network, "intrusionId": intrusion}),
            Self::IntrusionDetected {
                network,
                intrusion,
                attacker_node,
                ..
            } => json!({
                "networkId": network,
                "intrusionId": intrusion,
                "attackerNode": attacker_node,
            }),
            Self::AttackerRevealed {
                intrusion,
                attacker,
                attacker_address,
                ..
            } => json!({
                "intrusionId": intrusion,
                "attackerId": attacker,
                "attackerIp": attacker_address,
            }),
            Self::HardwareDamaged {
                damage, integrity, ..
            } => json!({"damage": damage, "integrity": integrity}),
            Self::ConnectionTerminated {
                network, reason, ..
            } => json!({"networkId": network, "reason": reason}),
            Self::FilesPurged {
                network, corrupted, ..
            } => json!({"networkId": network, "corrupted": corrupted}),
            Self::OrderExpired { order, .. } => json!({"orderId": order}),
            Self::GhostCollapsed { network, .. } => json!({"networkId": network}),
            Self::ActionComplete {
                network,
                node,
                action,
                ..
            } => json!({"networkId": network, "nodeId": node, "action": action}),
        }
    }

    /// Wraps the event into a protocol envelope.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        Envelope::event(self.msg_type(), self.payload())
    }
}

/// The simulation side of the event channel.
pub struct EventBus {
    sender: Sender<OutboundEvent>,
}

impl EventBus {
    /// Creates a bus and its consuming end.
    #[must_use]
    pub fn channel() -> (Self, Receiver<OutboundEvent>) {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    /// Creates a bus with a specific capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, Receiver<OutboundEvent>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, receiver)
    }

    /// Emits an event without blocking. A full channel drops the event
    /// with a warning; a disconnected consumer is silent (transport is
    /// shutting down).
    pub fn emit(&self, event: OutboundEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(
                    recipient = event.recipient(),
                    msg_type = event.msg_type(),
                    "event channel full, dropping event"
                );
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_route_to_recipient() {
        let (bus, receiver) = EventBus::channel();
        bus.emit(OutboundEvent::OrderExpired {
            player: 42,
            order: 7,
        });
        let event = receiver.try_recv().unwrap();
        assert_eq!(event.recipient(), 42);
        assert_eq!(event.msg_type(), protocol::EVT_ORDER_EXPIRED);
        assert_eq!(event.payload(), json!({"orderId": 7}));

        let envelope = event.envelope();
        assert_eq!(envelope.msg_type, protocol::EVT_ORDER_EXPIRED);
        assert_eq!(envelope.message_id, None);
    }

    #[test]
    fn test_full_channel_drops_not_blocks() {
        let (bus, receiver) = EventBus::with_capacity(1);
        for _ in 0..10 {
            bus.emit(OutboundEvent::GhostCollapsed {
                player: 1,
                network: 2,
            });
        }
        // Exactly one made it through; the rest were dropped silently.
        assert!(receiver.try_recv().is_ok());
        assert!(receiver.try_recv().is_err());
    }
}
