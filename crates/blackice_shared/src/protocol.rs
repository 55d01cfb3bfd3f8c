//! # Message Protocol
//!
//! JSON envelopes over a persistent duplex connection. Requests carry
//! `{type, payload, messageId?}`; responses echo `{type, payload}` plus
//! the `messageId` when one was present.
//!
//! The transport layer owns framing and dispatch; the simulation core
//! only sees decoded envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{IntrusionId, NetworkId, NodeId, OrderId};

// =============================================================================
// MESSAGE TYPES - CLIENT -> SERVER
// =============================================================================

/// Probe a network by address.
pub const MSG_SCAN: &str = "SCAN";
/// Open a session against a network.
pub const MSG_CONNECT: &str = "CONNECT";
/// End the current session.
pub const MSG_DISCONNECT: &str = "DISCONNECT";
/// Route to another network over the backbone.
pub const MSG_NAVIGATE: &str = "NAVIGATE";
/// Move between linked nodes inside the connected network.
pub const MSG_MOVE_NODE: &str = "MOVE_NODE";
/// Start a breach attempt against a node's ICE.
pub const MSG_BREACH: &str = "BREACH";
/// Start a crack attempt against a node's password gate.
pub const MSG_CRACK: &str = "CRACK";
/// Harvest resources from a breached node.
pub const MSG_HARVEST: &str = "HARVEST";
/// Download a file from a breached node.
pub const MSG_DOWNLOAD: &str = "DOWNLOAD";
/// List intrusions against the player's networks.
pub const MSG_DEFEND_VIEW: &str = "DEFEND_VIEW";
/// Run a backtrace program against an intrusion.
pub const MSG_DEFEND_BACKTRACE: &str = "DEFEND_BACKTRACE";
/// Run a counter-ICE program against an intrusion.
pub const MSG_DEFEND_COUNTERICE: &str = "DEFEND_COUNTERICE";
/// Lock down a network, terminating all intrusions.
pub const MSG_DEFEND_LOCKDOWN: &str = "DEFEND_LOCKDOWN";
/// Purge undownloaded files on a network.
pub const MSG_DEFEND_PURGE: &str = "DEFEND_PURGE";
/// List market orders.
pub const MSG_MARKET_LIST: &str = "MARKET_LIST";
/// Create a sell order.
pub const MSG_MARKET_SELL: &str = "MARKET_SELL";
/// Buy an order in full.
pub const MSG_MARKET_BUY: &str = "MARKET_BUY";
/// Cancel an own order.
pub const MSG_MARKET_CANCEL: &str = "MARKET_CANCEL";
/// Modify an own order.
pub const MSG_MARKET_MODIFY: &str = "MARKET_MODIFY";
/// List black-market stock and prices.
pub const MSG_BLACKMARKET_LIST: &str = "BLACKMARKET_LIST";
/// Buy one contraband item.
pub const MSG_BLACKMARKET_BUY: &str = "BLACKMARKET_BUY";
/// Sell one contraband item.
pub const MSG_BLACKMARKET_SELL: &str = "BLACKMARKET_SELL";

// =============================================================================
// MESSAGE TYPES - SERVER -> CLIENT (EVENTS)
// =============================================================================

/// A player connected to one of your networks.
pub const EVT_INTRUSION_ALERT: &str = "INTRUSION_ALERT";
/// An intrusion crossed the detection delay.
pub const EVT_INTRUSION_DETECTED: &str = "INTRUSION_DETECTED";
/// A backtrace completed; the attacker's identity is attached.
pub const EVT_ATTACKER_REVEALED: &str = "ATTACKER_REVEALED";
/// Counter-ICE completed; rig damage was applied.
pub const EVT_HARDWARE_DAMAGED: &str = "HARDWARE_DAMAGED";
/// Your session was force-terminated.
pub const EVT_CONNECTION_TERMINATED: &str = "CONNECTION_TERMINATED";
/// Undownloaded files on a network were destroyed.
pub const EVT_FILES_PURGED: &str = "FILES_PURGED";
/// One of your market orders expired and its escrow was returned.
pub const EVT_ORDER_EXPIRED: &str = "ORDER_EXPIRED";
/// The ghost network you were inside collapsed.
pub const EVT_GHOST_COLLAPSED: &str = "GHOST_COLLAPSED";
/// A scheduled breach or crack finished.
pub const EVT_ACTION_COMPLETE: &str = "ACTION_COMPLETE";

// =============================================================================
// ENVELOPE
// =============================================================================

/// A decoded protocol message in either direction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type tag.
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Message payload; shape depends on `msg_type`.
    #[serde(default)]
    pub payload: Value,
    /// Client-chosen correlation id, echoed on the response.
    #[serde(rename = "messageId", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<u64>,
}

impl Envelope {
    /// Builds a response envelope for a request, echoing its correlation id.
    #[must_use]
    pub fn response_to(request: &Self, payload: Value) -> Self {
        Self {
            msg_type: request.msg_type.clone(),
            payload,
            message_id: request.message_id,
        }
    }

    /// Builds a server-originated event envelope.
    #[must_use]
    pub fn event(msg_type: &str, payload: Value) -> Self {
        Self {
            msg_type: msg_type.to_owned(),
            payload,
            message_id: None,
        }
    }
}

/// Inline error payload. All recoverable request failures use this shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorPayload {
    /// Wraps a message into the inline error shape.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

// =============================================================================
// REQUEST PAYLOADS
// =============================================================================

/// Payload of [`MSG_SCAN`] and [`MSG_CONNECT`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetIpRequest {
    /// IP-like address of the target network.
    pub target_ip: String,
}

/// Payload of [`MSG_NAVIGATE`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateRequest {
    /// Destination network id.
    pub target_network_id: NetworkId,
}

/// Payload of node-targeted requests (`MOVE_NODE`, `BREACH`, `CRACK`,
/// `HARVEST`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRequest {
    /// Target node inside the connected network.
    pub node_id: NodeId,
}

/// Payload of [`MSG_DOWNLOAD`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    /// Node holding the file.
    pub node_id: NodeId,
    /// File to download.
    pub file_id: u32,
}

/// Payload of intrusion-targeted defense requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrusionRequest {
    /// Target intrusion id.
    pub intrusion_id: IntrusionId,
}

/// Payload of network-targeted defense requests (`DEFEND_LOCKDOWN`,
/// `DEFEND_PURGE`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequest {
    /// Target network id.
    pub network_id: NetworkId,
}

/// Payload of [`MSG_MARKET_LIST`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketListRequest {
    /// Optional category filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
}

/// Payload of [`MSG_MARKET_SELL`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSellRequest {
    /// Resource to list.
    pub resource_type: String,
    /// Quantity to escrow and list.
    pub amount: u32,
    /// Asking price per unit, in credits.
    pub price_per_unit: u64,
}

/// Payload of [`MSG_MARKET_BUY`] and [`MSG_MARKET_CANCEL`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Target order id.
    pub order_id: OrderId,
}

/// Payload of [`MSG_MARKET_MODIFY`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketModifyRequest {
    /// Target order id.
    pub order_id: OrderId,
    /// New quantity, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_amount: Option<u32>,
    /// New unit price, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_price: Option<u64>,
}

/// Payload of black-market item requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlackMarketItemRequest {
    /// Contraband item identifier.
    pub item_id: String,
}
