//! # Message Handlers
//!
//! The protocol surface of the simulation: one synchronous handler per
//! message type, invoked by the transport layer. Every recoverable
//! failure is returned inline as `{error: message}`; the process never
//! terminates on one and never logs it as a failure.
//!
//! An unparseable message is logged at warn level and dropped without a
//! response — the connection stays open.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::warn;

use blackice_intrusion::{IntrusionError, Program};
use blackice_market::{MarketError, ReturnedEscrow};
use blackice_procedural::{find_route, Network, Owner};
use blackice_shared::protocol::{self, Envelope, ErrorPayload};
use blackice_shared::{IntrusionId, ItemType, NetworkId, PlayerId, ResourceKind, SimTime};

use crate::state::{ActionKind, GameState, PendingAction};
use crate::{events::OutboundEvent, player::Session};

/// Dispatches one inbound envelope.
///
/// Returns `None` for messages that are dropped (unknown type, bad
/// payload, unknown player) — the caller sends nothing back.
pub fn handle_message(
    state: &mut GameState,
    player_id: PlayerId,
    request: &Envelope,
    now: SimTime,
) -> Option<Envelope> {
    if !state.players.contains_key(&player_id) {
        warn!(player = player_id, "message from unknown player dropped");
        return None;
    }

    let payload = match request.msg_type.as_str() {
        protocol::MSG_SCAN => scan(state, &parse(request)?),
        protocol::MSG_CONNECT => connect(state, player_id, &parse(request)?, now),
        protocol::MSG_DISCONNECT => disconnect(state, player_id),
        protocol::MSG_NAVIGATE => navigate(state, player_id, &parse(request)?),
        protocol::MSG_MOVE_NODE => move_node(state, player_id, &parse(request)?),
        protocol::MSG_BREACH => schedule_action(state, player_id, &parse(request)?, ActionKind::Breach, now),
        protocol::MSG_CRACK => schedule_action(state, player_id, &parse(request)?, ActionKind::Crack, now),
        protocol::MSG_HARVEST => harvest(state, player_id, &parse(request)?),
        protocol::MSG_DOWNLOAD => download(state, player_id, &parse(request)?),
        protocol::MSG_DEFEND_VIEW => defend_view(state, player_id),
        protocol::MSG_DEFEND_BACKTRACE => {
            let req: protocol::IntrusionRequest = parse(request)?;
            apply_defense(state, player_id, req.intrusion_id, Program::Backtrace, now)
        }
        protocol::MSG_DEFEND_COUNTERICE => {
            let req: protocol::IntrusionRequest = parse(request)?;
            apply_defense(state, player_id, req.intrusion_id, Program::CounterIce, now)
        }
        protocol::MSG_DEFEND_LOCKDOWN => {
            let req: protocol::NetworkRequest = parse(request)?;
            network_defense(state, player_id, req.network_id, Program::Lockdown, now)
        }
        protocol::MSG_DEFEND_PURGE => {
            let req: protocol::NetworkRequest = parse(request)?;
            network_defense(state, player_id, req.network_id, Program::Purge, now)
        }
        protocol::MSG_MARKET_LIST => market_list(state, player_id, &parse(request)?),
        protocol::MSG_MARKET_SELL => market_sell(state, player_id, &parse(request)?, now),
        protocol::MSG_MARKET_BUY => market_buy(state, player_id, &parse(request)?),
        protocol::MSG_MARKET_CANCEL => market_cancel(state, player_id, &parse(request)?),
        protocol::MSG_MARKET_MODIFY => market_modify(state, player_id, &parse(request)?, now),
        protocol::MSG_BLACKMARKET_LIST => blackmarket_list(state),
        protocol::MSG_BLACKMARKET_BUY => blackmarket_buy(state, player_id, &parse(request)?),
        protocol::MSG_BLACKMARKET_SELL => blackmarket_sell(state, player_id, &parse(request)?),
        other => {
            warn!(msg_type = other, "unknown message type dropped");
            return None;
        }
    };
    Some(Envelope::response_to(request, payload))
}

/// Decodes a payload, dropping the message on mismatch. An absent
/// payload decodes like an empty object so field-less requests work.
fn parse<T: DeserializeOwned>(request: &Envelope) -> Option<T> {
    let raw = if request.payload.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        request.payload.clone()
    };
    match serde_json::from_value(raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(msg_type = %request.msg_type, %error, "unparseable payload dropped");
            None
        }
    }
}

/// The inline error shape shared by all handlers.
fn error_payload(message: &str) -> Value {
    json!(ErrorPayload::new(message))
}

/// Network view sent with CONNECT responses.
fn network_view(network: &Network) -> Value {
    let nodes: Vec<Value> = network
        .nodes
        .nodes()
        .map(|node| {
            json!({
                "id": node.id,
                "type": node.kind.name(),
                "breached": node.breached,
                "hasIce": node.ice.is_some(),
                "passwordGate": node.password_gate,
                "cracked": node.cracked,
                "links": node.links,
            })
        })
        .collect();
    json!({
        "id": network.id,
        "address": network.address,
        "name": network.name,
        "zone": network.zone.name(),
        "security": network.security,
        "nodes": nodes,
    })
}

// =============================================================================
// WORLD & SESSION HANDLERS
// =============================================================================

fn scan(state: &GameState, req: &protocol::TargetIpRequest) -> Value {
    let Some(network) = state
        .world
        .resolve_address(&req.target_ip)
        .and_then(|id| state.world.network(id))
    else {
        return error_payload("Network not found");
    };
    let owner = match network.owner {
        Owner::Npc => "NPC".to_owned(),
        Owner::Player(id) => state
            .players
            .get(&id)
            .map_or_else(|| "unknown".to_owned(), |p| p.handle.clone()),
    };
    json!({
        "owner": owner,
        "securityRating": network.security,
        "nodeCount": network.nodes.len(),
        "iceCount": network.nodes.ice_count(),
    })
}

fn connect(
    state: &mut GameState,
    player_id: PlayerId,
    req: &protocol::TargetIpRequest,
    now: SimTime,
) -> Value {
    let Some(network_id) = state.world.resolve_address(&req.target_ip) else {
        return error_payload("Network not found");
    };
    let (has_session, attacker_address) = match state.players.get(&player_id) {
        Some(p) => (p.session.is_some(), p.address.clone()),
        None => return error_payload("Unknown player"),
    };
    if has_session {
        return error_payload("Already connected to a network");
    }

    let Some(network) = state.world.network(network_id) else {
        return error_payload("Network not found");
    };
    if network.in_lockdown(now) {
        return error_payload(&IntrusionError::NetworkLockdown.to_string());
    }

    let gateway = network.nodes.gateway_id();
    let view = network_view(network);
    let owner = network.owner;
    // Trace progress itself is owned by the player connection; the
    // core only hands out the derived rate.
    let trace_rate = state.intrusions.trace_rate(network);

    let mut intrusion = None;
    let mut defender_online = false;
    if let Owner::Player(defender) = owner {
        if defender != player_id {
            // Non-NPC target: open the intrusion and alert the owner
            // immediately if they are online (separately from the
            // delayed detection alert).
            match state
                .intrusions
                .open(network, player_id, attacker_address, now)
            {
                Ok(record) => intrusion = Some(record.id),
                Err(error) => return error_payload(&error.to_string()),
            }
            defender_online = state.players.get(&defender).map_or(false, |p| p.online);
            if defender_online {
                state.events.emit(OutboundEvent::IntrusionAlert {
                    defender,
                    network: network_id,
                    intrusion: intrusion.unwrap_or_default(),
                });
            }
        }
    }

    if let Some(player) = state.players.get_mut(&player_id) {
        player.session = Some(Session {
            network: network_id,
            current_node: gateway,
            intrusion,
        });
    }
    json!({
        "success": true,
        "network": view,
        "defenderOnline": defender_online,
        "traceRate": trace_rate,
    })
}

fn disconnect(state: &mut GameState, player_id: PlayerId) -> Value {
    if state.disconnect_session(player_id) {
        json!({ "disconnected": true })
    } else {
        error_payload("Not connected to any network")
    }
}

fn navigate(state: &mut GameState, player_id: PlayerId, req: &protocol::NavigateRequest) -> Value {
    let Some(location) = state.players.get(&player_id).map(|p| p.location) else {
        return error_payload("Unknown player");
    };
    let route = match find_route(&state.world, location, req.target_network_id) {
        Ok(route) => route,
        Err(error) => return error_payload(&error.to_string()),
    };
    let jumps = route.len() - 1;

    if let Some(player) = state.players.get_mut(&player_id) {
        player.location = req.target_network_id;
    }
    let current = state
        .world
        .network(req.target_network_id)
        .map_or(Value::Null, |network| {
            json!({
                "id": network.id,
                "address": network.address,
                "name": network.name,
                "zone": network.zone.name(),
                "security": network.security,
            })
        });
    json!({
        "route": route,
        "jumps": jumps,
        "location": req.target_network_id,
        "currentNetwork": current,
    })
}

/// Looks up the caller's open session or returns the standard error.
fn require_session(state: &GameState, player_id: PlayerId) -> Result<Session, Value> {
    state
        .players
        .get(&player_id)
        .and_then(|p| p.session)
        .ok_or_else(|| error_payload("Not connected to any network"))
}

fn move_node(state: &mut GameState, player_id: PlayerId, req: &protocol::NodeRequest) -> Value {
    let session = match require_session(state, player_id) {
        Ok(session) => session,
        Err(error) => return error,
    };
    let Some(network) = state.world.network(session.network) else {
        return error_payload("Network not found");
    };
    let Some(target) = network.nodes.node(req.node_id) else {
        return error_payload("Node not found");
    };
    let Some(current) = network.nodes.node(session.current_node) else {
        return error_payload("Node not found");
    };
    if !current.links.contains(&req.node_id) {
        return error_payload("Node is not adjacent");
    }
    if !target.breached {
        return error_payload("Node is not breached");
    }
    if target.password_gate && !target.cracked {
        return error_payload("Password gate is locked");
    }

    if let Some(player) = state.players.get_mut(&player_id) {
        if let Some(session) = player.session.as_mut() {
            session.current_node = req.node_id;
        }
    }
    if let Some(intrusion) = session.intrusion {
        state.intrusions.set_current_node(intrusion, req.node_id);
    }
    json!({ "location": req.node_id })
}

fn schedule_action(
    state: &mut GameState,
    player_id: PlayerId,
    req: &protocol::NodeRequest,
    kind: ActionKind,
    now: SimTime,
) -> Value {
    let session = match require_session(state, player_id) {
        Ok(session) => session,
        Err(error) => return error,
    };
    if state
        .pending_actions
        .iter()
        .any(|a| a.player == player_id)
    {
        return error_payload("Another action is already running");
    }
    let Some(network) = state.world.network(session.network) else {
        return error_payload("Network not found");
    };
    let Some(node) = network.nodes.node(req.node_id) else {
        return error_payload("Node not found");
    };
    let Some(current) = network.nodes.node(session.current_node) else {
        return error_payload("Node not found");
    };
    if !current.links.contains(&req.node_id) {
        return error_payload("Node is not adjacent");
    }

    let actions = state.config.actions;
    let duration = match kind {
        ActionKind::Breach => {
            if node.breached {
                return error_payload("Node is already breached");
            }
            let strength = node.ice.as_ref().map_or(0, blackice_procedural::Ice::strength);
            actions.breach_base_ms + u64::from(strength) * actions.breach_per_strength_ms
        }
        ActionKind::Crack => {
            if !node.breached {
                return error_payload("Node is not breached");
            }
            if !node.password_gate {
                return error_payload("Node has no password gate");
            }
            if node.cracked {
                return error_payload("Node is already cracked");
            }
            actions.crack_base_ms
        }
    };

    state.pending_actions.push(PendingAction {
        player: player_id,
        network: session.network,
        node: req.node_id,
        kind,
        completes_at: now + duration,
    });
    json!({ "started": true, "completesIn": duration })
}

fn harvest(state: &mut GameState, player_id: PlayerId, req: &protocol::NodeRequest) -> Value {
    let session = match require_session(state, player_id) {
        Ok(session) => session,
        Err(error) => return error,
    };

    let harvested: Vec<(ResourceKind, u32)> = {
        let Some(network) = state.world.network_mut(session.network) else {
            return error_payload("Network not found");
        };
        let adjacent = network
            .nodes
            .node(session.current_node)
            .map_or(false, |n| n.links.contains(&req.node_id));
        let Some(node) = network.nodes.node_mut(req.node_id) else {
            return error_payload("Node not found");
        };
        if node.id != session.current_node && !adjacent {
            return error_payload("Node is not adjacent");
        }
        if !node.is_open() {
            return error_payload("Node is not breached");
        }
        node.deposits
            .iter_mut()
            .filter(|d| d.amount > 0)
            .map(|d| {
                let taken = (d.kind, d.amount);
                d.amount = 0;
                taken
            })
            .collect()
    };

    let Some(player) = state.players.get_mut(&player_id) else {
        return error_payload("Unknown player");
    };
    for &(kind, amount) in &harvested {
        player.account.give_resource(kind, amount);
    }
    let rows: Vec<Value> = harvested
        .iter()
        .map(|&(kind, amount)| json!({ "resource": kind.as_str(), "amount": amount }))
        .collect();
    json!({
        "harvested": rows,
        "resources": player.account.resource_balances(),
    })
}

fn download(state: &mut GameState, player_id: PlayerId, req: &protocol::DownloadRequest) -> Value {
    let session = match require_session(state, player_id) {
        Ok(session) => session,
        Err(error) => return error,
    };
    let Some(network) = state.world.network_mut(session.network) else {
        return error_payload("Network not found");
    };
    let Some(node) = network.nodes.node_mut(req.node_id) else {
        return error_payload("Node not found");
    };
    if !node.is_open() {
        return error_payload("Node is not breached");
    }
    let Some(file) = node.files.iter_mut().find(|f| f.id == req.file_id) else {
        return error_payload("File not found");
    };
    if file.corrupted {
        return error_payload("File is corrupted");
    }
    if file.downloaded {
        return error_payload("File already downloaded");
    }
    file.downloaded = true;
    json!({
        "file": { "id": file.id, "name": file.name, "sizeKb": file.size_kb }
    })
}

// =============================================================================
// DEFENSE HANDLERS
// =============================================================================

fn defend_view(state: &GameState, player_id: PlayerId) -> Value {
    let mut owned: Vec<&Network> = state
        .world
        .networks()
        .filter(|n| n.owner == Owner::Player(player_id))
        .collect();
    owned.sort_by_key(|n| n.id);

    let mut intrusions = Vec::new();
    for network in owned {
        for intrusion in state.intrusions.active_on_network(network.id) {
            let counter_measures: Vec<Value> = intrusion
                .counter_measures
                .iter()
                .map(|cm| {
                    json!({
                        "program": cm.program.name(),
                        "active": cm.status == blackice_intrusion::CounterMeasureStatus::Active,
                        "completesAt": cm.completes_at(),
                    })
                })
                .collect();
            intrusions.push(json!({
                "intrusionId": intrusion.id,
                "networkId": network.id,
                "startedAt": intrusion.started_at,
                "detected": intrusion.detected,
                // Position is only revealed once detection fired.
                "attackerNode": if intrusion.detected {
                    json!(intrusion.current_node)
                } else {
                    Value::Null
                },
                "counterMeasures": counter_measures,
            }));
        }
    }
    json!({ "intrusions": intrusions })
}

fn apply_defense(
    state: &mut GameState,
    player_id: PlayerId,
    intrusion_id: IntrusionId,
    program: Program,
    now: SimTime,
) -> Value {
    let Some(network_id) = state.intrusions.get(intrusion_id).map(|i| i.network) else {
        return error_payload(&IntrusionError::NotFound.to_string());
    };
    let owns = state
        .world
        .network(network_id)
        .map_or(false, |n| n.owner == Owner::Player(player_id));
    if !owns {
        return error_payload("Network is not yours");
    }

    let spec = state.intrusions.config().programs.spec(program);
    // The program cost is charged up front and refunded if the apply is
    // rejected.
    {
        let Some(player) = state.players.get_mut(&player_id) else {
            return error_payload("Unknown player");
        };
        if let Err(error) = player.account.charge(spec.cost) {
            return error_payload(&error.to_string());
        }
    }

    match state
        .intrusions
        .apply_program(intrusion_id, program, player_id, now)
    {
        Ok(cm) => {
            let completes_at = cm.completes_at();
            let credits = state
                .players
                .get(&player_id)
                .map_or(0, |p| p.account.credits());
            json!({
                "program": program.name(),
                "cost": spec.cost,
                "duration": spec.duration_ms,
                "completesAt": completes_at,
                "credits": credits,
            })
        }
        Err(error) => {
            if let Some(player) = state.players.get_mut(&player_id) {
                player.account.deposit(spec.cost);
            }
            error_payload(&error.to_string())
        }
    }
}

fn network_defense(
    state: &mut GameState,
    player_id: PlayerId,
    network_id: NetworkId,
    program: Program,
    now: SimTime,
) -> Value {
    let owns = state
        .world
        .network(network_id)
        .map_or(false, |n| n.owner == Owner::Player(player_id));
    if !owns {
        return error_payload("Network is not yours");
    }
    // Network-scoped programs attach to the oldest active intrusion so
    // the per-intrusion duplicate rule still applies.
    match state.intrusions.oldest_active_on(network_id) {
        Ok(intrusion_id) => apply_defense(state, player_id, intrusion_id, program, now),
        Err(error) => error_payload(&error.to_string()),
    }
}

// =============================================================================
// MARKET HANDLERS
// =============================================================================

fn market_list(state: &GameState, player_id: PlayerId, req: &protocol::MarketListRequest) -> Value {
    let filter = match &req.item_type {
        None => None,
        Some(raw) => match ItemType::parse(raw) {
            Some(kind) => Some(kind),
            None => return error_payload(&MarketError::UnknownItem(raw.clone()).to_string()),
        },
    };
    let (orders, my_orders) = state.market.list_view(player_id, filter);
    json!({ "orders": orders, "myOrders": my_orders })
}

fn market_sell(
    state: &mut GameState,
    player_id: PlayerId,
    req: &protocol::MarketSellRequest,
    now: SimTime,
) -> Value {
    let Some(kind) = ResourceKind::parse(&req.resource_type) else {
        return error_payload(&MarketError::UnknownItem(req.resource_type.clone()).to_string());
    };
    let Some(player) = state.players.get_mut(&player_id) else {
        return error_payload("Unknown player");
    };
    match state.market.list_sell(
        player_id,
        &mut player.account,
        kind,
        req.amount,
        req.price_per_unit,
        now,
    ) {
        Ok(receipt) => json!({
            "orderId": receipt.order_id,
            "listed": true,
            "fee": receipt.fee,
            "credits": player.account.credits(),
        }),
        Err(error) => error_payload(&error.to_string()),
    }
}

fn market_buy(state: &mut GameState, player_id: PlayerId, req: &protocol::OrderRequest) -> Value {
    let receipt = {
        let Some(player) = state.players.get_mut(&player_id) else {
            return error_payload("Unknown player");
        };
        match state.market.buy(player_id, &mut player.account, req.order_id) {
            Ok(receipt) => receipt,
            Err(error) => return error_payload(&error.to_string()),
        }
    };
    // Seller payout lands in the same handler call: the credit motion
    // and the order removal are atomic relative to every other
    // operation.
    if let Some((seller, amount)) = receipt.seller_payout {
        if let Some(seller_player) = state.players.get_mut(&seller) {
            seller_player.account.deposit(amount);
        }
    }
    let credits = state
        .players
        .get(&player_id)
        .map_or(0, |p| p.account.credits());
    json!({
        "bought": {
            "itemType": receipt.good.item_type().as_str(),
            "itemId": receipt.good.item_id(),
            "amount": receipt.quantity,
        },
        "paid": receipt.paid,
        "credits": credits,
    })
}

fn market_cancel(state: &mut GameState, player_id: PlayerId, req: &protocol::OrderRequest) -> Value {
    let Some(player) = state.players.get_mut(&player_id) else {
        return error_payload("Unknown player");
    };
    match state.market.cancel(player_id, &mut player.account, req.order_id) {
        Ok(receipt) => {
            let returned = match receipt.returned {
                ReturnedEscrow::Goods { good, quantity } => json!({
                    "itemType": good.item_type().as_str(),
                    "itemId": good.item_id(),
                    "amount": quantity,
                }),
                ReturnedEscrow::Credits { amount } => json!({ "credits": amount }),
            };
            json!({ "returned": returned })
        }
        Err(error) => error_payload(&error.to_string()),
    }
}

fn market_modify(
    state: &mut GameState,
    player_id: PlayerId,
    req: &protocol::MarketModifyRequest,
    now: SimTime,
) -> Value {
    let Some(player) = state.players.get_mut(&player_id) else {
        return error_payload("Unknown player");
    };
    match state.market.modify(
        player_id,
        &mut player.account,
        req.order_id,
        req.new_amount,
        req.new_price,
        now,
    ) {
        Ok(receipt) => json!({
            "newAmount": receipt.new_amount,
            "newPrice": receipt.new_price,
            "fee": receipt.fee,
            "credits": player.account.credits(),
        }),
        Err(error) => error_payload(&error.to_string()),
    }
}

// =============================================================================
// BLACK MARKET HANDLERS
// =============================================================================

fn blackmarket_list(state: &mut GameState) -> Value {
    let rows: Vec<Value> = state
        .blackmarket
        .quote_all()
        .into_iter()
        .map(|quote| {
            json!({
                "itemId": quote.item_id,
                "name": quote.name,
                "price": quote.price,
                "stock": quote.stock,
            })
        })
        .collect();
    json!({ "items": rows })
}

fn blackmarket_buy(
    state: &mut GameState,
    player_id: PlayerId,
    req: &protocol::BlackMarketItemRequest,
) -> Value {
    let Some(player) = state.players.get_mut(&player_id) else {
        return error_payload("Unknown player");
    };
    match state.blackmarket.buy(&mut player.account, &req.item_id) {
        Ok(quote) => json!({
            "bought": quote.item_id,
            "paid": quote.price,
            "credits": player.account.credits(),
        }),
        Err(error) => error_payload(&error.to_string()),
    }
}

fn blackmarket_sell(
    state: &mut GameState,
    player_id: PlayerId,
    req: &protocol::BlackMarketItemRequest,
) -> Value {
    let Some(player) = state.players.get_mut(&player_id) else {
        return error_payload("Unknown player");
    };
    match state.blackmarket.sell(&mut player.account, &req.item_id) {
        Ok(payout) => json!({
            "sold": req.item_id,
            "received": payout,
            "credits": player.account.credits(),
        }),
        Err(error) => error_payload(&error.to_string()),
    }
}
