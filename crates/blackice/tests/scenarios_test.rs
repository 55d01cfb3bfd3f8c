//! # End-to-End Scenario Tests
//!
//! Drives the simulation through the message handlers and the
//! deterministic scheduler with virtual time — no sleeps anywhere.

use crossbeam_channel::Receiver;
use serde_json::{json, Value};

use blackice::handlers::handle_message;
use blackice::{EventBus, GameConfig, GameState, OutboundEvent};
use blackice_procedural::Owner;
use blackice_shared::protocol::{self, Envelope};
use blackice_shared::{NetworkId, PlayerId, ResourceKind, SimTime};

fn boot() -> (GameState, Receiver<OutboundEvent>) {
    let (bus, receiver) = EventBus::channel();
    let state = GameState::new(GameConfig::default(), bus);
    (state, receiver)
}

/// Sends a request and unwraps the response payload.
fn send(
    state: &mut GameState,
    player: PlayerId,
    msg_type: &str,
    payload: Value,
    now: SimTime,
) -> Value {
    let request = Envelope {
        msg_type: msg_type.to_owned(),
        payload,
        message_id: None,
    };
    handle_message(state, player, &request, now)
        .expect("request was dropped")
        .payload
}

/// First NPC-owned network in deterministic cluster order.
fn npc_network(state: &GameState) -> NetworkId {
    state
        .world()
        .clusters()
        .iter()
        .flat_map(|c| c.networks.iter().copied())
        .find(|&id| {
            state
                .world()
                .network(id)
                .map_or(false, |n| n.owner == Owner::Npc)
        })
        .expect("world has NPC networks")
}

fn address_of(state: &GameState, network: NetworkId) -> String {
    state.world().network(network).unwrap().address.clone()
}

fn events_of<'a>(
    receiver: &'a Receiver<OutboundEvent>,
    msg_type: &'a str,
) -> impl Iterator<Item = OutboundEvent> + 'a {
    receiver
        .try_iter()
        .filter(move |e| e.msg_type() == msg_type)
}

#[test]
fn test_connect_npc_owned_creates_no_intrusion() {
    let (mut state, receiver) = boot();
    let bob = state.register_player("bob");
    let target = npc_network(&state);
    let address = address_of(&state, target);

    let response = send(
        &mut state,
        bob,
        protocol::MSG_CONNECT,
        json!({"targetIp": address}),
        0,
    );
    assert_eq!(response["success"], true);

    // No intrusion record, no alert.
    assert!(state.intrusion_tracker().active_on_network(target).is_empty());
    assert_eq!(receiver.try_iter().count(), 0);
}

#[test]
fn test_connect_player_owned_creates_intrusion_and_immediate_alert() {
    let (mut state, receiver) = boot();
    let alice = state.register_player("alice");
    let bob = state.register_player("bob");
    let target = state.player(alice).unwrap().home_network;
    let address = address_of(&state, target);

    let response = send(
        &mut state,
        bob,
        protocol::MSG_CONNECT,
        json!({"targetIp": address}),
        0,
    );
    assert_eq!(response["success"], true);
    assert_eq!(response["defenderOnline"], true);

    let active = state.intrusion_tracker().active_on_network(target);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].attacker, bob);
    assert!(!active[0].detected);

    // The immediate alert went to alice, separately from the delayed
    // detection alert.
    let alerts: Vec<_> = events_of(&receiver, protocol::EVT_INTRUSION_ALERT).collect();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].recipient(), alice);
}

#[test]
fn test_detection_fires_only_after_alert_delay() {
    let (mut state, receiver) = boot();
    let alice = state.register_player("alice");
    let bob = state.register_player("bob");
    let target = state.player(alice).unwrap().home_network;
    let address = address_of(&state, target);
    let delay = state.config().intrusion.alert_delay_ms;

    send(
        &mut state,
        bob,
        protocol::MSG_CONNECT,
        json!({"targetIp": address}),
        0,
    );
    let intrusion_id = state.intrusion_tracker().active_on_network(target)[0].id;
    receiver.try_iter().count(); // drain the connect alert

    // Sweeps before the delay never flip the flag.
    state.pump(delay - 1_000);
    assert!(!state.intrusion_tracker().get(intrusion_id).unwrap().detected);
    assert_eq!(events_of(&receiver, protocol::EVT_INTRUSION_DETECTED).count(), 0);

    // The first sweep at or past the delay does, exactly once.
    state.pump(delay + 1_000);
    assert!(state.intrusion_tracker().get(intrusion_id).unwrap().detected);
    let detections: Vec<_> =
        events_of(&receiver, protocol::EVT_INTRUSION_DETECTED).collect();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].recipient(), alice);
}

#[test]
fn test_backtrace_charges_rejects_duplicates_and_reveals() {
    let (mut state, receiver) = boot();
    let alice = state.register_player("alice");
    let bob = state.register_player("bob");
    let target = state.player(alice).unwrap().home_network;
    let address = address_of(&state, target);
    let cost = state.config().intrusion.programs.backtrace.cost;
    let duration = state.config().intrusion.programs.backtrace.duration_ms;

    send(
        &mut state,
        bob,
        protocol::MSG_CONNECT,
        json!({"targetIp": address}),
        0,
    );
    let intrusion_id = state.intrusion_tracker().active_on_network(target)[0].id;

    let before = state.player(alice).unwrap().account.credits();
    let response = send(
        &mut state,
        alice,
        protocol::MSG_DEFEND_BACKTRACE,
        json!({"intrusionId": intrusion_id}),
        100,
    );
    assert!(response.get("error").is_none(), "{response}");
    let after_charge = state.player(alice).unwrap().account.credits();
    assert_eq!(after_charge, before - cost);

    // Duplicate while one is active: rejected, cost refunded.
    let duplicate = send(
        &mut state,
        alice,
        protocol::MSG_DEFEND_BACKTRACE,
        json!({"intrusionId": intrusion_id}),
        200,
    );
    assert!(duplicate["error"]
        .as_str()
        .unwrap()
        .contains("already running"));
    assert_eq!(state.player(alice).unwrap().account.credits(), after_charge);

    // Resolution reveals the attacker's address to the defender.
    receiver.try_iter().count();
    state.pump(100 + duration + 1_000);
    let reveals: Vec<_> = events_of(&receiver, protocol::EVT_ATTACKER_REVEALED).collect();
    assert_eq!(reveals.len(), 1);
    assert_eq!(reveals[0].recipient(), alice);
    if let OutboundEvent::AttackerRevealed {
        attacker,
        attacker_address,
        ..
    } = &reveals[0]
    {
        assert_eq!(*attacker, bob);
        assert_eq!(
            attacker_address,
            &state.player(bob).unwrap().address
        );
    } else {
        panic!("wrong event variant");
    }
}

#[test]
fn test_lockdown_terminates_all_and_rejects_new_intrusions() {
    let (mut state, receiver) = boot();
    let alice = state.register_player("alice");
    let bob = state.register_player("bob");
    let target = state.player(alice).unwrap().home_network;
    let address = address_of(&state, target);
    let duration = state.config().intrusion.programs.lockdown.duration_ms;

    send(
        &mut state,
        bob,
        protocol::MSG_CONNECT,
        json!({"targetIp": address}),
        0,
    );

    let response = send(
        &mut state,
        alice,
        protocol::MSG_DEFEND_LOCKDOWN,
        json!({"networkId": target}),
        100,
    );
    assert!(response.get("error").is_none(), "{response}");

    receiver.try_iter().count();
    state.pump(100 + duration + 1_000);

    // Bob was thrown off and told about it.
    assert!(state.player(bob).unwrap().session.is_none());
    let kicked: Vec<_> =
        events_of(&receiver, protocol::EVT_CONNECTION_TERMINATED).collect();
    assert_eq!(kicked.len(), 1);
    assert_eq!(kicked[0].recipient(), bob);
    assert!(state.intrusion_tracker().active_on_network(target).is_empty());

    // New intrusions are rejected for the lockdown window.
    let rejected = send(
        &mut state,
        bob,
        protocol::MSG_CONNECT,
        json!({"targetIp": address}),
        100 + duration + 2_000,
    );
    assert_eq!(rejected["error"], "Network is in lockdown");
}

#[test]
fn test_market_scenario_through_handlers() {
    let (mut state, _receiver) = boot();
    let seller = state.register_player("seller");
    let buyer = state.register_player("buyer");
    state
        .player_mut(seller)
        .unwrap()
        .account
        .give_resource(ResourceKind::DataPackets, 25);
    let fee_bps = u64::from(state.config().market.transaction_fee_bps);

    let listed = send(
        &mut state,
        seller,
        protocol::MSG_MARKET_SELL,
        json!({"resourceType": "data_packets", "amount": 10, "pricePerUnit": 50}),
        0,
    );
    assert_eq!(listed["listed"], true);
    let order_id = listed["orderId"].as_u64().unwrap();
    assert_eq!(
        state
            .player(seller)
            .unwrap()
            .account
            .resource(ResourceKind::DataPackets),
        15
    );

    // The listing is anonymous to the buyer but visible in myOrders to
    // the seller.
    let listing = send(
        &mut state,
        buyer,
        protocol::MSG_MARKET_LIST,
        json!({"itemType": "resource"}),
        0,
    );
    let orders = listing["orders"].as_array().unwrap();
    assert!(!orders.is_empty());
    for order in orders {
        assert_eq!(order["seller"], "Anonymous");
    }
    let my = send(&mut state, seller, protocol::MSG_MARKET_LIST, json!({}), 0);
    let mine = my["myOrders"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["amount"], 10);
    assert_eq!(mine[0]["pricePerUnit"], 50);

    // Increase attempt is rejected with the explicit error.
    let cooldown = state.config().market.modify_cooldown_ms;
    let bumped = send(
        &mut state,
        seller,
        protocol::MSG_MARKET_MODIFY,
        json!({"orderId": order_id, "newAmount": 15}),
        cooldown,
    );
    assert_eq!(bumped["error"], "Sell order quantity can only be decreased");

    // The buy moves goods and credits atomically.
    let seller_before = state.player(seller).unwrap().account.credits();
    let bought = send(
        &mut state,
        buyer,
        protocol::MSG_MARKET_BUY,
        json!({"orderId": order_id}),
        cooldown,
    );
    assert_eq!(bought["paid"], 500);
    assert_eq!(bought["bought"]["amount"], 10);
    assert_eq!(
        state
            .player(buyer)
            .unwrap()
            .account
            .resource(ResourceKind::DataPackets),
        10
    );
    let expected_payout = 500 - 500 * fee_bps / 10_000;
    assert_eq!(
        state.player(seller).unwrap().account.credits(),
        seller_before + expected_payout
    );

    // Gone from the book.
    assert!(state.market().order(order_id).is_none());
}

#[test]
fn test_navigate_routes_and_errors() {
    let (mut state, _receiver) = boot();
    let bob = state.register_player("bob");
    let home = state.player(bob).unwrap().home_network;

    // Same-cluster target: a route exists.
    let cluster = state
        .world()
        .clusters()
        .iter()
        .find(|c| c.networks.contains(&home))
        .unwrap();
    let target = *cluster.networks.iter().find(|&&id| id != home).unwrap();
    let other_cluster_target = state
        .world()
        .clusters()
        .iter()
        .find(|c| !c.networks.contains(&home))
        .unwrap()
        .networks[0];

    let response = send(
        &mut state,
        bob,
        protocol::MSG_NAVIGATE,
        json!({"targetNetworkId": target}),
        0,
    );
    assert!(response.get("error").is_none(), "{response}");
    let route = response["route"].as_array().unwrap();
    assert!(route.len() >= 2);
    assert_eq!(response["jumps"], route.len() as u64 - 1);
    assert_eq!(response["location"], target);
    assert_eq!(state.player(bob).unwrap().location, target);

    // Unknown network.
    let missing = send(
        &mut state,
        bob,
        protocol::MSG_NAVIGATE,
        json!({"targetNetworkId": 999_999}),
        0,
    );
    assert_eq!(missing["error"], "Network not found");

    // Clusters are disjoint subgraphs.
    let unreachable = send(
        &mut state,
        bob,
        protocol::MSG_NAVIGATE,
        json!({"targetNetworkId": other_cluster_target}),
        0,
    );
    assert_eq!(unreachable["error"], "No route to target network");
}

#[test]
fn test_breach_move_harvest_flow() {
    let (mut state, receiver) = boot();
    let bob = state.register_player("bob");
    let target = npc_network(&state);
    let address = address_of(&state, target);

    send(
        &mut state,
        bob,
        protocol::MSG_CONNECT,
        json!({"targetIp": address}),
        0,
    );
    // Node 1 is chain-linked to the gateway.
    let expected: Vec<(String, u32)> = state
        .world()
        .network(target)
        .unwrap()
        .nodes
        .node(1)
        .unwrap()
        .deposits
        .iter()
        .map(|d| (d.kind.as_str().to_owned(), d.amount))
        .collect();

    let started = send(
        &mut state,
        bob,
        protocol::MSG_BREACH,
        json!({"nodeId": 1}),
        1_000,
    );
    assert_eq!(started["started"], true);
    let completes_in = started["completesIn"].as_u64().unwrap();

    // A second action while one runs is rejected.
    let busy = send(
        &mut state,
        bob,
        protocol::MSG_BREACH,
        json!({"nodeId": 1}),
        1_100,
    );
    assert_eq!(busy["error"], "Another action is already running");

    state.pump(1_000 + completes_in + 500);
    assert_eq!(
        events_of(&receiver, protocol::EVT_ACTION_COMPLETE).count(),
        1
    );
    assert!(state
        .world()
        .network(target)
        .unwrap()
        .nodes
        .node(1)
        .unwrap()
        .breached);

    let moved = send(
        &mut state,
        bob,
        protocol::MSG_MOVE_NODE,
        json!({"nodeId": 1}),
        2_000 + completes_in,
    );
    assert!(moved.get("error").is_none(), "{moved}");

    let harvested = send(
        &mut state,
        bob,
        protocol::MSG_HARVEST,
        json!({"nodeId": 1}),
        2_000 + completes_in,
    );
    assert!(harvested.get("error").is_none(), "{harvested}");
    let rows = harvested["harvested"].as_array().unwrap();
    assert_eq!(rows.len(), expected.len());
    for (row, (kind, amount)) in rows.iter().zip(&expected) {
        assert_eq!(row["resource"].as_str().unwrap(), kind);
        assert_eq!(row["amount"].as_u64().unwrap(), u64::from(*amount));
        assert_eq!(
            u64::from(
                state
                    .player(bob)
                    .unwrap()
                    .account
                    .resource(ResourceKind::parse(kind).unwrap())
            ),
            u64::from(*amount)
        );
    }
}

#[test]
fn test_ghost_collapse_evicts_players() {
    let (mut state, receiver) = boot();
    let bob = state.register_player("bob");
    let ghost = state.spawn_ghost(0);
    let address = address_of(&state, ghost);
    let lifetime = state.config().ghost.lifetime_ms;
    let home = state.player(bob).unwrap().home_network;

    let response = send(
        &mut state,
        bob,
        protocol::MSG_CONNECT,
        json!({"targetIp": address}),
        1_000,
    );
    assert_eq!(response["success"], true);
    assert!(state.player(bob).unwrap().session.is_some());

    state.pump(1_000 + lifetime);

    assert!(state.world().network(ghost).is_none());
    assert!(state.player(bob).unwrap().session.is_none());
    assert_eq!(state.player(bob).unwrap().location, home);
    let collapses: Vec<_> = events_of(&receiver, protocol::EVT_GHOST_COLLAPSED).collect();
    assert_eq!(collapses.len(), 1);
    assert_eq!(collapses[0].recipient(), bob);
}

#[test]
fn test_disconnect_marks_intrusion_escaped() {
    let (mut state, _receiver) = boot();
    let alice = state.register_player("alice");
    let bob = state.register_player("bob");
    let target = state.player(alice).unwrap().home_network;
    let address = address_of(&state, target);

    send(
        &mut state,
        bob,
        protocol::MSG_CONNECT,
        json!({"targetIp": address}),
        0,
    );
    let intrusion_id = state.intrusion_tracker().active_on_network(target)[0].id;

    let response = send(&mut state, bob, protocol::MSG_DISCONNECT, json!({}), 500);
    assert_eq!(response["disconnected"], true);

    // Preserved as history, not deleted.
    let record = state.intrusion_tracker().get(intrusion_id).unwrap();
    assert_eq!(record.status.name(), "escaped");
}

#[test]
fn test_unparseable_and_unknown_messages_dropped() {
    let (mut state, _receiver) = boot();
    let bob = state.register_player("bob");

    // Wrong payload shape: dropped, no response, connection untouched.
    let bad = Envelope {
        msg_type: protocol::MSG_CONNECT.to_owned(),
        payload: json!({"targetIp": 12345}),
        message_id: Some(1),
    };
    assert!(handle_message(&mut state, bob, &bad, 0).is_none());

    // Unknown type: dropped.
    let unknown = Envelope {
        msg_type: "TELEPORT".to_owned(),
        payload: json!({}),
        message_id: Some(2),
    };
    assert!(handle_message(&mut state, bob, &unknown, 0).is_none());

    // The player can still act normally afterwards.
    let scan_payload = json!({"targetIp": address_of(&state, npc_network(&state))});
    let scan = send(
        &mut state,
        bob,
        protocol::MSG_SCAN,
        scan_payload,
        0,
    );
    assert!(scan.get("error").is_none());
}

#[test]
fn test_response_echoes_message_id() {
    let (mut state, _receiver) = boot();
    let bob = state.register_player("bob");
    let request = Envelope {
        msg_type: protocol::MSG_DEFEND_VIEW.to_owned(),
        payload: Value::Null,
        message_id: Some(77),
    };
    let response = handle_message(&mut state, bob, &request, 0).unwrap();
    assert_eq!(response.message_id, Some(77));
    assert_eq!(response.msg_type, protocol::MSG_DEFEND_VIEW);
}
