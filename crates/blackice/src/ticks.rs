//! # Tick Callbacks
//!
//! The fixed-interval sweeps the scheduler dispatches. Each callback
//! applies one subsystem's due work to the shared state and emits the
//! resulting events. Ticks never run concurrently with handlers.

use tracing::{debug, info};

use blackice_intrusion::Program;
use blackice_market::{npc, MarketEngine, Seller};
use blackice_procedural::Owner;
use blackice_shared::{NetworkId, PlayerId, SimTime};

use crate::events::OutboundEvent;
use crate::scheduler::TaskKind;
use crate::state::{ActionKind, GameState};

/// Dispatches one due task.
pub(crate) fn run_task(state: &mut GameState, task: TaskKind, now: SimTime) {
    match task {
        TaskKind::IntrusionSweep => intrusion_sweep(state, now),
        TaskKind::ActionResolve => action_resolve(state, now),
        TaskKind::MarketSweep => market_sweep(state, now),
        TaskKind::NpcRestock => npc_restock(state, now),
        TaskKind::GhostSweep => ghost_sweep(state, now),
        TaskKind::BlackMarketTick => state.blackmarket.tick(),
    }
}

/// Detection flips and counter-measure effects.
fn intrusion_sweep(state: &mut GameState, now: SimTime) {
    let outcome = state.intrusions.sweep(now);

    for detection in outcome.detections {
        let Some(network) = state.world.network(detection.network) else {
            continue;
        };
        let Owner::Player(defender) = network.owner else {
            continue;
        };
        // The owner is alerted only if online; the flag stays flipped
        // either way.
        if state.players.get(&defender).map_or(false, |p| p.online) {
            state.events.emit(OutboundEvent::IntrusionDetected {
                defender,
                network: detection.network,
                intrusion: detection.intrusion,
                attacker_node: detection.attacker_node,
            });
        }
    }

    for resolution in outcome.resolutions {
        match resolution.program {
            Program::Backtrace => {
                state.events.emit(OutboundEvent::AttackerRevealed {
                    defender: resolution.defender,
                    intrusion: resolution.intrusion,
                    attacker: resolution.attacker,
                    attacker_address: resolution.attacker_address.clone(),
                });
            }
            Program::CounterIce => {
                let damage = state.intrusions.config().counter_ice_damage;
                if let Some(attacker) = state.players.get_mut(&resolution.attacker) {
                    let integrity = attacker.damage_rig(damage);
                    state.events.emit(OutboundEvent::HardwareDamaged {
                        player: resolution.attacker,
                        damage,
                        integrity,
                    });
                }
            }
            Program::Lockdown => {
                let terminated = state.intrusions.terminate_all_on(resolution.network);
                let window = state.intrusions.config().lockdown_window_ms;
                if let Some(network) = state.world.network_mut(resolution.network) {
                    network.lockdown_until = Some(now + window);
                }
                for (_, attacker) in terminated {
                    evict_attacker(state, attacker, resolution.network, "Network lockdown");
                }
                info!(network = resolution.network, "lockdown engaged");
            }
            Program::Purge => {
                let mut corrupted = 0;
                if let Some(network) = state.world.network_mut(resolution.network) {
                    for node in network.nodes.nodes_mut() {
                        for file in &mut node.files {
                            if !file.downloaded && !file.corrupted {
                                file.corrupted = true;
                                corrupted += 1;
                            }
                        }
                    }
                }
                state.events.emit(OutboundEvent::FilesPurged {
                    defender: resolution.defender,
                    network: resolution.network,
                    corrupted,
                });
            }
        }
    }
}

/// Ends an attacker's session after a forced termination.
fn evict_attacker(
    state: &mut GameState,
    attacker: PlayerId,
    network: NetworkId,
    reason: &'static str,
) {
    state
        .pending_actions
        .retain(|a| !(a.player == attacker && a.network == network));
    if let Some(player) = state.players.get_mut(&attacker) {
        if player.session.map_or(false, |s| s.network == network) {
            player.session = None;
        }
        state.events.emit(OutboundEvent::ConnectionTerminated {
            player: attacker,
            network,
            reason,
        });
    }
}

/// Resolves due breach/crack work.
fn action_resolve(state: &mut GameState, now: SimTime) {
    let mut due = Vec::new();
    state.pending_actions.retain(|action| {
        if action.completes_at <= now {
            due.push(*action);
            false
        } else {
            true
        }
    });

    for action in due {
        // The session must still be open on the same network; a
        // disconnect or eviction silently voids the work.
        let still_there = state
            .players
            .get(&action.player)
            .and_then(|p| p.session)
            .map_or(false, |s| s.network == action.network);
        if !still_there {
            continue;
        }
        let Some(network) = state.world.network_mut(action.network) else {
            continue;
        };
        let Some(node) = network.nodes.node_mut(action.node) else {
            continue;
        };
        let action_name = match action.kind {
            ActionKind::Breach => {
                node.breached = true;
                "breach"
            }
            ActionKind::Crack => {
                node.cracked = true;
                "crack"
            }
        };
        state.events.emit(OutboundEvent::ActionComplete {
            player: action.player,
            network: action.network,
            node: action.node,
            action: action_name,
        });
    }
}

/// Deletes expired orders, returning escrow and notifying connected
/// originators.
fn market_sweep(state: &mut GameState, now: SimTime) {
    for expired in state.market.sweep_expired(now) {
        let Seller::Player(owner) = expired.order.seller else {
            continue; // vendor escrow is synthetic
        };
        if let Some(player) = state.players.get_mut(&owner) {
            MarketEngine::return_escrow(&expired.order, &mut player.account);
            if player.online {
                state.events.emit(OutboundEvent::OrderExpired {
                    player: owner,
                    order: expired.order.id,
                });
            }
        }
    }
}

/// Tops up NPC liquidity for sold-out items.
fn npc_restock(state: &mut GameState, now: SimTime) {
    let created = npc::restock(&mut state.market, &mut state.market_rng, now);
    if !created.is_empty() {
        debug!(orders = created.len(), "restocked NPC liquidity");
    }
}

/// Collapses expired ghosts (evicting anyone inside) and rolls the
/// spawn dice.
fn ghost_sweep(state: &mut GameState, now: SimTime) {
    for network in state.ghosts.sweep(&mut state.world, now) {
        let inside: Vec<PlayerId> = state
            .players
            .values()
            .filter(|p| p.session.map_or(false, |s| s.network == network))
            .map(|p| p.id)
            .collect();
        for player_id in inside {
            if let Some(player) = state.players.get_mut(&player_id) {
                player.session = None;
                player.location = player.home_network;
                state.events.emit(OutboundEvent::GhostCollapsed {
                    player: player_id,
                    network,
                });
            }
        }
        state.pending_actions.retain(|a| a.network != network);
        info!(network, "ghost network collapsed");
    }

    if let Some(network) = state.ghosts.maybe_spawn(&mut state.world, now) {
        info!(network, "ghost network spawned");
    }
}
