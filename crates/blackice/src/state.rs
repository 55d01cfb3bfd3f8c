//! # Game State
//!
//! The process-wide simulation context: every registry, the scheduler
//! and the event bus, owned by one object that is passed to every
//! handler and tick. There is no global state.

use std::collections::HashMap;

use rand_chacha::ChaCha8Rng;
use tracing::info;

use blackice_intrusion::IntrusionTracker;
use blackice_market::{npc, Account, BlackMarket, MarketEngine};
use blackice_procedural::seed::{PURPOSE_BLACKMARKET, PURPOSE_MARKET};
use blackice_procedural::{GhostRegistry, Owner, World, WorldGenerator, WorldSeed};
use blackice_shared::constants::MAX_RIG_INTEGRITY;
use blackice_shared::{NetworkId, NodeId, PlayerId, SimTime, Zone};

use crate::config::GameConfig;
use crate::events::EventBus;
use crate::player::Player;
use crate::scheduler::Scheduler;
use crate::ticks;

/// Scheduled long-running player work, resumed by the ActionResolve
/// tick. The player connection is never blocked on game-time delays.
#[derive(Clone, Copy, Debug)]
pub struct PendingAction {
    /// The acting player.
    pub player: PlayerId,
    /// Network the action runs in.
    pub network: NetworkId,
    /// Target node.
    pub node: NodeId,
    /// What completes.
    pub kind: ActionKind,
    /// Resolution deadline.
    pub completes_at: SimTime,
}

/// Kinds of scheduled player work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// Clear a node's ICE gate.
    Breach,
    /// Clear a node's password gate.
    Crack,
}

/// The authoritative simulation state.
///
/// Mutated only from message handlers and tick callbacks, which never
/// run concurrently — every operation is atomic relative to all others.
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) world: World,
    pub(crate) ghosts: GhostRegistry,
    pub(crate) intrusions: IntrusionTracker,
    pub(crate) market: MarketEngine,
    pub(crate) blackmarket: BlackMarket,
    pub(crate) players: HashMap<PlayerId, Player>,
    pub(crate) pending_actions: Vec<PendingAction>,
    pub(crate) events: EventBus,
    pub(crate) market_rng: ChaCha8Rng,
    scheduler: Scheduler,
    next_player_id: PlayerId,
}

impl GameState {
    /// Boots the simulation: generates the world and seeds NPC
    /// liquidity.
    #[must_use]
    pub fn new(config: GameConfig, events: EventBus) -> Self {
        let seed = WorldSeed::new(config.world_seed);

        let world = WorldGenerator::new(seed).generate();
        info!(
            networks = world.network_count(),
            sectors = world.sectors().len(),
            "world generated"
        );

        let mut market = MarketEngine::new(config.market);
        let mut market_rng = seed.derive(PURPOSE_MARKET).rng();
        let seeded = npc::seed(&mut market, &mut market_rng, 0);
        info!(orders = seeded.len(), "market seeded with NPC liquidity");

        let blackmarket = BlackMarket::new(config.blackmarket, seed.derive(PURPOSE_BLACKMARKET).rng());
        let ghosts = GhostRegistry::new(seed, config.ghost);
        let intrusions = IntrusionTracker::new(config.intrusion);
        let scheduler = Scheduler::new(&config.scheduler);

        Self {
            config,
            world,
            ghosts,
            intrusions,
            market,
            blackmarket,
            players: HashMap::new(),
            pending_actions: Vec::new(),
            events,
            market_rng,
            scheduler,
            next_player_id: 1,
        }
    }

    /// Registers a player, claiming an NPC network as their home.
    pub fn register_player(&mut self, handle: &str) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;

        let home = self.claim_home_network(id);
        let address = format!("77.{}.{}.{}", (id >> 16) & 0xFF, (id >> 8) & 0xFF, id & 0xFF);
        self.players.insert(
            id,
            Player {
                id,
                handle: handle.to_owned(),
                address,
                online: true,
                account: Account::new(self.config.starting_credits),
                rig_integrity: MAX_RIG_INTEGRITY,
                home_network: home,
                location: home,
                session: None,
            },
        );
        info!(player = id, handle, home, "player registered");
        id
    }

    /// Claims the first NPC-owned ClearNet network (in cluster order)
    /// for a new player, falling back to any NPC network.
    fn claim_home_network(&mut self, player: PlayerId) -> NetworkId {
        let in_cluster_order = |want_clearnet: bool| {
            self.world
                .clusters()
                .iter()
                .flat_map(|c| c.networks.iter().copied())
                .find(|&id| {
                    self.world.network(id).map_or(false, |n| {
                        n.owner == Owner::Npc && (!want_clearnet || n.zone == Zone::ClearNet)
                    })
                })
        };
        let home = in_cluster_order(true)
            .or_else(|| in_cluster_order(false))
            .unwrap_or_default();
        if let Some(network) = self.world.network_mut(home) {
            network.owner = Owner::Player(player);
        }
        home
    }

    /// Marks a player online or offline. Going offline ends any open
    /// session the same way [`Self::disconnect_session`] does.
    pub fn set_online(&mut self, id: PlayerId, online: bool) {
        if !online {
            self.disconnect_session(id);
        }
        if let Some(player) = self.players.get_mut(&id) {
            player.online = online;
        }
    }

    /// Ends a player's open session. The attacker-side intrusion
    /// transitions to `escaped` — history is preserved, nothing is
    /// deleted.
    pub fn disconnect_session(&mut self, id: PlayerId) -> bool {
        let Some(player) = self.players.get_mut(&id) else {
            return false;
        };
        let Some(session) = player.session.take() else {
            return false;
        };
        self.pending_actions
            .retain(|a| !(a.player == id && a.network == session.network));
        if let Some(intrusion) = session.intrusion {
            self.intrusions.mark_escaped(intrusion);
        }
        true
    }

    /// Runs every scheduled task due at `now`, in deterministic order.
    pub fn pump(&mut self, now: SimTime) {
        for task in self.scheduler.advance(now) {
            ticks::run_task(self, task, now);
        }
    }

    /// The earliest time any scheduled task becomes due, for the
    /// real-time driver.
    #[must_use]
    pub fn next_tick_due(&self) -> Option<SimTime> {
        self.scheduler.next_due()
    }

    /// Spawns a ghost network immediately (admin/testing surface; the
    /// ghost sweep also spawns them on its own dice).
    pub fn spawn_ghost(&mut self, now: SimTime) -> NetworkId {
        let id = self.ghosts.spawn(&mut self.world, now);
        info!(network = id, "ghost network spawned");
        id
    }

    /// Looks up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Looks up a player mutably (rewards, admin grants, snapshot
    /// restore).
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// The generated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The order book.
    #[must_use]
    pub fn market(&self) -> &MarketEngine {
        &self.market
    }

    /// The intrusion registry.
    #[must_use]
    pub fn intrusion_tracker(&self) -> &IntrusionTracker {
        &self.intrusions
    }

    /// The configuration the simulation booted with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
