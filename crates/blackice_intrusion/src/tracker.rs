//! # Intrusion Tracker
//!
//! Owns every intrusion record, the detection-delay race and the
//! counter-measure timers. The tracker mutates only its own state; the
//! simulation applies the returned effects to players, networks and the
//! event stream so that each operation stays atomic at the handler
//! level.

use std::collections::HashMap;

use serde::Deserialize;

use blackice_procedural::{Ice, Network};
use blackice_shared::{IntrusionId, NetworkId, NodeId, PlayerId, SimTime};

use crate::error::{IntrusionError, IntrusionResult};
use crate::intrusion::{
    CounterMeasure, CounterMeasureStatus, Intrusion, IntrusionStatus, Program,
};

/// Cost and duration of one program.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ProgramSpec {
    /// Credits charged to the defender up front.
    pub cost: u64,
    /// Time until the effect fires, ms.
    pub duration_ms: u64,
}

/// Per-program balance table.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ProgramTable {
    /// Backtrace: reveal the attacker.
    pub backtrace: ProgramSpec,
    /// CounterICE: damage the attacker's rig.
    pub counter_ice: ProgramSpec,
    /// Lockdown: disconnect everyone, close the network.
    pub lockdown: ProgramSpec,
    /// Purge: destroy undownloaded files.
    pub purge: ProgramSpec,
}

impl ProgramTable {
    /// Looks up the spec for a program.
    #[must_use]
    pub const fn spec(&self, program: Program) -> ProgramSpec {
        match program {
            Program::Backtrace => self.backtrace,
            Program::CounterIce => self.counter_ice,
            Program::Lockdown => self.lockdown,
            Program::Purge => self.purge,
        }
    }
}

impl Default for ProgramTable {
    fn default() -> Self {
        Self {
            backtrace: ProgramSpec {
                cost: 150,
                duration_ms: 60_000,
            },
            counter_ice: ProgramSpec {
                cost: 250,
                duration_ms: 45_000,
            },
            lockdown: ProgramSpec {
                cost: 500,
                duration_ms: 30_000,
            },
            purge: ProgramSpec {
                cost: 200,
                duration_ms: 20_000,
            },
        }
    }
}

/// Intrusion subsystem configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct IntrusionConfig {
    /// Delay before the defender is alerted, ms.
    pub alert_delay_ms: u64,
    /// Counter-measure damage applied by CounterICE.
    pub counter_ice_damage: u32,
    /// Length of the lockdown window rejecting new intrusions, ms.
    pub lockdown_window_ms: u64,
    /// Base trace accrual rate (percent per second) before zone and ICE
    /// multipliers.
    pub base_trace_rate: f32,
    /// Program balance table.
    pub programs: ProgramTable,
}

impl Default for IntrusionConfig {
    fn default() -> Self {
        Self {
            alert_delay_ms: blackice_shared::constants::INTRUSION_ALERT_DELAY_MS,
            counter_ice_damage: 20,
            lockdown_window_ms: blackice_shared::constants::LOCKDOWN_WINDOW_MS,
            base_trace_rate: 1.0,
            programs: ProgramTable::default(),
        }
    }
}

/// A detection that fired during a sweep.
#[derive(Clone, Debug)]
pub struct Detection {
    /// The intrusion that crossed the alert delay.
    pub intrusion: IntrusionId,
    /// Target network (its owner receives the alert).
    pub network: NetworkId,
    /// Attacker's current node — the only position the defender learns.
    pub attacker_node: NodeId,
}

/// A counter-measure whose timer elapsed during a sweep.
///
/// The simulation applies the program's terminal effect.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// The intrusion the program ran against.
    pub intrusion: IntrusionId,
    /// Target network.
    pub network: NetworkId,
    /// The program that completed.
    pub program: Program,
    /// Defender who launched it.
    pub defender: PlayerId,
    /// Attacker of the intrusion.
    pub attacker: PlayerId,
    /// Attacker's address (for Backtrace reveals).
    pub attacker_address: String,
}

/// Everything that became due during one sweep.
#[derive(Clone, Debug, Default)]
pub struct SweepOutcome {
    /// Intrusions that flipped `detected` this sweep.
    pub detections: Vec<Detection>,
    /// Counter-measures that completed this sweep.
    pub resolutions: Vec<Resolution>,
}

/// Registry of all intrusions, live and historical.
pub struct IntrusionTracker {
    config: IntrusionConfig,
    intrusions: HashMap<IntrusionId, Intrusion>,
    by_network: HashMap<NetworkId, Vec<IntrusionId>>,
    next_id: IntrusionId,
}

impl IntrusionTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new(config: IntrusionConfig) -> Self {
        Self {
            config,
            intrusions: HashMap::new(),
            by_network: HashMap::new(),
            next_id: 1,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &IntrusionConfig {
        &self.config
    }

    /// Opens an intrusion for an attacker connecting to `network`.
    ///
    /// The caller has already established that the network has a non-NPC
    /// owner; NPC targets never create intrusions.
    ///
    /// # Errors
    ///
    /// [`IntrusionError::NetworkLockdown`] while the network's lockdown
    /// window is active.
    pub fn open(
        &mut self,
        network: &Network,
        attacker: PlayerId,
        attacker_address: String,
        now: SimTime,
    ) -> IntrusionResult<&Intrusion> {
        if network.in_lockdown(now) {
            return Err(IntrusionError::NetworkLockdown);
        }

        let id = self.next_id;
        self.next_id += 1;

        let intrusion = Intrusion {
            id,
            network: network.id,
            attacker,
            attacker_address,
            current_node: network.nodes.gateway_id(),
            started_at: now,
            detected: false,
            counter_measures: Vec::new(),
            status: IntrusionStatus::Active,
        };
        self.by_network.entry(network.id).or_default().push(id);
        self.intrusions.insert(id, intrusion);
        Ok(&self.intrusions[&id])
    }

    /// Looks up an intrusion.
    #[must_use]
    pub fn get(&self, id: IntrusionId) -> Option<&Intrusion> {
        self.intrusions.get(&id)
    }

    /// Active intrusions against one network, oldest first.
    #[must_use]
    pub fn active_on_network(&self, network: NetworkId) -> Vec<&Intrusion> {
        self.by_network
            .get(&network)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.intrusions.get(id))
                    .filter(|i| i.is_active())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Updates the attacker's current node as they move.
    pub fn set_current_node(&mut self, id: IntrusionId, node: NodeId) {
        if let Some(intrusion) = self.intrusions.get_mut(&id) {
            if intrusion.is_active() {
                intrusion.current_node = node;
            }
        }
    }

    /// Transitions an active intrusion to `escaped` (attacker
    /// disconnected). Terminal; no-op if already terminal.
    pub fn mark_escaped(&mut self, id: IntrusionId) {
        if let Some(intrusion) = self.intrusions.get_mut(&id) {
            if intrusion.is_active() {
                intrusion.status = IntrusionStatus::Escaped;
            }
        }
    }

    /// Transitions an active intrusion to `traced` (trace meter
    /// completed, owned by the player connection).
    pub fn mark_traced(&mut self, id: IntrusionId) {
        if let Some(intrusion) = self.intrusions.get_mut(&id) {
            if intrusion.is_active() {
                intrusion.status = IntrusionStatus::Traced;
            }
        }
    }

    /// Launches a program against an intrusion.
    ///
    /// The caller charges the program's cost up front and refunds it if
    /// this returns an error.
    ///
    /// # Errors
    ///
    /// [`IntrusionError::NotFound`], [`IntrusionError::NotActive`], or
    /// [`IntrusionError::DuplicateProgram`] when one instance of the
    /// program is already running.
    pub fn apply_program(
        &mut self,
        id: IntrusionId,
        program: Program,
        defender: PlayerId,
        now: SimTime,
    ) -> IntrusionResult<&CounterMeasure> {
        let spec = self.config.programs.spec(program);
        let intrusion = self
            .intrusions
            .get_mut(&id)
            .ok_or(IntrusionError::NotFound)?;
        if !intrusion.is_active() {
            return Err(IntrusionError::NotActive);
        }
        if intrusion.has_active_program(program) {
            return Err(IntrusionError::DuplicateProgram {
                program: program.name(),
            });
        }

        intrusion.counter_measures.push(CounterMeasure {
            program,
            defender,
            started_at: now,
            duration_ms: spec.duration_ms,
            status: CounterMeasureStatus::Active,
        });
        Ok(intrusion
            .counter_measures
            .last()
            .expect("just pushed"))
    }

    /// Oldest active intrusion on a network, for network-targeted
    /// programs.
    ///
    /// # Errors
    ///
    /// [`IntrusionError::NoActiveIntrusions`] when the network has none.
    pub fn oldest_active_on(&self, network: NetworkId) -> IntrusionResult<IntrusionId> {
        self.active_on_network(network)
            .first()
            .map(|i| i.id)
            .ok_or(IntrusionError::NoActiveIntrusions)
    }

    /// Terminates every active intrusion on a network with the
    /// `lockdown` status. Returns the terminated records' (id, attacker)
    /// pairs so the simulation can notify and relocate the attackers.
    pub fn terminate_all_on(&mut self, network: NetworkId) -> Vec<(IntrusionId, PlayerId)> {
        let ids = self.by_network.get(&network).cloned().unwrap_or_default();
        let mut terminated = Vec::new();
        for id in ids {
            if let Some(intrusion) = self.intrusions.get_mut(&id) {
                if intrusion.is_active() {
                    intrusion.status = IntrusionStatus::Lockdown;
                    terminated.push((id, intrusion.attacker));
                }
            }
        }
        terminated
    }

    /// The fixed-interval sweep: flips due detections and completes due
    /// counter-measures.
    ///
    /// Completion latency is bounded by the sweep interval — an effect
    /// fires on the first sweep at or after `started_at + duration`.
    pub fn sweep(&mut self, now: SimTime) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();

        let mut ids: Vec<IntrusionId> = self.intrusions.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            let Some(intrusion) = self.intrusions.get_mut(&id) else {
                continue;
            };
            if !intrusion.is_active() {
                continue;
            }

            // One-shot detection.
            if !intrusion.detected
                && now.saturating_sub(intrusion.started_at) >= self.config.alert_delay_ms
            {
                intrusion.detected = true;
                outcome.detections.push(Detection {
                    intrusion: id,
                    network: intrusion.network,
                    attacker_node: intrusion.current_node,
                });
            }

            // Counter-measures complete exactly once.
            for cm in &mut intrusion.counter_measures {
                if cm.status == CounterMeasureStatus::Active && now >= cm.completes_at() {
                    cm.status = CounterMeasureStatus::Completed;
                    outcome.resolutions.push(Resolution {
                        intrusion: id,
                        network: intrusion.network,
                        program: cm.program,
                        defender: cm.defender,
                        attacker: intrusion.attacker,
                        attacker_address: intrusion.attacker_address.clone(),
                    });
                }
            }
        }

        outcome
    }

    /// Derives the effective trace rate for a network: base rate scaled
    /// by the zone multiplier, plus the boost of every unbreached
    /// Tracker ICE.
    #[must_use]
    pub fn trace_rate(&self, network: &Network) -> f32 {
        let ice_boost: f32 = network
            .nodes
            .nodes()
            .filter(|n| !n.breached)
            .filter_map(|n| n.ice.as_ref().map(Ice::trace_boost))
            .sum();
        self.config.base_trace_rate * network.trace_mult + ice_boost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackice_procedural::{WorldGenerator, WorldSeed};

    fn player_network() -> Network {
        let world = WorldGenerator::new(WorldSeed::new(42)).generate();
        let id = world.clusters()[0].networks[0];
        world.network(id).unwrap().clone()
    }

    fn tracker() -> IntrusionTracker {
        IntrusionTracker::new(IntrusionConfig::default())
    }

    #[test]
    fn test_open_starts_at_gateway() {
        let network = player_network();
        let mut tracker = tracker();
        let intrusion = tracker.open(&network, 7, "10.1.2.3".into(), 1_000).unwrap();
        assert_eq!(intrusion.current_node, network.nodes.gateway_id());
        assert_eq!(intrusion.status, IntrusionStatus::Active);
        assert!(!intrusion.detected);
    }

    #[test]
    fn test_detection_fires_only_after_delay() {
        let network = player_network();
        let mut tracker = tracker();
        let delay = tracker.config().alert_delay_ms;
        let id = tracker
            .open(&network, 7, "10.1.2.3".into(), 1_000)
            .unwrap()
            .id;

        // Just before the delay: nothing.
        let outcome = tracker.sweep(1_000 + delay - 1);
        assert!(outcome.detections.is_empty());
        assert!(!tracker.get(id).unwrap().detected);

        // At the delay: exactly one detection.
        let outcome = tracker.sweep(1_000 + delay);
        assert_eq!(outcome.detections.len(), 1);
        assert_eq!(outcome.detections[0].intrusion, id);
        assert!(tracker.get(id).unwrap().detected);

        // One-shot: never again.
        let outcome = tracker.sweep(1_000 + delay * 2);
        assert!(outcome.detections.is_empty());
    }

    #[test]
    fn test_duplicate_program_rejected() {
        let network = player_network();
        let mut tracker = tracker();
        let id = tracker.open(&network, 7, "10.1.2.3".into(), 0).unwrap().id;

        tracker
            .apply_program(id, Program::Backtrace, 99, 0)
            .unwrap();
        let duplicate = tracker.apply_program(id, Program::Backtrace, 99, 5_000);
        assert!(matches!(
            duplicate,
            Err(IntrusionError::DuplicateProgram { .. })
        ));

        // A different program is fine.
        tracker
            .apply_program(id, Program::CounterIce, 99, 5_000)
            .unwrap();
    }

    #[test]
    fn test_program_resolves_once_on_sweep() {
        let network = player_network();
        let mut tracker = tracker();
        let id = tracker.open(&network, 7, "10.1.2.3".into(), 0).unwrap().id;
        tracker
            .apply_program(id, Program::Backtrace, 99, 0)
            .unwrap();
        let duration = tracker.config().programs.backtrace.duration_ms;

        assert!(tracker.sweep(duration - 1).resolutions.is_empty());

        let outcome = tracker.sweep(duration);
        assert_eq!(outcome.resolutions.len(), 1);
        assert_eq!(outcome.resolutions[0].program, Program::Backtrace);
        assert_eq!(outcome.resolutions[0].defender, 99);

        // Completed: never fires again.
        assert!(tracker.sweep(duration * 2).resolutions.is_empty());

        // And can be re-applied now that the first completed.
        tracker
            .apply_program(id, Program::Backtrace, 99, duration * 2)
            .unwrap();
    }

    #[test]
    fn test_terminate_all_marks_lockdown() {
        let network = player_network();
        let mut tracker = tracker();
        let a = tracker.open(&network, 7, "10.1.2.3".into(), 0).unwrap().id;
        let b = tracker.open(&network, 8, "10.9.9.9".into(), 0).unwrap().id;

        let terminated = tracker.terminate_all_on(network.id);
        assert_eq!(terminated.len(), 2);
        assert_eq!(tracker.get(a).unwrap().status, IntrusionStatus::Lockdown);
        assert_eq!(tracker.get(b).unwrap().status, IntrusionStatus::Lockdown);
        assert!(tracker.active_on_network(network.id).is_empty());
    }

    #[test]
    fn test_open_rejected_during_lockdown() {
        let mut network = player_network();
        network.lockdown_until = Some(10_000);
        let mut tracker = tracker();

        assert_eq!(
            tracker
                .open(&network, 7, "10.1.2.3".into(), 5_000)
                .err(),
            Some(IntrusionError::NetworkLockdown)
        );
        // Window elapsed: accepted again.
        assert!(tracker.open(&network, 7, "10.1.2.3".into(), 10_000).is_ok());
    }

    #[test]
    fn test_trace_rate_scales_with_zone_and_tracker_ice() {
        use blackice_procedural::Ice;

        let mut network = player_network();
        let tracker = tracker();
        let base = tracker.config().base_trace_rate;

        // Strip ICE: rate is the pure zone-scaled base.
        for node in network.nodes.nodes_mut() {
            node.ice = None;
        }
        let bare = tracker.trace_rate(&network);
        assert!((bare - base * network.trace_mult).abs() < f32::EPSILON);

        // An unbreached Tracker adds its boost.
        if let Some(node) = network.nodes.node_mut(1) {
            node.breached = false;
            node.ice = Some(Ice::Tracker {
                strength: 30,
                trace_boost: 0.75,
            });
        }
        assert!((tracker.trace_rate(&network) - (bare + 0.75)).abs() < f32::EPSILON);

        // Breaching it silences the boost.
        if let Some(node) = network.nodes.node_mut(1) {
            node.breached = true;
        }
        assert!((tracker.trace_rate(&network) - bare).abs() < f32::EPSILON);
    }

    #[test]
    fn test_escaped_preserves_history() {
        let network = player_network();
        let mut tracker = tracker();
        let id = tracker.open(&network, 7, "10.1.2.3".into(), 0).unwrap().id;

        tracker.mark_escaped(id);
        let intrusion = tracker.get(id).unwrap();
        assert_eq!(intrusion.status, IntrusionStatus::Escaped);

        // Terminal: traced cannot overwrite escaped.
        tracker.mark_traced(id);
        assert_eq!(tracker.get(id).unwrap().status, IntrusionStatus::Escaped);
    }
}
