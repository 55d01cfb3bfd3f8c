//! # Intrusion & Counter-Measure Records
//!
//! One [`Intrusion`] is created when a player connects to a network with
//! a non-NPC owner, and is never deleted — terminal states preserve the
//! history without holding resources.

use blackice_shared::{IntrusionId, NetworkId, NodeId, PlayerId, SimTime};

/// Lifecycle state of an intrusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntrusionStatus {
    /// The attacker is connected and moving.
    Active,
    /// The attacker disconnected before being stopped.
    Escaped,
    /// The trace meter completed; the attacker was caught.
    Traced,
    /// Terminated by a lockdown program.
    Lockdown,
}

impl IntrusionStatus {
    /// Returns the wire identifier for this status.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Escaped => "escaped",
            Self::Traced => "traced",
            Self::Lockdown => "lockdown",
        }
    }
}

/// Defender counter-measure programs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Program {
    /// Reveal the attacker's identity to the defender.
    Backtrace,
    /// Queue fixed damage against the attacker's rig.
    CounterIce,
    /// Terminate every intrusion on the network and reject new ones
    /// for a time-boxed window.
    Lockdown,
    /// Corrupt every not-yet-downloaded file on the network.
    Purge,
}

impl Program {
    /// All programs, in display order.
    pub const ALL: [Self; 4] = [Self::Backtrace, Self::CounterIce, Self::Lockdown, Self::Purge];

    /// Returns the display name of this program.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Backtrace => "Backtrace",
            Self::CounterIce => "CounterICE",
            Self::Lockdown => "Lockdown",
            Self::Purge => "Purge",
        }
    }
}

/// Resolution state of a counter-measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterMeasureStatus {
    /// Timer still running.
    Active,
    /// Effect fired; never fires again.
    Completed,
}

/// A defender program running against one intrusion.
#[derive(Clone, Debug)]
pub struct CounterMeasure {
    /// The program being run.
    pub program: Program,
    /// Defender who launched it (charged its cost up front).
    pub defender: PlayerId,
    /// Launch time.
    pub started_at: SimTime,
    /// Fixed duration until the effect fires, ms.
    pub duration_ms: u64,
    /// Resolution state.
    pub status: CounterMeasureStatus,
}

impl CounterMeasure {
    /// Time at which the effect becomes due.
    #[must_use]
    pub const fn completes_at(&self) -> SimTime {
        self.started_at + self.duration_ms
    }
}

/// A live or historical intrusion record.
#[derive(Clone, Debug)]
pub struct Intrusion {
    /// Intrusion id.
    pub id: IntrusionId,
    /// Target network.
    pub network: NetworkId,
    /// Attacking player.
    pub attacker: PlayerId,
    /// Attacker's address as seen by defense programs.
    pub attacker_address: String,
    /// The attacker's current node. Updated as they move; the defender
    /// only ever sees the current value, never a history.
    pub current_node: NodeId,
    /// Connection time.
    pub started_at: SimTime,
    /// One-shot detection flag.
    pub detected: bool,
    /// Programs launched against this intrusion.
    pub counter_measures: Vec<CounterMeasure>,
    /// Lifecycle state.
    pub status: IntrusionStatus,
}

impl Intrusion {
    /// Returns true while the intrusion has not reached a terminal
    /// state.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == IntrusionStatus::Active
    }

    /// Returns true if an unresolved instance of `program` is running.
    #[must_use]
    pub fn has_active_program(&self, program: Program) -> bool {
        self.counter_measures
            .iter()
            .any(|cm| cm.program == program && cm.status == CounterMeasureStatus::Active)
    }
}
