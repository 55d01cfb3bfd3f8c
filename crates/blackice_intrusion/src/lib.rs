//! # BLACKICE Intrusion Tracking
//!
//! Models the asymmetric race between an attacker traversing a network's
//! node graph and a defender who may notice and respond.
//!
//! ## State machine
//!
//! ```text
//! active ──┬──> escaped   (attacker disconnected)
//!          ├──> traced    (trace meter reached 100%)
//!          └──> lockdown  (terminated by a lockdown program)
//! ```
//!
//! Detection is a separate one-shot flag on the active state: once the
//! elapsed time crosses the alert delay, the defender learns the
//! attacker's *current* node — never the position history.
//!
//! Counter-measure effects are resolved by the fixed-interval sweep, so
//! completion latency is bounded by the tick period, not exact to the
//! millisecond. That is intentional.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod intrusion;
pub mod tracker;

pub use error::{IntrusionError, IntrusionResult};
pub use intrusion::{CounterMeasure, CounterMeasureStatus, Intrusion, IntrusionStatus, Program};
pub use tracker::{
    Detection, IntrusionConfig, IntrusionTracker, ProgramSpec, ProgramTable, Resolution,
    SweepOutcome,
};
