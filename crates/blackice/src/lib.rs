//! # BLACKICE Simulation Core
//!
//! The authoritative in-memory simulation of the BLACKICE world: one
//! process, one [`GameState`], mutated only by message handlers and
//! scheduled tick callbacks.
//!
//! ## Architecture
//!
//! ```text
//! transport (out of scope)
//!     │  Envelope in            Envelope out │  OutboundEvent
//!     ▼                                      │
//! handlers ──> GameState ──> subsystems      │
//!     ▲            │    (world/intrusions/   │
//!     │            │     market/ghosts)      │
//! Scheduler ───────┘                         ▼
//!  (ticks)                               EventBus
//! ```
//!
//! Because handlers and ticks never run concurrently, every operation is
//! atomic relative to all others; the only rule to preserve is that
//! escrow changes and credit changes are applied together or not at
//! all.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod events;
pub mod handlers;
pub mod player;
pub mod scheduler;
pub mod state;
pub mod ticks;

pub use config::{ActionConfig, ConfigError, GameConfig, SchedulerConfig};
pub use events::{EventBus, OutboundEvent};
pub use player::{Player, Session};
pub use scheduler::{Scheduler, TaskKind, TickDriver};
pub use state::{ActionKind, GameState, PendingAction};
