//! # Operations Rule Engine
//!
//! Business rules evaluated over an immutable roster [`Snapshot`]:
//!
//! - weather compatibility between drone ratings and mission forecasts
//! - pilot and drone availability over half-open date ranges
//! - conflict detection (double bookings, mismatches, overruns)
//! - pilot cost estimation
//! - first-match reassignment candidate search
//!
//! Every entry point takes the snapshot as an argument; nothing here reads
//! ambient state or performs I/O.
//!
//! [`Snapshot`]: ops_domain::Snapshot

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod availability;
pub mod candidates;
pub mod conflicts;
pub mod cost;
pub mod error;
pub mod matching;
pub mod policy;
pub mod weather;

pub use availability::{Schedulable, is_available, is_available_excluding};
pub use candidates::{find_candidates, is_eligible};
pub use conflicts::{ConflictSummary, conflicts_for_mission, detect_conflicts};
pub use cost::estimate_cost;
pub use error::{EngineError, Result};
pub use policy::SeverityPolicy;
pub use weather::can_operate;
