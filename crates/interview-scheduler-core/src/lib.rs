//! # Interview Scheduler Core Library
//!
//! Assigns attendees to interview and coffee-chat slots offered by companies
//! at a multi-day event. Hard constraints (no double booking, personal
//! breaks, one slot per company and kind, candidate sets) always hold; within
//! them a local-search heuristic lowers the preference-weighted utility.
//!
//! ## Architecture
//!
//! - **Model**: an arena of attendees, companies, rooms and appointments
//!   addressed by typed ids, built through [`ScheduleBuilder`]
//! - **Index**: [`AppointmentIntersects`] maps every slot span to all
//!   appointments overlapping it
//! - **Swap primitive**: the only code that changes occupancy, validating a
//!   whole plan before committing it
//! - **Scheduler**: greedy fill, pairwise exchange and compaction, run by
//!   [`Scheduler::run`]
//! - **Manual swaps**: [`try_swap`] for externally requested exchanges
//!
//! The core installs no `tracing` subscriber; callers decide where phase
//! events go, or pass a [`PhaseObserver`].

pub mod builder;
pub mod error;
pub mod intersects;
pub mod interval;
pub mod manual_swap;
pub mod model;
pub mod scheduler;
pub mod slots;
pub mod summary;
pub mod swap;
pub mod utility;

pub use builder::ScheduleBuilder;
pub use error::{BuildError, CoreError, IntervalError, Result, SwapError, ValidationError};
pub use intersects::AppointmentIntersects;
pub use interval::{parse_timestamp, TimeInterval, TimeKey};
pub use manual_swap::{try_swap, try_swap_with, SwapRequest, SwapRequestSide};
pub use model::{
    Appointment, AppointmentId, AppointmentKind, Attendee, AttendeeId, CoffeeChat, Company,
    CompanyId, CompanyRoom, RoomId, Schedule,
};
pub use scheduler::{Phase, PhaseObserver, PhaseReport, RunReport, Scheduler, SchedulerConfig};
pub use slots::generate_slots;
pub use summary::ScheduleSummary;
pub use swap::{Reassignment, SwapConflict, SwapSide};
pub use utility::{UtilityModel, DEFAULT_EMPTY_UTILITY};
