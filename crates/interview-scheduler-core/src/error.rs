//! Core error types for interview-scheduler-core.
//!
//! Construction problems (intervals, the builder) are reported when the
//! graph is assembled. Once a [`Schedule`](crate::Schedule) exists, the only
//! failures left are swap errors and malformed swap requests.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::model::{AppointmentId, AttendeeId};
use crate::swap::{SwapConflict, SwapSide};

/// Core error type for interview-scheduler-core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed or inverted time interval
    #[error("Interval error: {0}")]
    Interval(#[from] IntervalError),

    /// Inconsistent input handed to the builder
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// A swap that would break an invariant
    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),

    /// Malformed external swap request
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Time interval construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// One of the timestamps could not be parsed
    #[error("invalid iso format dates: '{start}' and '{end}'")]
    Format { start: String, end: String },

    /// Start is not strictly before end
    #[error("invalid dates: start date ({start}) is not smaller than end date ({end})")]
    Range {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Slot length must be positive
    #[error("slot length must be positive, got {minutes} minutes")]
    NonPositiveLength { minutes: i64 },
}

/// Errors raised while assembling a schedule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("duplicate company name: {0}")]
    DuplicateCompany(String),

    #[error("duplicate room name: {0}")]
    DuplicateRoom(String),

    #[error("duplicate attendee id: {0}")]
    DuplicateAttendee(String),

    #[error("unknown company: {0}")]
    UnknownCompany(String),

    #[error("unknown attendee: {0}")]
    UnknownAttendee(String),

    #[error("unknown room: {0}")]
    UnknownRoom(String),

    #[error("room '{room}' already has a coffee chat")]
    DuplicateCoffeeChat { room: String },

    #[error("coffee chat of room '{room}' must have a capacity of at least 1")]
    ZeroCapacity { room: String },

    #[error("preference of attendee '{attendee}' for '{company}' must be at least 1")]
    InvalidRank { attendee: String, company: String },

    /// A mandatory table is empty
    #[error("a mandatory table ({0}) is empty")]
    EmptyTable(&'static str),
}

/// Errors raised by the swap primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// `swap` was called with an occupant that fails its own check.
    #[error("tried to place {attendee} into {appointment}, which violates: {reason}")]
    Invariant {
        appointment: AppointmentId,
        attendee: AttendeeId,
        reason: String,
    },

    /// An external request is well formed but breaks a constraint.
    #[error("Could not swap ({side} side): {reason}")]
    Rejected {
        side: SwapSide,
        reason: String,
        conflict: SwapConflict,
    },

    /// The intersection index was built for a different appointment set.
    #[error("intersection index covers {indexed} appointments but the schedule has {actual}")]
    StaleIndex { indexed: usize, actual: usize },
}

/// Malformed external swap requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the {0} side of the swap names neither an appointment nor an attendee")]
    EmptySide(SwapSide),

    #[error("must be at least one appointment")]
    NoAppointment,

    #[error("must be at least one attendee")]
    NoAttendee,

    #[error("both sides of the swap name the same attendee ({0})")]
    SameAttendee(String),

    #[error("if an appointment and attendee are given, the appointment must be held by that attendee: {appointment} is held by {actual}, not {expected}")]
    OccupantMismatch {
        appointment: String,
        expected: String,
        actual: String,
    },

    #[error("unknown appointment: {0}")]
    UnknownAppointment(AppointmentId),

    #[error("unknown attendee: {0}")]
    UnknownAttendee(AttendeeId),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
