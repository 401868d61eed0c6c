//! People seeking appointments.

use std::collections::HashMap;

use super::{AttendeeId, CompanyId};
use crate::interval::TimeInterval;

/// An attendee with ranked company preferences and personal busy intervals.
///
/// Ranks follow the "lower is better" convention: rank 1 is the favourite
/// company. Companies the attendee did not rank fall back to the schedule's
/// unranked default, see [`UtilityModel`](crate::UtilityModel).
#[derive(Debug, Clone)]
pub struct Attendee {
    pub(crate) id: AttendeeId,
    pub(crate) key: String,
    pub(crate) name: String,
    pub(crate) preferences: HashMap<CompanyId, u32>,
    pub(crate) commitments: Vec<TimeInterval>,
}

impl Attendee {
    pub fn id(&self) -> AttendeeId {
        self.id
    }

    /// External identifier (badge or member number).
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit rank for `company`, if the attendee gave one.
    pub fn rank_for(&self, company: CompanyId) -> Option<u32> {
        self.preferences.get(&company).copied()
    }

    pub fn preferences(&self) -> &HashMap<CompanyId, u32> {
        &self.preferences
    }

    pub fn commitments(&self) -> &[TimeInterval] {
        &self.commitments
    }

    /// The first commitment overlapping `interval`, if any.
    pub fn busy_during(&self, interval: &TimeInterval) -> Option<&TimeInterval> {
        interval.first_overlap(&self.commitments)
    }
}
