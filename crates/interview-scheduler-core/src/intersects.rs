//! Precomputed "who overlaps whom" index.

use std::collections::HashMap;

use crate::error::SwapError;
use crate::interval::{TimeInterval, TimeKey};
use crate::model::{AppointmentId, AttendeeId, Schedule};

/// Maps every distinct slot span to all appointments overlapping it.
///
/// Derived data: rebuild it whenever the set of appointments changes.
/// Occupancy changes do not invalidate it.
#[derive(Debug, Clone, Default)]
pub struct AppointmentIntersects {
    apps_at_time: HashMap<TimeKey, Vec<AppointmentId>>,
    appointment_count: usize,
}

impl AppointmentIntersects {
    pub fn new(schedule: &Schedule) -> Self {
        let appointments = schedule.appointments();
        let mut keys: Vec<TimeKey> = appointments.iter().map(|app| app.interval().key()).collect();
        keys.sort();
        keys.dedup();

        let apps_at_time = keys
            .into_iter()
            .map(|key| {
                let span = TimeInterval::from(key);
                let overlapping = appointments
                    .iter()
                    .filter(|app| app.interval().is_intersecting(&span))
                    .map(|app| app.id())
                    .collect();
                (key, overlapping)
            })
            .collect();

        Self {
            apps_at_time,
            appointment_count: appointments.len(),
        }
    }

    pub fn appointment_count(&self) -> usize {
        self.appointment_count
    }

    /// Fail when the index was built for a different appointment set.
    pub fn ensure_current(&self, schedule: &Schedule) -> Result<(), SwapError> {
        let actual = schedule.appointments().len();
        if actual != self.appointment_count {
            return Err(SwapError::StaleIndex {
                indexed: self.appointment_count,
                actual,
            });
        }
        Ok(())
    }

    /// Appointments overlapping `key`. Empty for unknown spans.
    pub fn overlapping(&self, key: &TimeKey) -> &[AppointmentId] {
        self.apps_at_time.get(key).map_or(&[], Vec::as_slice)
    }

    /// Appointments overlapping `appointment`, excluding itself.
    pub fn others_at<'a>(
        &'a self,
        schedule: &Schedule,
        appointment: AppointmentId,
    ) -> impl Iterator<Item = AppointmentId> + 'a {
        let key = schedule.appointment(appointment).interval().key();
        self.overlapping(&key)
            .iter()
            .copied()
            .filter(move |other| *other != appointment)
    }

    /// Another appointment overlapping `appointment` held by `attendee`.
    pub fn conflicting_appointment(
        &self,
        schedule: &Schedule,
        attendee: AttendeeId,
        appointment: AppointmentId,
    ) -> Option<AppointmentId> {
        self.others_at(schedule, appointment)
            .find(|other| schedule.appointment(*other).holds(attendee))
    }

    pub fn has_conflict(
        &self,
        schedule: &Schedule,
        attendee: AttendeeId,
        appointment: AppointmentId,
    ) -> bool {
        self.conflicting_appointment(schedule, attendee, appointment)
            .is_some()
    }

    /// Number of other empty appointments overlapping `appointment`.
    pub fn empty_overlaps(&self, schedule: &Schedule, appointment: AppointmentId) -> usize {
        self.others_at(schedule, appointment)
            .filter(|other| schedule.appointment(*other).is_empty())
            .count()
    }
}
