//! Entity graph for one event.
//!
//! All entities live in flat arenas owned by [`Schedule`] and refer to each
//! other through typed ids. Ids are only minted by
//! [`ScheduleBuilder`](crate::ScheduleBuilder), so an id obtained from a
//! schedule always indexes that schedule. Externally supplied ids go through
//! the `get_*` lookups instead.

mod appointment;
mod attendee;
mod company;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use appointment::{Appointment, AppointmentKind};
pub use attendee::Attendee;
pub use company::{CoffeeChat, Company, CompanyRoom};

use crate::interval::TimeInterval;
use crate::swap::SwapConflict;
use crate::utility::UtilityModel;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position in the owning arena.
            pub fn index(&self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " #{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Index of an [`Attendee`].
    AttendeeId,
    "attendee"
);
arena_id!(
    /// Index of a [`Company`].
    CompanyId,
    "company"
);
arena_id!(
    /// Index of a [`CompanyRoom`].
    RoomId,
    "room"
);
arena_id!(
    /// Index of an [`Appointment`].
    AppointmentId,
    "appointment"
);

/// The entity graph plus its utility model.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub(crate) event_times: Vec<TimeInterval>,
    pub(crate) companies: Vec<Company>,
    pub(crate) rooms: Vec<CompanyRoom>,
    pub(crate) attendees: Vec<Attendee>,
    pub(crate) appointments: Vec<Appointment>,
    pub(crate) utility: UtilityModel,
}

impl Schedule {
    pub fn event_times(&self) -> &[TimeInterval] {
        &self.event_times
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn rooms(&self) -> &[CompanyRoom] {
        &self.rooms
    }

    pub fn attendees(&self) -> &[Attendee] {
        &self.attendees
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn utility_model(&self) -> &UtilityModel {
        &self.utility
    }

    pub fn company(&self, id: CompanyId) -> &Company {
        &self.companies[id.0]
    }

    pub fn room(&self, id: RoomId) -> &CompanyRoom {
        &self.rooms[id.0]
    }

    pub fn attendee(&self, id: AttendeeId) -> &Attendee {
        &self.attendees[id.0]
    }

    pub fn appointment(&self, id: AppointmentId) -> &Appointment {
        &self.appointments[id.0]
    }

    pub fn get_appointment(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.get(id.0)
    }

    pub fn get_attendee(&self, id: AttendeeId) -> Option<&Attendee> {
        self.attendees.get(id.0)
    }

    pub fn find_company(&self, name: &str) -> Option<CompanyId> {
        self.companies.iter().find(|c| c.name == name).map(|c| c.id)
    }

    pub fn find_room(&self, name: &str) -> Option<RoomId> {
        self.rooms.iter().find(|r| r.name == name).map(|r| r.id)
    }

    /// Look up an attendee by external key.
    pub fn find_attendee(&self, key: &str) -> Option<AttendeeId> {
        self.attendees.iter().find(|a| a.key == key).map(|a| a.id)
    }

    /// The appointment of `room` starting at `start` with the given kind.
    ///
    /// For coffee chats the first empty seat is preferred, then the first seat.
    pub fn find_appointment(
        &self,
        room: RoomId,
        start: chrono::NaiveDateTime,
        kind: AppointmentKind,
    ) -> Option<AppointmentId> {
        let mut matching = self.rooms[room.0]
            .appointments
            .iter()
            .map(|id| &self.appointments[id.0])
            .filter(|app| app.kind == kind && app.interval.start() == start);
        let first = matching.next()?;
        if first.is_empty() {
            return Some(first.id);
        }
        Some(matching.find(|app| app.is_empty()).map_or(first.id, |app| app.id))
    }

    /// All appointments of `kind` at `company`, in room order.
    pub fn company_appointments(
        &self,
        company: CompanyId,
        kind: AppointmentKind,
    ) -> impl Iterator<Item = &Appointment> + '_ {
        self.companies[company.0]
            .rooms
            .iter()
            .flat_map(move |room| self.rooms[room.0].appointments.iter())
            .map(move |id| &self.appointments[id.0])
            .filter(move |app| app.kind == kind)
    }

    /// Appointments currently held by `attendee`.
    pub fn appointments_of(&self, attendee: AttendeeId) -> impl Iterator<Item = &Appointment> + '_ {
        self.appointments.iter().filter(move |app| app.holds(attendee))
    }

    pub fn room_wants(&self, room: RoomId, attendee: AttendeeId, kind: AppointmentKind) -> bool {
        self.rooms[room.0].wants_attendee(attendee, kind)
    }

    /// Whether any room of `company` wants `attendee` for `kind`.
    pub fn company_wants(
        &self,
        company: CompanyId,
        attendee: AttendeeId,
        kind: AppointmentKind,
    ) -> bool {
        self.companies[company.0]
            .rooms
            .iter()
            .any(|room| self.room_wants(*room, attendee, kind))
    }

    /// The appointment of `kind` at `company` held by `attendee`, skipping `ignore`.
    pub fn company_has(
        &self,
        company: CompanyId,
        attendee: AttendeeId,
        kind: AppointmentKind,
        ignore: Option<AppointmentId>,
    ) -> Option<AppointmentId> {
        self.company_appointments(company, kind)
            .find(|app| app.holds(attendee) && Some(app.id) != ignore)
            .map(|app| app.id)
    }

    /// Utility of `attendee` sitting in `appointment`; lower is better.
    ///
    /// `None` yields the empty sentinel.
    pub fn utility(&self, appointment: AppointmentId, attendee: Option<AttendeeId>) -> u64 {
        let Some(attendee) = attendee else {
            return self.utility.empty();
        };
        let app = &self.appointments[appointment.0];
        let rank = self.attendees[attendee.0].rank_for(app.company);
        match app.kind {
            AppointmentKind::Interview => self.utility.interview(rank),
            AppointmentKind::CoffeeChat => {
                let room_rank = self.rooms[app.room.0]
                    .coffee_chat
                    .as_ref()
                    .map_or(u32::MAX, |chat| {
                        chat.room_rank(attendee)
                            .unwrap_or(chat.candidates.len() as u32 + 1)
                    });
                self.utility.coffee_chat(room_rank, rank)
            }
        }
    }

    /// Utility of the current occupant of `appointment`.
    pub fn occupied_utility(&self, appointment: AppointmentId) -> u64 {
        self.utility(appointment, self.appointments[appointment.0].attendee)
    }

    pub fn empty_utility(&self) -> u64 {
        self.utility.empty()
    }

    /// Audit every occupancy invariant without the intersection index.
    ///
    /// Each offending pair is reported once, on the later appointment.
    pub fn violations(&self) -> Vec<SwapConflict> {
        let mut found = Vec::new();
        for app in &self.appointments {
            let Some(attendee) = app.attendee else {
                continue;
            };
            if !self.room_wants(app.room, attendee, app.kind) {
                found.push(SwapConflict::NotWanted {
                    attendee,
                    appointment: app.id,
                });
            }
            if let Some(commitment) = self.attendees[attendee.0].busy_during(&app.interval) {
                found.push(SwapConflict::PersonalBreak {
                    attendee,
                    appointment: app.id,
                    commitment: *commitment,
                });
            }
            for earlier in self.appointments[..app.id.0].iter().filter(|o| o.holds(attendee)) {
                if earlier.interval.is_intersecting(&app.interval) {
                    found.push(SwapConflict::TimeConflict {
                        attendee,
                        appointment: app.id,
                        existing: earlier.id,
                    });
                } else if earlier.company == app.company && earlier.kind == app.kind {
                    found.push(SwapConflict::AlreadyAtCompany {
                        attendee,
                        appointment: app.id,
                        existing: earlier.id,
                    });
                }
            }
        }
        found
    }
}
