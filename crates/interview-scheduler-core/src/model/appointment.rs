//! Bookable slots.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AppointmentId, AttendeeId, CompanyId, RoomId};
use crate::interval::TimeInterval;

/// The two appointment flavours. They differ only in how utility is
/// computed and in which candidate set gates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    /// One attendee with one room
    Interview,
    /// One of `capacity` parallel seats at a room's coffee chat
    CoffeeChat,
}

impl AppointmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentKind::Interview => "interview",
            AppointmentKind::CoffeeChat => "coffee chat",
        }
    }
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One bookable time slot at a room.
#[derive(Debug, Clone)]
pub struct Appointment {
    pub(crate) id: AppointmentId,
    pub(crate) room: RoomId,
    pub(crate) company: CompanyId,
    pub(crate) interval: TimeInterval,
    pub(crate) kind: AppointmentKind,
    pub(crate) attendee: Option<AttendeeId>,
}

impl Appointment {
    pub fn id(&self) -> AppointmentId {
        self.id
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn company(&self) -> CompanyId {
        self.company
    }

    pub fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    pub fn kind(&self) -> AppointmentKind {
        self.kind
    }

    pub fn is_coffee_chat(&self) -> bool {
        self.kind == AppointmentKind::CoffeeChat
    }

    pub fn attendee(&self) -> Option<AttendeeId> {
        self.attendee
    }

    pub fn is_empty(&self) -> bool {
        self.attendee.is_none()
    }

    /// Whether `attendee` currently occupies this slot.
    pub fn holds(&self, attendee: AttendeeId) -> bool {
        self.attendee == Some(attendee)
    }
}
