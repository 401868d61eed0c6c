//! Companies, their rooms and coffee chats.

use std::collections::BTreeSet;

use super::{AppointmentId, AppointmentKind, AttendeeId, CompanyId, RoomId};
use crate::interval::TimeInterval;

/// An organization offering one or more rooms.
#[derive(Debug, Clone)]
pub struct Company {
    pub(crate) id: CompanyId,
    pub(crate) name: String,
    pub(crate) rooms: Vec<RoomId>,
}

impl Company {
    pub fn id(&self) -> CompanyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }
}

/// An interview room with its own slots and candidate pool.
#[derive(Debug, Clone)]
pub struct CompanyRoom {
    pub(crate) id: RoomId,
    pub(crate) name: String,
    pub(crate) company: CompanyId,
    pub(crate) candidates: BTreeSet<AttendeeId>,
    /// Interview and coffee-chat slots, sorted by start time.
    pub(crate) appointments: Vec<AppointmentId>,
    pub(crate) interview_slots: usize,
    pub(crate) coffee_chat: Option<CoffeeChat>,
}

impl CompanyRoom {
    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn company(&self) -> CompanyId {
        self.company
    }

    /// Candidates for interview slots.
    pub fn candidates(&self) -> &BTreeSet<AttendeeId> {
        &self.candidates
    }

    pub fn appointments(&self) -> &[AppointmentId] {
        &self.appointments
    }

    pub fn interview_slot_count(&self) -> usize {
        self.interview_slots
    }

    pub fn coffee_chat(&self) -> Option<&CoffeeChat> {
        self.coffee_chat.as_ref()
    }

    /// Whether this room accepts `attendee` for slots of `kind`.
    pub fn wants_attendee(&self, attendee: AttendeeId, kind: AppointmentKind) -> bool {
        match kind {
            AppointmentKind::Interview => self.candidates.contains(&attendee),
            AppointmentKind::CoffeeChat => self
                .coffee_chat
                .as_ref()
                .is_some_and(|chat| chat.wants_attendee(attendee)),
        }
    }
}

/// A capacity-bounded group session held by a room at a fixed time.
#[derive(Debug, Clone)]
pub struct CoffeeChat {
    pub(crate) interval: TimeInterval,
    pub(crate) capacity: u32,
    /// Ordered by the room's preference, most wanted first.
    pub(crate) candidates: Vec<AttendeeId>,
    pub(crate) appointments: Vec<AppointmentId>,
}

impl CoffeeChat {
    pub fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn candidates(&self) -> &[AttendeeId] {
        &self.candidates
    }

    pub fn appointments(&self) -> &[AppointmentId] {
        &self.appointments
    }

    pub fn wants_attendee(&self, attendee: AttendeeId) -> bool {
        self.candidates.contains(&attendee)
    }

    /// The room's 1-based rank of `attendee`.
    pub fn room_rank(&self, attendee: AttendeeId) -> Option<u32> {
        self.candidates
            .iter()
            .position(|candidate| *candidate == attendee)
            .map(|index| index as u32 + 1)
    }
}
