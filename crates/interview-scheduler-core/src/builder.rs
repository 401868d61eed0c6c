//! Assembles a validated [`Schedule`] from plain inputs.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::BuildError;
use crate::interval::TimeInterval;
use crate::model::{
    Appointment, AppointmentId, AppointmentKind, Attendee, AttendeeId, CoffeeChat, Company,
    CompanyId, CompanyRoom, RoomId, Schedule,
};
use crate::utility::{UtilityModel, DEFAULT_EMPTY_UTILITY};

#[derive(Debug, Clone)]
struct RoomDraft {
    name: String,
    company: CompanyId,
    slots: Vec<TimeInterval>,
    candidates: BTreeSet<AttendeeId>,
    coffee_chat: Option<CoffeeDraft>,
}

#[derive(Debug, Clone)]
struct CoffeeDraft {
    interval: TimeInterval,
    capacity: u32,
    candidates: Vec<AttendeeId>,
}

/// Incrementally collects companies, rooms and attendees.
///
/// Names are unique per table (room names across all companies). Ids handed
/// out by the builder stay valid in the built [`Schedule`].
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    event_times: Vec<TimeInterval>,
    companies: Vec<Company>,
    rooms: Vec<RoomDraft>,
    attendees: Vec<Attendee>,
    unranked_rank: Option<u32>,
    empty_utility: u64,
}

impl Default for ScheduleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self {
            event_times: Vec::new(),
            companies: Vec::new(),
            rooms: Vec::new(),
            attendees: Vec::new(),
            unranked_rank: None,
            empty_utility: DEFAULT_EMPTY_UTILITY,
        }
    }

    /// Record one day (or block) of the event.
    pub fn event_time(&mut self, interval: TimeInterval) -> &mut Self {
        self.event_times.push(interval);
        self
    }

    /// Override the rank used for companies an attendee left unranked.
    pub fn unranked_rank(&mut self, rank: u32) -> &mut Self {
        self.unranked_rank = Some(rank);
        self
    }

    /// Floor of the empty-slot sentinel.
    pub fn empty_utility(&mut self, floor: u64) -> &mut Self {
        self.empty_utility = floor;
        self
    }

    pub fn company(&mut self, name: impl Into<String>) -> Result<CompanyId, BuildError> {
        let name = name.into();
        if self.company_id(&name).is_some() {
            return Err(BuildError::DuplicateCompany(name));
        }
        let id = CompanyId(self.companies.len());
        self.companies.push(Company {
            id,
            name,
            rooms: Vec::new(),
        });
        Ok(id)
    }

    pub fn attendee(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        commitments: Vec<TimeInterval>,
    ) -> Result<AttendeeId, BuildError> {
        let key = key.into();
        if self.attendee_id(&key).is_some() {
            return Err(BuildError::DuplicateAttendee(key));
        }
        let id = AttendeeId(self.attendees.len());
        self.attendees.push(Attendee {
            id,
            key,
            name: name.into(),
            preferences: HashMap::new(),
            commitments,
        });
        Ok(id)
    }

    /// Rank `company` for `attendee`; 1 is the favourite.
    pub fn preference(
        &mut self,
        attendee: AttendeeId,
        company: CompanyId,
        rank: u32,
    ) -> Result<(), BuildError> {
        self.check_company(company)?;
        let company_name = &self.companies[company.0].name;
        let entry = self
            .attendees
            .get_mut(attendee.0)
            .ok_or_else(|| BuildError::UnknownAttendee(attendee.to_string()))?;
        if rank == 0 {
            return Err(BuildError::InvalidRank {
                attendee: entry.key.clone(),
                company: company_name.clone(),
            });
        }
        entry.preferences.insert(company, rank);
        Ok(())
    }

    /// Add an interview room with its slots and candidate pool.
    pub fn room(
        &mut self,
        company: CompanyId,
        name: impl Into<String>,
        slots: Vec<TimeInterval>,
        candidates: impl IntoIterator<Item = AttendeeId>,
    ) -> Result<RoomId, BuildError> {
        self.check_company(company)?;
        let name = name.into();
        if self.room_id(&name).is_some() {
            return Err(BuildError::DuplicateRoom(name));
        }
        let candidates = candidates
            .into_iter()
            .map(|attendee| self.check_attendee(attendee).map(|_| attendee))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let id = RoomId(self.rooms.len());
        self.rooms.push(RoomDraft {
            name,
            company,
            slots,
            candidates,
            coffee_chat: None,
        });
        self.companies[company.0].rooms.push(id);
        Ok(id)
    }

    /// Attach a coffee chat to `room`. `candidates` is ordered by the room's
    /// preference; repeated entries keep their first position.
    pub fn coffee_chat(
        &mut self,
        room: RoomId,
        interval: TimeInterval,
        capacity: u32,
        candidates: Vec<AttendeeId>,
    ) -> Result<(), BuildError> {
        for attendee in &candidates {
            self.check_attendee(*attendee)?;
        }
        let draft = self
            .rooms
            .get_mut(room.0)
            .ok_or_else(|| BuildError::UnknownRoom(room.to_string()))?;
        if draft.coffee_chat.is_some() {
            return Err(BuildError::DuplicateCoffeeChat {
                room: draft.name.clone(),
            });
        }
        if capacity == 0 {
            return Err(BuildError::ZeroCapacity {
                room: draft.name.clone(),
            });
        }
        let mut seen = HashSet::new();
        let candidates = candidates
            .into_iter()
            .filter(|attendee| seen.insert(*attendee))
            .collect();
        draft.coffee_chat = Some(CoffeeDraft {
            interval,
            capacity,
            candidates,
        });
        Ok(())
    }

    pub fn company_id(&self, name: &str) -> Option<CompanyId> {
        self.companies.iter().find(|c| c.name == name).map(|c| c.id)
    }

    pub fn room_id(&self, name: &str) -> Option<RoomId> {
        self.rooms
            .iter()
            .position(|r| r.name == name)
            .map(RoomId)
    }

    pub fn attendee_id(&self, key: &str) -> Option<AttendeeId> {
        self.attendees.iter().find(|a| a.key == key).map(|a| a.id)
    }

    fn check_company(&self, company: CompanyId) -> Result<(), BuildError> {
        if company.0 < self.companies.len() {
            Ok(())
        } else {
            Err(BuildError::UnknownCompany(company.to_string()))
        }
    }

    fn check_attendee(&self, attendee: AttendeeId) -> Result<(), BuildError> {
        if attendee.0 < self.attendees.len() {
            Ok(())
        } else {
            Err(BuildError::UnknownAttendee(attendee.to_string()))
        }
    }

    /// Create every appointment and fix the utility model.
    ///
    /// # Errors
    ///
    /// [`BuildError::EmptyTable`] when no company or no attendee was added.
    pub fn build(self) -> Result<Schedule, BuildError> {
        if self.companies.is_empty() {
            return Err(BuildError::EmptyTable("companies"));
        }
        if self.attendees.is_empty() {
            return Err(BuildError::EmptyTable("attendees"));
        }

        let mut appointments: Vec<Appointment> = Vec::new();
        let mut rooms = Vec::with_capacity(self.rooms.len());

        for (position, draft) in self.rooms.into_iter().enumerate() {
            let room_id = RoomId(position);
            let mut planned: Vec<(TimeInterval, AppointmentKind)> = draft
                .slots
                .iter()
                .map(|slot| (*slot, AppointmentKind::Interview))
                .collect();
            if let Some(chat) = &draft.coffee_chat {
                planned.extend((0..chat.capacity).map(|_| (chat.interval, AppointmentKind::CoffeeChat)));
            }
            planned.sort_by_key(|(interval, kind)| (interval.start(), *kind));

            let mut room_appointments = Vec::with_capacity(planned.len());
            let mut coffee_appointments = Vec::new();
            for (interval, kind) in planned {
                let id = AppointmentId(appointments.len());
                appointments.push(Appointment {
                    id,
                    room: room_id,
                    company: draft.company,
                    interval,
                    kind,
                    attendee: None,
                });
                room_appointments.push(id);
                if kind == AppointmentKind::CoffeeChat {
                    coffee_appointments.push(id);
                }
            }

            rooms.push(CompanyRoom {
                id: room_id,
                name: draft.name,
                company: draft.company,
                candidates: draft.candidates,
                appointments: room_appointments,
                interview_slots: draft.slots.len(),
                coffee_chat: draft.coffee_chat.map(|chat| CoffeeChat {
                    interval: chat.interval,
                    capacity: chat.capacity,
                    candidates: chat.candidates,
                    appointments: coffee_appointments,
                }),
            });
        }

        let highest_rank = self
            .attendees
            .iter()
            .flat_map(|a| a.preferences.values().copied())
            .max()
            .unwrap_or(0);
        let unranked_rank = self
            .unranked_rank
            .unwrap_or_else(|| highest_rank.max(self.companies.len() as u32) + 1);
        let largest_pool = rooms
            .iter()
            .filter_map(|room| room.coffee_chat.as_ref())
            .map(|chat| chat.candidates.len())
            .max()
            .unwrap_or(0);

        Ok(Schedule {
            event_times: self.event_times,
            companies: self.companies,
            rooms,
            attendees: self.attendees,
            appointments,
            utility: UtilityModel::new(unranked_rank, highest_rank, largest_pool, self.empty_utility),
        })
    }
}
