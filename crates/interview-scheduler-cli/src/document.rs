//! JSON schedule document: the CLI's transport for the core's entity graph.
//!
//! Companies, rooms and attendees are referenced by name (attendees by their
//! external id). Timestamps accept `T` or space separators with optional
//! seconds and are written back as `YYYY-MM-DDTHH:MM:SS`.

use std::path::Path;

use chrono::Duration;
use interview_scheduler_core::{
    generate_slots, parse_timestamp, AppointmentIntersects, AppointmentKind, BuildError,
    CoreError, IntervalError, Schedule, ScheduleBuilder, ScheduleSummary, SwapError, TimeInterval,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SchedulerSettings;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors turning a document into a schedule.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid schedule document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid timestamp: '{0}'")]
    Timestamp(String),

    #[error("room '{0}' needs either explicit slots or slot generation")]
    NoSlotSource(String),

    #[error("room '{room}' has no free {kind} slot starting at {start}")]
    NoSuchSlot {
        room: String,
        kind: AppointmentKind,
        start: String,
    },
}

impl From<IntervalError> for DocumentError {
    fn from(e: IntervalError) -> Self {
        DocumentError::Core(e.into())
    }
}

impl From<BuildError> for DocumentError {
    fn from(e: BuildError) -> Self {
        DocumentError::Core(e.into())
    }
}

impl From<SwapError> for DocumentError {
    fn from(e: SwapError) -> Self {
        DocumentError::Core(e.into())
    }
}

/// A `[start, end)` pair as written in documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: String,
    pub end: String,
}

impl Span {
    pub fn interval(&self) -> Result<TimeInterval, IntervalError> {
        TimeInterval::parse(&self.start, &self.end)
    }
}

impl From<&TimeInterval> for Span {
    fn from(interval: &TimeInterval) -> Self {
        Self {
            start: interval.start().format(TIMESTAMP_FORMAT).to_string(),
            end: interval.end().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGeneration {
    pub length_minutes: i64,
    /// Defaults to the whole event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<Span>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breaks: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeChatEntry {
    pub start: String,
    pub end: String,
    pub capacity: u32,
    /// Most wanted first.
    #[serde(default)]
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<Span>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_generation: Option<SlotGeneration>,
    #[serde(default)]
    pub candidates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coffee_chat: Option<CoffeeChatEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyEntry {
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<RoomEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeEntry {
    pub id: String,
    pub name: String,
    /// Company name to rank, 1 being the favourite.
    #[serde(default)]
    pub preferences: std::collections::BTreeMap<String, u32>,
    #[serde(default)]
    pub commitments: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub room: String,
    pub start: String,
    pub kind: AppointmentKind,
    pub attendee: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    #[serde(default)]
    pub event_times: Vec<Span>,
    pub companies: Vec<CompanyEntry>,
    pub attendees: Vec<AttendeeEntry>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ScheduleSummary>,
}

impl ScheduleDocument {
    pub fn read(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Build the entity graph and seat every listed assignment.
    ///
    /// Assignments go through the swap primitive, so a document violating an
    /// occupancy constraint is rejected.
    pub fn to_schedule(&self, settings: &SchedulerSettings) -> Result<Schedule, DocumentError> {
        let mut b = ScheduleBuilder::new();
        b.empty_utility(settings.empty_utility);
        if settings.unranked_rank > 0 {
            b.unranked_rank(settings.unranked_rank);
        }

        let event_times = self
            .event_times
            .iter()
            .map(Span::interval)
            .collect::<Result<Vec<_>, _>>()?;
        for day in &event_times {
            b.event_time(*day);
        }

        let companies = self
            .companies
            .iter()
            .map(|c| b.company(c.name.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        for attendee in &self.attendees {
            let commitments = attendee
                .commitments
                .iter()
                .map(Span::interval)
                .collect::<Result<Vec<_>, _>>()?;
            let id = b.attendee(attendee.id.as_str(), attendee.name.as_str(), commitments)?;
            for (company, rank) in &attendee.preferences {
                let company = b
                    .company_id(company)
                    .ok_or_else(|| BuildError::UnknownCompany(company.clone()))?;
                b.preference(id, company, *rank)?;
            }
        }

        let resolve = |b: &ScheduleBuilder, keys: &[String]| {
            keys.iter()
                .map(|key| {
                    b.attendee_id(key)
                        .ok_or_else(|| BuildError::UnknownAttendee(key.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

        for (company, entry) in companies.iter().zip(&self.companies) {
            for room in &entry.rooms {
                let coffee = match &room.coffee_chat {
                    Some(chat) => Some((
                        TimeInterval::parse(&chat.start, &chat.end)?,
                        chat,
                    )),
                    None => None,
                };
                let slots = match (&room.slots, &room.slot_generation) {
                    (Some(slots), _) => slots
                        .iter()
                        .map(Span::interval)
                        .collect::<Result<Vec<_>, _>>()?,
                    (None, Some(generation)) => {
                        let mut breaks = generation
                            .breaks
                            .iter()
                            .map(Span::interval)
                            .collect::<Result<Vec<_>, _>>()?;
                        breaks.extend(coffee.as_ref().map(|(interval, _)| *interval));
                        let window = generation.window.as_ref().map(Span::interval).transpose()?;
                        generate_slots(
                            &event_times,
                            Duration::minutes(generation.length_minutes),
                            &breaks,
                            window.as_ref(),
                        )?
                    }
                    (None, None) if coffee.is_some() => Vec::new(),
                    (None, None) => return Err(DocumentError::NoSlotSource(room.name.clone())),
                };

                let candidates = resolve(&b, &room.candidates)?;
                let id = b.room(*company, room.name.as_str(), slots, candidates)?;
                if let Some((interval, chat)) = coffee {
                    let candidates = resolve(&b, &chat.candidates)?;
                    b.coffee_chat(id, interval, chat.capacity, candidates)?;
                }
            }
        }

        let mut schedule = b.build()?;
        self.seat_assignments(&mut schedule)?;
        Ok(schedule)
    }

    fn seat_assignments(&self, schedule: &mut Schedule) -> Result<(), DocumentError> {
        if self.assignments.is_empty() {
            return Ok(());
        }
        let index = AppointmentIntersects::new(schedule);
        for assignment in &self.assignments {
            let room = schedule
                .find_room(&assignment.room)
                .ok_or_else(|| BuildError::UnknownRoom(assignment.room.clone()))?;
            let attendee = schedule
                .find_attendee(&assignment.attendee)
                .ok_or_else(|| BuildError::UnknownAttendee(assignment.attendee.clone()))?;
            let start = parse_timestamp(&assignment.start)
                .ok_or_else(|| DocumentError::Timestamp(assignment.start.clone()))?;
            let slot = schedule
                .find_appointment(room, start, assignment.kind)
                .filter(|id| schedule.appointment(*id).is_empty())
                .ok_or_else(|| DocumentError::NoSuchSlot {
                    room: assignment.room.clone(),
                    kind: assignment.kind,
                    start: assignment.start.clone(),
                })?;
            schedule.swap(&index, slot, Some(attendee), None)?;
        }
        Ok(())
    }

    /// Replace assignments and summary with the schedule's current state.
    pub fn record(&mut self, schedule: &Schedule, summary: ScheduleSummary) {
        self.assignments = schedule
            .appointments()
            .iter()
            .filter_map(|app| {
                let attendee = app.attendee()?;
                Some(Assignment {
                    room: schedule.room(app.room()).name().to_string(),
                    start: app.interval().start().format(TIMESTAMP_FORMAT).to_string(),
                    kind: app.kind(),
                    attendee: schedule.attendee(attendee).key().to_string(),
                })
            })
            .collect();
        self.summary = Some(summary);
    }
}
