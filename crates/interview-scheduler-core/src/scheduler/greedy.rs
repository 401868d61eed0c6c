//! Greedy fill: hand every wanted attendee one more slot per pass.

use std::cmp::Reverse;

use super::Scheduler;
use crate::error::Result;
use crate::model::{AppointmentId, AppointmentKind, AttendeeId};
use crate::swap::SwapConflict;

/// Ordering of attendees within a pass; smallest goes first.
type Priority = (u32, usize, usize, Reverse<usize>);

/// Preference among open slots; largest wins.
type SlotScore = (usize, i64, i64, i64, Reverse<AppointmentId>);

impl Scheduler<'_> {
    /// Place attendees into empty slots of `kind` until a whole pass places
    /// nobody. Returns the number of placements.
    pub(crate) fn try_match_everyone(&mut self, kind: AppointmentKind) -> Result<usize> {
        let mut attendees: Vec<AttendeeId> = self
            .schedule
            .attendees()
            .iter()
            .map(|a| a.id())
            .filter(|a| self.wanting_companies(*a, kind) > 0)
            .collect();

        let mut total = 0;
        loop {
            attendees.sort_by_cached_key(|a| self.priority(*a, kind));

            let mut placed = 0;
            for &attendee in &attendees {
                let mut open = self.open_slots(attendee, kind);
                if open.is_empty() && kind == AppointmentKind::CoffeeChat && self.config.relocate_blockers {
                    open.extend(self.relocate_blocker(attendee)?);
                }
                let Some(slot) = self.pick_slot(attendee, kind, &open) else {
                    continue;
                };
                self.schedule.swap(&self.index, slot, Some(attendee), None)?;
                tracing::debug!(%attendee, appointment = %slot, %kind, "placed");
                placed += 1;
            }

            total += placed;
            if placed == 0 {
                return Ok(total);
            }
        }
    }

    fn wanting_companies(&self, attendee: AttendeeId, kind: AppointmentKind) -> usize {
        self.schedule
            .companies()
            .iter()
            .filter(|c| self.schedule.company_wants(c.id(), attendee, kind))
            .count()
    }

    fn priority(&self, attendee: AttendeeId, kind: AppointmentKind) -> Priority {
        let best_room_rank = match kind {
            AppointmentKind::Interview => 0,
            AppointmentKind::CoffeeChat => self
                .schedule
                .rooms()
                .iter()
                .filter_map(|room| room.coffee_chat()?.room_rank(attendee))
                .min()
                .unwrap_or(u32::MAX),
        };
        let matched = self
            .schedule
            .companies()
            .iter()
            .filter(|c| self.schedule.company_has(c.id(), attendee, kind, None).is_some())
            .count();
        (
            best_room_rank,
            matched,
            self.wanting_companies(attendee, kind),
            Reverse(self.schedule.attendee(attendee).commitments().len()),
        )
    }

    /// Empty slots of `kind` the attendee could take right now.
    fn open_slots(&self, attendee: AttendeeId, kind: AppointmentKind) -> Vec<AppointmentId> {
        self.schedule
            .rooms()
            .iter()
            .filter(|room| room.wants_attendee(attendee, kind))
            .flat_map(|room| room.appointments().iter().copied())
            .filter(|id| {
                let app = self.schedule.appointment(*id);
                app.kind() == kind
                    && app.is_empty()
                    && self.schedule.can_swap(&self.index, *id, Some(attendee), None)
            })
            .collect()
    }

    fn pick_slot(
        &self,
        attendee: AttendeeId,
        kind: AppointmentKind,
        open: &[AppointmentId],
    ) -> Option<AppointmentId> {
        open.iter()
            .copied()
            .max_by_key(|slot| self.slot_score(attendee, kind, *slot))
    }

    fn slot_score(&self, attendee: AttendeeId, kind: AppointmentKind, slot: AppointmentId) -> SlotScore {
        let app = self.schedule.appointment(slot);
        let room = self.schedule.room(app.room());
        let utility = self.schedule.utility(slot, Some(attendee)) as i64;
        let crowding = self.index.empty_overlaps(self.schedule, slot);
        match (kind, room.coffee_chat()) {
            (AppointmentKind::CoffeeChat, Some(chat)) => (
                crowding,
                -utility,
                chat.candidates().len() as i64,
                i64::from(chat.capacity()),
                Reverse(slot),
            ),
            _ => (
                crowding,
                utility,
                -(room.candidates().len() as i64),
                -(room.interview_slot_count() as i64),
                Reverse(slot),
            ),
        }
    }

    /// Free a coffee-chat seat blocked only by one of the attendee's own
    /// interviews by moving that interview to another slot of its room.
    ///
    /// Returns the freed seat, if any.
    fn relocate_blocker(&mut self, attendee: AttendeeId) -> Result<Option<AppointmentId>> {
        let seats: Vec<AppointmentId> = self
            .schedule
            .rooms()
            .iter()
            .filter(|room| room.wants_attendee(attendee, AppointmentKind::CoffeeChat))
            .filter_map(|room| {
                let chat = room.coffee_chat()?;
                chat.appointments()
                    .iter()
                    .copied()
                    .find(|id| self.schedule.appointment(*id).is_empty())
            })
            .collect();

        for seat in seats {
            let blocker = match self
                .schedule
                .cant_swap_reason(&self.index, seat, Some(attendee), None)
            {
                Some(SwapConflict::TimeConflict { existing, .. }) => existing,
                _ => continue,
            };
            let blocking = self.schedule.appointment(blocker);
            if blocking.kind() != AppointmentKind::Interview
                || !self
                    .schedule
                    .can_swap(&self.index, seat, Some(attendee), Some(blocker))
            {
                continue;
            }

            let seat_interval = *self.schedule.appointment(seat).interval();
            let target = self
                .schedule
                .room(blocking.room())
                .appointments()
                .iter()
                .copied()
                .filter(|id| *id != blocker)
                .map(|id| self.schedule.appointment(id))
                .filter(|app| {
                    app.kind() == AppointmentKind::Interview
                        && !app.interval().is_intersecting(&seat_interval)
                })
                .map(|app| (app.id(), app.attendee()))
                .find(|(alt, occupant)| {
                    self.schedule.can_swap_both(
                        &self.index,
                        Some(blocker),
                        Some(attendee),
                        Some(*alt),
                        *occupant,
                    )
                });

            if let Some((alt, occupant)) = target {
                self.schedule
                    .swap_both(&self.index, Some(blocker), Some(attendee), Some(alt), occupant)?;
                tracing::debug!(%attendee, from = %blocker, to = %alt, "relocated interview for coffee chat");
                if self.schedule.can_swap(&self.index, seat, Some(attendee), None) {
                    return Ok(Some(seat));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::ScheduleBuilder;
    use crate::interval::TimeInterval;
    use crate::model::{AppointmentKind, Schedule};
    use crate::scheduler::{Scheduler, SchedulerConfig};

    fn slot(hour: u32, minute: u32) -> TimeInterval {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        TimeInterval::new(start, chrono::Duration::minutes(30)).unwrap()
    }

    /// Ann's only interview sits on top of the coffee chat Ann is wanted for.
    fn blocked_coffee_chat() -> Schedule {
        let mut b = ScheduleBuilder::new();
        let acme = b.company("Acme").unwrap();
        let beta = b.company("Beta").unwrap();
        let ann = b.attendee("1", "Ann", vec![]).unwrap();
        b.preference(ann, acme, 1).unwrap();
        b.preference(ann, beta, 2).unwrap();
        b.room(acme, "Acme", vec![slot(9, 0), slot(10, 0)], [ann])
            .unwrap();
        let beta_room = b.room(beta, "Beta", vec![], []).unwrap();
        b.coffee_chat(beta_room, slot(9, 0), 1, vec![ann]).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn greedy_places_everyone_once_per_company() {
        let mut b = ScheduleBuilder::new();
        let acme = b.company("Acme").unwrap();
        let ann = b.attendee("1", "Ann", vec![]).unwrap();
        let bob = b.attendee("2", "Bob", vec![]).unwrap();
        b.room(acme, "Acme", vec![slot(9, 0), slot(9, 30), slot(10, 0)], [ann, bob])
            .unwrap();
        let mut schedule = b.build().unwrap();

        let mut scheduler = Scheduler::new(&mut schedule);
        let placed = scheduler
            .try_match_everyone(AppointmentKind::Interview)
            .unwrap();
        assert_eq!(placed, 2);
        assert!(schedule.violations().is_empty());
    }

    #[test]
    fn busy_attendee_is_placed_first() {
        let mut b = ScheduleBuilder::new();
        let acme = b.company("Acme").unwrap();
        let ann = b.attendee("1", "Ann", vec![]).unwrap();
        let bob = b.attendee("2", "Bob", vec![slot(9, 30)]).unwrap();
        b.room(acme, "Acme", vec![slot(9, 0)], [ann, bob]).unwrap();
        let mut schedule = b.build().unwrap();

        Scheduler::new(&mut schedule)
            .try_match_everyone(AppointmentKind::Interview)
            .unwrap();
        assert_eq!(schedule.appointments()[0].attendee(), Some(bob));
    }

    #[test]
    fn coffee_fill_relocates_blocking_interview() {
        let mut schedule = blocked_coffee_chat();
        let ann = schedule.find_attendee("1").unwrap();
        let mut scheduler = Scheduler::new(&mut schedule);
        scheduler
            .try_match_everyone(AppointmentKind::Interview)
            .unwrap();
        // with one empty slot each, the 9:00 slot wins on empty overlaps
        assert!(scheduler.schedule().appointments()[0].holds(ann));

        scheduler
            .try_match_everyone(AppointmentKind::CoffeeChat)
            .unwrap();
        let apps = schedule.appointments();
        assert!(apps[1].holds(ann), "interview moved to 10:00");
        assert!(apps[2].holds(ann), "coffee chat seat taken");
        assert!(schedule.violations().is_empty());
    }

    #[test]
    fn relocation_can_be_disabled() {
        let mut schedule = blocked_coffee_chat();
        let config = SchedulerConfig {
            relocate_blockers: false,
            ..SchedulerConfig::default()
        };
        let mut scheduler = Scheduler::with_config(&mut schedule, config);
        scheduler
            .try_match_everyone(AppointmentKind::Interview)
            .unwrap();
        scheduler
            .try_match_everyone(AppointmentKind::CoffeeChat)
            .unwrap();
        assert!(schedule.appointments()[2].is_empty());
    }
}
