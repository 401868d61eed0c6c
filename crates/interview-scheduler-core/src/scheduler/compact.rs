//! Compaction: pull interviews towards the start of each day.
//!
//! Attendees only ever move between slots of the same company, so neither
//! utility nor the attendee/company pairing changes. Moves never cross a
//! calendar date: an empty slot is only filled from later slots starting on
//! the same day.
//!
//! A move at one company can free an attendee's earlier time for another,
//! so companies are rescanned until a whole pass moves nobody.

use super::Scheduler;
use crate::error::Result;
use crate::model::{AppointmentId, AppointmentKind, CompanyId};
use crate::swap::{apply_plan, check_plan, Reassignment};

impl Scheduler<'_> {
    /// Returns the number of moves made; zero once nothing can move.
    pub(crate) fn move_to_start_of_day(&mut self) -> Result<usize> {
        let companies: Vec<CompanyId> =
            self.schedule.companies().iter().map(|c| c.id()).collect();
        let mut moved = 0;
        loop {
            let mut changed = false;
            for &company in &companies {
                while let Some(plan) = self.find_compaction(company) {
                    apply_plan(self.schedule, &self.index, &plan)?;
                    tracing::debug!(%company, steps = plan.len(), "compacted");
                    moved += 1;
                    changed = true;
                }
            }
            if !changed {
                return Ok(moved);
            }
        }
    }

    /// The first legal plan that fills an empty slot from a later one on the
    /// same day.
    fn find_compaction(&self, company: CompanyId) -> Option<Vec<Reassignment>> {
        let mut slots: Vec<AppointmentId> = self
            .schedule
            .company_appointments(company, AppointmentKind::Interview)
            .map(|app| app.id())
            .collect();
        slots.sort_by_key(|id| (self.schedule.appointment(*id).interval().start(), *id));

        for (i, &early) in slots.iter().enumerate() {
            let early_app = self.schedule.appointment(early);
            if !early_app.is_empty() {
                continue;
            }
            let day = early_app.interval().start().date();

            for &late in slots[i + 1..].iter().rev() {
                let late_app = self.schedule.appointment(late);
                let Some(mover) = late_app.attendee() else {
                    continue;
                };
                let starts_later = late_app.interval().start() > early_app.interval().start();
                if !starts_later || late_app.interval().start().date() != day {
                    continue;
                }

                let direct = vec![Reassignment::vacate(late), Reassignment::place(early, mover)];
                if check_plan(self.schedule, &self.index, &direct).is_none() {
                    return Some(direct);
                }

                for &middle in &slots[..i] {
                    let middle_app = self.schedule.appointment(middle);
                    let Some(displaced) = middle_app.attendee() else {
                        continue;
                    };
                    if middle_app.interval().start().date() != day {
                        continue;
                    }
                    let three_way = vec![
                        Reassignment::vacate(late),
                        Reassignment::place(middle, mover),
                        Reassignment::place(early, displaced),
                    ];
                    if check_plan(self.schedule, &self.index, &three_way).is_none() {
                        return Some(three_way);
                    }
                }
            }
        }
        None
    }
}
