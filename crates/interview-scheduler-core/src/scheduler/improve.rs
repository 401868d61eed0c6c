//! Pairwise exchange until no exchange lowers the utility sum.

use std::collections::BTreeSet;

use super::Scheduler;
use crate::error::Result;
use crate::model::{AppointmentId, AppointmentKind, AttendeeId};

/// An appointment with its occupant, or an attendee not seated in some room.
type Entry = (Option<AppointmentId>, Option<AttendeeId>);

impl Scheduler<'_> {
    /// First-improvement local search over pairs of entries of `kind`.
    /// Returns the number of adopted exchanges.
    pub(crate) fn min_rank(&mut self, kind: AppointmentKind) -> Result<usize> {
        let mut adopted = 0;
        'scan: loop {
            let entries = self.exchange_entries(kind);
            for (i, &(app1, att1)) in entries.iter().enumerate() {
                for &(app2, att2) in &entries[i + 1..] {
                    if self
                        .schedule
                        .should_swap(&self.index, app1, att1, app2, att2)
                    {
                        self.schedule
                            .swap_both(&self.index, app1, att1, app2, att2)?;
                        tracing::debug!(?app1, ?att1, ?app2, ?att2, %kind, "exchange adopted");
                        adopted += 1;
                        continue 'scan;
                    }
                }
            }
            return Ok(adopted);
        }
    }

    fn exchange_entries(&self, kind: AppointmentKind) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .schedule
            .appointments()
            .iter()
            .filter(|app| app.kind() == kind)
            .map(|app| (Some(app.id()), app.attendee()))
            .collect();

        let mut unseated = BTreeSet::new();
        for room in self.schedule.rooms() {
            let seated: BTreeSet<AttendeeId> = room
                .appointments()
                .iter()
                .map(|id| self.schedule.appointment(*id))
                .filter(|app| app.kind() == kind)
                .filter_map(|app| app.attendee())
                .collect();
            let candidates: Vec<AttendeeId> = match kind {
                AppointmentKind::Interview => room.candidates().iter().copied().collect(),
                AppointmentKind::CoffeeChat => room
                    .coffee_chat()
                    .map(|chat| chat.candidates().to_vec())
                    .unwrap_or_default(),
            };
            unseated.extend(candidates.into_iter().filter(|a| !seated.contains(a)));
        }
        entries.extend(unseated.into_iter().map(|attendee| (None, Some(attendee))));
        entries
    }
}
