//! Whole-schedule metrics.

use serde::{Deserialize, Serialize};

use crate::model::Schedule;

/// Aggregate figures reported after a run or a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Summed utility of filled slots (lower is better).
    pub total_utility: u64,
    pub total_slots: usize,
    pub filled_slots: usize,
    /// Distinct attendees holding at least one slot.
    pub matched_attendees: usize,
    /// Population variance of per-attendee slot counts over all attendees.
    pub match_count_variance: f64,
}

impl ScheduleSummary {
    pub fn of(schedule: &Schedule) -> Self {
        let mut per_attendee = vec![0usize; schedule.attendees().len()];
        let mut total_utility = 0;
        let mut filled_slots = 0;

        for app in schedule.appointments() {
            if let Some(attendee) = app.attendee() {
                filled_slots += 1;
                total_utility += schedule.utility(app.id(), Some(attendee));
                per_attendee[attendee.index()] += 1;
            }
        }

        let matched_attendees = per_attendee.iter().filter(|count| **count > 0).count();
        let match_count_variance = if per_attendee.is_empty() {
            0.0
        } else {
            let n = per_attendee.len() as f64;
            let mean = filled_slots as f64 / n;
            per_attendee
                .iter()
                .map(|count| (*count as f64 - mean).powi(2))
                .sum::<f64>()
                / n
        };

        Self {
            total_utility,
            total_slots: schedule.appointments().len(),
            filled_slots,
            matched_attendees,
            match_count_variance,
        }
    }

    pub fn empty_slots(&self) -> usize {
        self.total_slots - self.filled_slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ScheduleBuilder;
    use crate::interval::TimeInterval;

    fn slot(hour: u32) -> TimeInterval {
        TimeInterval::parse(
            &format!("2024-03-02T{hour:02}:00"),
            &format!("2024-03-02T{hour:02}:30"),
        )
        .unwrap()
    }

    #[test]
    fn counts_filled_slots_and_variance() {
        let mut b = ScheduleBuilder::new();
        let acme = b.company("Acme").unwrap();
        let beta = b.company("Beta").unwrap();
        let ann = b.attendee("1", "Ann", vec![]).unwrap();
        let bob = b.attendee("2", "Bob", vec![]).unwrap();
        b.preference(ann, acme, 1).unwrap();
        b.preference(ann, beta, 2).unwrap();
        b.room(acme, "Acme", vec![slot(9)], [ann, bob]).unwrap();
        b.room(beta, "Beta", vec![slot(10)], [ann, bob]).unwrap();
        let mut schedule = b.build().unwrap();

        let empty = ScheduleSummary::of(&schedule);
        assert_eq!(empty.filled_slots, 0);
        assert_eq!(empty.empty_slots(), 2);
        assert_eq!(empty.match_count_variance, 0.0);

        schedule.appointments[0].attendee = Some(ann);
        schedule.appointments[1].attendee = Some(ann);
        let summary = ScheduleSummary::of(&schedule);
        assert_eq!(summary.total_utility, 3);
        assert_eq!(summary.matched_attendees, 1);
        // counts [2, 0], mean 1
        assert_eq!(summary.match_count_variance, 1.0);
    }
}
