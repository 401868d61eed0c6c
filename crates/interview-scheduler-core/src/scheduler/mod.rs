//! Heuristic matching pipeline.
//!
//! The run is a fixed sequence of local-search phases, each driven to a
//! fixed point:
//! - greedy fill of interviews
//! - pairwise exchange on interviews
//! - compaction towards the start of each day
//! - pairwise exchange on interviews again
//! - greedy fill of coffee chats (relocating blocking interviews)
//! - pairwise exchange on coffee chats
//!
//! Every mutation goes through the swap primitive, so the occupancy
//! invariants hold after each step.

mod compact;
mod greedy;
mod improve;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::intersects::AppointmentIntersects;
use crate::model::{AppointmentKind, Schedule};
use crate::summary::ScheduleSummary;

/// Switches for the optional parts of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Move interviews towards the start of the day.
    pub compact: bool,
    /// Seat attendees into coffee chats after interviews are settled.
    pub coffee_chats: bool,
    /// Let the coffee-chat fill move a blocking interview within its room.
    pub relocate_blockers: bool,
    /// Run the interview exchange again after compaction.
    pub second_improvement_pass: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            compact: true,
            coffee_chats: true,
            relocate_blockers: true,
            second_improvement_pass: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    GreedyFill,
    Improve,
    Compact,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::GreedyFill => f.write_str("greedy fill"),
            Phase::Improve => f.write_str("improve"),
            Phase::Compact => f.write_str("compact"),
        }
    }
}

/// Outcome of one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: Phase,
    /// `None` for compaction, which has no kind parameter.
    pub kind: Option<AppointmentKind>,
    /// Placements, adopted exchanges or moves, depending on the phase.
    pub changes: usize,
    pub summary: ScheduleSummary,
}

/// Outcome of [`Scheduler::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: ScheduleSummary,
    pub phases: Vec<PhaseReport>,
}

/// Receives a report after each phase.
pub trait PhaseObserver {
    fn phase_finished(&mut self, report: &PhaseReport);
}

impl<F> PhaseObserver for F
where
    F: FnMut(&PhaseReport),
{
    fn phase_finished(&mut self, report: &PhaseReport) {
        self(report)
    }
}

/// Drives the pipeline over one schedule.
pub struct Scheduler<'a> {
    schedule: &'a mut Schedule,
    index: AppointmentIntersects,
    config: SchedulerConfig,
    observer: Option<&'a mut dyn PhaseObserver>,
}

impl<'a> Scheduler<'a> {
    pub fn new(schedule: &'a mut Schedule) -> Self {
        Self::with_config(schedule, SchedulerConfig::default())
    }

    pub fn with_config(schedule: &'a mut Schedule, config: SchedulerConfig) -> Self {
        let index = AppointmentIntersects::new(schedule);
        Self {
            schedule,
            index,
            config,
            observer: None,
        }
    }

    /// Forward phase reports to `observer`.
    pub fn observe(mut self, observer: &'a mut dyn PhaseObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn index(&self) -> &AppointmentIntersects {
        &self.index
    }

    pub fn schedule(&self) -> &Schedule {
        self.schedule
    }

    /// Run every enabled phase in order.
    ///
    /// # Errors
    ///
    /// Only if the swap primitive rejects a step the phase had validated,
    /// which indicates a bug; the schedule still satisfies every invariant.
    pub fn run(mut self) -> Result<RunReport> {
        self.index.ensure_current(self.schedule)?;
        let mut phases = Vec::new();

        let placed = self.try_match_everyone(AppointmentKind::Interview)?;
        phases.push(self.report(Phase::GreedyFill, Some(AppointmentKind::Interview), placed));

        let adopted = self.min_rank(AppointmentKind::Interview)?;
        phases.push(self.report(Phase::Improve, Some(AppointmentKind::Interview), adopted));

        if self.config.compact {
            let moved = self.move_to_start_of_day()?;
            phases.push(self.report(Phase::Compact, None, moved));

            if self.config.second_improvement_pass {
                let adopted = self.min_rank(AppointmentKind::Interview)?;
                phases.push(self.report(Phase::Improve, Some(AppointmentKind::Interview), adopted));
            }
        }

        if self.config.coffee_chats {
            let placed = self.try_match_everyone(AppointmentKind::CoffeeChat)?;
            phases.push(self.report(Phase::GreedyFill, Some(AppointmentKind::CoffeeChat), placed));

            let adopted = self.min_rank(AppointmentKind::CoffeeChat)?;
            phases.push(self.report(Phase::Improve, Some(AppointmentKind::CoffeeChat), adopted));
        }

        Ok(RunReport {
            summary: ScheduleSummary::of(self.schedule),
            phases,
        })
    }

    fn report(&mut self, phase: Phase, kind: Option<AppointmentKind>, changes: usize) -> PhaseReport {
        let report = PhaseReport {
            phase,
            kind,
            changes,
            summary: ScheduleSummary::of(self.schedule),
        };
        tracing::info!(
            phase = %phase,
            kind = kind.map(|k| k.label()).unwrap_or("all"),
            changes,
            utility = report.summary.total_utility,
            filled = report.summary.filled_slots,
            slots = report.summary.total_slots,
            "phase finished"
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.phase_finished(&report);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ScheduleBuilder;
    use crate::interval::TimeInterval;

    fn slot(hour: u32, minute: u32) -> TimeInterval {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        TimeInterval::new(start, chrono::Duration::minutes(30)).unwrap()
    }

    fn two_by_two() -> Schedule {
        let mut b = ScheduleBuilder::new();
        let acme = b.company("Acme").unwrap();
        let ann = b.attendee("1", "Ann", vec![]).unwrap();
        let bob = b.attendee("2", "Bob", vec![]).unwrap();
        b.preference(ann, acme, 1).unwrap();
        b.preference(bob, acme, 1).unwrap();
        b.room(acme, "Acme", vec![slot(9, 0), slot(9, 30)], [ann, bob])
            .unwrap();
        b.build().unwrap()
    }

    #[test]
    fn config_defaults_enable_everything() {
        let config: SchedulerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SchedulerConfig::default());
        assert!(config.compact && config.coffee_chats);
    }

    #[test]
    fn run_fills_simple_room() {
        let mut schedule = two_by_two();
        let report = Scheduler::new(&mut schedule).run().unwrap();
        assert_eq!(report.summary.filled_slots, 2);
        assert_eq!(report.summary.total_utility, 2);
        assert!(schedule.violations().is_empty());
    }

    #[test]
    fn observer_sees_every_phase() {
        let mut schedule = two_by_two();
        let mut seen = Vec::new();
        let mut record = |report: &PhaseReport| seen.push((report.phase, report.kind));
        Scheduler::new(&mut schedule)
            .observe(&mut record)
            .run()
            .unwrap();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], (Phase::GreedyFill, Some(AppointmentKind::Interview)));
        assert_eq!(seen[2], (Phase::Compact, None));
        assert_eq!(seen[5], (Phase::Improve, Some(AppointmentKind::CoffeeChat)));
    }

    #[test]
    fn disabled_phases_are_skipped() {
        let mut schedule = two_by_two();
        let config = SchedulerConfig {
            compact: false,
            coffee_chats: false,
            ..SchedulerConfig::default()
        };
        let report = Scheduler::with_config(&mut schedule, config).run().unwrap();
        assert_eq!(report.phases.len(), 2);
    }
}
