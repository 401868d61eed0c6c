//! The swap primitive: the only code that changes who sits where.
//!
//! A change is expressed as a plan of [`Reassignment`]s. Every placement in
//! the plan is checked against the occupancy the plan would produce, and the
//! plan is committed only if all checks pass. Nothing is ever half-applied.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SwapError;
use crate::intersects::AppointmentIntersects;
use crate::interval::TimeInterval;
use crate::model::{AppointmentId, AttendeeId, Schedule};

/// Which half of a two-sided swap a problem belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapSide {
    First,
    Second,
}

impl fmt::Display for SwapSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapSide::First => f.write_str("first"),
            SwapSide::Second => f.write_str("second"),
        }
    }
}

/// The first constraint a placement violates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapConflict {
    /// The room (or its coffee chat) does not list the attendee.
    NotWanted {
        attendee: AttendeeId,
        appointment: AppointmentId,
    },
    /// The attendee already holds an overlapping appointment.
    TimeConflict {
        attendee: AttendeeId,
        appointment: AppointmentId,
        existing: AppointmentId,
    },
    /// A personal commitment overlaps the slot.
    PersonalBreak {
        attendee: AttendeeId,
        appointment: AppointmentId,
        commitment: TimeInterval,
    },
    /// The attendee already has an appointment of this kind at the company.
    AlreadyAtCompany {
        attendee: AttendeeId,
        appointment: AppointmentId,
        existing: AppointmentId,
    },
}

impl SwapConflict {
    pub fn attendee(&self) -> AttendeeId {
        match self {
            SwapConflict::NotWanted { attendee, .. }
            | SwapConflict::TimeConflict { attendee, .. }
            | SwapConflict::PersonalBreak { attendee, .. }
            | SwapConflict::AlreadyAtCompany { attendee, .. } => *attendee,
        }
    }

    pub fn appointment(&self) -> AppointmentId {
        match self {
            SwapConflict::NotWanted { appointment, .. }
            | SwapConflict::TimeConflict { appointment, .. }
            | SwapConflict::PersonalBreak { appointment, .. }
            | SwapConflict::AlreadyAtCompany { appointment, .. } => *appointment,
        }
    }

    /// Render with names taken from `schedule`.
    pub fn describe(&self, schedule: &Schedule) -> String {
        let who = schedule.attendee(self.attendee()).name();
        let slot = |id: AppointmentId| {
            let app = schedule.appointment(id);
            format!(
                "{} at {} ({})",
                app.kind(),
                schedule.room(app.room()).name(),
                app.interval()
            )
        };
        match self {
            SwapConflict::NotWanted { appointment, .. } => {
                let app = schedule.appointment(*appointment);
                format!(
                    "{who} is not a {} candidate of {}",
                    app.kind(),
                    schedule.room(app.room()).name()
                )
            }
            SwapConflict::TimeConflict {
                appointment,
                existing,
                ..
            } => format!(
                "{who} already has the {} which overlaps the {}",
                slot(*existing),
                slot(*appointment)
            ),
            SwapConflict::PersonalBreak {
                appointment,
                commitment,
                ..
            } => format!(
                "{who} is busy during {commitment}, which overlaps the {}",
                slot(*appointment)
            ),
            SwapConflict::AlreadyAtCompany { existing, .. } => {
                let app = schedule.appointment(*existing);
                format!(
                    "{who} already has a {} with {} ({})",
                    app.kind(),
                    schedule.company(app.company()).name(),
                    slot(*existing)
                )
            }
        }
    }
}

/// One step of a plan: give `appointment` to `attendee` (or empty it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reassignment {
    pub appointment: AppointmentId,
    pub attendee: Option<AttendeeId>,
}

impl Reassignment {
    pub fn place(appointment: AppointmentId, attendee: AttendeeId) -> Self {
        Self {
            appointment,
            attendee: Some(attendee),
        }
    }

    pub fn vacate(appointment: AppointmentId) -> Self {
        Self {
            appointment,
            attendee: None,
        }
    }
}

/// Occupant of `appointment` once `plan` is applied.
fn occupant_after(
    schedule: &Schedule,
    plan: &[Reassignment],
    appointment: AppointmentId,
) -> Option<AttendeeId> {
    plan.iter()
        .rev()
        .find(|step| step.appointment == appointment)
        .map_or_else(|| schedule.appointment(appointment).attendee(), |step| step.attendee)
}

/// Check `attendee` sitting in `appointment` against the post-plan occupancy.
fn check_placement(
    schedule: &Schedule,
    index: &AppointmentIntersects,
    plan: &[Reassignment],
    appointment: AppointmentId,
    attendee: AttendeeId,
) -> Option<SwapConflict> {
    let app = schedule.appointment(appointment);

    if !schedule.room_wants(app.room(), attendee, app.kind()) {
        return Some(SwapConflict::NotWanted {
            attendee,
            appointment,
        });
    }

    if let Some(existing) = index
        .others_at(schedule, appointment)
        .find(|other| occupant_after(schedule, plan, *other) == Some(attendee))
    {
        return Some(SwapConflict::TimeConflict {
            attendee,
            appointment,
            existing,
        });
    }

    if let Some(commitment) = schedule.attendee(attendee).busy_during(app.interval()) {
        return Some(SwapConflict::PersonalBreak {
            attendee,
            appointment,
            commitment: *commitment,
        });
    }

    schedule
        .company_appointments(app.company(), app.kind())
        .map(|other| other.id())
        .find(|other| {
            *other != appointment && occupant_after(schedule, plan, *other) == Some(attendee)
        })
        .map(|existing| SwapConflict::AlreadyAtCompany {
            attendee,
            appointment,
            existing,
        })
}

/// First conflict of `plan`, in plan order.
pub fn check_plan(
    schedule: &Schedule,
    index: &AppointmentIntersects,
    plan: &[Reassignment],
) -> Option<SwapConflict> {
    plan.iter().find_map(|step| {
        step.attendee
            .and_then(|attendee| check_placement(schedule, index, plan, step.appointment, attendee))
    })
}

/// Check `plan` and commit it if legal.
///
/// # Errors
///
/// [`SwapError::Invariant`] naming the first conflict; the schedule is left
/// untouched.
pub fn apply_plan(
    schedule: &mut Schedule,
    index: &AppointmentIntersects,
    plan: &[Reassignment],
) -> Result<(), SwapError> {
    if let Some(conflict) = check_plan(schedule, index, plan) {
        return Err(SwapError::Invariant {
            appointment: conflict.appointment(),
            attendee: conflict.attendee(),
            reason: conflict.describe(schedule),
        });
    }
    for step in plan {
        schedule.appointments[step.appointment.0].attendee = step.attendee;
    }
    Ok(())
}

/// Plan for placing `candidate` into `appointment` with `ignore` treated as vacated.
fn single_plan(
    schedule: &Schedule,
    appointment: AppointmentId,
    candidate: AttendeeId,
    ignore: Option<AppointmentId>,
) -> Vec<Reassignment> {
    let mut plan = Vec::with_capacity(2);
    if let Some(ignored) = ignore.filter(|id| schedule.appointment(*id).holds(candidate)) {
        plan.push(Reassignment::vacate(ignored));
    }
    plan.push(Reassignment::place(appointment, candidate));
    plan
}

/// Plan for `app1 <- att2` and `app2 <- att1`.
fn exchange_plan(
    app1: Option<AppointmentId>,
    att1: Option<AttendeeId>,
    app2: Option<AppointmentId>,
    att2: Option<AttendeeId>,
) -> Vec<Reassignment> {
    let mut plan = Vec::with_capacity(2);
    if let Some(appointment) = app1 {
        plan.push(Reassignment {
            appointment,
            attendee: att2,
        });
    }
    if let Some(appointment) = app2 {
        plan.push(Reassignment {
            appointment,
            attendee: att1,
        });
    }
    plan
}

impl Schedule {
    /// Whether `candidate` may take `appointment`, treating `ignore` as vacated.
    ///
    /// `None` (emptying the slot) is always allowed.
    pub fn can_swap(
        &self,
        index: &AppointmentIntersects,
        appointment: AppointmentId,
        candidate: Option<AttendeeId>,
        ignore: Option<AppointmentId>,
    ) -> bool {
        self.cant_swap_reason(index, appointment, candidate, ignore)
            .is_none()
    }

    /// The first violated constraint, or `None` when [`Schedule::can_swap`] holds.
    pub fn cant_swap_reason(
        &self,
        index: &AppointmentIntersects,
        appointment: AppointmentId,
        candidate: Option<AttendeeId>,
        ignore: Option<AppointmentId>,
    ) -> Option<SwapConflict> {
        let candidate = candidate?;
        check_plan(self, index, &single_plan(self, appointment, candidate, ignore))
    }

    /// Give `appointment` to `candidate`, vacating `ignore` if the candidate held it.
    ///
    /// # Errors
    ///
    /// [`SwapError::Invariant`] when the placement is illegal.
    pub fn swap(
        &mut self,
        index: &AppointmentIntersects,
        appointment: AppointmentId,
        candidate: Option<AttendeeId>,
        ignore: Option<AppointmentId>,
    ) -> Result<(), SwapError> {
        match candidate {
            Some(candidate) => {
                let plan = single_plan(self, appointment, candidate, ignore);
                apply_plan(self, index, &plan)
            }
            None => {
                self.appointments[appointment.0].attendee = None;
                Ok(())
            }
        }
    }

    /// Whether `app1 <- att2` and `app2 <- att1` is legal as one step.
    ///
    /// A `None` appointment stands for "not seated here": its attendee simply
    /// moves into the other appointment.
    pub fn can_swap_both(
        &self,
        index: &AppointmentIntersects,
        app1: Option<AppointmentId>,
        att1: Option<AttendeeId>,
        app2: Option<AppointmentId>,
        att2: Option<AttendeeId>,
    ) -> bool {
        check_plan(self, index, &exchange_plan(app1, att1, app2, att2)).is_none()
    }

    /// Apply `app1 <- att2` and `app2 <- att1` atomically.
    ///
    /// # Errors
    ///
    /// [`SwapError::Invariant`] when either placement is illegal.
    pub fn swap_both(
        &mut self,
        index: &AppointmentIntersects,
        app1: Option<AppointmentId>,
        att1: Option<AttendeeId>,
        app2: Option<AppointmentId>,
        att2: Option<AttendeeId>,
    ) -> Result<(), SwapError> {
        apply_plan(self, index, &exchange_plan(app1, att1, app2, att2))
    }

    /// Summed utility of an (appointment, attendee) pair; `None` on either
    /// side scores the empty sentinel.
    pub fn pair_utility(&self, appointment: Option<AppointmentId>, attendee: Option<AttendeeId>) -> u64 {
        match (appointment, attendee) {
            (Some(appointment), Some(attendee)) => self.utility(appointment, Some(attendee)),
            _ => self.empty_utility(),
        }
    }

    /// Whether exchanging the two entries strictly lowers utility and is legal.
    ///
    /// An exchange that lowers the number of matched attendees is never
    /// adopted: an unseated attendee who already holds another slot cannot
    /// take the only slot of someone else.
    pub fn should_swap(
        &self,
        index: &AppointmentIntersects,
        app1: Option<AppointmentId>,
        att1: Option<AttendeeId>,
        app2: Option<AppointmentId>,
        att2: Option<AttendeeId>,
    ) -> bool {
        if att1 == att2 {
            return false;
        }
        let unmatches = match (app1, app2) {
            (None, None) => return false,
            (Some(app), None) => self.unmatches_occupant(app, att1, att2),
            (None, Some(app)) => self.unmatches_occupant(app, att2, att1),
            (Some(_), Some(_)) => false,
        };
        if unmatches {
            return false;
        }
        let current = self.pair_utility(app1, att1) + self.pair_utility(app2, att2);
        let exchanged = self.pair_utility(app1, att2) + self.pair_utility(app2, att1);
        exchanged < current && self.can_swap_both(index, app1, att1, app2, att2)
    }

    /// Whether `entering` taking `appointment` from `leaving` leaves one
    /// fewer attendee with any slot.
    fn unmatches_occupant(
        &self,
        appointment: AppointmentId,
        leaving: Option<AttendeeId>,
        entering: Option<AttendeeId>,
    ) -> bool {
        let loses_last = leaving.is_some_and(|attendee| {
            self.appointment(appointment).holds(attendee)
                && self.appointments_of(attendee).count() == 1
        });
        let gains_first =
            entering.is_some_and(|attendee| self.appointments_of(attendee).next().is_none());
        loses_last && !gains_first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ScheduleBuilder;
    use chrono::{Duration, NaiveDate};

    fn slot(hour: u32) -> TimeInterval {
        let start = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        TimeInterval::new(start, Duration::minutes(30)).unwrap()
    }

    struct Fixture {
        schedule: Schedule,
        index: AppointmentIntersects,
        ann: AttendeeId,
        bob: AttendeeId,
        acme_9: AppointmentId,
        acme_10: AppointmentId,
        beta_9: AppointmentId,
    }

    fn fixture() -> Fixture {
        let mut b = ScheduleBuilder::new();
        let acme = b.company("Acme").unwrap();
        let beta = b.company("Beta").unwrap();
        let ann = b.attendee("1", "Ann", vec![]).unwrap();
        let bob = b.attendee("2", "Bob", vec![slot(10)]).unwrap();
        b.preference(ann, acme, 1).unwrap();
        b.preference(ann, beta, 2).unwrap();
        b.preference(bob, acme, 2).unwrap();
        b.preference(bob, beta, 1).unwrap();
        b.room(acme, "Acme", vec![slot(9), slot(10)], [ann, bob])
            .unwrap();
        b.room(beta, "Beta", vec![slot(9)], [ann, bob]).unwrap();
        let schedule = b.build().unwrap();
        let index = AppointmentIntersects::new(&schedule);
        let ids: Vec<_> = schedule.appointments().iter().map(|a| a.id()).collect();
        Fixture {
            schedule,
            index,
            ann,
            bob,
            acme_9: ids[0],
            acme_10: ids[1],
            beta_9: ids[2],
        }
    }

    #[test]
    fn empty_candidate_is_always_allowed() {
        let f = fixture();
        assert!(f.schedule.can_swap(&f.index, f.acme_9, None, None));
    }

    #[test]
    fn personal_break_blocks_slot() {
        let f = fixture();
        let reason = f
            .schedule
            .cant_swap_reason(&f.index, f.acme_10, Some(f.bob), None)
            .unwrap();
        assert!(matches!(reason, SwapConflict::PersonalBreak { .. }));
        assert!(reason.describe(&f.schedule).contains("Bob is busy"));
    }

    #[test]
    fn overlap_and_same_company_are_rejected() {
        let mut f = fixture();
        f.schedule.swap(&f.index, f.acme_9, Some(f.ann), None).unwrap();

        let reason = f
            .schedule
            .cant_swap_reason(&f.index, f.beta_9, Some(f.ann), None)
            .unwrap();
        assert_eq!(
            reason,
            SwapConflict::TimeConflict {
                attendee: f.ann,
                appointment: f.beta_9,
                existing: f.acme_9,
            }
        );

        let reason = f
            .schedule
            .cant_swap_reason(&f.index, f.acme_10, Some(f.ann), None)
            .unwrap();
        assert!(matches!(reason, SwapConflict::AlreadyAtCompany { .. }));
    }

    #[test]
    fn ignore_counts_as_vacated() {
        let mut f = fixture();
        f.schedule.swap(&f.index, f.acme_9, Some(f.ann), None).unwrap();
        assert!(f
            .schedule
            .can_swap(&f.index, f.acme_10, Some(f.ann), Some(f.acme_9)));

        f.schedule
            .swap(&f.index, f.acme_10, Some(f.ann), Some(f.acme_9))
            .unwrap();
        assert!(f.schedule.appointment(f.acme_9).is_empty());
        assert!(f.schedule.appointment(f.acme_10).holds(f.ann));
    }

    #[test]
    fn illegal_swap_fails_loudly_and_changes_nothing() {
        let mut f = fixture();
        let err = f
            .schedule
            .swap(&f.index, f.acme_10, Some(f.bob), None)
            .unwrap_err();
        assert!(matches!(err, SwapError::Invariant { .. }));
        assert!(f.schedule.appointment(f.acme_10).is_empty());
    }

    #[test]
    fn exchange_checks_post_swap_occupancy() {
        let mut f = fixture();
        f.schedule.swap(&f.index, f.acme_9, Some(f.bob), None).unwrap();
        f.schedule.swap(&f.index, f.beta_9, Some(f.ann), None).unwrap();

        // each holds a 9:00 slot; exchanging them is legal because both move at once
        assert!(f.schedule.should_swap(
            &f.index,
            Some(f.acme_9),
            Some(f.bob),
            Some(f.beta_9),
            Some(f.ann),
        ));
        f.schedule
            .swap_both(&f.index, Some(f.acme_9), Some(f.bob), Some(f.beta_9), Some(f.ann))
            .unwrap();
        assert!(f.schedule.appointment(f.acme_9).holds(f.ann));
        assert!(f.schedule.appointment(f.beta_9).holds(f.bob));
        assert!(f.schedule.violations().is_empty());

        // and now swapping back would raise the utility sum
        assert!(!f.schedule.should_swap(
            &f.index,
            Some(f.acme_9),
            Some(f.ann),
            Some(f.beta_9),
            Some(f.bob),
        ));
    }

    #[test]
    fn equal_attendees_or_two_missing_slots_never_swap() {
        let f = fixture();
        assert!(!f
            .schedule
            .should_swap(&f.index, Some(f.acme_9), Some(f.ann), None, Some(f.ann)));
        assert!(!f
            .schedule
            .should_swap(&f.index, None, Some(f.ann), None, Some(f.bob)));
    }

    #[test]
    fn seated_attendee_never_takes_someones_only_slot() {
        let mut b = ScheduleBuilder::new();
        let acme = b.company("Acme").unwrap();
        let beta = b.company("Beta").unwrap();
        let ann = b.attendee("1", "Ann", vec![]).unwrap();
        let bob = b.attendee("2", "Bob", vec![]).unwrap();
        b.preference(ann, acme, 1).unwrap();
        b.preference(ann, beta, 1).unwrap();
        b.preference(bob, acme, 5).unwrap();
        b.room(acme, "Acme", vec![slot(9)], [ann, bob]).unwrap();
        b.room(beta, "Beta", vec![slot(10)], [ann]).unwrap();
        let mut schedule = b.build().unwrap();
        let index = AppointmentIntersects::new(&schedule);
        let acme_9 = schedule.appointments()[0].id();
        let beta_10 = schedule.appointments()[1].id();
        schedule.swap(&index, acme_9, Some(bob), None).unwrap();

        // while Ann has nothing, replacing Bob keeps the matched count
        assert!(schedule.should_swap(&index, Some(acme_9), Some(bob), None, Some(ann)));

        // once Ann holds Beta, Bob would be left without any slot
        schedule.swap(&index, beta_10, Some(ann), None).unwrap();
        assert!(schedule.can_swap_both(&index, Some(acme_9), Some(bob), None, Some(ann)));
        assert!(!schedule.should_swap(&index, Some(acme_9), Some(bob), None, Some(ann)));
        assert!(!schedule.should_swap(&index, None, Some(ann), Some(acme_9), Some(bob)));
    }

    #[test]
    fn filling_an_empty_slot_pays_off() {
        let f = fixture();
        assert!(f
            .schedule
            .should_swap(&f.index, None, Some(f.ann), Some(f.acme_9), None));
    }
}
