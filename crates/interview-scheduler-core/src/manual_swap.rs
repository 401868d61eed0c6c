//! Externally requested swaps.
//!
//! A request names two sides, each an appointment, an attendee or both. The
//! first appointment goes to the second attendee and the second appointment
//! to the first attendee, all or nothing.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapError, ValidationError};
use crate::intersects::AppointmentIntersects;
use crate::model::{AppointmentId, AttendeeId, Schedule};
use crate::summary::ScheduleSummary;
use crate::swap::{apply_plan, check_plan, Reassignment, SwapSide};

/// One side of a swap request.
///
/// When both fields are set the appointment must be held by that attendee.
/// An appointment alone stands for whoever sits there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequestSide {
    pub appointment: Option<AppointmentId>,
    pub attendee: Option<AttendeeId>,
}

impl SwapRequestSide {
    pub fn new(appointment: Option<AppointmentId>, attendee: Option<AttendeeId>) -> Self {
        Self {
            appointment,
            attendee,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.appointment.is_none() && self.attendee.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub first: SwapRequestSide,
    pub second: SwapRequestSide,
}

impl SwapRequest {
    pub fn new(first: SwapRequestSide, second: SwapRequestSide) -> Self {
        Self { first, second }
    }
}

/// Validate and apply `request`, building a fresh intersection index.
///
/// # Errors
///
/// [`ValidationError`] for a malformed request, [`SwapError::Rejected`] when
/// the swap would break a constraint. The schedule is unchanged on error.
pub fn try_swap(schedule: &mut Schedule, request: &SwapRequest) -> Result<ScheduleSummary> {
    let index = AppointmentIntersects::new(schedule);
    try_swap_with(schedule, &index, request)
}

/// Like [`try_swap`], reusing a caller-provided index.
pub fn try_swap_with(
    schedule: &mut Schedule,
    index: &AppointmentIntersects,
    request: &SwapRequest,
) -> Result<ScheduleSummary> {
    index.ensure_current(schedule)?;
    validate(schedule, request)?;

    let SwapRequest { first, second } = *request;
    let mut plan = Vec::with_capacity(2);
    if let Some(appointment) = first.appointment {
        plan.push(Reassignment {
            appointment,
            attendee: second.attendee,
        });
    }
    if let Some(appointment) = second.appointment {
        plan.push(Reassignment {
            appointment,
            attendee: first.attendee,
        });
    }

    if let Some(conflict) = check_plan(schedule, index, &plan) {
        let side = if Some(conflict.appointment()) == first.appointment {
            SwapSide::First
        } else {
            SwapSide::Second
        };
        let reason = conflict.describe(schedule);
        tracing::info!(%side, %reason, "swap rejected");
        return Err(SwapError::Rejected {
            side,
            reason,
            conflict,
        }
        .into());
    }

    apply_plan(schedule, index, &plan)?;
    tracing::info!(?first, ?second, "swap applied");
    Ok(ScheduleSummary::of(schedule))
}

fn validate(schedule: &Schedule, request: &SwapRequest) -> Result<(), ValidationError> {
    let SwapRequest { first, second } = request;
    if first.is_empty() {
        return Err(ValidationError::EmptySide(SwapSide::First));
    }
    if second.is_empty() {
        return Err(ValidationError::EmptySide(SwapSide::Second));
    }
    if first.appointment.is_none() && second.appointment.is_none() {
        return Err(ValidationError::NoAppointment);
    }
    if first.attendee.is_none() && second.attendee.is_none() {
        return Err(ValidationError::NoAttendee);
    }

    for side in [first, second] {
        if let Some(appointment) = side.appointment {
            if schedule.get_appointment(appointment).is_none() {
                return Err(ValidationError::UnknownAppointment(appointment));
            }
        }
        if let Some(attendee) = side.attendee {
            if schedule.get_attendee(attendee).is_none() {
                return Err(ValidationError::UnknownAttendee(attendee));
            }
        }
    }

    if let (Some(a), Some(b)) = (first.attendee, second.attendee) {
        if a == b {
            return Err(ValidationError::SameAttendee(
                schedule.attendee(a).name().to_string(),
            ));
        }
    }

    let name = |attendee: Option<AttendeeId>| {
        attendee.map_or_else(
            || "nobody".to_string(),
            |a| schedule.attendee(a).name().to_string(),
        )
    };
    for side in [first, second] {
        let (Some(appointment), Some(expected)) = (side.appointment, side.attendee) else {
            continue;
        };
        let app = schedule.appointment(appointment);
        if !app.holds(expected) {
            return Err(ValidationError::OccupantMismatch {
                appointment: format!(
                    "{} at {} ({})",
                    app.kind(),
                    schedule.room(app.room()).name(),
                    app.interval()
                ),
                expected: name(Some(expected)),
                actual: name(app.attendee()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ScheduleBuilder;
    use crate::error::CoreError;
    use crate::interval::TimeInterval;

    fn slot(hour: u32) -> TimeInterval {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        TimeInterval::new(start, chrono::Duration::minutes(30)).unwrap()
    }

    struct Fixture {
        schedule: Schedule,
        ann: AttendeeId,
        bob: AttendeeId,
        cid: AttendeeId,
        nine: AppointmentId,
        ten: AppointmentId,
    }

    /// Ann at 9:00, Bob at 10:00, Cid unseated and busy at 10:00.
    fn fixture() -> Fixture {
        let mut b = ScheduleBuilder::new();
        let acme = b.company("Acme").unwrap();
        let ann = b.attendee("1", "Ann", vec![]).unwrap();
        let bob = b.attendee("2", "Bob", vec![]).unwrap();
        let cid = b.attendee("3", "Cid", vec![slot(10)]).unwrap();
        b.room(acme, "Acme", vec![slot(9), slot(10)], [ann, bob, cid])
            .unwrap();
        let mut schedule = b.build().unwrap();
        let nine = schedule.appointments()[0].id();
        let ten = schedule.appointments()[1].id();
        schedule.appointments[nine.0].attendee = Some(ann);
        schedule.appointments[ten.0].attendee = Some(bob);
        Fixture {
            schedule,
            ann,
            bob,
            cid,
            nine,
            ten,
        }
    }

    fn side(app: Option<AppointmentId>, att: Option<AttendeeId>) -> SwapRequestSide {
        SwapRequestSide::new(app, att)
    }

    #[test]
    fn exchanges_two_occupants() {
        let mut f = fixture();
        let request = SwapRequest::new(
            side(Some(f.nine), Some(f.ann)),
            side(Some(f.ten), Some(f.bob)),
        );
        let summary = try_swap(&mut f.schedule, &request).unwrap();
        assert_eq!(summary.filled_slots, 2);
        assert!(f.schedule.appointment(f.nine).holds(f.bob));
        assert!(f.schedule.appointment(f.ten).holds(f.ann));
    }

    #[test]
    fn one_sided_request_is_invalid() {
        let mut f = fixture();
        let request = SwapRequest::new(side(Some(f.nine), Some(f.ann)), side(None, None));
        assert_eq!(
            try_swap(&mut f.schedule, &request),
            Err(CoreError::Validation(ValidationError::EmptySide(
                SwapSide::Second
            )))
        );
    }

    #[test]
    fn occupant_must_match() {
        let mut f = fixture();
        let request = SwapRequest::new(
            side(Some(f.nine), Some(f.bob)),
            side(None, Some(f.cid)),
        );
        let err = try_swap(&mut f.schedule, &request).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OccupantMismatch { ref actual, .. }) if actual == "Ann"
        ));
    }

    #[test]
    fn same_attendee_twice_is_invalid() {
        let mut f = fixture();
        let request = SwapRequest::new(side(Some(f.nine), Some(f.ann)), side(None, Some(f.ann)));
        assert!(matches!(
            try_swap(&mut f.schedule, &request),
            Err(CoreError::Validation(ValidationError::SameAttendee(_)))
        ));
    }

    #[test]
    fn rejected_swap_names_side_and_leaves_schedule_alone() {
        let mut f = fixture();
        // Cid would take 10:00 despite being busy then
        let request = SwapRequest::new(
            side(None, Some(f.cid)),
            side(Some(f.ten), Some(f.bob)),
        );
        let err = try_swap(&mut f.schedule, &request).unwrap_err();
        match err {
            CoreError::Swap(SwapError::Rejected { side, reason, .. }) => {
                assert_eq!(side, SwapSide::Second);
                assert!(reason.contains("Cid is busy"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(f.schedule.appointment(f.ten).holds(f.bob));
    }

    #[test]
    fn unseated_attendee_replaces_occupant() {
        let mut f = fixture();
        let request = SwapRequest::new(
            side(Some(f.nine), Some(f.ann)),
            side(None, Some(f.cid)),
        );
        try_swap(&mut f.schedule, &request).unwrap();
        assert!(f.schedule.appointment(f.nine).holds(f.cid));
        assert!(f.schedule.appointments_of(f.ann).next().is_none());
    }

    #[test]
    fn appointment_without_attendee_takes_whoever_sits_there() {
        let mut f = fixture();
        let request = SwapRequest::new(side(Some(f.nine), None), side(None, Some(f.cid)));
        let summary = try_swap(&mut f.schedule, &request).unwrap();
        assert!(f.schedule.appointment(f.nine).holds(f.cid));
        assert!(f.schedule.appointments_of(f.ann).next().is_none());
        assert_eq!(summary.matched_attendees, 2);
    }

    #[test]
    fn stale_index_is_refused() {
        let mut f = fixture();
        let request = SwapRequest::new(
            side(Some(f.nine), Some(f.ann)),
            side(Some(f.ten), Some(f.bob)),
        );
        let stale = AppointmentIntersects::default();
        assert!(matches!(
            try_swap_with(&mut f.schedule, &stale, &request),
            Err(CoreError::Swap(SwapError::StaleIndex { .. }))
        ));
    }
}
