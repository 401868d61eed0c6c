//! Interview slot generation from event days, a room window and breaks.

use chrono::Duration;

use crate::error::IntervalError;
use crate::interval::TimeInterval;

/// Cut back-to-back slots of `length` out of every event interval that
/// intersects `window` (all of them when `window` is `None`).
///
/// Slots never extend past the end of the clipped interval. A slot that would
/// hit a break is dropped and generation resumes at the end of that break.
pub fn generate_slots(
    event_times: &[TimeInterval],
    length: Duration,
    breaks: &[TimeInterval],
    window: Option<&TimeInterval>,
) -> Result<Vec<TimeInterval>, IntervalError> {
    if length <= Duration::zero() {
        return Err(IntervalError::NonPositiveLength {
            minutes: length.num_minutes(),
        });
    }

    let mut slots = Vec::new();
    for day in event_times {
        let (start, end) = match window {
            Some(window) if !day.is_intersecting(window) => continue,
            Some(window) => (day.start().max(window.start()), day.end().min(window.end())),
            None => (day.start(), day.end()),
        };

        let mut cursor = start;
        loop {
            let candidate = TimeInterval::new(cursor, length)?;
            if candidate.end() > end {
                break;
            }
            match candidate.first_overlap(breaks) {
                Some(blocking) => cursor = blocking.end(),
                None => {
                    cursor = candidate.end();
                    slots.push(candidate);
                }
            }
        }
    }
    Ok(slots)
}
