pub mod config;
pub mod run;
pub mod slots;
pub mod swap;

use std::path::Path;

use interview_scheduler_core::Schedule;

use crate::config::Config;
use crate::document::ScheduleDocument;

/// Write `doc` to `output`, or stdout when no path is given.
pub(crate) fn emit(
    doc: &ScheduleDocument,
    output: Option<&Path>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = doc.to_json(config.output.pretty)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), "schedule written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Fail when the schedule breaks an occupancy invariant.
pub(crate) fn audit(schedule: &Schedule, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if !config.output.check_invariants {
        return Ok(());
    }
    let violations = schedule.violations();
    if let Some(first) = violations.first() {
        for violation in &violations {
            tracing::error!("{}", violation.describe(schedule));
        }
        return Err(format!(
            "{} invariant violation(s), first: {}",
            violations.len(),
            first.describe(schedule)
        )
        .into());
    }
    Ok(())
}
