use std::path::PathBuf;

use clap::Args;
use interview_scheduler_core::{PhaseReport, Scheduler};

use crate::config::Config;
use crate::document::ScheduleDocument;

#[derive(Args)]
pub struct RunArgs {
    /// Schedule document (JSON)
    pub input: PathBuf,
    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Skip moving interviews towards the start of the day
    #[arg(long)]
    pub no_compact: bool,
    /// Leave coffee chats empty
    #[arg(long)]
    pub no_coffee_chats: bool,
    /// Audit invariants even if disabled in the config
    #[arg(long)]
    pub check: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if args.check {
        config.output.check_invariants = true;
    }
    let mut pipeline = config.scheduler.pipeline.clone();
    pipeline.compact &= !args.no_compact;
    pipeline.coffee_chats &= !args.no_coffee_chats;

    let mut doc = ScheduleDocument::read(&args.input)?;
    let mut schedule = doc.to_schedule(&config.scheduler)?;
    tracing::info!(
        companies = schedule.companies().len(),
        attendees = schedule.attendees().len(),
        slots = schedule.appointments().len(),
        "schedule loaded"
    );

    let mut log_phase = |report: &PhaseReport| {
        tracing::debug!(
            phase = %report.phase,
            filled = report.summary.filled_slots,
            "phase summary"
        );
    };
    let report = Scheduler::with_config(&mut schedule, pipeline)
        .observe(&mut log_phase)
        .run()?;
    super::audit(&schedule, &config)?;

    doc.record(&schedule, report.summary);
    super::emit(&doc, args.output.as_deref(), &config)
}
