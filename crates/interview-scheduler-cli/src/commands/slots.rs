use chrono::Duration;
use clap::Args;
use interview_scheduler_core::{generate_slots, TimeInterval};

use crate::document::Span;

#[derive(Args)]
pub struct SlotsArgs {
    /// Event start (e.g. 2024-03-02T09:00)
    #[arg(long)]
    pub start: String,
    /// Event end
    #[arg(long)]
    pub end: String,
    #[arg(long, default_value_t = 30)]
    pub length_minutes: i64,
    /// Room window start
    #[arg(long, requires = "window_end")]
    pub window_start: Option<String>,
    /// Room window end
    #[arg(long, requires = "window_start")]
    pub window_end: Option<String>,
    /// Break as "start,end"; repeatable
    #[arg(long = "break")]
    pub breaks: Vec<String>,
}

fn parse_break(value: &str) -> Result<TimeInterval, Box<dyn std::error::Error>> {
    let (start, end) = value
        .split_once(',')
        .ok_or_else(|| format!("break must be 'start,end', got '{value}'"))?;
    Ok(TimeInterval::parse(start.trim(), end.trim())?)
}

pub fn run(args: SlotsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let event = TimeInterval::parse(&args.start, &args.end)?;
    let window = match (&args.window_start, &args.window_end) {
        (Some(start), Some(end)) => Some(TimeInterval::parse(start, end)?),
        _ => None,
    };
    let breaks = args
        .breaks
        .iter()
        .map(|b| parse_break(b))
        .collect::<Result<Vec<_>, _>>()?;

    let slots = generate_slots(
        &[event],
        Duration::minutes(args.length_minutes),
        &breaks,
        window.as_ref(),
    )?;
    tracing::debug!(count = slots.len(), "slots generated");

    let spans: Vec<Span> = slots.iter().map(Span::from).collect();
    println!("{}", serde_json::to_string_pretty(&spans)?);
    Ok(())
}
