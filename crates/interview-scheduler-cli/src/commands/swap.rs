use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::Args;
use interview_scheduler_core::{
    parse_timestamp, try_swap, AppointmentKind, Schedule, SwapRequest, SwapRequestSide,
};

use crate::config::Config;
use crate::document::ScheduleDocument;

#[derive(Args)]
pub struct SwapArgs {
    /// Schedule document holding current assignments
    pub schedule: PathBuf,
    /// Room of the first appointment
    #[arg(long, requires = "start1")]
    pub room1: Option<String>,
    /// Start of the first appointment
    #[arg(long, requires = "room1", value_parser = parse_start)]
    pub start1: Option<NaiveDateTime>,
    #[arg(long, value_enum, default_value = "interview")]
    pub kind1: KindArg,
    /// Attendee id on the first side
    #[arg(long)]
    pub attendee1: Option<String>,
    /// Room of the second appointment
    #[arg(long, requires = "start2")]
    pub room2: Option<String>,
    /// Start of the second appointment
    #[arg(long, requires = "room2", value_parser = parse_start)]
    pub start2: Option<NaiveDateTime>,
    #[arg(long, value_enum, default_value = "interview")]
    pub kind2: KindArg,
    /// Attendee id on the second side
    #[arg(long)]
    pub attendee2: Option<String>,
    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum KindArg {
    Interview,
    CoffeeChat,
}

impl From<KindArg> for AppointmentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Interview => AppointmentKind::Interview,
            KindArg::CoffeeChat => AppointmentKind::CoffeeChat,
        }
    }
}

fn parse_start(value: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(value).ok_or_else(|| format!("invalid timestamp: '{value}'"))
}

fn resolve_side(
    schedule: &Schedule,
    slot: Option<(&str, NaiveDateTime, AppointmentKind)>,
    attendee: Option<&str>,
) -> Result<SwapRequestSide, Box<dyn std::error::Error>> {
    let attendee = attendee
        .map(|key| {
            schedule
                .find_attendee(key)
                .ok_or_else(|| format!("unknown attendee: {key}"))
        })
        .transpose()?;
    let appointment = match slot {
        Some((room_name, start, kind)) => {
            let room = schedule
                .find_room(room_name)
                .ok_or_else(|| format!("unknown room: {room_name}"))?;
            let found = schedule
                .room(room)
                .appointments()
                .iter()
                .copied()
                .filter(|id| {
                    let app = schedule.appointment(*id);
                    app.kind() == kind && app.interval().start() == start
                })
                .collect::<Vec<_>>();
            // a coffee chat has several seats; pick the one the attendee holds
            let id = attendee
                .and_then(|att| found.iter().copied().find(|id| schedule.appointment(*id).holds(att)))
                .or_else(|| schedule.find_appointment(room, start, kind))
                .ok_or_else(|| format!("room '{room_name}' has no {kind} starting at {start}"))?;
            Some(id)
        }
        None => None,
    };
    Ok(SwapRequestSide::new(appointment, attendee))
}

pub fn run(args: SwapArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut doc = ScheduleDocument::read(&args.schedule)?;
    let mut schedule = doc.to_schedule(&config.scheduler)?;

    let first = resolve_side(
        &schedule,
        args.room1.as_deref().zip(args.start1).map(|(r, s)| (r, s, args.kind1.into())),
        args.attendee1.as_deref(),
    )?;
    let second = resolve_side(
        &schedule,
        args.room2.as_deref().zip(args.start2).map(|(r, s)| (r, s, args.kind2.into())),
        args.attendee2.as_deref(),
    )?;

    let summary = try_swap(&mut schedule, &SwapRequest::new(first, second))?;
    super::audit(&schedule, &config)?;

    doc.record(&schedule, summary);
    super::emit(&doc, args.output.as_deref(), &config)
}
