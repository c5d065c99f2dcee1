//! CLI entry point for the cycling portal.
//!
//! Provides subcommands for building a sample race, inspecting a saved
//! portal, classifying a single stage, and exporting race classifications.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use cycling_portal::config::PortalConfig;
use cycling_portal::ids::{RaceId, StageId};
use cycling_portal::model::{CheckpointType, StageType};
use cycling_portal::output::{append_records, classification_rows, format_delta, print_json};
use cycling_portal::CyclingPortal;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "cycling-portal")]
#[command(about = "Stage results, rankings and race classifications for cycling races", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a small sample race with results and save it
    Demo {
        /// Portal file to write (`.gz` for compressed); defaults to CYCLING_PORTAL_FILE
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Log the races, stages and stage states held in a portal file
    Summary {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Log the full classification of one stage
    Stage {
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Stage ID
        #[arg(short, long)]
        stage: u32,
    },
    /// Compute the general, points and mountain classifications of a race
    Classify {
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Race ID
        #[arg(short, long)]
        race: u32,

        /// CSV file to append results to
        #[arg(short, long, default_value = "classifications.csv")]
        output: String,
    },
}

fn main() -> Result<()> {
    let config = PortalConfig::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let (log_dir, log_file_name) = config.log_location();
    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("RUST_LOG")
                .from_env_lossy(),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .with_env_var("RUST_LOG_JSON")
                .from_env_lossy(),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let file_or_default = |file: Option<PathBuf>| file.unwrap_or_else(|| config.portal_file.clone());

    match cli.command {
        Commands::Demo { file } => {
            let path = file_or_default(file);
            let portal = build_demo()?;
            portal
                .save(&path)
                .with_context(|| format!("saving portal to {}", path.display()))?;
            info!(path = %path.display(), "Sample race written");
        }
        Commands::Summary { file } => {
            let portal = open(&file_or_default(file))?;
            for race in portal.race_ids() {
                let details = portal.view_race_details(race)?;
                info!(%details, "Race");
                for stage in portal.race_stages(race)? {
                    let s = portal.stage(stage)?;
                    info!(
                        stage = %stage,
                        name = s.name(),
                        stage_type = ?s.stage_type(),
                        state = %s.state(),
                        checkpoints = s.checkpoints().len(),
                        results = s.finishes().len(),
                        "Stage"
                    );
                }
            }
        }
        Commands::Stage { file, stage } => {
            let portal = open(&file_or_default(file))?;
            let stage = StageId(stage);
            let standings = portal.stage_standings(stage)?;
            let mountain = portal.riders_mountain_points_in_stage(stage)?;
            if standings.is_empty() {
                warn!(stage = %stage, "Stage has no results");
            }
            for (position, (standing, mountain)) in standings.iter().zip(mountain).enumerate() {
                info!(
                    position = position + 1,
                    rider = %standing.rider,
                    elapsed = %format_delta(standing.elapsed),
                    adjusted = %format_delta(standing.classification_time()),
                    points = standing.points,
                    mountain,
                    "Standing"
                );
            }
        }
        Commands::Classify { file, race, output } => {
            let portal = open(&file_or_default(file))?;
            let aggregate = portal.race_aggregate(RaceId(race))?;
            print_json(&aggregate)?;

            let rows = classification_rows(&aggregate);
            append_records(&output, &rows)
                .with_context(|| format!("writing classifications to {output}"))?;
            info!(rows = rows.len(), output = %output, "Classifications exported");
        }
    }

    Ok(())
}

fn open(path: &Path) -> Result<CyclingPortal> {
    let mut portal = CyclingPortal::new();
    portal
        .load(path)
        .with_context(|| format!("loading portal from {}", path.display()))?;
    Ok(portal)
}

fn hms(h: u32, m: u32, s: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, s).with_context(|| format!("invalid time {h}:{m}:{s}"))
}

/// Two stages (one road stage with a sprint and a climb, one time trial)
/// and four riders from two teams.
fn build_demo() -> Result<CyclingPortal> {
    let mut portal = CyclingPortal::new();
    let day = |d: u32| {
        NaiveDate::from_ymd_opt(2024, 7, d)
            .and_then(|date| date.and_hms_opt(11, 0, 0))
            .context("invalid demo date")
    };

    let blue = portal.create_team("Blue", "Climbers")?;
    let red = portal.create_team("Red", "Sprinters")?;
    let riders = [
        portal.create_rider(blue, "Alba", 1996)?,
        portal.create_rider(blue, "Bruno", 1999)?,
        portal.create_rider(red, "Chiara", 1994)?,
        portal.create_rider(red, "Dario", 2001)?,
    ];

    let race = portal.create_race("GiroDemo", "Two-day sample race")?;
    let road = portal.add_stage_to_race(race, "Hills", "", 180.0, day(1)?, StageType::MediumMountain)?;
    portal.add_intermediate_sprint_to_stage(road, 70.0)?;
    portal.add_categorized_climb_to_stage(road, 150.0, CheckpointType::C1, 7.2, 9.5)?;
    let tt = portal.add_stage_to_race(race, "Chrono", "", 32.0, day(2)?, StageType::TimeTrial)?;
    portal.conclude_stage_preparation(road)?;
    portal.conclude_stage_preparation(tt)?;

    // start, sprint, climb, finish
    let road_times = [
        [(11, 0, 0), (12, 40, 3), (14, 30, 0), (15, 20, 0)],
        [(11, 0, 0), (12, 40, 1), (14, 31, 10), (15, 20, 0)],
        [(11, 0, 0), (12, 40, 0), (14, 32, 0), (15, 21, 30)],
        [(11, 0, 0), (12, 40, 2), (14, 29, 45), (15, 19, 59)],
    ];
    for (rider, times) in riders.iter().zip(road_times) {
        let times = times
            .iter()
            .map(|&(h, m, s)| hms(h, m, s))
            .collect::<Result<Vec<_>>>()?;
        portal.register_rider_results_in_stage(road, *rider, &times)?;
    }

    let tt_finishes = [(11, 41, 12), (11, 43, 5), (11, 39, 58), (11, 44, 0)];
    for (rider, (h, m, s)) in riders.iter().zip(tt_finishes) {
        portal.register_rider_results_in_stage(tt, *rider, &[hms(11, 0, 0)?, hms(h, m, s)?])?;
    }

    Ok(portal)
}
