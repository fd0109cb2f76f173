use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use glucotrend::{actions_for, EngineConfig, TrendEngine, ViewerPrefs};

#[derive(Parser, Debug)]
#[command(name = "glucotrend", version, about = "CGM day-series and pattern-overlay viewer")]
struct Cli {
    /// Data root holding glucose_trend.json, pattern_rules.json, and
    /// patternshapes/
    #[arg(value_name = "DATA_ROOT", default_value = "data")]
    data_root: PathBuf,

    /// Day to inspect (YYYY-MM-DD); defaults to the most recent day with data
    #[arg(long, value_name = "DAY")]
    day: Option<String>,

    /// BCP 47 locale tag used for time labels
    #[arg(long, value_name = "TAG", default_value = "en-US")]
    locale: String,

    /// Replay the day at its inferred sampling cadence after the summary
    #[arg(long)]
    follow: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Cli::parse();
    let prefs = ViewerPrefs {
        locale: args.locale.clone(),
        ..ViewerPrefs::default()
    };
    let engine = TrendEngine::new(&args.data_root, &prefs, EngineConfig::default());

    let resolution = engine.resolve_day_series(args.day.as_deref()).await;
    let Some(day) = resolution.resolved_day.clone() else {
        let status = engine.store_status().await;
        match status.error {
            Some(error) => bail!("no glucose data available: {error}"),
            None => bail!("no glucose data available under {}", args.data_root.display()),
        }
    };

    println!("day {day} ({} readings)", resolution.points.len());
    println!(
        "days on record: {}",
        resolution.available_days.join(", ")
    );

    let summary = engine.summarize_day(&day).await;
    println!(
        "TIR {:.1}%  avg {:.0} mg/dL  in-range {:.0} of {:.0} min",
        summary.tir, summary.avg_glucose, summary.time_in_range_minutes, summary.total_minutes
    );

    for part in engine.day_part_segments(&day).await {
        println!("  {:<18} {:>3}%  {}", part.label, part.score, part.status);
    }

    let overlays = engine.resolve_overlays(&day).await;
    if !overlays.is_empty() {
        println!("detected patterns:");
        for overlay in &overlays {
            let marker = if overlay.highlight { "*" } else { " " };
            println!(
                " {marker}{} x{} ({} curve points)",
                overlay.label,
                overlay.occurrences,
                overlay.points.len()
            );
            for action in actions_for(&overlay.pattern_id) {
                println!("      - {action}");
            }
        }
    }

    if args.follow {
        // Replays the day at its real sampling cadence.
        let Some(mut subscription) = engine.subscribe_playback(Some(&day)).await else {
            return Ok(());
        };
        while let Some(frame) = subscription.frames.recv().await {
            if let Some(latest) = frame.latest() {
                println!(
                    "[{}/{}] {} {:.0} mg/dL",
                    frame.revealed, frame.total, latest.label, latest.glucose
                );
            }
            if frame.done {
                break;
            }
        }
    }

    Ok(())
}
