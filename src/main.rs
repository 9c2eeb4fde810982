use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use datefacts::{history::FileStore, Config, DataService};
use serde_json::json;
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Resolve dated facts and city populations from published sheets"
)]
struct Args {
    /// YAML config; without it everything comes from DATEFACTS_* variables.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Today's snapshot.
    Snapshot,
    /// Snapshot as of a date (YYYY-MM-DD).
    SnapshotFor { date: String },
    /// Population of "City, State", at the birth year when --dob is before 2020.
    Population {
        place: String,
        #[arg(long)]
        dob: Option<String>,
    },
    /// Current population of "City, State".
    CurrentPopulation { place: String },
    /// Drop the snapshot cache (the metals backup is kept).
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,datefacts=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) config + storage ─────────────────────────────────────────
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    let store = FileStore::new(&config.cache_dir)
        .with_context(|| format!("opening cache dir {:?}", config.cache_dir))?;
    let service = DataService::new(&config, Arc::new(store));

    // ─── 3) run ──────────────────────────────────────────────────────
    let out = match args.command {
        Command::Snapshot => serde_json::to_value(service.all_snapshot_values().await)?,
        Command::SnapshotFor { date } => serde_json::to_value(
            service
                .snapshot_for_date(&date)
                .await
                .with_context(|| format!("snapshot for {date}"))?,
        )?,
        Command::Population { place, dob } => {
            let population = service
                .population_for_city(&place, dob.as_deref())
                .await
                .with_context(|| format!("population for {place:?}"))?;
            population_json(&service, &place, population)
        }
        Command::CurrentPopulation { place } => {
            let population = service
                .current_population_for_city(&place)
                .await
                .with_context(|| format!("current population for {place:?}"))?;
            population_json(&service, &place, population)
        }
        Command::ClearCache => {
            service.clear_cache().context("clearing cache")?;
            json!({ "cleared": true })
        }
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    info!("done");
    Ok(())
}

fn population_json(
    service: &DataService,
    place: &str,
    population: Option<u64>,
) -> serde_json::Value {
    match population {
        Some(p) => json!({ "place": place, "population": p }),
        None => json!({
            "place": place,
            "population": null,
            "message": service.not_found_message(),
        }),
    }
}
