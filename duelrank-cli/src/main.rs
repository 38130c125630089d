//! DuelRank CLI — tournament lifecycle, simulation, and reporting.
//!
//! Commands:
//! - `create` — register a tournament from a TOML config and enroll its items
//! - `activate` / `finish` — tournament lifecycle transitions
//! - `reset` — restore the active tournament's ratings and counters
//! - `simulate` — drive N synthetic rounds against hidden item qualities
//! - `stats` — observability snapshot (pretty or JSON)
//! - `top` — leaderboard, printable or exportable as CSV/JSON

mod output;
mod simulate;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use duelrank_core::domain::{
    ItemId, TournamentConfig, TournamentId, TournamentState, INITIAL_RATING,
};
use duelrank_core::store::{ItemStore, JsonStore, TournamentDirectory};
use duelrank_core::TournamentEngine;

#[derive(Parser)]
#[command(name = "duelrank", about = "DuelRank CLI — pairwise-comparison tournament engine")]
struct Cli {
    /// Path to the JSON store file.
    #[arg(long, global = true, default_value = "duelrank.json")]
    store: PathBuf,

    /// Master seed for deterministic sampling.
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a tournament from a TOML config and enroll its items.
    Create {
        /// Tournament config file (id, title, item_count, parameters).
        #[arg(long)]
        config: PathBuf,

        /// Optional item-id file, one id per line. Defaults to ids
        /// 1..=item_count.
        #[arg(long)]
        ids: Option<PathBuf>,
    },
    /// Transition a tournament to the active state.
    Activate {
        #[arg(long)]
        id: i64,
    },
    /// Transition a tournament to the finished state.
    Finish {
        #[arg(long)]
        id: i64,
    },
    /// Restore the active tournament's ratings and counters.
    Reset,
    /// Drive synthetic rounds against hidden item qualities.
    Simulate {
        /// Number of rounds to run.
        #[arg(long, default_value_t = 10_000)]
        rounds: u64,

        /// Fraction of rounds judged "no preference".
        #[arg(long, default_value_t = 0.05)]
        no_preference_rate: f64,

        /// Print statistics every this many rounds (0 = only at the end).
        #[arg(long, default_value_t = 1000)]
        report_every: u64,
    },
    /// Print the observability snapshot.
    Stats {
        /// Emit machine-readable JSON instead of the pretty form.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print or export the leaderboard.
    Top {
        /// Number of items to list.
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,

        /// Write the leaderboard to a CSV file instead of stdout.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Emit JSON instead of the table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = Arc::new(JsonStore::open(&cli.store, cli.seed)?);

    match cli.command {
        Commands::Create { config, ids } => run_create(&store, &config, ids.as_deref()),
        Commands::Activate { id } => run_set_state(&store, id, TournamentState::Active),
        Commands::Finish { id } => run_set_state(&store, id, TournamentState::Finished),
        Commands::Reset => {
            let engine = TournamentEngine::for_active(store.clone(), store.as_ref())?;
            engine.reset()?;
            println!("tournament {} reset to {INITIAL_RATING}", engine.config().id);
            Ok(())
        }
        Commands::Simulate {
            rounds,
            no_preference_rate,
            report_every,
        } => {
            let engine = TournamentEngine::for_active(store.clone(), store.as_ref())?;
            simulate::run(&engine, rounds, no_preference_rate, report_every, cli.seed)
        }
        Commands::Stats { json } => {
            let engine = TournamentEngine::for_active(store.clone(), store.as_ref())?;
            let stats = engine.statistics()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                output::print_statistics(engine.config(), &stats);
            }
            Ok(())
        }
        Commands::Top { count, csv, json } => {
            let engine = TournamentEngine::for_active(store.clone(), store.as_ref())?;
            let top = engine.top_items(count)?;
            if let Some(path) = csv {
                output::write_csv(&path, &top)?;
                println!("wrote {} rows to {}", top.len(), path.display());
            } else if json {
                println!("{}", serde_json::to_string_pretty(&top)?);
            } else {
                output::print_leaderboard(&top);
            }
            Ok(())
        }
    }
}

fn run_create(store: &Arc<JsonStore>, config_path: &std::path::Path, ids: Option<&std::path::Path>) -> Result<()> {
    let text = fs::read_to_string(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let mut config: TournamentConfig =
        toml::from_str(&text).with_context(|| format!("parsing {}", config_path.display()))?;

    let items: Vec<ItemId> = match ids {
        Some(path) => parse_id_file(path)?,
        None => (1..=config.item_count as i64).map(ItemId).collect(),
    };
    if items.len() < 2 {
        bail!("a tournament needs at least two items, got {}", items.len());
    }
    config.item_count = items.len();

    store.create(&config)?;
    store.create_items(config.id, &items, INITIAL_RATING)?;
    println!(
        "created tournament {} ({}) with {} items",
        config.id,
        config.title,
        items.len()
    );
    Ok(())
}

fn run_set_state(store: &Arc<JsonStore>, id: i64, state: TournamentState) -> Result<()> {
    store.set_state(TournamentId(id), state)?;
    println!("tournament {id} is now {state:?}");
    Ok(())
}

fn parse_id_file(path: &std::path::Path) -> Result<Vec<ItemId>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<i64>()
                .map(ItemId)
                .with_context(|| format!("bad item id {line:?}"))
        })
        .collect()
}
