use std::io::Read;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;

use reportes_lib::commands::{self, IntakeRequest};
use reportes_lib::config::{AppConfig, DEFAULT_LOG_FILTER};
use reportes_lib::db::{self, ProfileStore, UserProfile};
use reportes_lib::reference::{StaticReference, ZoneStateReference};
use reportes_lib::Result;

#[derive(Parser, Debug)]
#[command(
    name = "reportes",
    about = "Net check-in intake: call-sign classification and report capture",
    version
)]
struct Cli {
    /// Database file (overrides REPORTES_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an intake request read as JSON from stdin
    Intake {
        /// Commit the batch if nothing blocks it
        #[arg(long)]
        commit: bool,
    },
    /// Import roster entries from a JSON file
    ImportRoster { file: PathBuf },
    /// Classify call signs and look them up in the roster
    Lookup { calls: Vec<String> },
    /// Save a user's intake profile read as JSON from stdin
    SetProfile {
        #[arg(long)]
        user: String,
    },
    /// Show a user's stored intake profile
    Profile {
        #[arg(long)]
        user: String,
    },
    /// Totals of committed reports for one date (default: today)
    Summary {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Zones, states and systems offered as edit choices
    Reference,
    /// Row counts
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize logging - default to info level for our crates
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.db {
        config.db_path = path;
    }

    let pool = db::init_db(&config).await?;
    if let Ok(stats) = db::get_db_stats(&pool).await {
        log::info!(
            "Database stats: {} operators, {} reports",
            stats.operator_count,
            stats.report_count
        );
    }

    let today = chrono::Local::now().date_naive();

    match cli.command {
        Command::Intake { commit } => {
            let mut request: IntakeRequest = serde_json::from_str(&read_stdin()?)?;
            request.commit |= commit;
            print_json(&commands::run_intake(&pool, &config, request, today).await?)
        }
        Command::ImportRoster { file } => {
            print_json(&commands::import_roster_file(&pool, &file).await?)
        }
        Command::Lookup { calls } => print_json(&commands::lookup_call_signs(&pool, &calls).await?),
        Command::SetProfile { user } => {
            let profile: UserProfile = serde_json::from_str(&read_stdin()?)?;
            let store = ProfileStore::new(pool.clone());
            store.save_profile(&user, &profile).await?;
            print_json(&store.load_profile(&user).await?)
        }
        Command::Profile { user } => {
            print_json(&ProfileStore::new(pool.clone()).load_profile(&user).await?)
        }
        Command::Summary { date } => {
            print_json(&db::summarize_reports(&pool, date.unwrap_or(today)).await?)
        }
        Command::Reference => {
            let reference = StaticReference;
            print_json(&serde_json::json!({
                "zones": reference.list_zones(),
                "states": reference.list_states(),
                "systems": reference.list_systems(),
            }))
        }
        Command::Stats => print_json(&db::get_db_stats(&pool).await?),
    }
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
