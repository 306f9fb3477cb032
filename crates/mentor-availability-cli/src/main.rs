//! `availability` CLI — manage mentor availability windows and query bookable slots.
//!
//! State lives in a JSON data file holding users, windows, and booked sessions.
//! Read commands print JSON to stdout; mutating commands rewrite the data file.
//!
//! ## Usage
//!
//! ```sh
//! # Publish Monday 09:00-12:00 for mentor-1
//! availability --data data.json create --owner mentor-1 --day 1 --start 09:00 --end 12:00
//!
//! # Replace all of mentor-1's windows from a JSON array (stdin or -i)
//! echo '[{"dayOfWeek":1,"startTime":"09:00","endTime":"10:00"}]' \
//!   | availability --data data.json bulk --owner mentor-1
//!
//! # Bookable slots on a date, with the clock pinned
//! availability --data data.json --now 2026-03-16T07:00:00Z slots --mentor mentor-1 --date 2026-03-16
//!
//! # Remove one window, or all of them
//! availability --data data.json delete --owner mentor-1 --id 01J...
//! availability --data data.json delete-all --owner mentor-1
//! ```
//!
//! Exit status: 0 on success, 4 for invalid input, 3 when something is not found,
//! 1 for any other failure. Status 2 is left to clap for malformed command lines.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use mentor_availability::{
    AvailabilityEngine, AvailabilityError, Clock, EngineConfig, FixedClock, InMemoryStore,
    OccupiedSlotPolicy, Snapshot, SystemClock, WindowDraft, WindowId, WindowPatch,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, Level};

#[derive(Parser)]
#[command(
    name = "availability",
    version,
    about = "Mentor availability windows and bookable slots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON data file with users, windows, and sessions (created on first write)
    #[arg(long, global = true, env = "AVAILABILITY_DATA", default_value = "availability.json")]
    data: String,

    /// Pin "now" to an RFC 3339 instant instead of the system clock
    #[arg(long, global = true, env = "AVAILABILITY_NOW")]
    now: Option<String>,

    /// Report occupied future slots with "available": false instead of omitting them
    #[arg(long, global = true)]
    flag_occupied: bool,

    /// Reject single-window writes that overlap the owner's stored windows
    #[arg(long, global = true)]
    strict_overlaps: bool,

    /// Increase log verbosity (-v info, -vv debug); logs go to stderr
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List an owner's windows ordered by day and start time
    List {
        #[arg(long)]
        owner: String,
    },
    /// List a mentor's published windows (fails unless the user is a mentor or admin)
    Mentor {
        #[arg(long)]
        mentor: String,
    },
    /// Compute bookable 30-minute slots for a mentor on a date
    Slots {
        #[arg(long)]
        mentor: String,
        /// Calendar date as YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    /// Create one window
    Create {
        #[arg(long)]
        owner: String,
        /// Day of week, 0 = Sunday .. 6 = Saturday
        #[arg(long)]
        day: u8,
        /// Start time, HH:MM
        #[arg(long)]
        start: String,
        /// End time, HH:MM
        #[arg(long)]
        end: String,
        /// Create a one-off (non-recurring) window
        #[arg(long)]
        one_off: bool,
    },
    /// Replace all of an owner's windows with a JSON batch
    Bulk {
        #[arg(long)]
        owner: String,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Change fields of one window
    Update {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        day: Option<u8>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        recurring: Option<bool>,
    },
    /// Delete one window owned by the caller
    Delete {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        id: String,
    },
    /// Delete every window owned by the caller
    DeleteAll {
        #[arg(long)]
        owner: String,
    },
}

/// A bulk request body: either a bare array or `{"slots": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum BulkInput {
    Wrapped { slots: Vec<WindowDraft> },
    Plain(Vec<WindowDraft>),
}

impl BulkInput {
    fn into_drafts(self) -> Vec<WindowDraft> {
        match self {
            BulkInput::Wrapped { slots } => slots,
            BulkInput::Plain(slots) => slots,
        }
    }
}

#[derive(Serialize)]
struct Deleted {
    deleted: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            exit_code_for(&err)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

const EXIT_NOT_FOUND: u8 = 3;
const EXIT_INVALID_INPUT: u8 = 4;

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<AvailabilityError>() {
        Some(e) if e.is_validation() => ExitCode::from(EXIT_INVALID_INPUT),
        Some(e) if e.is_not_found() => ExitCode::from(EXIT_NOT_FOUND),
        _ => ExitCode::FAILURE,
    }
}

fn run(cli: Cli) -> Result<()> {
    let clock: Box<dyn Clock> = match cli.now.as_deref() {
        Some(raw) => Box::new(FixedClock(parse_now(raw)?)),
        None => Box::new(SystemClock),
    };
    let config = EngineConfig {
        occupied_slots: if cli.flag_occupied {
            OccupiedSlotPolicy::Flag
        } else {
            OccupiedSlotPolicy::Drop
        },
        check_stored_overlaps: cli.strict_overlaps,
    };

    let data_path = Path::new(&cli.data);
    let store = load_store(data_path)?;
    let engine = AvailabilityEngine::new(store, &*clock).with_config(config);
    debug!(data = %data_path.display(), ?config, "engine ready");

    match cli.command {
        Commands::List { owner } => {
            print_json(&engine.list_windows(&owner)?)?;
        }
        Commands::Mentor { mentor } => {
            print_json(&engine.list_mentor_windows(&mentor)?)?;
        }
        Commands::Slots { mentor, date } => {
            let date = parse_date(&date)?;
            let slots = engine.compute_available_slots(&mentor, date)?;
            debug!(mentor = %mentor, %date, count = slots.len(), "computed slots");
            print_json(&slots)?;
        }
        Commands::Create {
            owner,
            day,
            start,
            end,
            one_off,
        } => {
            let mut draft = WindowDraft::new(day, start, end);
            if one_off {
                draft = draft.one_off();
            }
            let window = engine.create_window(&owner, &draft)?;
            info!(owner = %owner, id = %window.id, "created availability window");
            save_store(data_path, &engine.into_store())?;
            print_json(&window)?;
        }
        Commands::Bulk { owner, input } => {
            let raw = read_input(input.as_deref())?;
            let drafts = serde_json::from_str::<BulkInput>(&raw)
                .map_err(|e| AvailabilityError::validation(format!("invalid bulk body: {}", e)))?
                .into_drafts();
            let windows = engine.replace_all_windows(&owner, &drafts)?;
            info!(owner = %owner, count = windows.len(), "replaced availability windows");
            save_store(data_path, &engine.into_store())?;
            print_json(&windows)?;
        }
        Commands::Update {
            owner,
            id,
            day,
            start,
            end,
            recurring,
        } => {
            let patch = WindowPatch {
                day_of_week: day,
                start_time: start,
                end_time: end,
                is_recurring: recurring,
            };
            let window = engine.update_window(parse_id(&id)?, &owner, &patch)?;
            info!(owner = %owner, id = %window.id, "updated availability window");
            save_store(data_path, &engine.into_store())?;
            print_json(&window)?;
        }
        Commands::Delete { owner, id } => {
            engine.delete_window(parse_id(&id)?, &owner)?;
            info!(owner = %owner, id = %id, "deleted availability window");
            save_store(data_path, &engine.into_store())?;
            print_json(&Deleted { deleted: 1 })?;
        }
        Commands::DeleteAll { owner } => {
            let deleted = engine.delete_all_windows(&owner)?;
            info!(owner = %owner, deleted, "deleted all availability windows");
            save_store(data_path, &engine.into_store())?;
            print_json(&Deleted { deleted })?;
        }
    }

    Ok(())
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid --now instant '{}', expected RFC 3339", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AvailabilityError::validation(format!("invalid date '{}', expected YYYY-MM-DD", raw)).into()
    })
}

fn parse_id(raw: &str) -> Result<WindowId> {
    // A malformed id cannot name any stored window.
    WindowId::from_string(raw).map_err(|_| {
        AvailabilityError::not_found(format!("availability slot {} not found", raw)).into()
    })
}

fn load_store(path: &Path) -> Result<InMemoryStore> {
    if !path.exists() {
        debug!(data = %path.display(), "data file missing, starting empty");
        return Ok(InMemoryStore::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse data file: {}", path.display()))?;
    Ok(InMemoryStore::from_snapshot(snapshot))
}

/// Write the snapshot to a sibling temp file, fsync it, then rename it over the
/// data file. A crash mid-write leaves the previous data file intact.
fn save_store(path: &Path, store: &InMemoryStore) -> Result<()> {
    let snapshot = store.snapshot()?;
    let tmp_path = path.with_extension("json.tmp");

    let file = File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file: {}", tmp_path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &snapshot)?;
    writer.flush()?;
    writer
        .get_ref()
        .sync_all()
        .with_context(|| format!("Failed to sync temp file: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to write data file: {}", path.display()))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
