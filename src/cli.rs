use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::DEFAULT_ZOOM;

const DEFAULT_STORE: &str = "mapty.sqlite3";

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Record running and cycling workouts at map locations and keep them across sessions"
)]
pub struct Cli {
    /// Where workouts are kept: an SQLite file, or a directory for `--backend json`.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_STORE)]
    pub store: PathBuf,

    /// Storage backend.
    #[arg(long, global = true, value_enum, default_value_t = Backend::Sqlite)]
    pub backend: Backend,

    /// Map zoom level used when centering on a workout.
    #[arg(long, global = true, default_value_t = DEFAULT_ZOOM)]
    pub zoom: u8,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Sqlite,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Record a workout at a location.
    ///
    /// Numbers are taken as typed and validated before anything is saved.
    Add {
        /// running or cycling
        #[arg(value_name = "TYPE")]
        kind: String,

        /// Distance in km.
        #[arg(long, allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes.
        #[arg(long, allow_hyphen_values = true)]
        duration: String,

        /// Cadence in steps/min (running).
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        cadence: String,

        /// Elevation gain in metres (cycling).
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        elevation: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// List stored workouts, oldest first.
    List {
        /// Also place a map marker for every workout.
        #[arg(long)]
        markers: bool,
    },

    /// Pick a workout from the list and center the map on it.
    Select {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Print the stored representation of all workouts.
    Export,

    /// Delete every workout. Cannot be undone.
    Reset {
        /// Confirm the reset; nothing is deleted without it.
        #[arg(long)]
        yes: bool,
    },
}
