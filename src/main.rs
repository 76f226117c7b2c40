#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Result, bail};
use clap::Parser;
use mapty::cli::{self, Backend, Cmd};
use mapty::storage::{BlobStore, JsonDirStore, MemoryBlobStore, StorageError};
use mapty::view::{TerminalList, TerminalMap};
use mapty::{App, Coords, RawWorkoutInput, SqliteBlobStore, WorkoutStore, utils};
use std::path::Path;

#[macro_use]
extern crate mapty;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);
    dlog!(
        "store={} backend={:?} zoom={}",
        cli.store.display(),
        cli.backend,
        cli.zoom
    );

    let store = WorkoutStore::open(open_storage(cli.backend, &cli.store));
    let cmd = cli.cmd.unwrap_or(Cmd::List { markers: false });

    match cmd {
        Cmd::Add {
            kind,
            distance,
            duration,
            cadence,
            elevation,
            lat,
            lng,
        } => {
            let input = RawWorkoutInput {
                kind,
                distance,
                duration,
                cadence,
                elevation,
            };
            let mut app = App::new(
                store,
                TerminalList::stdout(),
                Some(TerminalMap::stdout()),
                cli.zoom,
            );
            if let Err(e) = app.on_submit(&input, Coords::new(lat, lng)) {
                bail!("Workout rejected: {e}");
            }
            warn_if_degraded(&app.into_parts().0);
            Ok(())
        }
        Cmd::List { markers } => {
            if store.is_empty() {
                println!("No workouts yet.");
                return Ok(());
            }
            let map = markers.then(TerminalMap::stdout);
            let mut app = App::new(store, TerminalList::stdout(), map, cli.zoom);
            app.load();
            Ok(())
        }
        Cmd::Select { id } => {
            let mut app = App::new(
                store,
                TerminalList::stdout(),
                Some(TerminalMap::stdout()),
                cli.zoom,
            );
            if let Some(w) = app.on_select(&id) {
                dlog!("selected id={} clicks={}", w.id(), w.clicks());
            } else {
                println!("No workout with id {id}.");
            }
            Ok(())
        }
        Cmd::Export => {
            println!("{}", store.serialize_all()?);
            Ok(())
        }
        Cmd::Reset { yes } => {
            if !yes {
                bail!("Refusing to delete {} workouts without --yes", store.len());
            }
            let mut store = store;
            store.reset();
            warn_if_degraded(&store);
            Ok(())
        }
    }
}

/// Storage that cannot be opened is not fatal: the session runs in memory.
fn open_storage(backend: Backend, path: &Path) -> Box<dyn BlobStore> {
    let opened: Result<Box<dyn BlobStore>, StorageError> = match backend {
        Backend::Sqlite => {
            SqliteBlobStore::open(path).map(|s| Box::new(s) as Box<dyn BlobStore>)
        }
        Backend::Json => JsonDirStore::open(path).map(|s| Box::new(s) as Box<dyn BlobStore>),
    };

    opened.unwrap_or_else(|e| {
        tracing::warn!(
            path = %path.display(),
            err = %e,
            "storage unavailable; workouts will not be saved this session"
        );
        Box::new(MemoryBlobStore::new())
    })
}

fn warn_if_degraded<S: BlobStore>(store: &WorkoutStore<S>) {
    if store.is_degraded() {
        eprintln!("warning: changes could not be saved and only live for this run");
    }
}
