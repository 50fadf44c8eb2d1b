// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod index;
pub mod logging;
pub mod poll;
pub mod select;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile};
use crate::fs::RealFileSystem;
use crate::index::{FileIndex, Scanner};
use crate::poll::{ConsoleSink, PollLoop, WatchConfig};

pub use crate::errors::{PollwatchError, TraversalError};
pub use crate::index::{Change, FileRecord};
pub use crate::poll::ChangeSink;
pub use crate::select::FileSelector;
pub use crate::types::{ChangeKind, ErrorPolicy};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, then CLI overrides)
/// - the poll loop with a console sink
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut raw = load_or_default(args.config_path())?;
    args.apply_to(&mut raw);
    let cfg = ConfigFile::try_from(raw)?;
    let watch = cfg.to_watch_config()?;

    if args.dry_run {
        print_dry_run(&cfg, &watch)?;
        return Ok(());
    }

    let poll = PollLoop::new(watch, ConsoleSink);

    // Ctrl-C → graceful shutdown.
    {
        let token = poll.cancel_token();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            token.cancel();
        });
    }

    poll.start().await?;
    info!("pollwatch exiting");
    Ok(())
}

/// Print the effective configuration and what the baseline scan would track.
fn print_dry_run(cfg: &ConfigFile, watch: &WatchConfig) -> Result<()> {
    let section = cfg.watch_section();
    println!("pollwatch dry-run");
    println!("  roots = {:?}", section.roots);
    println!("  interval = {:?}", cfg.interval());
    if section.include.is_empty() {
        println!("  extensions = {:?}", section.extensions);
    } else {
        println!("  include = {:?}", section.include);
    }
    if !section.exclude.is_empty() {
        println!("  exclude = {:?}", section.exclude);
    }
    println!("  on_error = {:?}", section.on_error);

    let fs = RealFileSystem;
    let scanner = Scanner::new(&fs, watch.selector()).with_policy(watch.error_policy());
    let mut index = FileIndex::new();
    index.build(&scanner, watch.roots())?;

    println!();
    println!("tracked files ({}):", index.len());
    for record in index.iter() {
        println!("  {}", record.path.display());
    }

    debug!("dry-run complete (no polling)");
    Ok(())
}
