pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod render;
pub mod stats;
pub mod store;
pub mod task;

use std::ffi::OsString;
use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Context;
use clap::Parser;
use tracing::info;

/// Run one planning session: parse global flags, load config, then read
/// command lines from stdin until quit or end of input. All task state
/// lives in memory for the lifetime of this call.
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::GlobalCli::parse_from(raw_args);
    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting study session");

    let cfg = config::Config::load(cli.config.as_deref()).context("failed to load config")?;
    let mut store = store::TaskStore::new();
    let mut renderer = render::Renderer::new(&cfg);

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        println!("Study planner. Type 'help' for commands, 'quit' to end the session.");
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("study> ");
            io::stdout().flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input line")?;

        let inv = match cli::tokenize(&line).and_then(cli::Invocation::parse) {
            Ok(Some(inv)) => inv,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("error: {err:#}");
                continue;
            }
        };

        if matches!(inv.command.as_str(), "quit" | "exit") {
            break;
        }

        // A failed command reports and the session goes on; nothing here
        // can leave the store partially mutated.
        if let Err(err) = commands::dispatch(&mut store, &cfg, &mut renderer, &inv) {
            eprintln!("error: {err:#}");
        }
    }

    info!(tasks = store.len(), "session ended");
    Ok(())
}
