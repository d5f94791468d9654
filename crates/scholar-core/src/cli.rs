use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "study",
    version,
    about = "Scholar: a study task planner for one sitting",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    // Logs go to stderr so rendered output on stdout stays pipeable.
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Split a session line into tokens, honoring single and double quotes so
/// values like `subject:"Computer Science"` stay one token.
pub fn tokenize(line: &str) -> anyhow::Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err(anyhow!("unterminated quote in input"));
    }
    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}

/// One parsed session command.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Parse a token list into a command and its arguments. An empty line
    /// parses to None; a single numeric token is shorthand for `info N`.
    pub fn parse(tokens: Vec<String>) -> anyhow::Result<Option<Self>> {
        let Some(first) = tokens.first() else {
            return Ok(None);
        };

        if tokens.len() == 1 && first.parse::<u64>().is_ok() {
            debug!(token = %first, "numeric token interpreted as info query");
            return Ok(Some(Self {
                command: "info".to_string(),
                args: tokens,
            }));
        }

        let known = crate::commands::known_command_names();
        let Some(command) = crate::commands::expand_command_abbrev(first, &known) else {
            return Err(anyhow!("unknown command: {first} (try 'help')"));
        };

        debug!(token = %first, expanded = %command, "resolved command token");
        Ok(Some(Self {
            command: command.to_string(),
            args: tokens[1..].to_vec(),
        }))
    }
}
