//! stackstate CLI
//!
//! `stackstate state delete|unprotect` against a JSON snapshot file.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod render;
pub mod state;

use anyhow::{bail, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use stackstate_edit::driver::FileStore;
use stackstate_edit::{EditConfig, ProviderMatch};
use stackstate_resource::Urn;
use state::UnprotectTarget;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the snapshot file
pub const STATE_FILE_ENV: &str = "STACKSTATE_STATE_FILE";

/// Snapshot file used when neither flag nor environment names one
pub const DEFAULT_STATE_FILE: &str = "stackstate.json";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line definition
#[must_use]
pub fn command() -> Command {
    Command::new("stackstate")
        .version(VERSION)
        .about("Repair infrastructure state snapshots by hand")
        .arg(
            Arg::new("state")
                .long("state")
                .global(true)
                .env(STATE_FILE_ENV)
                .default_value(DEFAULT_STATE_FILE)
                .value_parser(value_parser!(PathBuf))
                .help("Snapshot file to edit"),
        )
        .arg(
            Arg::new("exact-provider-ids")
                .long("exact-provider-ids")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Match provider references by URN and physical ID"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("state")
                .about("Edit the current snapshot")
                .subcommand_required(true)
                .subcommand(
                    Command::new("delete")
                        .about("Delete a resource nothing depends on")
                        .arg(
                            Arg::new("urn")
                                .required(true)
                                .value_parser(value_parser!(Urn))
                                .help("URN of the resource to delete"),
                        ),
                )
                .subcommand(
                    Command::new("unprotect")
                        .about("Clear the protect flag of a resource")
                        .arg(
                            Arg::new("urn")
                                .value_parser(value_parser!(Urn))
                                .conflicts_with("all")
                                .help("URN of the resource to unprotect"),
                        )
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Unprotect every resource"),
                        ),
                ),
        )
}

/// Install the stderr log subscriber, filtered by `RUST_LOG` (default `warn`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run parsed arguments, writing the success message to `out`
///
/// # Errors
/// Usage errors, and any [`stackstate_edit::driver::DriverError`] from the edit
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("state")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));
    let store = FileStore::new(path);
    let config = if matches.get_flag("exact-provider-ids") {
        EditConfig::new().with_provider_match(ProviderMatch::UrnAndId)
    } else {
        EditConfig::new()
    };
    tracing::debug!(state = %store.path().display(), ?config, "running command");

    let message = match matches.subcommand() {
        Some(("state", state_matches)) => match state_matches.subcommand() {
            Some(("delete", args)) => {
                let Some(urn) = args.get_one::<Urn>("urn") else {
                    bail!("must provide a URN corresponding to a resource");
                };
                state::delete(&store, urn, &config)?
            }
            Some(("unprotect", args)) => {
                let target = if args.get_flag("all") {
                    UnprotectTarget::All
                } else if let Some(urn) = args.get_one::<Urn>("urn") {
                    UnprotectTarget::One(urn.clone())
                } else {
                    bail!("must provide a URN corresponding to a resource");
                };
                state::unprotect(&store, &target)?
            }
            _ => bail!("unknown state command"),
        },
        _ => bail!("unknown command"),
    };

    writeln!(out, "{message}")?;
    Ok(())
}
