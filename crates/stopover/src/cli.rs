use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::place::LatLng;

#[derive(Parser)]
#[command(name = "stopover")]
#[command(author, version, about)]
#[command(long_about = "Collect places into an ordered waypoint list and turn it into route links.\n\n\
    The most recently added place always comes first. Your current location\n\
    (from --at or the `home` config entry) is added once at startup.\n\n\
    Examples:\n  \
    stopover plan --at 40.7,-74.0                 Interactive session\n  \
    stopover route \"Central Park\" \"Pier 17\"       Add places and print links\n  \
    stopover route --selections picks.json --offline\n  \
    stopover config set backend.url http://localhost:8000")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search places interactively and submit the waypoint list
    Plan {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Add places non-interactively, submit once and print the route links
    Route {
        /// Place searches, added in the order given (the last one ends up first)
        queries: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,

        /// Print waypoints and links as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

/// Where places, positions and route links come from.
#[derive(Args, Clone, Default)]
pub struct SourceArgs {
    /// Current location as LAT,LNG (overrides `home` from the config)
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub at: Option<LatLng>,

    /// JSON file of recorded place selections to search instead of Google
    #[arg(long, value_name = "FILE")]
    pub selections: Option<PathBuf>,

    /// Route service base URL (overrides config and STOPOVER_BACKEND_URL)
    #[arg(long, value_name = "URL")]
    pub backend: Option<String>,

    /// Build route links locally and skip all web services
    #[arg(long)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (backend.url, google.api_key, home)
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the configuration file path
    Path,
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Plan { source }) => crate::commands::plan::run(&source),
            Some(Commands::Route {
                queries,
                source,
                json,
            }) => crate::commands::route::run(&queries, &source, json, self.quiet),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("stopover {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                use clap::CommandFactory;
                let mut cmd = Self::command();
                cmd.print_help()?;
                println!();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_route_args() {
        let cli = Cli::try_parse_from([
            "stopover",
            "route",
            "Central Park",
            "Pier 17",
            "--at",
            "40.7,-74.0",
            "--offline",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Route {
                queries, source, ..
            }) => {
                assert_eq!(queries, vec!["Central Park", "Pier 17"]);
                assert_eq!(source.at, Some(LatLng::new(40.7, -74.0)));
                assert!(source.offline);
            }
            _ => panic!("expected route command"),
        }
    }

    #[test]
    fn test_negative_latitude_is_not_a_flag() {
        let cli = Cli::try_parse_from(["stopover", "plan", "--at", "-33.86,151.21"]).unwrap();
        match cli.command {
            Some(Commands::Plan { source }) => {
                assert_eq!(source.at, Some(LatLng::new(-33.86, 151.21)));
            }
            _ => panic!("expected plan command"),
        }
    }

    #[test]
    fn test_bad_coordinates_are_rejected() {
        assert!(Cli::try_parse_from(["stopover", "plan", "--at", "400,0"]).is_err());
    }
}
