pub mod toml_config;

pub use toml_config::{AppConfig, StoreKind};

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "jumuia-booking")]
#[command(about = "Book parish meeting rooms for Jumuia groups")]
pub struct CliConfig {
    /// Path to TOML configuration file; defaults apply when it is absent
    #[arg(short, long, default_value = "jumuia-booking.toml")]
    pub config: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List Jumuia group names
    Groups,
    /// List room names
    Rooms,
    /// Show current reservations
    List {
        /// Filter by group, room or date
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Show the 24 bookable hour slots starting from the current hour
    Slots,
    /// Reserve a room
    Reserve {
        #[arg(long)]
        group: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:00
        #[arg(long)]
        time: String,
        #[arg(long)]
        room: String,
    },
    /// Delete reservations whose time has passed
    Sweep,
    /// Keep sweeping on the configured interval until Ctrl-C
    Watch {
        #[arg(short, long, default_value = "")]
        search: String,
    },
}
