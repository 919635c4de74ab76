use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

/// Command-line client for the SoundCloud API.
#[derive(Debug, Parser)]
#[command(name = "soundcloud", version)]
pub struct Cli {
    /// Directory holding config.toml and token.json.
    #[arg(long = "home", global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in through the browser and store the access token.
    Login(LoginArgs),
    /// Forget the stored access token.
    Logout,
    /// Show the logged-in user.
    Me,
    /// Track operations.
    Tracks(TracksCli),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Seconds to wait for the browser redirect.
    #[arg(long = "timeout", default_value_t = 300)]
    pub timeout_secs: u64,
}

#[derive(Debug, Args)]
pub struct TracksCli {
    #[command(subcommand)]
    pub command: TracksSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum TracksSubcommand {
    /// Search public tracks.
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query.
    pub query: String,

    /// Results per page (1-200).
    #[arg(long = "limit", short = 'l', default_value_t = 10)]
    pub limit: u32,

    /// Zero-based page number.
    #[arg(long = "page", short = 'p', default_value_t = 0)]
    pub page: u32,

    /// Print raw JSON instead of a table.
    #[arg(long = "json", short = 'j')]
    pub json: bool,
}
