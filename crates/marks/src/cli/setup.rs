use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.3.0"
/// Format for dev builds: "v0.3.0\ndev: abc1234 2026-10-19 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "marks",
    bin_name = "marks",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Bookmarks in a database, mirrored into git", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Database to operate on (defaults to `default_db` from marks.toml)
    #[arg(long, global = true, help_heading = "Options")]
    pub db: Option<String>,

    /// Data directory (overrides MARKS_DATA)
    #[arg(long, global = true, help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a bookmark
    #[command(alias = "a")]
    Add {
        url: String,

        #[arg(short, long, default_value = "")]
        title: String,

        #[arg(short, long, default_value = "")]
        desc: String,

        /// Comma-separated tags
        #[arg(short = 'T', long, value_delimiter = ',')]
        tags: Vec<String>,

        #[arg(short, long)]
        favorite: bool,
    },

    /// Remove a bookmark by URL
    #[command(alias = "rm")]
    Remove { url: String },

    /// List bookmarks
    #[command(alias = "ls")]
    List {
        /// Only bookmarks with this tag (repeatable)
        #[arg(short = 'T', long = "tag")]
        tags: Vec<String>,

        /// Only favorites
        #[arg(short, long)]
        favorites: bool,

        #[arg(long)]
        json: bool,
    },

    /// Git mirror operations
    Git {
        #[command(subcommand)]
        action: GitCommands,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GitCommands {
    /// Create the git repository
    Init {
        /// Encrypt records for these gpg recipients
        #[arg(long, num_args = 1..)]
        encrypt: Vec<String>,
    },

    /// Write the database into the repository
    Export {
        /// Rewrite every file even when unchanged
        #[arg(short, long)]
        force: bool,
    },

    /// Read the repository into the database
    Import,

    /// Commit pending changes
    Commit {
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Compare the repository with the database
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Track the database and export it
    Track,

    /// Stop tracking the database
    Untrack,

    /// Delete the database's files from the repository
    Drop,

    /// Clone an existing marks repository
    Clone { url: String },

    /// Push to the remote
    Push,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print one configuration value
    Get { key: String },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
