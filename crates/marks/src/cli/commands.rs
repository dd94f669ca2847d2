//! # Dispatch
//!
//! 1. Parse the command line with clap.
//! 2. Install logging. `MARKS_LOG` takes an `EnvFilter` directive; `-v`
//!    switches marks' own targets to `debug`.
//! 3. Resolve the [`MarksContext`] (data dir, git root, config).
//! 4. Dispatch to a `marksapp::commands` function and render its `CmdResult`.

use super::render::{print_bookmarks, print_json, print_messages, print_status};
use super::setup::{parse_cli, Commands, ConfigCommands, GitCommands};
use anyhow::{anyhow, Context, Result};
use clapfig::{Clapfig, ConfigAction, SearchPath};
use marksapp::commands::{self, add::NewBookmark, list::ListFilter, CmdResult};
use marksapp::config::MarksConfig;
use marksapp::init::{initialize, MarksContext, CONFIG_FILE};
use marksapp::repo::Repository;
use marksapp::vcs::GitCli;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "MARKS_LOG";

pub fn run() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.verbose);

    let ctx = initialize(cli.data.clone()).context("failed to initialize marks")?;

    if let Some(Commands::Config { action }) = &cli.command {
        return handle_config_command(action.as_ref(), &ctx);
    }

    let db = ctx.db_name(cli.db.as_deref());
    tracing::debug!(db = %db, "dispatching");

    match cli.command {
        // Naked `marks` lists the default database.
        None => handle_list(&ctx, &db, Vec::new(), false, false),
        Some(Commands::Add {
            url,
            title,
            desc,
            tags,
            favorite,
        }) => {
            let mut store = ctx.open_store(&db)?;
            let mut repo = ctx.repository(&db);
            let input = NewBookmark {
                url,
                title,
                desc,
                tags,
                favorite,
            };
            let result = commands::add::run(&mut store, &mut repo, input)?;
            print_messages(&result.messages);
            Ok(())
        }
        Some(Commands::Remove { url }) => {
            let mut store = ctx.open_store(&db)?;
            let mut repo = ctx.repository(&db);
            let result = commands::remove::run(&mut store, &mut repo, &url)?;
            print_messages(&result.messages);
            Ok(())
        }
        Some(Commands::List {
            tags,
            favorites,
            json,
        }) => handle_list(&ctx, &db, tags, favorites, json),
        Some(Commands::Git { action }) => handle_git(&ctx, &db, action),
        Some(Commands::Config { .. }) => Ok(()),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,marksapp=debug,marks=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn handle_list(
    ctx: &MarksContext,
    db: &str,
    tags: Vec<String>,
    favorites_only: bool,
    json: bool,
) -> Result<()> {
    let store = ctx.open_store(db)?;
    let filter = ListFilter {
        tags,
        favorites_only,
    };
    let result = commands::list::run(&store, &filter)?;
    if json {
        print_json(&result.bookmarks)
    } else {
        print_bookmarks(&result.bookmarks);
        Ok(())
    }
}

fn handle_git(ctx: &MarksContext, db: &str, action: GitCommands) -> Result<()> {
    // Clone works on the git root alone and must not require a database.
    if let GitCommands::Clone { url } = &action {
        let result = commands::clone::run(&ctx.vcs(), url, &ctx.git_root)?;
        print_messages(&result.messages);
        return Ok(());
    }

    let mut store = ctx.open_store(db)?;
    let progress = Progress::new(progress_label(&action));
    let mut repo = progress.attach(ctx.repository(db));

    let result: CmdResult = match action {
        GitCommands::Init { encrypt } => commands::init::run(&repo, &encrypt)?,
        GitCommands::Export { force } => commands::export::run(&store, &repo, force)?,
        GitCommands::Import => commands::import::run(&mut store, &repo)?,
        GitCommands::Commit { message } => {
            commands::commit::run(&store, &repo, message.as_deref())?
        }
        GitCommands::Status { json } => {
            let result = commands::status::run(&store, &mut repo)?;
            if json {
                return print_json(&result);
            }
            print_status(&result);
            result
        }
        GitCommands::Track => commands::track::track(&store, &mut repo)?,
        GitCommands::Untrack => commands::track::untrack(&mut repo)?,
        GitCommands::Drop => commands::drop::run(&mut repo)?,
        GitCommands::Push => commands::push::run(&repo)?,
        GitCommands::Clone { .. } => CmdResult::default(),
    };
    progress.finish();
    print_messages(&result.messages);
    Ok(())
}

/// What the running count measures for each git subcommand.
fn progress_label(action: &GitCommands) -> &'static str {
    match action {
        GitCommands::Import => "loaded",
        _ => "exported",
    }
}

/// A running count on stderr during bulk work, only when stderr is a terminal.
struct Progress {
    label: &'static str,
    enabled: bool,
    shown: Arc<AtomicBool>,
}

impl Progress {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            enabled: console::Term::stderr().is_term(),
            shown: Arc::new(AtomicBool::new(false)),
        }
    }

    fn attach(&self, repo: Repository<GitCli>) -> Repository<GitCli> {
        if !self.enabled {
            return repo;
        }
        let shown = Arc::clone(&self.shown);
        let label = self.label;
        repo.with_progress(Box::new(move |done: usize| {
            shown.store(true, Ordering::Relaxed);
            eprint!("\r{} {}", console::style(label).dim(), done);
        }))
    }

    fn finish(&self) {
        if self.shown.load(Ordering::Relaxed) {
            eprintln!();
        }
    }
}

/// Handle the `marks config` subcommand using clapfig directly.
fn handle_config_command(action: Option<&ConfigCommands>, ctx: &MarksContext) -> Result<()> {
    let load_paths = vec![SearchPath::Path(ctx.data_dir.clone())];
    match action {
        None => {
            let config: MarksConfig = Clapfig::builder()
                .app_name("marks")
                .file_name(CONFIG_FILE)
                .search_paths(load_paths)
                .no_env()
                .strict(false)
                .load()
                .unwrap_or_default();

            let table = toml::Value::try_from(&config).map_err(|e| anyhow!(e.to_string()))?;
            if let toml::Value::Table(t) = table {
                for (k, v) in &t {
                    println!("{} = {}", k, format_toml_value(v));
                }
            }
            println!("# git_root resolves to \"{}\"", ctx.git_root.display());
            Ok(())
        }
        Some(ConfigCommands::Get { key }) => {
            let action = ConfigAction::Get {
                key: key.clone(),
                scope: None,
            };
            let result = Clapfig::builder::<MarksConfig>()
                .app_name("marks")
                .file_name(CONFIG_FILE)
                .search_paths(load_paths)
                .no_env()
                .strict(false)
                .handle(&action)
                .map_err(|e| anyhow!(e.to_string()))?;
            println!("{result}");
            Ok(())
        }
    }
}

fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => format!("\"{}\"", s),
        toml::Value::Array(a) => toml::to_string(a).unwrap_or_else(|_| format!("{a:?}")),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_toml_value_quotes_strings() {
        assert_eq!(
            format_toml_value(&toml::Value::String("bookmarks".into())),
            "\"bookmarks\""
        );
        assert_eq!(format_toml_value(&toml::Value::Integer(4)), "4");
        assert_eq!(format_toml_value(&toml::Value::Boolean(true)), "true");
    }

    #[test]
    fn test_progress_label_per_command() {
        assert_eq!(progress_label(&GitCommands::Import), "loaded");
        assert_eq!(progress_label(&GitCommands::Export { force: false }), "exported");
        assert_eq!(progress_label(&GitCommands::Track), "exported");
    }

    #[test]
    fn test_default_config_serializes_to_table() {
        let table = toml::Value::try_from(&MarksConfig::default()).unwrap();
        let table = table.as_table().unwrap();
        assert_eq!(table["default_db"].as_str(), Some("bookmarks"));
        assert!(!table.contains_key("workers"));
    }
}
