//! Terminal rendering for command results.
//!
//! Listings follow a fixed-width layout: index, favorite marker, title and
//! tags truncated to fit, then a right-aligned relative time. URLs go on a
//! dimmed second line so they are never cut.

use anyhow::Result;
use chrono::{DateTime, Utc};
use console::style;
use marksapp::commands::{CmdMessage, CmdResult, MessageLevel};
use marksapp::model::Bookmark;
use serde::Serialize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const FAVORITE_MARKER: &str = "★";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", style(&message.content).dim()),
            MessageLevel::Success => println!("{}", style(&message.content).green()),
            MessageLevel::Warning => println!("{}", style(&message.content).yellow()),
            MessageLevel::Error => println!("{}", style(&message.content).red()),
        }
    }
}

pub(super) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(super) fn print_bookmarks(bookmarks: &[Bookmark]) {
    if bookmarks.is_empty() {
        println!("No bookmarks found.");
        return;
    }
    for bookmark in bookmarks {
        println!("{}", format_line(bookmark));
        println!("      {}", style(&bookmark.url).dim());
    }
}

fn format_line(bookmark: &Bookmark) -> String {
    let idx_str = format!("{:>4}. ", bookmark.id);
    let marker = if bookmark.favorite {
        format!("{} ", FAVORITE_MARKER)
    } else {
        "  ".to_string()
    };

    let title = if bookmark.title.trim().is_empty() {
        bookmark.url.as_str()
    } else {
        bookmark.title.as_str()
    };
    let label = if bookmark.tags.is_empty() {
        title.to_string()
    } else {
        format!("{} [{}]", title, bookmark.tags_joined())
    };

    let fixed_width = idx_str.width() + marker.width() + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed_width);
    let label = truncate_to_width(&label, available);
    let padding = available.saturating_sub(label.width());

    format!(
        "{}{}{}{}{}",
        style(idx_str).yellow(),
        style(marker).yellow(),
        label,
        " ".repeat(padding),
        style(format_time_ago(bookmark.updated_at)).dim()
    )
}

pub(super) fn print_status(result: &CmdResult) {
    if let Some(manifest) = &result.manifest {
        let remote = if manifest.git_remote.is_empty() {
            "(none)"
        } else {
            manifest.git_remote.as_str()
        };
        let last_sync = manifest
            .last_sync_time()
            .map(|t| format_time_ago(t).trim().to_string())
            .unwrap_or_else(|| "never".to_string());

        println!("{}", style(&manifest.stats.name).bold());
        println!("  branch     {}", manifest.git_branch);
        println!("  remote     {}", remote);
        println!("  bookmarks  {}", manifest.stats.bookmarks);
        println!("  tags       {}", manifest.stats.tags);
        println!("  favorites  {}", manifest.stats.favorites);
        println!("  last sync  {}", last_sync);
    }
    if let Some(drift) = &result.drift {
        for d in drift {
            println!(
                "  {} {}: {} -> {}",
                style("~").yellow(),
                d.field,
                style(&d.recorded).dim(),
                d.current
            );
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
