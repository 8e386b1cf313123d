//! What the user sees on the terminal after a login or logout.

use std::path::Path;

use console::style;
use kubeconf::{render, Changes, ConfigDocument, EntryChange, OwnedEntry};
use similar::{ChangeTag, TextDiff};
use tabular::{row, Table};

const DELIMITER_WIDTH: usize = 51;

fn delimiter() -> String {
    "=".repeat(DELIMITER_WIDTH)
}

/// Print a previewed kubeconfig between delimiter lines on stdout.
pub fn preview(header: &str, rendered: &str) {
    println!("\n{header}");
    println!("{}", delimiter());
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    println!("{}", delimiter());
}

/// Line diff between the kubeconfig as it was and as it would be, on stderr.
pub fn diff(previous: Option<&ConfigDocument>, rendered: &str) {
    let before = match previous.map(render).transpose() {
        Ok(before) => before.unwrap_or_default(),
        Err(_) => return,
    };
    if before == rendered {
        eprintln!("{}", style("No changes.").dim());
        return;
    }

    let diff = TextDiff::from_lines(before.as_str(), rendered);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => eprint!("{}", style(format!("-{change}")).red()),
            ChangeTag::Insert => eprint!("{}", style(format!("+{change}")).green()),
            ChangeTag::Equal => eprint!(" {change}"),
        }
    }
}

fn describe(change: EntryChange) -> String {
    match change {
        EntryChange::Created => style("added").green().to_string(),
        EntryChange::Replaced => style("updated").yellow().to_string(),
        EntryChange::Unchanged => style("unchanged").dim().to_string(),
        EntryChange::Kept => style("kept existing").dim().to_string(),
        EntryChange::Missing => style("missing from bundle").red().to_string(),
    }
}

pub fn changes_table(changes: &Changes) -> Table {
    let mut table = Table::new("   {:<} {:<} {:<}");
    for (entry, change) in changes.iter() {
        table.add_row(row!(
            format!("{}:", capitalize(entry.kind())),
            entry.name(),
            describe(change)
        ));
    }
    table
}

pub fn removed_table(removed: &[OwnedEntry]) -> Table {
    let mut table = Table::new("   {:<} {:<}");
    for entry in removed {
        table.add_row(row!(
            format!("{}:", capitalize(entry.kind())),
            style(entry.name()).red()
        ));
    }
    table
}

pub fn location(path: &Path) {
    println!("   Location: {}", path.display());
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
