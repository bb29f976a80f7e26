//! Line-oriented console for the dashboard session.

use std::path::PathBuf;

use anyhow::bail;
use thermolog_client::Notifier;
use thermolog_core::DashboardSnapshot;

pub const HELP: &str = "\
Commands:
  add <timestamp;temp>   append a row on the device
  select <timestamp>     choose the row to delete
  delete                 delete the selected row
  clear                  clear the device's CSV log
  clear-wifi             forget the device's Wi-Fi credentials
  download <path>        save the CSV log to a file
  list                   show the selectable rows
  quit                   leave the dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Add(String),
    Select(String),
    Delete,
    Clear,
    ClearWifi,
    Download(PathBuf),
    List,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ConsoleCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match (word, rest) {
        ("add", row) if !row.is_empty() => ConsoleCommand::Add(row.to_string()),
        ("select", ts) if !ts.is_empty() => ConsoleCommand::Select(ts.to_string()),
        ("download", path) if !path.is_empty() => ConsoleCommand::Download(PathBuf::from(path)),
        ("add" | "select" | "download", _) => bail!("'{}' needs an argument", word),
        ("delete", "") => ConsoleCommand::Delete,
        ("clear", "") => ConsoleCommand::Clear,
        ("clear-wifi", "") => ConsoleCommand::ClearWifi,
        ("list", "") => ConsoleCommand::List,
        ("help", "") => ConsoleCommand::Help,
        ("quit" | "exit", "") => ConsoleCommand::Quit,
        _ => bail!("Unknown command: {}", line),
    };
    Ok(Some(command))
}

/// One status line: the latest value and the chart size.
pub fn render_status(snapshot: &DashboardSnapshot) -> String {
    let latest = snapshot.latest.as_deref().unwrap_or("Latest Temperature: -- °C");
    format!("{} ({} points)", latest, snapshot.values.len())
}

/// The selectable rows, marking the current one.
pub fn render_options(snapshot: &DashboardSnapshot) -> String {
    if snapshot.options.is_empty() {
        return "No rows".to_string();
    }
    snapshot
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let marker = if snapshot.selected_index == Some(index) {
                '*'
            } else {
                ' '
            };
            format!("{} {}  {}", marker, option.value, option.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints alerts to stdout.
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn alert(&self, message: &str) {
        println!("[alert] {}", message);
    }
}
