//! Terminal rendering: status lines, tables and portal units

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use rust_decimal::Decimal;

/// Decimal units, as the portal reports traffic
const SIZE_UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Errors go to stderr so `--json` output stays parseable
pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn warning(msg: &str) {
    println!("{} {}", "!".yellow().bold(), msg.yellow());
}

/// Secondary line, e.g. an empty result
pub fn note(msg: &str) {
    println!("{}", msg.dimmed());
}

/// Table with the shared preset and a header row
pub fn list_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

/// Two-column table of labelled values, labels in bold
pub fn detail_table(rows: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label.bold()), Cell::new(value)]);
    }
    table
}

/// Balance in yuan with two decimal places
pub fn format_balance(balance: Decimal) -> String {
    let mut yuan = balance.round_dp(2);
    yuan.rescale(2);
    format!("¥{}", yuan)
}

/// Byte count in decimal units, matching the portal's own figures
pub fn format_size(bytes: u64) -> String {
    if bytes < 1000 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1000.0;
    let mut unit = SIZE_UNITS[0];
    for next in &SIZE_UNITS[1..] {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        unit = next;
    }
    format!("{:.2} {}", value, unit)
}

/// Check time in the local zone
pub fn format_checked_at(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
