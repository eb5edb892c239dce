//! Field extraction from portal pages
//!
//! The portal renders everything as table cells with the `maintd` class. On
//! the account page the cells alternate label, value, label, value. On the
//! sessions page every row is a fixed number of cells.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::domain::result::{Error, Result};
use crate::domain::{AccountInfo, OnlineSession};

/// Labels on the account page
pub mod labels {
    pub const NAME: &str = "姓名";
    pub const LEGAL_ID: &str = "证件号";
    pub const BALANCE: &str = "帐户余额";
    pub const IPV4_USAGE: &str = "使用流量(IPV4)";
    pub const IPV6_USAGE: &str = "使用流量(IPV6)";
}

/// Cells per row on the sessions page
pub const SESSION_ROW_LEN: usize = 14;

const SESSION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// The portal reports times in China Standard Time
const PORTAL_UTC_OFFSET_SECS: i32 = 8 * 3600;

fn cell_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(".maintd").expect("static selector"))
}

fn input_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("input").expect("static selector"))
}

fn decimal_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?").expect("static regex"))
}

fn integer_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+").expect("static regex"))
}

fn usage_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([KMGT]?)").expect("static regex"))
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Trimmed text of every `maintd` cell, in document order
pub fn cell_texts(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document.select(cell_selector()).map(|c| cell_text(&c)).collect()
}

/// Pair cells two at a time into a label -> value map.
///
/// An unpaired trailing cell is dropped; a repeated label keeps its last value.
pub fn label_pairs(cells: &[String]) -> HashMap<String, String> {
    cells
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

/// Leading decimal number of a value such as `"12345.50 元"`
pub fn leading_decimal(label: &str, value: &str) -> Result<Decimal> {
    decimal_prefix()
        .find(value)
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
        .ok_or_else(|| Error::malformed_field(label, value))
}

/// Leading run of digits of a value such as `"678900 Bytes"`
pub fn leading_integer(label: &str, value: &str) -> Result<u64> {
    integer_prefix()
        .find(value)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| Error::malformed_field(label, value))
}

/// Byte count of a usage string such as `"1.5G"`, `"312K"` or `"2048B"`.
///
/// Units are decimal (K = 1000), matching how the portal prints usage.
pub fn parse_usage(label: &str, value: &str) -> Result<u64> {
    let malformed = || Error::malformed_field(label, value);
    let caps = usage_pattern().captures(value).ok_or_else(malformed)?;

    let amount = Decimal::from_str(&caps[1]).map_err(|_| malformed())?;
    let multiplier: u64 = match &caps[2] {
        "K" => 1_000,
        "M" => 1_000_000,
        "G" => 1_000_000_000,
        "T" => 1_000_000_000_000,
        _ => 1,
    };

    amount
        .checked_mul(Decimal::from(multiplier))
        .and_then(|bytes| bytes.trunc().to_u64())
        .ok_or_else(malformed)
}

fn required<'a>(fields: &'a HashMap<String, String>, label: &str) -> Result<&'a str> {
    fields
        .get(label)
        .map(String::as_str)
        .ok_or_else(|| Error::missing_field(label))
}

/// Parse the account page into typed fields
pub fn parse_account_info(html: &str) -> Result<AccountInfo> {
    let fields = label_pairs(&cell_texts(html));

    Ok(AccountInfo {
        display_name: required(&fields, labels::NAME)?.to_string(),
        legal_id: required(&fields, labels::LEGAL_ID)?.to_string(),
        balance: leading_decimal(labels::BALANCE, required(&fields, labels::BALANCE)?)?,
        ipv4_bytes: leading_integer(labels::IPV4_USAGE, required(&fields, labels::IPV4_USAGE)?)?,
        ipv6_bytes: leading_integer(labels::IPV6_USAGE, required(&fields, labels::IPV6_USAGE)?)?,
    })
}

fn parse_session_time(value: &str) -> Result<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(value, SESSION_TIME_FORMAT)
        .map_err(|_| Error::malformed_field("start_time", value))?;

    FixedOffset::east_opt(PORTAL_UTC_OFFSET_SECS)
        .and_then(|tz| tz.from_local_datetime(&naive).single())
        .ok_or_else(|| Error::malformed_field("start_time", value))
}

/// Parse the online sessions page. The first row is the table header.
pub fn parse_sessions(html: &str) -> Result<Vec<OnlineSession>> {
    let document = Html::parse_document(html);
    let cells: Vec<ElementRef<'_>> = document.select(cell_selector()).collect();

    cells
        .chunks_exact(SESSION_ROW_LEN)
        .skip(1)
        .map(|row| -> Result<OnlineSession> {
            let id = row[0]
                .select(input_selector())
                .next()
                .and_then(|input| input.value().attr("value"))
                .ok_or_else(|| Error::missing_field("session id"))?
                .to_string();

            Ok(OnlineSession {
                id,
                ip: cell_text(&row[1]),
                start_time: parse_session_time(&cell_text(&row[2]))?,
                usage_bytes: parse_usage("usage", &cell_text(&row[3]))?,
                device_name: cell_text(&row[11]),
            })
        })
        .collect()
}
