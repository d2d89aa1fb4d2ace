//! Encode/decode boundary for the on-disk order record format.
//!
//! Two textual forms share one item-line codec: the multi-line display form
//! (which doubles as the durable log record and the on-screen rendering),
//! and a compact pipe-delimited header used when reconstructing a record
//! from pre-split text. Everything the rest of the crate knows about the
//! text layout lives in this module.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::domain::aggregates::order::{Order, OrderLine, ORDER_ID_PREFIX};
use crate::domain::value_objects::Money;

/// Header line markers. The load parser matches on these verbatim, so they
/// must not change without migrating existing log files.
pub const ORDER_ID_TAG: &str = "Order ID:";
pub const USER_TAG: &str = "User:";
pub const ORDER_AT_TAG: &str = "Order at:";
/// Standalone line closing a record.
pub const TERMINATOR: &str = "---";

const TOTAL_SPLIT: &str = ", Total: $";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record header is missing the order id")]
    MissingOrderId,
    #[error("record header is missing the username")]
    MissingUsername,
    #[error("unparsable total amount {0:?}")]
    BadTotal(String),
    #[error("item line does not have 4 comma-separated fields: {0:?}")]
    BadItemFieldCount(String),
    #[error("compact header does not have 4 pipe-separated fields: {0:?}")]
    BadCompactHeader(String),
}

/// Renders an order in display form, ending with the `---` terminator and
/// no trailing newline. The store appends a blank line after each record.
pub fn encode(order: &Order) -> String {
    let mut out = String::new();
    out.push_str(&format!("{ORDER_ID_TAG} {}\n", order.order_id()));
    out.push_str(&format!("{USER_TAG} {}\n", order.username()));
    out.push_str(&format!(
        "{ORDER_AT_TAG} {}{TOTAL_SPLIT}{}\n",
        format_timestamp(order.timestamp()),
        order.total(),
    ));
    for line in order.items() {
        out.push_str(&format!(
            "{},{},{},{}\n",
            line.product_id, line.name, line.quantity, line.unit_price
        ));
    }
    out.push_str(TERMINATOR);
    out
}

/// RFC 3339 UTC with millisecond precision. Locale-independent and free of
/// commas, which keeps the `", Total: $"` split in the header unambiguous.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a flushed record: the buffered header line group plus the raw
/// item lines that followed it.
///
/// A record without an extractable order id or username is unusable. An
/// item line with the wrong field count poisons the whole record; a 4-field
/// line whose numerics do not parse is skipped on its own.
pub fn decode_record(header: &[String], items: &[String]) -> Result<Order, RecordError> {
    let mut order_id = None;
    let mut username = None;
    let mut timestamp_raw = None;
    let mut total = Money::zero();

    for line in header {
        if let Some(rest) = line.strip_prefix(ORDER_ID_TAG) {
            order_id = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(USER_TAG) {
            username = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(ORDER_AT_TAG) {
            if let Some((ts, amount)) = rest.split_once(TOTAL_SPLIT) {
                timestamp_raw = Some(ts.trim().to_string());
                total = amount
                    .trim()
                    .parse()
                    .map_err(|_| RecordError::BadTotal(amount.trim().to_string()))?;
            }
        }
    }

    let order_id = order_id
        .filter(|s| !s.is_empty())
        .ok_or(RecordError::MissingOrderId)?;
    let username = username
        .filter(|s| !s.is_empty())
        .ok_or(RecordError::MissingUsername)?;

    let mut lines = Vec::new();
    for raw in items {
        if raw.trim().is_empty() || raw == TERMINATOR {
            continue;
        }
        match decode_item_line(raw)? {
            Some(line) => lines.push(line),
            None => warn!(line = raw.as_str(), "skipping unparsable item line"),
        }
    }

    let timestamp = resolve_timestamp(timestamp_raw.as_deref(), &order_id);
    Ok(Order::from_parts(order_id, username, lines, total, timestamp))
}

/// Reconstructs an order from the compact form: a single
/// `order_id|username|epoch_millis|total` header line followed by the
/// standard item lines and terminator.
pub fn decode_compact(text: &str) -> Result<Order, RecordError> {
    let mut lines = text.lines();
    let header = lines.next().unwrap_or("");
    let fields: Vec<&str> = header.split('|').collect();
    if fields.len() != 4 {
        return Err(RecordError::BadCompactHeader(header.to_string()));
    }
    let order_id = fields[0].trim();
    if order_id.is_empty() {
        return Err(RecordError::MissingOrderId);
    }
    let username = fields[1].trim();
    if username.is_empty() {
        return Err(RecordError::MissingUsername);
    }
    let millis: i64 = fields[2]
        .trim()
        .parse()
        .map_err(|_| RecordError::BadCompactHeader(header.to_string()))?;
    let total: Money = fields[3]
        .trim()
        .parse()
        .map_err(|_| RecordError::BadTotal(fields[3].trim().to_string()))?;
    let timestamp = Utc.timestamp_millis_opt(millis).single().unwrap_or_default();

    let mut items = Vec::new();
    for raw in lines {
        if raw == TERMINATOR {
            break;
        }
        if raw.trim().is_empty() {
            continue;
        }
        match decode_item_line(raw)? {
            Some(line) => items.push(line),
            None => warn!(line = raw, "skipping unparsable item line"),
        }
    }
    Ok(Order::from_parts(order_id, username, items, total, timestamp))
}

/// Splits one `id,name,quantity,price` item line. `Err` on a wrong field
/// count (record-fatal), `Ok(None)` when the numeric fields do not parse
/// (line is skipped, record survives).
pub fn decode_item_line(line: &str) -> Result<Option<OrderLine>, RecordError> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 4 {
        return Err(RecordError::BadItemFieldCount(line.to_string()));
    }
    let quantity = match fields[2].trim().parse::<u32>() {
        Ok(q) => q,
        Err(_) => return Ok(None),
    };
    let unit_price = match fields[3].trim().parse::<Money>() {
        Ok(p) => p,
        Err(_) => return Ok(None),
    };
    Ok(Some(OrderLine {
        product_id: fields[0].to_string(),
        name: fields[1].to_string(),
        quantity,
        unit_price,
    }))
}

/// The stored header timestamp is authoritative. When it does not parse,
/// fall back to the instant embedded in the order id, then to the epoch;
/// the record itself is kept either way.
fn resolve_timestamp(raw: Option<&str>, order_id: &str) -> DateTime<Utc> {
    if let Some(raw) = raw {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => return ts.with_timezone(&Utc),
            Err(_) => warn!(raw, "unparsable order timestamp, falling back to order id"),
        }
    }
    order_id
        .strip_prefix(ORDER_ID_PREFIX)
        .and_then(|ms| ms.parse::<i64>().ok())
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or_default()
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}
