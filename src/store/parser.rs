//! Incremental parser for the append-only order log.
//!
//! The log is line-oriented; records are reconstructed by a three-state
//! machine:
//!
//! | state           | line                    | action                                   | next state      |
//! |-----------------|-------------------------|------------------------------------------|-----------------|
//! | `Idle`          | `Order ID:` / `User:`   | start a record                           | `ReadingHeader` |
//! | `ReadingHeader` | `Order ID:`             | flush the stale header, start another    | `ReadingHeader` |
//! | `ReadingHeader` | `User:`                 | continue the current header              | `ReadingHeader` |
//! | `ReadingHeader` | `Order at:`             | close the header                         | `ReadingItems`  |
//! | `ReadingItems`  | `Order ID:` / `User:`   | flush (terminator was lost), start anew  | `ReadingHeader` |
//! | `ReadingItems`  | `Order at:`             | buffer into the header (last one wins)   | `ReadingItems`  |
//! | `ReadingItems`  | other non-blank         | buffer an item line                      | `ReadingItems`  |
//! | any             | `---`                   | flush                                    | `Idle`          |
//!
//! Anything else is ignored where it stands. End of input flushes a record
//! still in progress, so a log missing its final terminator loads fully. A
//! record that fails to parse at flush time is dropped with a diagnostic and
//! the surrounding records are unaffected.

use tracing::{debug, warn};

use crate::domain::aggregates::order::Order;
use crate::store::record::{self, ORDER_AT_TAG, ORDER_ID_TAG, TERMINATOR, USER_TAG};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    ReadingHeader,
    ReadingItems,
}

/// Stateful line-by-line reconstruction of order records.
///
/// Feed lines with [`push_line`], then call [`finish`] to flush any record
/// left open by a truncated log.
///
/// [`push_line`]: LogParser::push_line
/// [`finish`]: LogParser::finish
#[derive(Debug)]
pub struct LogParser {
    state: ParserState,
    header: Vec<String>,
    items: Vec<String>,
    orders: Vec<Order>,
    dropped: usize,
}

impl LogParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            header: Vec::new(),
            items: Vec::new(),
            orders: Vec::new(),
            dropped: 0,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn push_line(&mut self, line: &str) {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.starts_with(ORDER_ID_TAG) {
            if self.state != ParserState::Idle {
                self.flush();
            }
            self.begin(line);
        } else if line.starts_with(USER_TAG) {
            match self.state {
                ParserState::ReadingHeader => self.header.push(line.to_string()),
                ParserState::Idle => self.begin(line),
                ParserState::ReadingItems => {
                    self.flush();
                    self.begin(line);
                }
            }
        } else if line.starts_with(ORDER_AT_TAG) {
            match self.state {
                ParserState::ReadingHeader | ParserState::ReadingItems => {
                    self.header.push(line.to_string());
                    self.state = ParserState::ReadingItems;
                }
                ParserState::Idle => debug!(line, "ignoring header line outside any record"),
            }
        } else if line == TERMINATOR {
            self.flush();
        } else if self.state == ParserState::ReadingItems && !line.trim().is_empty() {
            self.items.push(line.to_string());
        } else if !line.trim().is_empty() {
            debug!(line, "ignoring line outside an item block");
        }
    }

    /// Flushes any record still in progress and returns the parsed orders
    /// in input order, along with the number of records dropped as
    /// malformed.
    pub fn finish(mut self) -> (Vec<Order>, usize) {
        self.flush();
        (self.orders, self.dropped)
    }

    fn begin(&mut self, line: &str) {
        self.header.push(line.to_string());
        self.state = ParserState::ReadingHeader;
    }

    fn flush(&mut self) {
        if !self.header.is_empty() {
            match record::decode_record(&self.header, &self.items) {
                Ok(order) => {
                    debug!(order_id = order.order_id(), "parsed order record");
                    self.orders.push(order);
                }
                Err(e) => {
                    self.dropped += 1;
                    warn!(error = %e, "dropping malformed order record");
                }
            }
        }
        self.header.clear();
        self.items.clear();
        self.state = ParserState::Idle;
    }
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (Vec<Order>, usize) {
        let mut parser = LogParser::new();
        for line in text.lines() {
            parser.push_line(line);
        }
        parser.finish()
    }

    const WELL_FORMED: &str = "Order ID: ORD1699999999999\n\
                               User: alice\n\
                               Order at: 2023-11-14T22:13:19.999Z, Total: $19.98\n\
                               P1,Widget,2,9.99\n\
                               ---\n\
                               \n\
                               Order ID: ORD1700000000123\n\
                               User: bob\n\
                               Order at: 2023-11-14T22:13:20.123Z, Total: $25.00\n\
                               P2,Gadget,1,25.00\n\
                               ---\n";

    #[test]
    fn test_two_well_formed_records() {
        let (orders, dropped) = parse(WELL_FORMED);
        assert_eq!(dropped, 0);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].username(), "alice");
        assert_eq!(orders[1].username(), "bob");
        assert_eq!(orders[1].items()[0].name, "Gadget");
    }

    #[test]
    fn test_state_transitions() {
        let mut parser = LogParser::new();
        assert_eq!(parser.state(), ParserState::Idle);
        parser.push_line("Order ID: ORD1");
        assert_eq!(parser.state(), ParserState::ReadingHeader);
        parser.push_line("User: alice");
        assert_eq!(parser.state(), ParserState::ReadingHeader);
        parser.push_line("Order at: 2023-11-14T22:13:19.999Z, Total: $1.00");
        assert_eq!(parser.state(), ParserState::ReadingItems);
        parser.push_line("P1,Widget,1,1.00");
        assert_eq!(parser.state(), ParserState::ReadingItems);
        parser.push_line("---");
        assert_eq!(parser.state(), ParserState::Idle);
    }

    #[test]
    fn test_missing_final_terminator_still_flushes() {
        let text = "Order ID: ORD1\n\
                    User: alice\n\
                    Order at: 2023-11-14T22:13:19.999Z, Total: $9.99\n\
                    P1,Widget,1,9.99\n";
        let (orders, dropped) = parse(text);
        assert_eq!(dropped, 0);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items().len(), 1);
    }

    #[test]
    fn test_missing_terminator_between_records() {
        let text = "Order ID: ORD1\n\
                    User: alice\n\
                    Order at: 2023-11-14T22:13:19.999Z, Total: $9.99\n\
                    P1,Widget,1,9.99\n\
                    Order ID: ORD2\n\
                    User: bob\n\
                    Order at: 2023-11-14T22:13:20.123Z, Total: $25.00\n\
                    ---\n";
        let (orders, dropped) = parse(text);
        assert_eq!(dropped, 0);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].username(), "alice");
        assert_eq!(orders[1].username(), "bob");
    }

    #[test]
    fn test_record_without_user_is_dropped() {
        let text = "Order ID: ORD1\n\
                    User: alice\n\
                    Order at: 2023-11-14T22:13:19.999Z, Total: $9.99\n\
                    P1,Widget,1,9.99\n\
                    ---\n\
                    Order ID: ORD2\n\
                    Order at: 2023-11-14T22:13:20.000Z, Total: $1.00\n\
                    P2,Gadget,1,1.00\n\
                    ---\n\
                    Order ID: ORD3\n\
                    User: carol\n\
                    Order at: 2023-11-14T22:13:21.000Z, Total: $2.00\n\
                    P3,Sprocket,2,1.00\n\
                    ---\n";
        let (orders, dropped) = parse(text);
        assert_eq!(dropped, 1);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].username(), "alice");
        assert_eq!(orders[1].username(), "carol");
    }

    #[test]
    fn test_bad_item_field_count_drops_record() {
        let text = "Order ID: ORD1\n\
                    User: alice\n\
                    Order at: 2023-11-14T22:13:19.999Z, Total: $9.99\n\
                    P1,Widget,1\n\
                    ---\n";
        let (orders, dropped) = parse(text);
        assert_eq!(dropped, 1);
        assert!(orders.is_empty());
    }

    #[test]
    fn test_blank_line_inside_items_is_ignored() {
        let text = "Order ID: ORD1\n\
                    User: alice\n\
                    Order at: 2023-11-14T22:13:19.999Z, Total: $34.99\n\
                    P1,Widget,1,9.99\n\
                    \n\
                    P2,Gadget,1,25.00\n\
                    ---\n";
        let (orders, _) = parse(text);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items().len(), 2);
    }

    #[test]
    fn test_stray_lines_outside_records_are_ignored() {
        let text = "P9,Stray,1,1.00\n\
                    Order at: 2023-11-14T22:13:19.999Z, Total: $1.00\n\
                    Order ID: ORD1\n\
                    User: alice\n\
                    Order at: 2023-11-14T22:13:19.999Z, Total: $9.99\n\
                    P1,Widget,1,9.99\n\
                    ---\n";
        let (orders, dropped) = parse(text);
        assert_eq!(dropped, 0);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items().len(), 1);
        assert_eq!(orders[0].total().to_string(), "9.99");
    }

    #[test]
    fn test_empty_input() {
        let (orders, dropped) = parse("");
        assert!(orders.is_empty());
        assert_eq!(dropped, 0);
    }
}
