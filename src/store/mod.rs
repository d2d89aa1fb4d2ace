//! Durable order store over an append-only text log.

pub mod parser;
pub mod record;

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::aggregates::order::Order;
use crate::{Result, StoreError};

use self::parser::LogParser;

/// Default location of the order log, relative to the working directory.
pub const DEFAULT_ORDERS_FILE: &str = "data/orders.txt";

/// In-memory view of the order log plus the path needed to extend it.
///
/// One store owns one log file for its whole lifetime; the design assumes a
/// single process and no other writers. Opening reads the entire log through
/// [`LogParser`]; afterwards the in-memory list is the source of truth and
/// [`save_order`] appends each new order without touching prior content.
///
/// [`save_order`]: OrderStore::save_order
pub struct OrderStore {
    path: PathBuf,
    orders: Vec<Order>,
}

impl OrderStore {
    /// Opens the store, loading every parsable record from `path`. A missing
    /// file is a fresh installation, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let orders = match File::open(&path) {
            Ok(file) => {
                let mut log_parser = LogParser::new();
                for line in BufReader::new(file).lines() {
                    log_parser.push_line(&line?);
                }
                let (orders, dropped) = log_parser.finish();
                if dropped > 0 {
                    warn!(dropped, path = %path.display(), "dropped malformed records while loading order log");
                }
                info!(count = orders.len(), path = %path.display(), "loaded order log");
                orders
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no order log yet, starting empty");
                Vec::new()
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        Ok(Self { path, orders })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Records the order in memory, then appends its display form and a
    /// blank separator line to the log. The order stays in memory even when
    /// the write fails, so an `Err` here means memory is ahead of disk until
    /// the next [`rebuild`].
    ///
    /// [`rebuild`]: OrderStore::rebuild
    pub fn save_order(&mut self, order: Order) -> Result<()> {
        let encoded = record::encode(&order);
        self.orders.push(order);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(encoded.as_bytes())?;
        file.write_all(b"\n\n")?;
        Ok(())
    }

    /// Rewrites the whole log from memory. Maintenance path only; normal
    /// operation appends and never revisits prior content.
    pub fn rebuild(&self) -> Result<()> {
        let mut file = File::create(&self.path)?;
        for order in &self.orders {
            file.write_all(record::encode(order).as_bytes())?;
            file.write_all(b"\n\n")?;
        }
        Ok(())
    }

    /// All of `username`'s orders, most recent first. Orders with equal
    /// timestamps keep their insertion order.
    pub fn user_orders(&self, username: &str) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.username() == username)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        orders
    }

    /// Every loaded order, in file order (oldest first), as a defensive
    /// copy.
    pub fn all_orders(&self) -> Vec<Order> {
        self.orders.clone()
    }

    /// Drops every order from memory and truncates the log.
    pub fn clear(&mut self) -> Result<()> {
        self.orders.clear();
        self.rebuild()
    }
}
