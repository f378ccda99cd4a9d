//! SQLite persistence for user-managed sector rosters.
//!
//! The fixed default rosters live in [`SectorRosters`](super::SectorRosters);
//! this store only holds symbols users added on top of them.

use crate::error::RosterError;
use crate::types::{SectorId, SectorStock};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// SQLite store for sector → symbol lists.
pub struct RosterStore {
    conn: Mutex<Connection>,
}

impl RosterStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RosterError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("Sector roster store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self, RosterError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory sector roster store initialized");
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, RosterError> {
        self.conn.lock().map_err(|_| RosterError::LockPoisoned)
    }

    fn init_schema(&self) -> Result<(), RosterError> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sector_stocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sector TEXT NOT NULL,
                symbol TEXT NOT NULL,
                name TEXT NOT NULL,
                added_at INTEGER NOT NULL,
                UNIQUE(sector, symbol)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sector_stocks_sector ON sector_stocks(sector)",
            [],
        )?;

        Ok(())
    }

    /// Every stored entry, grouped by sector in insertion order.
    pub fn list_all(&self) -> Result<Vec<SectorStock>, RosterError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT sector, symbol, name FROM sector_stocks ORDER BY sector, id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut stocks = Vec::new();
        for row in rows {
            let (sector, symbol, name) = row?;
            // Rows are only written through `add`, which validates the tag
            if let Some(sector) = SectorId::from_str(&sector) {
                stocks.push(SectorStock {
                    symbol,
                    name,
                    sector,
                });
            }
        }

        Ok(stocks)
    }

    /// Entries for one sector in insertion order.
    pub fn list(&self, sector: SectorId) -> Result<Vec<SectorStock>, RosterError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT symbol, name FROM sector_stocks WHERE sector = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![sector.tag()], |row| {
            Ok(SectorStock {
                symbol: row.get(0)?,
                name: row.get(1)?,
                sector,
            })
        })?;

        let stocks = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(stocks)
    }

    /// Symbols for one sector in insertion order.
    pub fn symbols(&self, sector: SectorId) -> Result<Vec<String>, RosterError> {
        Ok(self.list(sector)?.into_iter().map(|s| s.symbol).collect())
    }

    /// Add a symbol to a sector. Returns false if it was already present.
    pub fn add(&self, sector: SectorId, symbol: &str, name: &str) -> Result<bool, RosterError> {
        let symbol = normalize_symbol(sector, symbol)?;
        let name = match name.trim() {
            "" => symbol.clone(),
            n => n.to_string(),
        };

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO sector_stocks (sector, symbol, name, added_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                sector.tag(),
                symbol,
                name,
                chrono::Utc::now().timestamp_millis()
            ],
        )?;

        debug!("Add {} to {} roster: inserted={}", symbol, sector, inserted > 0);
        Ok(inserted > 0)
    }

    /// Remove a symbol from a sector. Returns false if it was not present.
    pub fn remove(&self, sector: SectorId, symbol: &str) -> Result<bool, RosterError> {
        let symbol = normalize_symbol(sector, symbol)?;

        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM sector_stocks WHERE sector = ?1 AND symbol = ?2",
            params![sector.tag(), symbol],
        )?;

        debug!("Remove {} from {} roster: removed={}", symbol, sector, removed > 0);
        Ok(removed > 0)
    }
}

fn normalize_symbol(sector: SectorId, symbol: &str) -> Result<String, RosterError> {
    if sector == SectorId::All {
        return Err(RosterError::Invalid(
            "the 'all' sector cannot be edited".to_string(),
        ));
    }

    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(RosterError::Invalid("symbol is required".to_string()));
    }
    Ok(symbol)
}
