//! `SQLite`-backed raffle store.
//!
//! Uses `SQLite` with WAL mode so ceremony reads can proceed while winners
//! are being committed. The conditional winner write is a single `UPDATE`
//! guarded on `winner_id IS NULL`, which makes it an atomic compare-and-set
//! at the database level.

// SQLite stores booleans as INTEGER and counts as i64; both fit the
// domain types. Mutex poisoning indicates a panic in another thread,
// which is unrecoverable.
#![allow(clippy::missing_panics_doc)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};

use super::{RaffleStore, StoreError};
use crate::domain::{Lead, Prize, Raffle};

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// The production raffle store.
pub struct SqliteRaffleStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRaffleStore {
    /// Opens or creates a store at the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Inserts a raffle row. Used by the fixture loader and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (duplicate id included).
    pub fn insert_raffle(&self, raffle: &Raffle) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO raffles (id, company_id, title, description, start_date, end_date,
                                  is_active, allow_multiple_wins, max_participants,
                                  social_sharing_enabled)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                raffle.id,
                raffle.company_id,
                raffle.title,
                raffle.description,
                raffle.start_date.to_rfc3339(),
                raffle.end_date.to_rfc3339(),
                raffle.is_active,
                raffle.allow_multiple_wins,
                raffle.max_participants,
                raffle.social_sharing_enabled,
            ],
        )?;
        Ok(())
    }

    /// Inserts a lead row. Used by the fixture loader and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_lead(&self, lead: &Lead) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO leads (id, company_id, name, email, phone, lgpd_consent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                lead.id,
                lead.company_id,
                lead.name,
                lead.email,
                lead.phone,
                lead.lgpd_consent,
            ],
        )?;
        Ok(())
    }

    /// Inserts a prize row. Used by the fixture loader and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (duplicate draw order included).
    pub fn insert_prize(&self, prize: &Prize) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO prizes (id, raffle_id, name, description, draw_order, winner_id, drawn_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                prize.id,
                prize.raffle_id,
                prize.name,
                prize.description,
                prize.order,
                prize.winner_id,
                prize.drawn_at.map(|at| at.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn raffle_exists(conn: &Connection, raffle_id: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM raffles WHERE id = ?1",
                params![raffle_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn parse_timestamp(
        column: &'static str,
        value: &str,
    ) -> Result<DateTime<Utc>, StoreError> {
        DateTime::parse_from_rfc3339(value)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|_| StoreError::InvalidTimestamp {
                column,
                value: value.to_string(),
            })
    }
}

/// Raffle row with timestamps still in their stored text form.
///
/// Parsing happens outside the rusqlite row mapper so a malformed
/// timestamp surfaces as [`StoreError::InvalidTimestamp`] rather than a
/// generic database error.
struct RaffleRow {
    raffle: Raffle,
    start_date: String,
    end_date: String,
}

impl RaffleRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            raffle: Raffle {
                id: row.get(0)?,
                company_id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                start_date: DateTime::UNIX_EPOCH,
                end_date: DateTime::UNIX_EPOCH,
                is_active: row.get(6)?,
                allow_multiple_wins: row.get(7)?,
                max_participants: row.get(8)?,
                social_sharing_enabled: row.get(9)?,
            },
            start_date: row.get(4)?,
            end_date: row.get(5)?,
        })
    }

    fn into_raffle(self) -> Result<Raffle, StoreError> {
        let mut raffle = self.raffle;
        raffle.start_date =
            SqliteRaffleStore::parse_timestamp("raffles.start_date", &self.start_date)?;
        raffle.end_date =
            SqliteRaffleStore::parse_timestamp("raffles.end_date", &self.end_date)?;
        Ok(raffle)
    }
}

impl RaffleStore for SqliteRaffleStore {
    fn get_raffle(&self, raffle_id: &str) -> Result<Raffle, StoreError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, company_id, title, description, start_date, end_date,
                        is_active, allow_multiple_wins, max_participants,
                        social_sharing_enabled
                 FROM raffles WHERE id = ?1",
                params![raffle_id],
                RaffleRow::from_row,
            )
            .optional()?;

        match row {
            Some(raw) => raw.into_raffle(),
            None => Err(StoreError::RaffleNotFound {
                raffle_id: raffle_id.to_string(),
            }),
        }
    }

    fn list_prizes_ordered(&self, raffle_id: &str) -> Result<Vec<Prize>, StoreError> {
        let conn = self.conn.lock().unwrap();
        if !Self::raffle_exists(&conn, raffle_id)? {
            return Err(StoreError::RaffleNotFound {
                raffle_id: raffle_id.to_string(),
            });
        }

        let mut stmt = conn.prepare(
            "SELECT id, raffle_id, name, description, draw_order, winner_id, drawn_at
             FROM prizes
             WHERE raffle_id = ?1
             ORDER BY draw_order ASC",
        )?;
        let rows = stmt
            .query_map(params![raffle_id], |row| {
                let drawn_at: Option<String> = row.get(6)?;
                Ok((
                    Prize {
                        id: row.get(0)?,
                        raffle_id: row.get(1)?,
                        name: row.get(2)?,
                        description: row.get(3)?,
                        order: row.get(4)?,
                        winner_id: row.get(5)?,
                        drawn_at: None,
                    },
                    drawn_at,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut prizes = Vec::with_capacity(rows.len());
        for (mut prize, drawn_at) in rows {
            if let Some(raw) = drawn_at {
                prize.drawn_at = Some(Self::parse_timestamp("prizes.drawn_at", &raw)?);
            }
            prizes.push(prize);
        }
        Ok(prizes)
    }

    fn list_eligible_leads(&self, company_id: &str) -> Result<Vec<Lead>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, company_id, name, email, phone, lgpd_consent
             FROM leads
             WHERE company_id = ?1 AND lgpd_consent = 1
             ORDER BY id ASC",
        )?;
        let leads = stmt
            .query_map(params![company_id], |row| {
                Ok(Lead {
                    id: row.get(0)?,
                    company_id: row.get(1)?,
                    name: row.get(2)?,
                    email: row.get(3)?,
                    phone: row.get(4)?,
                    lgpd_consent: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(leads)
    }

    fn update_prize_winner(
        &self,
        prize_id: &str,
        winner_id: &str,
        drawn_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        // The WHERE clause is the compare-and-set: one statement, one row,
        // no read-modify-write window.
        let updated = conn.execute(
            "UPDATE prizes SET winner_id = ?2, drawn_at = ?3
             WHERE id = ?1 AND winner_id IS NULL",
            params![prize_id, winner_id, drawn_at.to_rfc3339()],
        )?;
        if updated == 1 {
            return Ok(());
        }

        // Zero rows updated: distinguish a missing prize from a lost race.
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM prizes WHERE id = ?1",
                params![prize_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            Err(StoreError::PrizeAlreadyDrawn {
                prize_id: prize_id.to_string(),
            })
        } else {
            Err(StoreError::PrizeNotFound {
                prize_id: prize_id.to_string(),
            })
        }
    }

    fn clear_prize_winners(&self, raffle_id: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        if !Self::raffle_exists(&conn, raffle_id)? {
            return Err(StoreError::RaffleNotFound {
                raffle_id: raffle_id.to_string(),
            });
        }
        conn.execute(
            "UPDATE prizes SET winner_id = NULL, drawn_at = NULL WHERE raffle_id = ?1",
            params![raffle_id],
        )?;
        Ok(())
    }
}
