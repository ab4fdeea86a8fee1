use crate::bulk::BulkInsert;
use crate::error::{Result, StoreError};
use numfix_core::{
    BatchRef, BatchResults, BatchStats, ClassifiedBatch, FixedEntry, RejectedEntry, ValidEntry,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use tracing::{error, info};

const VALID_TABLE: &str = "valid_numbers";
const FIXED_TABLE: &str = "fixed_numbers";
const REJECTED_TABLE: &str = "rejected_numbers";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub batch_ref: BatchRef,
    pub country_code: String,
    pub created_at: i64,
}

pub struct BatchesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> BatchesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Stores a classified submission.
    ///
    /// Each category is its own transaction: if a later category fails, the
    /// categories already committed stay committed and the error is returned.
    pub fn save_batch(&self, now_utc: i64, batch: &ClassifiedBatch) -> Result<BatchStats> {
        self.record(now_utc, &batch.batch_ref, &batch.country_code)?;
        let valid = self.save_valid(&batch.batch_ref, &batch.valid)?;
        let fixed = self.save_fixed(&batch.batch_ref, &batch.fixed)?;
        let rejected = self.save_rejected(&batch.batch_ref, &batch.rejected)?;
        Ok(BatchStats::new(valid, fixed, rejected))
    }

    pub fn record(&self, now_utc: i64, batch_ref: &BatchRef, country_code: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO batches (batch_ref, country_code, created_at) VALUES (?1, ?2, ?3);",
            params![batch_ref.to_string(), country_code, now_utc],
        )?;
        Ok(())
    }

    pub fn save_valid(&self, batch_ref: &BatchRef, entries: &[ValidEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }
        log_saved(
            VALID_TABLE,
            batch_ref,
            save_valid_inner(self.conn, batch_ref, entries),
        )
    }

    pub fn save_fixed(&self, batch_ref: &BatchRef, entries: &[FixedEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }
        log_saved(
            FIXED_TABLE,
            batch_ref,
            save_fixed_inner(self.conn, batch_ref, entries),
        )
    }

    pub fn save_rejected(&self, batch_ref: &BatchRef, entries: &[RejectedEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }
        log_saved(
            REJECTED_TABLE,
            batch_ref,
            save_rejected_inner(self.conn, batch_ref, entries),
        )
    }

    pub fn get(&self, batch_ref: &BatchRef) -> Result<Option<Batch>> {
        let mut stmt = self.conn.prepare(
            "SELECT batch_ref, country_code, created_at FROM batches WHERE batch_ref = ?1;",
        )?;
        let mut rows = stmt.query([batch_ref.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(batch_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn list(&self, limit: i64) -> Result<Vec<Batch>> {
        let mut stmt = self.conn.prepare(
            "SELECT batch_ref, country_code, created_at
             FROM batches
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([limit])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(batch_from_row(row)?);
        }
        Ok(items)
    }

    pub fn stats_for(&self, batch_ref: &BatchRef) -> Result<BatchStats> {
        self.ensure_exists(batch_ref)?;
        let key = batch_ref.to_string();
        let valid = self.count_in(VALID_TABLE, &key)?;
        let fixed = self.count_in(FIXED_TABLE, &key)?;
        let rejected = self.count_in(REJECTED_TABLE, &key)?;
        Ok(BatchStats::new(valid, fixed, rejected))
    }

    pub fn results_for(&self, batch_ref: &BatchRef) -> Result<BatchResults> {
        self.ensure_exists(batch_ref)?;
        let key = batch_ref.to_string();
        let mut results = BatchResults::default();

        let mut stmt = self
            .conn
            .prepare("SELECT number FROM valid_numbers WHERE batch_ref = ?1 ORDER BY id ASC;")?;
        let mut rows = stmt.query([&key])?;
        while let Some(row) = rows.next()? {
            results.valid_numbers.push(row.get(0)?);
        }

        let mut stmt = self.conn.prepare(
            "SELECT original_number, changes, fixed_number
             FROM fixed_numbers
             WHERE batch_ref = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([&key])?;
        while let Some(row) = rows.next()? {
            results.fixed_numbers.push(FixedEntry {
                original_number: row.get(0)?,
                changes: row.get(1)?,
                fixed_number: row.get(2)?,
            });
        }

        let mut stmt = self
            .conn
            .prepare("SELECT number FROM rejected_numbers WHERE batch_ref = ?1 ORDER BY id ASC;")?;
        let mut rows = stmt.query([&key])?;
        while let Some(row) = rows.next()? {
            results.rejected_numbers.push(row.get(0)?);
        }

        Ok(results)
    }

    fn ensure_exists(&self, batch_ref: &BatchRef) -> Result<()> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM batches WHERE batch_ref = ?1;",
                [batch_ref.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if found.is_none() {
            return Err(StoreError::NotFound(format!("batch {}", batch_ref)));
        }
        Ok(())
    }

    fn count_in(&self, table: &'static str, key: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE batch_ref = ?1;", table),
            [key],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn save_valid_inner(conn: &Connection, batch_ref: &BatchRef, entries: &[ValidEntry]) -> Result<usize> {
    let batch_key = batch_ref.to_string();
    let mut bulk = BulkInsert::begin(conn, VALID_TABLE, &["number", "country_code", "batch_ref"])?;
    for entry in entries {
        bulk.insert(params![entry.number, entry.country_code, batch_key])?;
    }
    bulk.commit()
}

fn save_fixed_inner(conn: &Connection, batch_ref: &BatchRef, entries: &[FixedEntry]) -> Result<usize> {
    let batch_key = batch_ref.to_string();
    let mut bulk = BulkInsert::begin(
        conn,
        FIXED_TABLE,
        &["original_number", "changes", "fixed_number", "batch_ref"],
    )?;
    for entry in entries {
        bulk.insert(params![
            entry.original_number,
            entry.changes,
            entry.fixed_number,
            batch_key
        ])?;
    }
    bulk.commit()
}

fn save_rejected_inner(
    conn: &Connection,
    batch_ref: &BatchRef,
    entries: &[RejectedEntry],
) -> Result<usize> {
    let batch_key = batch_ref.to_string();
    let mut bulk = BulkInsert::begin(conn, REJECTED_TABLE, &["number", "batch_ref"])?;
    for entry in entries {
        bulk.insert(params![entry.number, batch_key])?;
    }
    bulk.commit()
}

fn log_saved(table: &'static str, batch_ref: &BatchRef, result: Result<usize>) -> Result<usize> {
    match &result {
        Ok(count) => info!(table, batch_ref = %batch_ref, count, "saved numbers"),
        Err(err) => error!(table, batch_ref = %batch_ref, error = %err, "bulk insert failed"),
    }
    result
}

fn batch_from_row(row: &rusqlite::Row<'_>) -> Result<Batch> {
    let ref_str: String = row.get(0)?;
    let batch_ref =
        BatchRef::from_str(&ref_str).map_err(|_| StoreError::InvalidId(ref_str.clone()))?;
    Ok(Batch {
        batch_ref,
        country_code: row.get(1)?,
        created_at: row.get(2)?,
    })
}
