use crate::error::Result;
use rusqlite::{Connection, Params, Transaction};

/// One all-or-nothing multi-row insert into a single table.
///
/// Rows go through a cached prepared statement inside a transaction. Only
/// [`BulkInsert::commit`] makes them visible; dropping the guard on any other
/// path (a failed insert, an early return, a panic) rolls the transaction back.
pub(crate) struct BulkInsert<'conn> {
    tx: Transaction<'conn>,
    sql: String,
    inserted: usize,
}

impl<'conn> BulkInsert<'conn> {
    pub(crate) fn begin(
        conn: &'conn Connection,
        table: &'static str,
        columns: &[&'static str],
    ) -> Result<Self> {
        let placeholders = (1..=columns.len())
            .map(|index| format!("?{}", index))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            table,
            columns.join(", "),
            placeholders
        );
        let tx = conn.unchecked_transaction()?;
        Ok(Self {
            tx,
            sql,
            inserted: 0,
        })
    }

    pub(crate) fn insert<P: Params>(&mut self, params: P) -> Result<()> {
        let mut stmt = self.tx.prepare_cached(&self.sql)?;
        stmt.execute(params)?;
        self.inserted += 1;
        Ok(())
    }

    pub(crate) fn commit(self) -> Result<usize> {
        let inserted = self.inserted;
        self.tx.commit()?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::BulkInsert;
    use rusqlite::{params, Connection};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);")
            .expect("create");
        conn
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))
            .expect("count")
    }

    #[test]
    fn commit_persists_all_rows() {
        let conn = setup();
        let mut bulk = BulkInsert::begin(&conn, "items", &["name"]).expect("begin");
        bulk.insert(params!["a"]).expect("insert");
        bulk.insert(params!["b"]).expect("insert");
        assert_eq!(bulk.commit().expect("commit"), 2);
        assert_eq!(count(&conn), 2);
    }

    #[test]
    fn drop_without_commit_rolls_back() {
        let conn = setup();
        {
            let mut bulk = BulkInsert::begin(&conn, "items", &["name"]).expect("begin");
            bulk.insert(params!["a"]).expect("insert");
        }
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn failed_insert_discards_earlier_rows() {
        let conn = setup();
        let result = (|| {
            let mut bulk = BulkInsert::begin(&conn, "items", &["name"])?;
            bulk.insert(params!["a"])?;
            bulk.insert(params!["a"])?;
            bulk.commit()
        })();
        assert!(result.is_err());
        assert_eq!(count(&conn), 0);

        let mut bulk = BulkInsert::begin(&conn, "items", &["name"]).expect("begin again");
        bulk.insert(params!["b"]).expect("insert");
        bulk.commit().expect("commit");
        assert_eq!(count(&conn), 1);
    }
}
