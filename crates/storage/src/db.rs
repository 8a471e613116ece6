use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use shelftag_core::{NewScanRecord, RecordId, ScanRecord, TableName};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Same layout SQLite uses for `CURRENT_TIMESTAMP`, so rows written with the
/// column default read back the same way.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage failure: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage failure: row {0} has an unreadable timestamp {1:?}")]
    Timestamp(i64, Option<String>),
}

type RawRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Append-only table of confirmed label scans.
///
/// Holds no connection: every operation opens the database, runs, and closes
/// it again before returning, whether or not the operation succeeded.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    table: TableName,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>, table: TableName) -> Self {
        Self { path: path.into(), table }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Create the table if it does not exist yet. Safe to call on every start.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_name TEXT,
                weight TEXT,
                price_per_piece TEXT,
                barcode TEXT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            self.table
        );

        let mut conn = self.connect().await?;
        let result = sqlx::query(&sql).execute(&mut conn).await.map(|_| ());
        finish(conn, result).await
    }

    /// Write one record, assigning its id and creation time.
    pub async fn append(&self, record: &NewScanRecord) -> Result<ScanRecord, StorageError> {
        let created_at = Utc::now().trunc_subsecs(0);
        let sql = format!(
            "INSERT INTO {} (product_name, weight, price_per_piece, barcode, timestamp) VALUES (?, ?, ?, ?, ?)",
            self.table
        );

        let mut conn = self.connect().await?;
        let result = sqlx::query(&sql)
            .bind(&record.product_name)
            .bind(&record.weight)
            .bind(&record.price_per_piece)
            .bind(&record.barcode)
            .bind(created_at.format(TIMESTAMP_FORMAT).to_string())
            .execute(&mut conn)
            .await
            .map(|r| r.last_insert_rowid());
        let id = finish(conn, result).await?;

        tracing::info!(id, table = %self.table, "scan record saved");
        Ok(ScanRecord::new(RecordId(id), record.clone(), created_at))
    }

    /// Every stored record, oldest first.
    pub async fn fetch_all(&self) -> Result<Vec<ScanRecord>, StorageError> {
        let sql = format!(
            "SELECT id, product_name, weight, price_per_piece, barcode, CAST(timestamp AS TEXT) FROM {} ORDER BY id",
            self.table
        );

        let mut conn = self.connect().await?;
        let result = sqlx::query_as::<_, RawRow>(&sql).fetch_all(&mut conn).await;
        let rows = finish(conn, result).await?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn connect(&self) -> Result<SqliteConnection, StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let conn = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .connect()
            .await?;
        Ok(conn)
    }
}

/// Close the connection, then report the operation's own error first.
async fn finish<T>(
    conn: SqliteConnection,
    result: Result<T, sqlx::Error>,
) -> Result<T, StorageError> {
    let closed = conn.close().await;
    let value = result?;
    closed?;
    Ok(value)
}

fn row_to_record(r: RawRow) -> Result<ScanRecord, StorageError> {
    let created_at = parse_timestamp(r.5.as_deref())
        .ok_or_else(|| StorageError::Timestamp(r.0, r.5.clone()))?;
    Ok(ScanRecord {
        id: RecordId(r.0),
        product_name: r.1.unwrap_or_default(),
        weight: r.2.unwrap_or_default(),
        price_per_piece: r.3.unwrap_or_default(),
        barcode: r.4.unwrap_or_default(),
        created_at,
    })
}

fn parse_timestamp(s: Option<&str>) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s?, TIMESTAMP_FORMAT)
        .ok()
        .map(|n| n.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir, table: &str) -> RecordStore {
        RecordStore::new(dir.path().join("labels.db"), TableName::new(table).unwrap())
    }

    fn oats() -> NewScanRecord {
        NewScanRecord {
            product_name: "Organic Oats".into(),
            weight: "180g".into(),
            price_per_piece: "1.99 €".into(),
            barcode: "811234567".into(),
        }
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "lidl_ocr_data");
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
        assert!(store.path().exists());
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "lidl_ocr_data");
        store.ensure_schema().await.unwrap();

        let before = Utc::now().trunc_subsecs(0);
        let first = store.append(&oats()).await.unwrap();
        let second = store.append(&oats()).await.unwrap();

        assert!(second.id > first.id);
        assert!(first.created_at >= before);
        assert_eq!(first.product_name, "Organic Oats");

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn sentinels_are_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "ocr_data");
        store.ensure_schema().await.unwrap();

        let record = NewScanRecord {
            product_name: "Unknown Product".into(),
            weight: "Unknown Weight".into(),
            price_per_piece: "Unknown Price".into(),
            barcode: "Unknown Barcode".into(),
        };
        store.append(&record).await.unwrap();

        let stored = &store.fetch_all().await.unwrap()[0];
        assert_eq!(stored.weight, "Unknown Weight");
        assert_eq!(stored.barcode, "Unknown Barcode");
    }

    #[tokio::test]
    async fn tables_in_one_file_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let a = store_in(&dir, "lidl_ocr_data");
        let b = store_in(&dir, "ocr_data");
        a.ensure_schema().await.unwrap();
        b.ensure_schema().await.unwrap();

        a.append(&oats()).await.unwrap();

        assert_eq!(a.fetch_all().await.unwrap().len(), 1);
        assert!(b.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reads_rows_written_with_column_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "lidl_ocr_data");
        store.ensure_schema().await.unwrap();

        let mut conn = store.connect().await.unwrap();
        sqlx::query("INSERT INTO lidl_ocr_data (product_name, weight, price_per_piece, barcode) VALUES ('Milk', '1000 g', '1.29 €', '')")
            .execute(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();

        let rows = store.fetch_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_name, "Milk");
        assert_eq!(rows[0].barcode, "");
    }

    #[tokio::test]
    async fn append_without_schema_is_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, "missing_table");
        let err = store.append(&oats()).await.unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));
        assert!(err.to_string().starts_with("storage failure"));
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(
            dir.path().join("nested/data/labels.db"),
            TableName::new("lidl_ocr_data").unwrap(),
        );
        store.ensure_schema().await.unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn parse_timestamp_formats() {
        let ts = parse_timestamp(Some("2024-03-15 09:30:00")).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-15T09:30:00+00:00");
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}
