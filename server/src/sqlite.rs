use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Error, OpenFlags, OptionalExtension, Row};

use crate::domain::{NewImage, Repository, StoredImage};

const CACHE_SIZE: &str = "4096";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = "SELECT id, filename, original_name, size, file_type, upload_time FROM images";

pub enum Mode {
    ReadWrite,
    ReadOnly,
}

pub struct Sqlite {
    conn: Connection,
}

impl Repository for Sqlite {
    type Err = Error;

    fn new_database(&self) -> Result<(), Self::Err> {
        self.pragma_update("encoding", "UTF-8")?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS images (
                  id             INTEGER PRIMARY KEY AUTOINCREMENT,
                  filename       TEXT NOT NULL UNIQUE,
                  original_name  TEXT NOT NULL,
                  size           INTEGER NOT NULL,
                  file_type      TEXT NOT NULL,
                  upload_time    TEXT NOT NULL
                  )",
            [],
        )?;

        Ok(())
    }

    fn create(&mut self, image: &NewImage) -> Result<StoredImage, Self::Err> {
        self.assign_cache_size()?;
        self.pragma_update("synchronous", "FULL")?;

        let upload_time = Utc::now();
        let size = i64::try_from(image.size).unwrap_or(i64::MAX);

        let tx = self.conn.transaction()?;
        tx.prepare_cached(
            "INSERT INTO images (filename, original_name, size, file_type, upload_time)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
        )?
        .execute(params![
            &image.filename,
            &image.original_name,
            size,
            &image.file_type,
            upload_time
        ])?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(StoredImage {
            id,
            filename: image.filename.clone(),
            original_name: image.original_name.clone(),
            size: image.size,
            file_type: image.file_type.clone(),
            upload_time,
        })
    }

    fn get_by_filename(&self, filename: &str) -> Result<Option<StoredImage>, Self::Err> {
        let sql = format!("{SELECT_COLUMNS} WHERE filename = ?1");
        self.conn
            .query_row(&sql, params![filename], stored_image)
            .optional()
    }

    fn delete_by_filename(&mut self, filename: &str) -> Result<bool, Self::Err> {
        let removed = self
            .conn
            .execute("DELETE FROM images WHERE filename = ?1", params![filename])?;
        Ok(removed > 0)
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<StoredImage>, Self::Err> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY id ASC LIMIT ?1 OFFSET ?2");
        let mut stmt = self.conn.prepare(&sql)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit, offset], stored_image)?;
        rows.collect()
    }

    fn count(&self) -> Result<usize, Self::Err> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl Sqlite {
    pub fn open<P: AsRef<Path>>(path: P, mode: Mode) -> Result<Self, Error> {
        let c = match mode {
            Mode::ReadWrite => Connection::open(path),
            Mode::ReadOnly => Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY),
        }?;
        c.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn: c })
    }

    fn assign_cache_size(&self) -> Result<(), Error> {
        self.pragma_update("cache_size", CACHE_SIZE)
    }

    fn pragma_update(&self, name: &str, value: &str) -> Result<(), Error> {
        self.conn.pragma_update(None, name, value)
    }
}

fn stored_image(row: &Row<'_>) -> Result<StoredImage, Error> {
    let size: i64 = row.get(3)?;
    let upload_time: DateTime<Utc> = row.get(5)?;
    Ok(StoredImage {
        id: row.get(0)?,
        filename: row.get(1)?,
        original_name: row.get(2)?,
        size: u64::try_from(size).unwrap_or_default(),
        file_type: row.get(4)?,
        upload_time,
    })
}
