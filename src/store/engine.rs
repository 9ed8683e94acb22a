//! DuckDB-backed warehouse store
//!
//! A single connection to a local DuckDB database (file or in-memory), used
//! by one sequential caller. DuckDB can write tables straight to Parquet,
//! which backs [`DuckDbStore::export_parquet`].

use super::schema::{self, TABLES};
use super::types::{TableCounts, WarehouseStore};
use crate::error::{Error, Result};
use crate::types::{Artist, Song, SongKeys, Songplay, TimeRow, User};
use duckdb::{params, Connection};
use std::path::{Path, PathBuf};

/// In-memory database marker accepted by [`DuckDbStore::open`]
pub const MEMORY: &str = ":memory:";

/// Warehouse store over a DuckDB connection
pub struct DuckDbStore {
    /// DuckDB connection
    conn: Connection,
    /// Database file path or `:memory:` (for logging)
    location: String,
}

impl DuckDbStore {
    /// Open (or create) a database file; `:memory:` opens an in-memory database
    pub fn open(location: &str) -> Result<Self> {
        if location == MEMORY {
            return Self::open_in_memory();
        }

        if let Some(parent) = Path::new(location).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(location)
            .map_err(|e| Error::config(format!("Failed to open DuckDB at '{location}': {e}")))?;

        tracing::debug!("Opened DuckDB database at {}", location);

        Ok(Self {
            conn,
            location: location.to_string(),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;

        Ok(Self {
            conn,
            location: MEMORY.to_string(),
        })
    }

    /// Database location (file path or `:memory:`)
    pub fn location(&self) -> &str {
        &self.location
    }

    // ========================================================================
    // Schema provisioning
    // ========================================================================

    /// Create every table that does not exist yet
    pub fn create_schema(&self) -> Result<()> {
        for statement in schema::create_statements() {
            self.conn.execute_batch(&statement)?;
        }
        tracing::debug!("Schema ready in {}", self.location);
        Ok(())
    }

    /// Drop every table of the schema
    pub fn drop_schema(&self) -> Result<()> {
        for statement in schema::drop_statements() {
            self.conn.execute_batch(&statement)?;
        }
        tracing::debug!("Schema dropped in {}", self.location);
        Ok(())
    }

    /// Drop and recreate the schema, discarding all rows
    pub fn reset_schema(&self) -> Result<()> {
        self.drop_schema()?;
        self.create_schema()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Row counts for every table
    pub fn table_counts(&self) -> Result<TableCounts> {
        Ok(TableCounts {
            songs: self.count("SELECT COUNT(*) FROM songs")?,
            artists: self.count("SELECT COUNT(*) FROM artists")?,
            time: self.count("SELECT COUNT(*) FROM \"time\"")?,
            users: self.count("SELECT COUNT(*) FROM users")?,
            songplays: self.count("SELECT COUNT(*) FROM songplays")?,
            resolved_songplays: self.count(
                "SELECT COUNT(*) FROM songplays WHERE song_id IS NOT NULL AND artist_id IS NOT NULL",
            )?,
        })
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Song by id
    pub fn song(&self, song_id: &str) -> Result<Option<Song>> {
        let mut stmt = self.conn.prepare(
            "SELECT song_id, title, artist_id, year, duration FROM songs WHERE song_id = ?",
        )?;
        let mut rows = stmt.query_map(params![song_id], |row| {
            Ok(Song {
                song_id: row.get(0)?,
                title: row.get(1)?,
                artist_id: row.get(2)?,
                year: row.get(3)?,
                duration: row.get(4)?,
            })
        })?;
        let song = rows.next().transpose()?;
        Ok(song)
    }

    /// Artist by id
    pub fn artist(&self, artist_id: &str) -> Result<Option<Artist>> {
        let mut stmt = self.conn.prepare(
            "SELECT artist_id, name, location, latitude, longitude FROM artists WHERE artist_id = ?",
        )?;
        let mut rows = stmt.query_map(params![artist_id], |row| {
            Ok(Artist {
                artist_id: row.get(0)?,
                name: row.get(1)?,
                location: row.get(2)?,
                latitude: row.get(3)?,
                longitude: row.get(4)?,
            })
        })?;
        let artist = rows.next().transpose()?;
        Ok(artist)
    }

    /// User by id
    pub fn user(&self, user_id: &str) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, first_name, last_name, gender, level FROM users WHERE user_id = ?",
        )?;
        let mut rows = stmt.query_map(params![user_id], |row| {
            Ok(User {
                user_id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                gender: row.get(3)?,
                level: row.get(4)?,
            })
        })?;
        let user = rows.next().transpose()?;
        Ok(user)
    }

    /// Time row by timestamp
    pub fn time_row(&self, start_time: i64) -> Result<Option<TimeRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT start_time, hour, day, week, month, year, weekday FROM \"time\" WHERE start_time = ?",
        )?;
        let mut rows = stmt.query_map(params![start_time], |row| {
            Ok(TimeRow {
                start_time: row.get(0)?,
                hour: row.get(1)?,
                day: row.get(2)?,
                week: row.get(3)?,
                month: row.get(4)?,
                year: row.get(5)?,
                weekday: row.get(6)?,
            })
        })?;
        let time = rows.next().transpose()?;
        Ok(time)
    }

    /// Every songplay in insertion order
    pub fn songplays(&self) -> Result<Vec<Songplay>> {
        let mut stmt = self.conn.prepare(
            "SELECT start_time, user_id, level, song_id, artist_id, session_id, location, user_agent
             FROM songplays ORDER BY songplay_id",
        )?;
        let songplays = stmt
            .query_map([], |row| {
                Ok(Songplay {
                    start_time: row.get(0)?,
                    user_id: row.get(1)?,
                    level: row.get(2)?,
                    song_id: row.get(3)?,
                    artist_id: row.get(4)?,
                    session_id: row.get(5)?,
                    location: row.get(6)?,
                    user_agent: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(songplays)
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Write every table to `<dir>/<table>.parquet`
    pub fn export_parquet(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(TABLES.len());
        for table in TABLES {
            let path = dir.join(format!("{}.parquet", table.name));
            let target = path.to_string_lossy().replace('\'', "''");
            let copy_sql = format!(
                "COPY \"{}\" TO '{target}' (FORMAT PARQUET, COMPRESSION 'SNAPPY');",
                table.name
            );

            tracing::debug!("Executing: {}", copy_sql);
            self.conn
                .execute_batch(&copy_sql)
                .map_err(|e| Error::Other(format!("Failed to write Parquet: {e}")))?;
            written.push(path);
        }

        Ok(written)
    }
}

impl WarehouseStore for DuckDbStore {
    fn begin(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn upsert_song(&self, song: &Song) -> Result<()> {
        self.conn.execute(
            schema::SONG_UPSERT,
            params![song.song_id, song.title, song.artist_id, song.year, song.duration],
        )?;
        Ok(())
    }

    fn upsert_artist(&self, artist: &Artist) -> Result<()> {
        self.conn.execute(
            schema::ARTIST_UPSERT,
            params![
                artist.artist_id,
                artist.name,
                artist.location,
                artist.latitude,
                artist.longitude
            ],
        )?;
        Ok(())
    }

    fn upsert_time(&self, time: &TimeRow) -> Result<()> {
        self.conn.execute(
            schema::TIME_UPSERT,
            params![
                time.start_time,
                time.hour,
                time.day,
                time.week,
                time.month,
                time.year,
                time.weekday
            ],
        )?;
        Ok(())
    }

    fn upsert_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            schema::USER_UPSERT,
            params![
                user.user_id,
                user.first_name,
                user.last_name,
                user.gender,
                user.level
            ],
        )?;
        Ok(())
    }

    fn lookup_song_keys(
        &self,
        title: &str,
        artist: &str,
        duration: f64,
    ) -> Result<Vec<SongKeys>> {
        let mut stmt = self.conn.prepare(schema::SONG_SELECT)?;
        let keys = stmt
            .query_map(params![title, artist, duration], |row| {
                Ok(SongKeys {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn insert_songplay(&self, songplay: &Songplay) -> Result<()> {
        self.conn.execute(
            schema::SONGPLAY_INSERT,
            params![
                songplay.start_time,
                songplay.user_id,
                songplay.level,
                songplay.song_id,
                songplay.artist_id,
                songplay.session_id,
                songplay.location,
                songplay.user_agent
            ],
        )?;
        Ok(())
    }
}
