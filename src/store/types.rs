//! Storage adapter trait

use crate::error::Result;
use crate::types::{Artist, Song, SongKeys, Songplay, TimeRow, User};
use serde::Serialize;

/// Named store operations the pipeline depends on
///
/// Implementations run on a single sequential caller. A unit of work starts
/// with [`begin`](WarehouseStore::begin) and ends with either
/// [`commit`](WarehouseStore::commit) or
/// [`rollback`](WarehouseStore::rollback).
pub trait WarehouseStore {
    /// Start a unit of work
    fn begin(&self) -> Result<()>;

    /// Make the current unit of work durable
    fn commit(&self) -> Result<()>;

    /// Discard the current unit of work
    fn rollback(&self) -> Result<()>;

    /// Insert a song, overwriting on `song_id`
    fn upsert_song(&self, song: &Song) -> Result<()>;

    /// Insert an artist, overwriting on `artist_id`
    fn upsert_artist(&self, artist: &Artist) -> Result<()>;

    /// Insert a time row; an existing `start_time` is left untouched
    fn upsert_time(&self, time: &TimeRow) -> Result<()>;

    /// Insert a user, overwriting on `user_id`
    fn upsert_user(&self, user: &User) -> Result<()>;

    /// Every song/artist pair matching title, artist name and duration exactly
    ///
    /// Rows are ordered by `song_id`.
    fn lookup_song_keys(&self, title: &str, artist: &str, duration: f64)
        -> Result<Vec<SongKeys>>;

    /// Append one fact row
    fn insert_songplay(&self, songplay: &Songplay) -> Result<()>;
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub songs: u64,
    pub artists: u64,
    pub time: u64,
    pub users: u64,
    pub songplays: u64,
    /// Songplays with both keys resolved
    pub resolved_songplays: u64,
}
