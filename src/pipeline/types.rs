//! Pipeline types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Input file family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// One song-metadata record per file
    Song,
    /// Newline-delimited user activity events
    Log,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Song => write!(f, "song"),
            FileKind::Log => write!(f, "log"),
        }
    }
}

/// Rows written while processing one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub songs: usize,
    pub artists: usize,
    /// Log records read, before filtering
    pub events_read: usize,
    /// Playback events kept by the filter
    pub events_retained: usize,
    pub time_rows: usize,
    pub users_upserted: usize,
    /// Playback events without a user id
    pub users_skipped: usize,
    pub songplays: usize,
    pub songplays_resolved: usize,
    pub songplays_unresolved: usize,
}

impl AddAssign for FileStats {
    fn add_assign(&mut self, other: Self) {
        self.songs += other.songs;
        self.artists += other.artists;
        self.events_read += other.events_read;
        self.events_retained += other.events_retained;
        self.time_rows += other.time_rows;
        self.users_upserted += other.users_upserted;
        self.users_skipped += other.users_skipped;
        self.songplays += other.songplays;
        self.songplays_resolved += other.songplays_resolved;
        self.songplays_unresolved += other.songplays_unresolved;
    }
}
