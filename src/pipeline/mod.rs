//! Transform / resolve / load pipeline
//!
//! Per-file handlers for the two input families:
//!
//! - song-metadata files feed the song and artist dimensions
//!   ([`SongDimensionLoader`])
//! - activity logs are filtered to `NextSong` events, then feed the time
//!   dimension ([`TimeDimensionBuilder`]), the user dimension
//!   ([`UserDimensionLoader`]) and the songplay fact table
//!   ([`SongplayResolver`]), in that order
//!
//! Handlers only write through [`WarehouseStore`]; committing is the
//! orchestrator's job.

mod resolver;
mod song_loader;
mod time_builder;
mod types;
mod user_loader;

pub use resolver::{AmbiguityPolicy, ResolveStats, SongplayResolver};
pub use song_loader::SongDimensionLoader;
pub use time_builder::{decompose_timestamp, TimeDimensionBuilder};
pub use types::{FileKind, FileStats};
pub use user_loader::{UserDimensionLoader, UserLoadStats};

use crate::decode::RecordSource;
use crate::error::Result;
use crate::store::WarehouseStore;
use crate::types::{JsonObject, PlayEvent, SongMetadata};
use std::path::Path;

/// Keep only playback events and type them
///
/// Filtering happens before typing, so non-playback records are never
/// validated.
pub fn filter_play_events(records: &[JsonObject]) -> Result<Vec<PlayEvent>> {
    records
        .iter()
        .filter(|record| PlayEvent::is_play(record))
        .map(PlayEvent::from_record)
        .collect()
}

/// Per-file pipeline for both input families
pub struct Pipeline {
    source: RecordSource,
    songs: SongDimensionLoader,
    time: TimeDimensionBuilder,
    users: UserDimensionLoader,
    resolver: SongplayResolver,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AmbiguityPolicy::default())
    }
}

impl Pipeline {
    /// Create a pipeline with the given multiple-match policy
    pub fn new(ambiguity: AmbiguityPolicy) -> Self {
        Self {
            source: RecordSource::new(),
            songs: SongDimensionLoader,
            time: TimeDimensionBuilder,
            users: UserDimensionLoader,
            resolver: SongplayResolver::new(ambiguity),
        }
    }

    /// Run the handler matching `kind` on one file
    pub fn process_file(
        &self,
        kind: FileKind,
        store: &dyn WarehouseStore,
        path: &Path,
    ) -> Result<FileStats> {
        match kind {
            FileKind::Song => self.process_song_file(store, path),
            FileKind::Log => self.process_log_file(store, path),
        }
    }

    /// Load the single song/artist record of a song-metadata file
    pub fn process_song_file(&self, store: &dyn WarehouseStore, path: &Path) -> Result<FileStats> {
        let record = self.source.read_single(path)?;
        let metadata = SongMetadata::from_record(&record)?;
        self.songs.load(store, &metadata)?;

        Ok(FileStats {
            songs: 1,
            artists: 1,
            ..FileStats::default()
        })
    }

    /// Load the time, user and songplay rows of an activity log
    pub fn process_log_file(&self, store: &dyn WarehouseStore, path: &Path) -> Result<FileStats> {
        let records = self.source.read(path)?;
        let events = filter_play_events(&records)?;

        tracing::debug!(
            "{}: {} of {} events are playback events",
            path.display(),
            events.len(),
            records.len()
        );

        let time_rows = self.time.load(store, &events)?;
        let users = self.users.load(store, &events)?;
        let songplays = self.resolver.load(store, &events)?;

        Ok(FileStats {
            events_read: records.len(),
            events_retained: events.len(),
            time_rows,
            users_upserted: users.upserted,
            users_skipped: users.skipped,
            songplays: songplays.inserted,
            songplays_resolved: songplays.resolved,
            songplays_unresolved: songplays.unresolved,
            ..FileStats::default()
        })
    }
}

#[cfg(test)]
mod tests;
