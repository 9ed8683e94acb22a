//! Songplay fact resolution
//!
//! Activity logs carry the song title, artist name and duration, never the
//! surrogate keys. Each playback event is matched against the song and
//! artist dimensions on all three columns with exact equality (no
//! tolerance on the floating-point duration, no partial matching).

use crate::error::{Error, Result};
use crate::store::WarehouseStore;
use crate::types::{PlayEvent, SongKeys};
use serde::{Deserialize, Serialize};

/// What to do when more than one song/artist pair matches an event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Treat as a miss: the fact row gets null keys
    #[default]
    Miss,
    /// Take the match with the lowest `song_id`
    First,
    /// Fail the file with [`Error::LookupAmbiguity`]
    Error,
}

/// Outcome of loading the songplay facts for one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub inserted: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// Resolves song/artist keys for playback events and appends fact rows
#[derive(Debug, Clone, Copy, Default)]
pub struct SongplayResolver {
    policy: AmbiguityPolicy,
}

impl SongplayResolver {
    pub fn new(policy: AmbiguityPolicy) -> Self {
        Self { policy }
    }

    /// Keys for one event, `None` when it does not resolve
    pub fn resolve(&self, store: &dyn WarehouseStore, event: &PlayEvent) -> Result<Option<SongKeys>> {
        let mut matches = store.lookup_song_keys(&event.song, &event.artist, event.length)?;

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => match self.policy {
                AmbiguityPolicy::Miss => {
                    tracing::warn!(
                        "{} songs match '{}' by '{}' ({}s), leaving keys empty",
                        n,
                        event.song,
                        event.artist,
                        event.length
                    );
                    Ok(None)
                }
                AmbiguityPolicy::First => Ok(Some(matches.swap_remove(0))),
                AmbiguityPolicy::Error => Err(Error::LookupAmbiguity {
                    title: event.song.clone(),
                    artist: event.artist.clone(),
                    duration: event.length,
                    matches: n,
                }),
            },
        }
    }

    /// Insert one fact row per event, in event order
    ///
    /// Unresolved events still produce a row, with null keys.
    pub fn load(&self, store: &dyn WarehouseStore, events: &[PlayEvent]) -> Result<ResolveStats> {
        let mut stats = ResolveStats::default();

        for event in events {
            let keys = self.resolve(store, event)?;
            if keys.is_some() {
                stats.resolved += 1;
            } else {
                stats.unresolved += 1;
            }

            store.insert_songplay(&event.songplay(keys))?;
            stats.inserted += 1;
        }

        Ok(stats)
    }
}
