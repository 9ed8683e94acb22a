//! User dimension

use crate::error::Result;
use crate::store::WarehouseStore;
use crate::types::PlayEvent;

/// Outcome of loading the user dimension for one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserLoadStats {
    pub upserted: usize,
    pub skipped: usize,
}

/// Upserts one user row per playback event, in event order
///
/// The last event for a user decides the stored subscription level. Events
/// without a user id are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserDimensionLoader;

impl UserDimensionLoader {
    pub fn load(&self, store: &dyn WarehouseStore, events: &[PlayEvent]) -> Result<UserLoadStats> {
        let mut stats = UserLoadStats::default();

        for event in events {
            match event.user() {
                Some(user) => {
                    store.upsert_user(&user)?;
                    stats.upserted += 1;
                }
                None => stats.skipped += 1,
            }
        }

        if stats.skipped > 0 {
            tracing::warn!(
                "Skipped {} playback events without a user id",
                stats.skipped
            );
        }

        Ok(stats)
    }
}
