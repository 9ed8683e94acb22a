//! Song and artist dimensions

use crate::error::Result;
use crate::store::WarehouseStore;
use crate::types::SongMetadata;

/// Upserts the song and the artist carried by one song-metadata record
#[derive(Debug, Clone, Copy, Default)]
pub struct SongDimensionLoader;

impl SongDimensionLoader {
    /// Two writes: the song row, then the artist row
    pub fn load(&self, store: &dyn WarehouseStore, metadata: &SongMetadata) -> Result<()> {
        store.upsert_song(&metadata.song)?;
        store.upsert_artist(&metadata.artist)?;

        tracing::debug!(
            "Loaded song {} by artist {}",
            metadata.song.song_id,
            metadata.artist.artist_id
        );
        Ok(())
    }
}
