mod schema;
mod sqlite;

pub use sqlite::{DEFAULT_BUSY_TIMEOUT, SqliteStore};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Reads and single-statement writes live here. Anything that must compose
/// several statements atomically goes through [`Store::begin`].
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// Opens a write transaction. Dropping the returned handle without
    /// calling [`UnitOfWork::commit`] rolls it back.
    fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>>;

    // Track registry
    fn upsert_track(&self, track: &NewTrack) -> Result<Track>;
    fn get_track_by_external_id(&self, external_id: &str) -> Result<Option<Track>>;
    fn list_tracks(&self, cursor: &str, limit: i32) -> Result<Vec<Track>>;
    fn record_play(&self, external_id: &str) -> Result<bool>;

    // Playlist store (owner-scoped)
    fn create_playlist(
        &self,
        owner_id: OwnerId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist>;
    fn get_playlist(&self, id: PlaylistId, owner_id: OwnerId) -> Result<Option<Playlist>>;
    fn list_playlists(&self, owner_id: OwnerId) -> Result<Vec<PlaylistSummary>>;
    fn delete_playlist(&self, id: PlaylistId, owner_id: OwnerId) -> Result<bool>;
    fn count_playlists(&self, owner_id: OwnerId) -> Result<u64>;
    fn list_playlists_containing(
        &self,
        owner_id: OwnerId,
        external_id: &str,
    ) -> Result<Vec<Playlist>>;

    // Membership reads
    fn list_playlist_tracks(&self, id: PlaylistId) -> Result<Vec<PlaylistTrack>>;
    fn count_playlist_tracks(&self, id: PlaylistId) -> Result<u64>;
    fn playlist_has_track(&self, id: PlaylistId, external_id: &str) -> Result<bool>;
    fn playlist_total_duration(&self, id: PlaylistId) -> Result<u64>;
}

/// Statements composed inside one atomic, isolated scope.
pub trait UnitOfWork {
    fn find_playlist(&self, id: PlaylistId, owner_id: OwnerId) -> Result<Option<Playlist>>;
    /// Unscoped lookup for maintenance paths that act on behalf of every
    /// owner, such as track deletion.
    fn find_playlist_any_owner(&self, id: PlaylistId) -> Result<Option<Playlist>>;
    /// Persists name, description, cover and `updated_at`.
    fn save_playlist(&self, playlist: &Playlist) -> Result<bool>;
    fn find_track(&self, external_id: &str) -> Result<Option<Track>>;

    /// Highest member position, `None` for an empty playlist.
    fn max_position(&self, id: PlaylistId) -> Result<Option<i64>>;

    /// Inserts the membership, or overwrites the position of an existing one.
    fn upsert_membership(
        &self,
        id: PlaylistId,
        track_key: i64,
        position: i64,
        added_at: DateTime<Utc>,
    ) -> Result<()>;
    fn delete_membership(&self, id: PlaylistId, track_key: i64) -> Result<bool>;

    /// `(track_key, position)` pairs ordered by position, then track key.
    fn member_positions(&self, id: PlaylistId) -> Result<Vec<(i64, i64)>>;
    fn set_position(&self, id: PlaylistId, track_key: i64, position: i64) -> Result<bool>;
    fn count_members(&self, id: PlaylistId) -> Result<u64>;

    fn set_cover(&self, id: PlaylistId, cover: &str, updated_at: DateTime<Utc>) -> Result<()>;
    fn touch_playlist(&self, id: PlaylistId, updated_at: DateTime<Utc>) -> Result<()>;

    /// Playlists (any owner) that currently reference the track.
    fn playlists_with_track(&self, track_key: i64) -> Result<Vec<PlaylistId>>;
    fn delete_track(&self, track_key: i64) -> Result<bool>;

    fn list_playlist_tracks(&self, id: PlaylistId) -> Result<Vec<PlaylistTrack>>;

    fn commit(self: Box<Self>) -> Result<()>;
}

/// Runs `f` inside a unit of work, committing on success. Any error from `f`
/// or from the commit itself leaves the store untouched.
pub fn run_atomic<T, F>(store: &dyn Store, f: F) -> Result<T>
where
    F: FnOnce(&dyn UnitOfWork) -> Result<T>,
{
    let uow = store.begin()?;
    let value = f(uow.as_ref())?;
    uow.commit()?;
    Ok(value)
}
