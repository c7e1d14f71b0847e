use super::PlaylistEngine;
use super::membership::reindex;
use super::validation::validate_external_id;
use crate::error::{Error, Result};
use crate::store::run_atomic;
use crate::types::*;

impl PlaylistEngine {
    /// Creates or refreshes a registry entry keyed by external id. Play
    /// statistics and the internal key survive an update.
    pub fn upsert_track(&self, track: &NewTrack) -> Result<Track> {
        validate_external_id(&track.external_id)?;
        if track.title.trim().is_empty() {
            return Err(Error::validation("Track title cannot be empty"));
        }

        let track = self.store().upsert_track(track)?;
        tracing::debug!(track = %track.external_id, "upserted track");
        Ok(track)
    }

    pub fn find_track(&self, external_id: &str) -> Result<Option<Track>> {
        self.store().get_track_by_external_id(external_id)
    }

    pub fn get_track(&self, external_id: &str) -> Result<Track> {
        self.find_track(external_id)?
            .ok_or_else(|| Error::TrackNotFound(external_id.to_string()))
    }

    pub fn list_tracks(&self, cursor: &str, limit: i32) -> Result<Vec<Track>> {
        self.store().list_tracks(cursor, limit)
    }

    /// Bumps the play counter and last-played time, returning the fresh row.
    pub fn record_play(&self, external_id: &str) -> Result<Track> {
        if !self.store().record_play(external_id)? {
            return Err(Error::TrackNotFound(external_id.to_string()));
        }
        self.get_track(external_id)
    }

    /// Deletes a track from the registry.
    ///
    /// Memberships go with it, every playlist that held the track is
    /// reindexed, and playlists left empty get the default cover back.
    pub fn delete_track(&self, external_id: &str) -> Result<bool> {
        run_atomic(self.store(), |uow| {
            let Some(track) = uow.find_track(external_id)? else {
                return Ok(false);
            };

            let affected = uow.playlists_with_track(track.key)?;
            if !uow.delete_track(track.key)? {
                return Ok(false);
            }

            for playlist_id in &affected {
                reindex(uow, *playlist_id)?;

                if uow.count_members(*playlist_id)? == 0 {
                    if let Some(playlist) = uow.find_playlist_any_owner(*playlist_id)? {
                        uow.set_cover(
                            *playlist_id,
                            DEFAULT_COVER,
                            advance_timestamp(playlist.updated_at),
                        )?;
                    }
                }
            }

            tracing::debug!(
                track = external_id,
                playlists = affected.len(),
                "deleted track"
            );
            Ok(true)
        })
    }
}
