use std::collections::HashMap;

use super::PlaylistEngine;
use super::validation::validate_external_id;
use crate::error::{Error, Result};
use crate::store::{UnitOfWork, run_atomic};
use crate::types::*;

/// Rewrites member positions to the dense sequence `0..N-1`, keeping the
/// current relative order. Must run inside the same unit of work as the write
/// that disturbed the ordering.
pub(super) fn reindex(uow: &dyn UnitOfWork, id: PlaylistId) -> Result<usize> {
    let members = uow.member_positions(id)?;
    let mut changed = 0;

    for (index, (track_key, position)) in members.into_iter().enumerate() {
        let index = index as i64;
        if position != index {
            uow.set_position(id, track_key, index)?;
            changed += 1;
        }
    }

    Ok(changed)
}

fn refreshed(uow: &dyn UnitOfWork, playlist: Playlist) -> Result<PlaylistWithTracks> {
    let tracks = uow.list_playlist_tracks(playlist.id)?;
    Ok(PlaylistWithTracks { playlist, tracks })
}

impl PlaylistEngine {
    /// Appends a registered track to the end of the playlist.
    ///
    /// Adding a track that is already a member moves it to the end instead of
    /// duplicating it. The first track with artwork added to a playlist that
    /// still has the default cover becomes its cover.
    pub fn add_track(
        &self,
        playlist_id: PlaylistId,
        external_id: &str,
        owner_id: OwnerId,
    ) -> Result<PlaylistWithTracks> {
        validate_external_id(external_id)?;

        run_atomic(self.store(), |uow| {
            let mut playlist = uow
                .find_playlist(playlist_id, owner_id)?
                .ok_or(Error::NotFoundOrAccessDenied)?;

            let track = uow
                .find_track(external_id)?
                .ok_or_else(|| Error::TrackNotFound(external_id.to_string()))?;

            let position = uow.max_position(playlist_id)?.map_or(0, |max| max + 1);
            uow.upsert_membership(playlist_id, track.key, position, timestamp_now())?;

            // A re-added member leaves a hole at its old position.
            reindex(uow, playlist_id)?;

            if playlist.has_default_cover() {
                if let Some(cover) = track.cover.as_deref().filter(|c| !c.trim().is_empty()) {
                    playlist.cover = cover.to_string();
                    playlist.updated_at = advance_timestamp(playlist.updated_at);
                    uow.set_cover(playlist_id, &playlist.cover, playlist.updated_at)?;
                }
            }

            tracing::debug!(
                playlist = %playlist_id,
                owner = %owner_id,
                track = external_id,
                position,
                "added track to playlist"
            );

            refreshed(uow, playlist)
        })
    }

    /// Removes a track from the playlist and closes the gap it leaves.
    ///
    /// Returns `false` when the track is unknown or not a member; that is not
    /// an error. Emptying the playlist resets its cover to the default.
    pub fn remove_track(
        &self,
        playlist_id: PlaylistId,
        external_id: &str,
        owner_id: OwnerId,
    ) -> Result<bool> {
        run_atomic(self.store(), |uow| {
            let playlist = uow
                .find_playlist(playlist_id, owner_id)?
                .ok_or(Error::NotFoundOrAccessDenied)?;

            let Some(track) = uow.find_track(external_id)? else {
                return Ok(false);
            };

            if !uow.delete_membership(playlist_id, track.key)? {
                return Ok(false);
            }

            let moved = reindex(uow, playlist_id)?;

            if uow.count_members(playlist_id)? == 0 {
                uow.set_cover(
                    playlist_id,
                    DEFAULT_COVER,
                    advance_timestamp(playlist.updated_at),
                )?;
            }

            tracing::debug!(
                playlist = %playlist_id,
                owner = %owner_id,
                track = external_id,
                moved,
                "removed track from playlist"
            );

            Ok(true)
        })
    }

    /// Applies a caller-supplied order.
    ///
    /// The member named at index `i` moves to position `i`. Ids that are not
    /// members are skipped. Members left out of the list keep their previous
    /// relative order after the listed ones that share their slot, and the
    /// result is always a dense `0..N-1` sequence. `updated_at` advances even
    /// when nothing moved.
    pub fn reorder_tracks(
        &self,
        playlist_id: PlaylistId,
        ordered_external_ids: &[String],
        owner_id: OwnerId,
    ) -> Result<PlaylistWithTracks> {
        run_atomic(self.store(), |uow| {
            let mut playlist = uow
                .find_playlist(playlist_id, owner_id)?
                .ok_or(Error::NotFoundOrAccessDenied)?;

            let mut members = uow.member_positions(playlist_id)?;

            let mut requested: HashMap<i64, i64> = HashMap::new();
            let mut skipped = 0usize;
            for (index, external_id) in ordered_external_ids.iter().enumerate() {
                match uow.find_track(external_id)? {
                    Some(track) if members.iter().any(|(key, _)| *key == track.key) => {
                        requested.insert(track.key, index as i64);
                    }
                    _ => skipped += 1,
                }
            }

            members.sort_by_key(|&(key, old)| match requested.get(&key) {
                Some(&index) => (index, 0u8, old),
                None => (old, 1u8, old),
            });

            for (index, (track_key, old)) in members.iter().enumerate() {
                let index = index as i64;
                if *old != index {
                    uow.set_position(playlist_id, *track_key, index)?;
                }
            }

            playlist.updated_at = advance_timestamp(playlist.updated_at);
            uow.touch_playlist(playlist_id, playlist.updated_at)?;

            if skipped > 0 {
                tracing::debug!(
                    playlist = %playlist_id,
                    skipped,
                    "reorder skipped ids that are not playlist members"
                );
            }

            refreshed(uow, playlist)
        })
    }

    /// Members in position order. No ownership check: callers look the
    /// playlist up with [`PlaylistEngine::find_playlist`] first.
    pub fn get_tracks(&self, playlist_id: PlaylistId) -> Result<Vec<PlaylistTrack>> {
        self.store().list_playlist_tracks(playlist_id)
    }

    pub fn has_track(&self, playlist_id: PlaylistId, external_id: &str) -> Result<bool> {
        self.store().playlist_has_track(playlist_id, external_id)
    }
}
