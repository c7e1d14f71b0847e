use super::PlaylistEngine;
use super::validation::{validate_cover, validate_description, validate_playlist_name};
use crate::error::{Error, Result};
use crate::store::run_atomic;
use crate::types::*;

fn normalize_description(description: Option<&str>) -> Result<Option<String>> {
    match description.map(str::trim) {
        Some("") | None => Ok(None),
        Some(description) => {
            validate_description(description)?;
            Ok(Some(description.to_string()))
        }
    }
}

impl PlaylistEngine {
    pub fn create_playlist(
        &self,
        owner_id: OwnerId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist> {
        let name = validate_playlist_name(name)?;
        let description = normalize_description(description)?;

        let playlist = self
            .store()
            .create_playlist(owner_id, &name, description.as_deref())?;

        tracing::debug!(playlist = %playlist.id, owner = %owner_id, "created playlist");
        Ok(playlist)
    }

    /// Owner-scoped lookup. A playlist owned by someone else is reported
    /// exactly like one that does not exist.
    pub fn find_playlist(&self, playlist_id: PlaylistId, owner_id: OwnerId) -> Result<Playlist> {
        self.store()
            .get_playlist(playlist_id, owner_id)?
            .ok_or(Error::NotFoundOrAccessDenied)
    }

    /// Owner-scoped lookup of a playlist and its ordered tracks.
    pub fn get_playlist(
        &self,
        playlist_id: PlaylistId,
        owner_id: OwnerId,
    ) -> Result<PlaylistWithTracks> {
        let playlist = self.find_playlist(playlist_id, owner_id)?;
        let tracks = self.get_tracks(playlist_id)?;
        Ok(PlaylistWithTracks { playlist, tracks })
    }

    pub fn list_playlists(&self, owner_id: OwnerId) -> Result<Vec<PlaylistSummary>> {
        self.store().list_playlists(owner_id)
    }

    /// Changes only the supplied fields. `updated_at` advances on every
    /// successful call, including one that supplies no fields.
    pub fn update_playlist(
        &self,
        playlist_id: PlaylistId,
        owner_id: OwnerId,
        update: &PlaylistUpdate,
    ) -> Result<Playlist> {
        let name = update
            .name
            .as_deref()
            .map(validate_playlist_name)
            .transpose()?;
        let description = update
            .description
            .as_deref()
            .map(|d| normalize_description(Some(d)))
            .transpose()?;
        if let Some(cover) = update.cover.as_deref() {
            validate_cover(cover)?;
        }

        run_atomic(self.store(), |uow| {
            let mut playlist = uow
                .find_playlist(playlist_id, owner_id)?
                .ok_or(Error::NotFoundOrAccessDenied)?;

            if let Some(name) = name {
                playlist.name = name;
            }
            if let Some(description) = description {
                playlist.description = description;
            }
            if let Some(cover) = &update.cover {
                playlist.cover = cover.trim().to_string();
            }
            playlist.updated_at = advance_timestamp(playlist.updated_at);

            if !uow.save_playlist(&playlist)? {
                return Err(Error::NotFoundOrAccessDenied);
            }

            tracing::debug!(
                playlist = %playlist_id,
                owner = %owner_id,
                touch_only = update.is_empty(),
                "updated playlist"
            );
            Ok(playlist)
        })
    }

    /// Deletes the playlist and, through the store's cascade, its memberships.
    pub fn delete_playlist(&self, playlist_id: PlaylistId, owner_id: OwnerId) -> Result<()> {
        if !self.store().delete_playlist(playlist_id, owner_id)? {
            return Err(Error::NotFoundOrAccessDenied);
        }
        tracing::debug!(playlist = %playlist_id, owner = %owner_id, "deleted playlist");
        Ok(())
    }

    /// The caller's playlists that contain the given track.
    pub fn playlists_containing(
        &self,
        owner_id: OwnerId,
        external_id: &str,
    ) -> Result<Vec<Playlist>> {
        self.store()
            .list_playlists_containing(owner_id, external_id)
    }
}
