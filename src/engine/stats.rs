use super::PlaylistEngine;
use crate::error::Result;
use crate::types::{OwnerId, PlaylistId, PlaylistStats};

/// Renders seconds as `"<H> hr <M> min"`, or `"<M> min"` under an hour.
#[must_use]
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours} hr {minutes} min")
    } else {
        format!("{minutes} min")
    }
}

impl PlaylistEngine {
    pub fn get_stats(&self, playlist_id: PlaylistId) -> Result<PlaylistStats> {
        let track_count = self.store().count_playlist_tracks(playlist_id)?;
        let total_duration = self.store().playlist_total_duration(playlist_id)?;

        Ok(PlaylistStats {
            track_count,
            total_duration,
            formatted_duration: format_duration(total_duration),
        })
    }

    /// Member count for display purposes. Store failures read as zero.
    pub fn get_track_count(&self, playlist_id: PlaylistId) -> u64 {
        self.store()
            .count_playlist_tracks(playlist_id)
            .unwrap_or_else(|e| {
                tracing::warn!(playlist = %playlist_id, "Failed to count playlist tracks: {e}");
                0
            })
    }

    /// Number of playlists the owner has. Store failures read as zero.
    pub fn count(&self, owner_id: OwnerId) -> u64 {
        self.store().count_playlists(owner_id).unwrap_or_else(|e| {
            tracing::warn!(owner = %owner_id, "Failed to count playlists: {e}");
            0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0 min");
        assert_eq!(format_duration(59), "0 min");
        assert_eq!(format_duration(42 * 60 + 30), "42 min");
        assert_eq!(format_duration(3600), "1 hr 0 min");
        assert_eq!(format_duration(3600 + 5 * 60), "1 hr 5 min");
        assert_eq!(format_duration(26 * 3600 + 59 * 60 + 59), "26 hr 59 min");
    }
}
