use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::{OwnerId, PlaylistId};

/// Cover value of a playlist that has never derived or been given artwork.
pub const DEFAULT_COVER: &str = "default";

/// Current time at the precision the store keeps (microseconds).
#[must_use]
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly later than `previous`, normally just the current time.
#[must_use]
pub fn advance_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = timestamp_now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(skip)]
    pub key: i64,
    #[serde(rename = "id")]
    pub external_id: String,
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    /// Length in seconds.
    pub duration: u32,
    pub source: String,
    pub popularity: i64,
    pub play_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played_at: Option<DateTime<Utc>>,
    pub is_downloaded: bool,
    pub is_local: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ingestion payload for the track registry upsert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTrack {
    #[serde(rename = "id")]
    pub external_id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub popularity: i64,
    #[serde(default)]
    pub is_downloaded: bool,
    #[serde(default)]
    pub is_local: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cover: String,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    #[must_use]
    pub fn has_default_cover(&self) -> bool {
        self.cover == DEFAULT_COVER
    }
}

/// Field-by-field playlist update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

impl PlaylistUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.cover.is_none()
    }
}

/// A track as it appears inside one playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistTrack {
    #[serde(flatten)]
    pub track: Track,
    pub position: i64,
    pub added_at: DateTime<Utc>,
}

/// Playlist aggregate returned by every mutating engine operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistWithTracks {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub tracks: Vec<PlaylistTrack>,
}

impl PlaylistWithTracks {
    /// External ids of the members in playlist order.
    #[must_use]
    pub fn track_ids(&self) -> Vec<&str> {
        self.tracks
            .iter()
            .map(|t| t.track.external_id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistSummary {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub track_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistStats {
    pub track_count: u64,
    /// Summed duration in seconds.
    pub total_duration: u64,
    pub formatted_duration: String,
}
