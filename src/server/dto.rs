use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTrackRequest {
    pub track_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderTracksRequest {
    pub track_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RemoveTrackResponse {
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct PlaylistCountResponse {
    pub count: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<String>,
}
