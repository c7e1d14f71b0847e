use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::identity::RequireOwner;
use crate::server::AppState;
use crate::server::dto::{
    AddTrackRequest, CreatePlaylistRequest, PlaylistCountResponse, RemoveTrackResponse,
    ReorderTracksRequest,
};
use crate::server::response::{ApiError, ApiResponse};
use crate::types::{PlaylistId, PlaylistUpdate};

pub async fn list_playlists(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let playlists = state.engine.list_playlists(owner)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(playlists)))
}

pub async fn count_playlists(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let count = state.engine.count(owner);

    Json(ApiResponse::success(PlaylistCountResponse { count }))
}

pub async fn create_playlist(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlaylistRequest>,
) -> impl IntoResponse {
    let playlist = state
        .engine
        .create_playlist(owner, &req.name, req.description.as_deref())?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(playlist))))
}

pub async fn get_playlist(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id: PlaylistId = id.parse()?;
    let playlist = state.engine.get_playlist(id, owner)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(playlist)))
}

pub async fn update_playlist(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PlaylistUpdate>,
) -> impl IntoResponse {
    let id: PlaylistId = id.parse()?;
    let playlist = state.engine.update_playlist(id, owner, &req)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(playlist)))
}

pub async fn delete_playlist(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id: PlaylistId = id.parse()?;
    state.engine.delete_playlist(id, owner)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn playlist_stats(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id: PlaylistId = id.parse()?;
    state.engine.find_playlist(id, owner)?;
    let stats = state.engine.get_stats(id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(stats)))
}

pub async fn list_playlist_tracks(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id: PlaylistId = id.parse()?;
    state.engine.find_playlist(id, owner)?;
    let tracks = state.engine.get_tracks(id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(tracks)))
}

pub async fn add_track(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddTrackRequest>,
) -> impl IntoResponse {
    let id: PlaylistId = id.parse()?;
    let playlist = state.engine.add_track(id, &req.track_id, owner)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(playlist)))
}

pub async fn reorder_tracks(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ReorderTracksRequest>,
) -> impl IntoResponse {
    let id: PlaylistId = id.parse()?;
    let playlist = state.engine.reorder_tracks(id, &req.track_ids, owner)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(playlist)))
}

pub async fn remove_track(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path((id, track_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let id: PlaylistId = id.parse()?;
    let removed = state.engine.remove_track(id, &track_id, owner)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(RemoveTrackResponse { removed })))
}
