use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::error::Error;
use crate::identity::RequireOwner;
use crate::server::AppState;
use crate::server::dto::PaginationParams;
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, paginate,
};
use crate::types::NewTrack;

pub async fn list_tracks(
    _owner: RequireOwner,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let cursor = params.cursor.as_deref().unwrap_or("");

    let tracks = state.engine.list_tracks(cursor, DEFAULT_PAGE_SIZE + 1)?;

    let (tracks, next_cursor, has_more) =
        paginate(tracks, DEFAULT_PAGE_SIZE as usize, |t| t.external_id.clone());

    Ok::<_, ApiError>(Json(PaginatedResponse::new(tracks, next_cursor, has_more)))
}

pub async fn upsert_track(
    _owner: RequireOwner,
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewTrack>,
) -> impl IntoResponse {
    let track = state.engine.upsert_track(&req)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(track)))
}

pub async fn get_track(
    _owner: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let track = state.engine.get_track(&id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(track)))
}

pub async fn delete_track(
    _owner: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !state.engine.delete_track(&id)? {
        return Err(ApiError::from(Error::TrackNotFound(id)));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn record_play(
    _owner: RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let track = state.engine.record_play(&id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(track)))
}

pub async fn track_playlists(
    RequireOwner(owner): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let playlists = state.engine.playlists_containing(owner, &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(playlists)))
}
