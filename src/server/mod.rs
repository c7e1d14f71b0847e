pub mod dto;
mod playlists;
pub mod response;
mod router;
mod tracks;

pub use router::{AppState, create_router};

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn playlist_router() -> Router<Arc<AppState>> {
    Router::new()
        // Playlists (owner-scoped)
        .route(
            "/playlists",
            get(playlists::list_playlists).post(playlists::create_playlist),
        )
        .route("/playlists/count", get(playlists::count_playlists))
        .route(
            "/playlists/{id}",
            get(playlists::get_playlist)
                .patch(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route("/playlists/{id}/stats", get(playlists::playlist_stats))
        // Membership and ordering
        .route(
            "/playlists/{id}/tracks",
            get(playlists::list_playlist_tracks)
                .post(playlists::add_track)
                .put(playlists::reorder_tracks),
        )
        .route(
            "/playlists/{id}/tracks/{track_id}",
            delete(playlists::remove_track),
        )
        // Track registry
        .route("/tracks", get(tracks::list_tracks).post(tracks::upsert_track))
        .route(
            "/tracks/{id}",
            get(tracks::get_track).delete(tracks::delete_track),
        )
        .route("/tracks/{id}/plays", post(tracks::record_play))
        .route("/tracks/{id}/playlists", get(tracks::track_playlists))
}
