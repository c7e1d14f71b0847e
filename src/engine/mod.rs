//! Playlist composition and ordering.
//!
//! [`PlaylistEngine`] is the only component that mutates memberships. Every
//! mutation runs inside one unit of work: ownership check, track resolution,
//! the write itself, reindexing and cover derivation commit together or not
//! at all.

mod membership;
mod playlists;
mod stats;
mod tracks;
pub mod validation;

pub use stats::format_duration;

use std::sync::Arc;

use crate::store::Store;

#[derive(Clone)]
pub struct PlaylistEngine {
    store: Arc<dyn Store>,
}

impl PlaylistEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}
