//! # Setlist
//!
//! A playlist service that keeps owner-scoped playlists with a strict,
//! gapless track order. Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! setlist = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use setlist::engine::PlaylistEngine;
//! use setlist::store::{SqliteStore, Store};
//! use setlist::types::OwnerId;
//!
//! let store = SqliteStore::new("./data/setlist.db").unwrap();
//! store.initialize().unwrap();
//!
//! let engine = PlaylistEngine::new(Arc::new(store));
//! let owner = OwnerId::new(7).unwrap();
//! let playlist = engine.create_playlist(owner, "Road trip", None).unwrap();
//! engine.add_track(playlist.id, "dQw4w9WgXcQ", owner).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `setlist` binary. Disable with `default-features = false`.

pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod server;
pub mod store;
pub mod types;
