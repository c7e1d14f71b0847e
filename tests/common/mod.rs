#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use setlist::engine::PlaylistEngine;
use setlist::store::{SqliteStore, Store};
use setlist::types::{NewTrack, OwnerId, PlaylistId};
use tempfile::TempDir;

/// An engine over a fresh on-disk database in its own temp directory.
pub struct TestContext {
    pub temp_dir: TempDir,
    pub store: Arc<SqliteStore>,
    pub engine: PlaylistEngine,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = Arc::new(
            SqliteStore::new(temp_dir.path().join("setlist.db")).expect("open database"),
        );
        store.initialize().expect("initialize schema");
        let engine = PlaylistEngine::new(store.clone());

        Self {
            temp_dir,
            store,
            engine,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.temp_dir.path().join("setlist.db")
    }

    /// A second, independent connection to the same database.
    pub fn open_engine(&self) -> PlaylistEngine {
        let store = SqliteStore::new(self.db_path()).expect("open database");
        PlaylistEngine::new(Arc::new(store))
    }

    pub fn register(&self, external_id: &str, cover: Option<&str>, duration: u32) {
        self.engine
            .upsert_track(&track(external_id, cover, duration))
            .expect("register track");
    }

    pub fn playlist(&self, owner: OwnerId, name: &str) -> PlaylistId {
        self.engine
            .create_playlist(owner, name, None)
            .expect("create playlist")
            .id
    }

    pub fn positions(&self, id: PlaylistId) -> Vec<i64> {
        self.engine
            .get_tracks(id)
            .expect("list tracks")
            .iter()
            .map(|t| t.position)
            .collect()
    }

    pub fn order(&self, id: PlaylistId) -> Vec<String> {
        self.engine
            .get_tracks(id)
            .expect("list tracks")
            .into_iter()
            .map(|t| t.track.external_id)
            .collect()
    }
}

pub fn owner(raw: i64) -> OwnerId {
    OwnerId::new(raw).expect("valid owner id")
}

pub fn track(external_id: &str, cover: Option<&str>, duration: u32) -> NewTrack {
    NewTrack {
        external_id: external_id.to_string(),
        title: format!("Title {external_id}"),
        artist: "Artist".to_string(),
        cover: cover.map(str::to_string),
        duration,
        ..Default::default()
    }
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn dense(len: usize) -> Vec<i64> {
    (0..len as i64).collect()
}
