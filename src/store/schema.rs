pub const SCHEMA: &str = r#"
-- Track registry; playlists reference tracks by integer key only
CREATE TABLE IF NOT EXISTS tracks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    artist TEXT NOT NULL DEFAULT '',
    album TEXT,
    cover TEXT,
    duration INTEGER NOT NULL DEFAULT 0 CHECK (duration >= 0),

    -- Source channel label and external popularity counter
    source TEXT NOT NULL DEFAULT '',
    popularity INTEGER NOT NULL DEFAULT 0,

    -- Local playback stats
    play_count INTEGER NOT NULL DEFAULT 0,
    last_played_at TEXT,

    is_downloaded INTEGER NOT NULL DEFAULT 0,
    is_local INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Playlists; every read and write is scoped by (id, owner_id)
CREATE TABLE IF NOT EXISTS playlists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    cover TEXT NOT NULL DEFAULT 'default',
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Membership; positions form a dense 0..N-1 sequence per playlist
CREATE TABLE IF NOT EXISTS playlist_tracks (
    playlist_id INTEGER NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
    track_id INTEGER NOT NULL REFERENCES tracks(id) ON DELETE CASCADE,
    position INTEGER NOT NULL CHECK (position >= 0),
    added_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (playlist_id, track_id)
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_playlists_owner ON playlists(owner_id);
CREATE INDEX IF NOT EXISTS idx_playlist_tracks_position ON playlist_tracks(playlist_id, position);
CREATE INDEX IF NOT EXISTS idx_playlist_tracks_track ON playlist_tracks(track_id);
"#;
