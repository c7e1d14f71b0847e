use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::schema::SCHEMA;
use super::{Store, UnitOfWork};
use crate::error::{Error, Result};
use crate::types::*;

/// How long a writer waits for the database lock before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const TRACK_COLUMNS: &str = "t.id, t.external_id, t.title, t.artist, t.album, t.cover, t.duration, \
     t.source, t.popularity, t.play_count, t.last_played_at, t.is_downloaded, t.is_local, \
     t.created_at, t.updated_at";

const PLAYLIST_COLUMNS: &str =
    "p.id, p.owner_id, p.name, p.description, p.cover, p.created_at, p.updated_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::with_busy_timeout(db_path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn with_busy_timeout<P: AsRef<Path>>(db_path: P, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            tracing::warn!("SQLite journal mode is '{mode}', expected WAL");
        }
        conn.busy_timeout(busy_timeout)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Useful for tests and tooling.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn read_track(row: &Row<'_>) -> rusqlite::Result<Track> {
    Ok(Track {
        key: row.get(0)?,
        external_id: row.get(1)?,
        title: row.get(2)?,
        artist: row.get(3)?,
        album: row.get(4)?,
        cover: row.get(5)?,
        duration: row.get(6)?,
        source: row.get(7)?,
        popularity: row.get(8)?,
        play_count: row.get(9)?,
        last_played_at: row.get::<_, Option<String>>(10)?.map(|s| parse_datetime(&s)),
        is_downloaded: row.get(11)?,
        is_local: row.get(12)?,
        created_at: parse_datetime(&row.get::<_, String>(13)?),
        updated_at: parse_datetime(&row.get::<_, String>(14)?),
    })
}

fn read_playlist(row: &Row<'_>) -> rusqlite::Result<Playlist> {
    Ok(Playlist {
        id: PlaylistId::from_key(row.get(0)?),
        owner_id: OwnerId::from_raw(row.get(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        cover: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

/// Reads a track joined with its membership; membership columns follow the
/// track columns.
fn read_playlist_track(row: &Row<'_>) -> rusqlite::Result<PlaylistTrack> {
    Ok(PlaylistTrack {
        track: read_track(row)?,
        position: row.get(15)?,
        added_at: parse_datetime(&row.get::<_, String>(16)?),
    })
}

// Statements shared by the store and its units of work.

fn query_track(conn: &Connection, external_id: &str) -> Result<Option<Track>> {
    conn.query_row(
        &format!("SELECT {TRACK_COLUMNS} FROM tracks t WHERE t.external_id = ?1"),
        params![external_id],
        read_track,
    )
    .optional()
    .map_err(Error::from)
}

fn query_playlist(conn: &Connection, id: PlaylistId, owner_id: OwnerId) -> Result<Option<Playlist>> {
    conn.query_row(
        &format!("SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.id = ?1 AND p.owner_id = ?2"),
        params![id.key(), owner_id.get()],
        read_playlist,
    )
    .optional()
    .map_err(Error::from)
}

fn query_playlist_tracks(conn: &Connection, id: PlaylistId) -> Result<Vec<PlaylistTrack>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRACK_COLUMNS}, pt.position, pt.added_at
         FROM playlist_tracks pt
         JOIN tracks t ON t.id = pt.track_id
         WHERE pt.playlist_id = ?1
         ORDER BY pt.position ASC, pt.track_id ASC"
    ))?;

    let rows = stmt.query_map(params![id.key()], read_playlist_track)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn query_member_count(conn: &Connection, id: PlaylistId) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM playlist_tracks WHERE playlist_id = ?1",
        params![id.key()],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>> {
        Ok(Box::new(SqliteUnitOfWork::begin(self.conn())?))
    }

    // Track registry

    fn upsert_track(&self, track: &NewTrack) -> Result<Track> {
        let conn = self.conn();
        let now = format_datetime(&timestamp_now());

        conn.execute(
            "INSERT INTO tracks (external_id, title, artist, album, cover, duration, source,
                                 popularity, is_downloaded, is_local, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
             ON CONFLICT(external_id) DO UPDATE SET
                 title = excluded.title,
                 artist = excluded.artist,
                 album = excluded.album,
                 cover = excluded.cover,
                 duration = excluded.duration,
                 source = excluded.source,
                 popularity = excluded.popularity,
                 is_downloaded = excluded.is_downloaded,
                 is_local = excluded.is_local,
                 updated_at = excluded.updated_at",
            params![
                track.external_id,
                track.title,
                track.artist,
                track.album,
                track.cover,
                track.duration,
                track.source,
                track.popularity,
                track.is_downloaded,
                track.is_local,
                now,
            ],
        )?;

        query_track(&conn, &track.external_id)?
            .ok_or_else(|| Error::TrackNotFound(track.external_id.clone()))
    }

    fn get_track_by_external_id(&self, external_id: &str) -> Result<Option<Track>> {
        query_track(&self.conn(), external_id)
    }

    fn list_tracks(&self, cursor: &str, limit: i32) -> Result<Vec<Track>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks t
             WHERE t.external_id > ?1 ORDER BY t.external_id LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![cursor, limit], read_track)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn record_play(&self, external_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE tracks SET play_count = play_count + 1, last_played_at = ?1
             WHERE external_id = ?2",
            params![format_datetime(&timestamp_now()), external_id],
        )?;
        Ok(rows > 0)
    }

    // Playlist store

    fn create_playlist(
        &self,
        owner_id: OwnerId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist> {
        let conn = self.conn();
        let now = timestamp_now();

        conn.execute(
            "INSERT INTO playlists (owner_id, name, description, cover, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                owner_id.get(),
                name,
                description,
                DEFAULT_COVER,
                format_datetime(&now),
            ],
        )?;

        Ok(Playlist {
            id: PlaylistId::from_key(conn.last_insert_rowid()),
            name: name.to_string(),
            description: description.map(str::to_string),
            cover: DEFAULT_COVER.to_string(),
            owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_playlist(&self, id: PlaylistId, owner_id: OwnerId) -> Result<Option<Playlist>> {
        query_playlist(&self.conn(), id, owner_id)
    }

    fn list_playlists(&self, owner_id: OwnerId) -> Result<Vec<PlaylistSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PLAYLIST_COLUMNS},
                    (SELECT COUNT(*) FROM playlist_tracks pt WHERE pt.playlist_id = p.id)
             FROM playlists p
             WHERE p.owner_id = ?1
             ORDER BY p.id DESC"
        ))?;

        let rows = stmt.query_map(params![owner_id.get()], |row| {
            Ok(PlaylistSummary {
                playlist: read_playlist(row)?,
                track_count: row.get::<_, i64>(7)?.max(0) as u64,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_playlist(&self, id: PlaylistId, owner_id: OwnerId) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM playlists WHERE id = ?1 AND owner_id = ?2",
            params![id.key(), owner_id.get()],
        )?;
        Ok(rows > 0)
    }

    fn count_playlists(&self, owner_id: OwnerId) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM playlists WHERE owner_id = ?1",
            params![owner_id.get()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn list_playlists_containing(
        &self,
        owner_id: OwnerId,
        external_id: &str,
    ) -> Result<Vec<Playlist>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PLAYLIST_COLUMNS}
             FROM playlists p
             JOIN playlist_tracks pt ON pt.playlist_id = p.id
             JOIN tracks t ON t.id = pt.track_id
             WHERE p.owner_id = ?1 AND t.external_id = ?2
             ORDER BY p.id DESC"
        ))?;

        let rows = stmt.query_map(params![owner_id.get(), external_id], read_playlist)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Membership reads

    fn list_playlist_tracks(&self, id: PlaylistId) -> Result<Vec<PlaylistTrack>> {
        query_playlist_tracks(&self.conn(), id)
    }

    fn count_playlist_tracks(&self, id: PlaylistId) -> Result<u64> {
        query_member_count(&self.conn(), id)
    }

    fn playlist_has_track(&self, id: PlaylistId, external_id: &str) -> Result<bool> {
        let exists: bool = self.conn().query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM playlist_tracks pt
                 JOIN tracks t ON t.id = pt.track_id
                 WHERE pt.playlist_id = ?1 AND t.external_id = ?2
             )",
            params![id.key(), external_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn playlist_total_duration(&self, id: PlaylistId) -> Result<u64> {
        let total: i64 = self.conn().query_row(
            "SELECT COALESCE(SUM(t.duration), 0)
             FROM playlist_tracks pt
             JOIN tracks t ON t.id = pt.track_id
             WHERE pt.playlist_id = ?1",
            params![id.key()],
            |row| row.get(0),
        )?;
        Ok(total.max(0) as u64)
    }
}

/// A `BEGIN IMMEDIATE` transaction that owns the connection lock for its
/// whole lifetime. The write lock is taken up front, so no other writer can
/// observe the playlist between our reads and our writes.
pub struct SqliteUnitOfWork<'a> {
    conn: MutexGuard<'a, Connection>,
    open: bool,
}

impl<'a> SqliteUnitOfWork<'a> {
    fn begin(conn: MutexGuard<'a, Connection>) -> Result<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self { conn, open: true })
    }
}

impl Drop for SqliteUnitOfWork<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::error!("Failed to roll back transaction: {e}");
            }
        }
    }
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn find_playlist(&self, id: PlaylistId, owner_id: OwnerId) -> Result<Option<Playlist>> {
        query_playlist(&self.conn, id, owner_id)
    }

    fn find_playlist_any_owner(&self, id: PlaylistId) -> Result<Option<Playlist>> {
        self.conn
            .query_row(
                &format!("SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.id = ?1"),
                params![id.key()],
                read_playlist,
            )
            .optional()
            .map_err(Error::from)
    }

    fn save_playlist(&self, playlist: &Playlist) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE playlists SET name = ?1, description = ?2, cover = ?3, updated_at = ?4
             WHERE id = ?5 AND owner_id = ?6",
            params![
                playlist.name,
                playlist.description,
                playlist.cover,
                format_datetime(&playlist.updated_at),
                playlist.id.key(),
                playlist.owner_id.get(),
            ],
        )?;
        Ok(rows > 0)
    }

    fn find_track(&self, external_id: &str) -> Result<Option<Track>> {
        query_track(&self.conn, external_id)
    }

    fn max_position(&self, id: PlaylistId) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT MAX(position) FROM playlist_tracks WHERE playlist_id = ?1",
                params![id.key()],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    fn upsert_membership(
        &self,
        id: PlaylistId,
        track_key: i64,
        position: i64,
        added_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO playlist_tracks (playlist_id, track_id, position, added_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(playlist_id, track_id) DO UPDATE SET position = excluded.position",
            params![id.key(), track_key, position, format_datetime(&added_at)],
        )?;
        Ok(())
    }

    fn delete_membership(&self, id: PlaylistId, track_key: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM playlist_tracks WHERE playlist_id = ?1 AND track_id = ?2",
            params![id.key(), track_key],
        )?;
        Ok(rows > 0)
    }

    fn member_positions(&self, id: PlaylistId) -> Result<Vec<(i64, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT track_id, position FROM playlist_tracks
             WHERE playlist_id = ?1 ORDER BY position ASC, track_id ASC",
        )?;

        let rows = stmt.query_map(params![id.key()], |row| Ok((row.get(0)?, row.get(1)?)))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn set_position(&self, id: PlaylistId, track_key: i64, position: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE playlist_tracks SET position = ?1 WHERE playlist_id = ?2 AND track_id = ?3",
            params![position, id.key(), track_key],
        )?;
        Ok(rows > 0)
    }

    fn count_members(&self, id: PlaylistId) -> Result<u64> {
        query_member_count(&self.conn, id)
    }

    fn set_cover(&self, id: PlaylistId, cover: &str, updated_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE playlists SET cover = ?1, updated_at = ?2 WHERE id = ?3",
            params![cover, format_datetime(&updated_at), id.key()],
        )?;
        Ok(())
    }

    fn touch_playlist(&self, id: PlaylistId, updated_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE playlists SET updated_at = ?1 WHERE id = ?2",
            params![format_datetime(&updated_at), id.key()],
        )?;
        Ok(())
    }

    fn playlists_with_track(&self, track_key: i64) -> Result<Vec<PlaylistId>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT playlist_id FROM playlist_tracks
             WHERE track_id = ?1 ORDER BY playlist_id",
        )?;

        let rows = stmt.query_map(params![track_key], |row| {
            Ok(PlaylistId::from_key(row.get(0)?))
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_track(&self, track_key: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM tracks WHERE id = ?1", params![track_key])?;
        Ok(rows > 0)
    }

    fn list_playlist_tracks(&self, id: PlaylistId) -> Result<Vec<PlaylistTrack>> {
        query_playlist_tracks(&self.conn, id)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.open = false;
        Ok(())
    }
}
