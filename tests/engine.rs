//! Engine integration tests.
//!
//! Every test runs against its own on-disk database so the store behaves the
//! way it does in production (WAL, foreign keys, busy timeout).

mod common;

use common::{TestContext, dense, ids, owner};
use setlist::error::Error;
use setlist::types::{DEFAULT_COVER, PlaylistId, PlaylistUpdate};

#[test]
fn test_add_and_remove_walkthrough() {
    let ctx = TestContext::new();
    let me = owner(7);
    ctx.register("v1", Some("cov1"), 180);
    ctx.register("v2", Some("cov2"), 200);
    let p1 = ctx.playlist(me, "Road trip");

    let result = ctx.engine.add_track(p1, "v1", me).expect("add v1");
    assert_eq!(result.playlist.cover, "cov1");
    assert_eq!(result.track_ids(), vec!["v1"]);
    assert_eq!(result.tracks[0].position, 0);

    let result = ctx.engine.add_track(p1, "v2", me).expect("add v2");
    assert_eq!(result.playlist.cover, "cov1");
    assert_eq!(result.track_ids(), vec!["v1", "v2"]);
    assert_eq!(ctx.positions(p1), vec![0, 1]);

    assert!(ctx.engine.remove_track(p1, "v1", me).expect("remove v1"));
    assert_eq!(ctx.order(p1), vec!["v2"]);
    assert_eq!(ctx.positions(p1), vec![0]);

    assert!(ctx.engine.remove_track(p1, "v2", me).expect("remove v2"));
    let playlist = ctx.engine.get_playlist(p1, me).expect("get playlist");
    assert!(playlist.tracks.is_empty());
    assert_eq!(playlist.playlist.cover, DEFAULT_COVER);
}

#[test]
fn test_positions_stay_dense_across_mixed_operations() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Shuffle");

    let catalog: Vec<String> = (0..12).map(|n| format!("t{n:02}")).collect();
    for external_id in &catalog {
        ctx.register(external_id, None, 60);
    }

    // Fixed-seed LCG so failures are reproducible.
    let mut seed: u64 = 0x5eed;
    let mut next = move || {
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (seed >> 33) as usize
    };

    for step in 0..200 {
        let external_id = &catalog[next() % catalog.len()];
        if next() % 3 == 0 {
            ctx.engine
                .remove_track(id, external_id, me)
                .expect("remove track");
        } else {
            ctx.engine
                .add_track(id, external_id, me)
                .expect("add track");
        }

        let positions = ctx.positions(id);
        assert_eq!(positions, dense(positions.len()), "step {step}");
    }
}

#[test]
fn test_removing_middle_member_preserves_order() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Ordered");
    for external_id in ["a", "b", "c", "d", "e"] {
        ctx.register(external_id, None, 60);
        ctx.engine.add_track(id, external_id, me).expect("add");
    }

    assert!(ctx.engine.remove_track(id, "c", me).expect("remove"));

    assert_eq!(ctx.order(id), vec!["a", "b", "d", "e"]);
    assert_eq!(ctx.positions(id), dense(4));
}

#[test]
fn test_readding_member_does_not_duplicate() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Repeat");
    for external_id in ["a", "b", "c"] {
        ctx.register(external_id, None, 60);
        ctx.engine.add_track(id, external_id, me).expect("add");
    }

    let result = ctx.engine.add_track(id, "a", me).expect("re-add");

    assert_eq!(result.tracks.len(), 3);
    assert_eq!(ctx.engine.get_track_count(id), 3);
    assert_eq!(result.track_ids(), vec!["b", "c", "a"]);
    assert_eq!(ctx.positions(id), dense(3));
}

#[test]
fn test_cover_follows_first_track_with_artwork() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Covers");
    ctx.register("plain", None, 60);
    ctx.register("blank", Some("  "), 60);
    ctx.register("x", Some("X"), 60);
    ctx.register("y", Some("Y"), 60);

    let result = ctx.engine.add_track(id, "plain", me).expect("add plain");
    assert_eq!(result.playlist.cover, DEFAULT_COVER);

    let result = ctx.engine.add_track(id, "blank", me).expect("add blank");
    assert_eq!(result.playlist.cover, DEFAULT_COVER);

    let result = ctx.engine.add_track(id, "x", me).expect("add x");
    assert_eq!(result.playlist.cover, "X");

    let result = ctx.engine.add_track(id, "y", me).expect("add y");
    assert_eq!(result.playlist.cover, "X");

    for external_id in ["plain", "blank", "x"] {
        ctx.engine.remove_track(id, external_id, me).expect("remove");
        assert_eq!(
            ctx.engine.find_playlist(id, me).expect("find").cover,
            "X",
            "cover must survive while members remain"
        );
    }

    ctx.engine.remove_track(id, "y", me).expect("remove last");
    assert_eq!(
        ctx.engine.find_playlist(id, me).expect("find").cover,
        DEFAULT_COVER
    );
}

#[test]
fn test_explicit_cover_is_not_replaced_by_tracks() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Custom");
    ctx.register("x", Some("X"), 60);

    let update = PlaylistUpdate {
        cover: Some("custom-art".into()),
        ..Default::default()
    };
    ctx.engine.update_playlist(id, me, &update).expect("update");

    let result = ctx.engine.add_track(id, "x", me).expect("add");
    assert_eq!(result.playlist.cover, "custom-art");
}

#[test]
fn test_foreign_playlist_looks_nonexistent() {
    let ctx = TestContext::new();
    let alice = owner(1);
    let mallory = owner(2);
    ctx.register("a", Some("A"), 60);
    let id = ctx.playlist(alice, "Private");
    ctx.engine.add_track(id, "a", alice).expect("add");
    let missing = PlaylistId::from_key(id.key() + 1000);

    for target in [id, missing] {
        let err = ctx.engine.get_playlist(target, mallory).unwrap_err();
        assert!(matches!(err, Error::NotFoundOrAccessDenied), "{err:?}");

        let err = ctx.engine.add_track(target, "a", mallory).unwrap_err();
        assert!(matches!(err, Error::NotFoundOrAccessDenied), "{err:?}");

        // Ownership is checked before the track is resolved.
        let err = ctx.engine.add_track(target, "ghost", mallory).unwrap_err();
        assert!(matches!(err, Error::NotFoundOrAccessDenied), "{err:?}");

        let err = ctx.engine.remove_track(target, "a", mallory).unwrap_err();
        assert!(matches!(err, Error::NotFoundOrAccessDenied), "{err:?}");

        let err = ctx
            .engine
            .reorder_tracks(target, &ids(&["a"]), mallory)
            .unwrap_err();
        assert!(matches!(err, Error::NotFoundOrAccessDenied), "{err:?}");

        let err = ctx
            .engine
            .update_playlist(target, mallory, &PlaylistUpdate::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFoundOrAccessDenied), "{err:?}");

        let err = ctx.engine.delete_playlist(target, mallory).unwrap_err();
        assert!(matches!(err, Error::NotFoundOrAccessDenied), "{err:?}");
    }

    let playlist = ctx.engine.get_playlist(id, alice).expect("owner still sees it");
    assert_eq!(playlist.track_ids(), vec!["a"]);
    assert_eq!(playlist.playlist.cover, "A");
    assert_eq!(ctx.engine.count(mallory), 0);
    assert!(
        ctx.engine
            .playlists_containing(mallory, "a")
            .expect("containing")
            .is_empty()
    );
}

#[test]
fn test_reorder_applies_requested_order() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Reorder");
    for external_id in ["a", "b", "c"] {
        ctx.register(external_id, None, 60);
        ctx.engine.add_track(id, external_id, me).expect("add");
    }

    let result = ctx
        .engine
        .reorder_tracks(id, &ids(&["c", "a", "b"]), me)
        .expect("reorder");

    assert_eq!(result.track_ids(), vec!["c", "a", "b"]);
    assert_eq!(ctx.order(id), vec!["c", "a", "b"]);
    assert_eq!(ctx.positions(id), dense(3));
}

#[test]
fn test_reorder_skips_unknown_and_foreign_ids() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Reorder");
    for external_id in ["a", "b", "c", "outsider"] {
        ctx.register(external_id, None, 60);
    }
    for external_id in ["a", "b", "c"] {
        ctx.engine.add_track(id, external_id, me).expect("add");
    }

    let result = ctx
        .engine
        .reorder_tracks(id, &ids(&["ghost", "c", "outsider", "b", "a"]), me)
        .expect("reorder");

    assert_eq!(result.track_ids(), vec!["c", "b", "a"]);
    assert_eq!(ctx.positions(id), dense(3));
    assert!(!ctx.engine.has_track(id, "outsider").expect("has_track"));
}

#[test]
fn test_partial_reorder_keeps_positions_dense() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Partial");
    for external_id in ["a", "b", "c", "d"] {
        ctx.register(external_id, None, 60);
        ctx.engine.add_track(id, external_id, me).expect("add");
    }

    let result = ctx
        .engine
        .reorder_tracks(id, &ids(&["d"]), me)
        .expect("reorder");

    assert_eq!(result.track_ids(), vec!["d", "a", "b", "c"]);
    assert_eq!(ctx.positions(id), dense(4));

    let result = ctx
        .engine
        .reorder_tracks(id, &ids(&["b", "b", "c", "b"]), me)
        .expect("reorder with duplicates");

    assert_eq!(result.tracks.len(), 4);
    assert_eq!(ctx.positions(id), dense(4));
}

#[test]
fn test_empty_reorder_changes_nothing_but_timestamp() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Still");
    for external_id in ["a", "b"] {
        ctx.register(external_id, None, 60);
        ctx.engine.add_track(id, external_id, me).expect("add");
    }
    let before = ctx.engine.find_playlist(id, me).expect("find").updated_at;

    let result = ctx.engine.reorder_tracks(id, &[], me).expect("reorder");

    assert_eq!(result.track_ids(), vec!["a", "b"]);
    assert!(result.playlist.updated_at > before);
}

#[test]
fn test_add_unknown_track_changes_nothing() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Empty");

    let err = ctx.engine.add_track(id, "ghost", me).unwrap_err();
    assert!(matches!(err, Error::TrackNotFound(ref t) if t == "ghost"), "{err:?}");

    let err = ctx.engine.add_track(id, "", me).unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err:?}");

    assert!(ctx.order(id).is_empty());
}

#[test]
fn test_remove_non_member_returns_false() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Sparse");
    ctx.register("a", Some("A"), 60);
    ctx.register("b", None, 60);
    ctx.engine.add_track(id, "a", me).expect("add");
    let before = ctx.engine.find_playlist(id, me).expect("find");

    assert!(!ctx.engine.remove_track(id, "b", me).expect("remove non-member"));
    assert!(!ctx.engine.remove_track(id, "ghost", me).expect("remove unknown"));

    let after = ctx.engine.find_playlist(id, me).expect("find");
    assert_eq!(after, before);
    assert_eq!(ctx.order(id), vec!["a"]);
}

#[test]
fn test_remove_from_empty_playlist_leaves_timestamp() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Nothing");
    ctx.register("a", None, 60);
    let before = ctx.engine.find_playlist(id, me).expect("find");

    assert!(!ctx.engine.remove_track(id, "a", me).expect("remove"));
    assert_eq!(ctx.engine.find_playlist(id, me).expect("find"), before);
}

#[test]
fn test_updated_at_advances_on_mutations() {
    let ctx = TestContext::new();
    let me = owner(1);
    ctx.register("x", Some("X"), 60);
    let id = ctx.playlist(me, "Clock");
    let created = ctx.engine.find_playlist(id, me).expect("find");

    let after_add = ctx.engine.add_track(id, "x", me).expect("add").playlist;
    assert!(after_add.updated_at > created.updated_at);
    assert_eq!(after_add.created_at, created.created_at);

    let after_update = ctx
        .engine
        .update_playlist(id, me, &PlaylistUpdate::default())
        .expect("empty update");
    assert!(after_update.updated_at > after_add.updated_at);

    ctx.engine.remove_track(id, "x", me).expect("remove");
    let after_remove = ctx.engine.find_playlist(id, me).expect("find");
    assert!(after_remove.updated_at > after_update.updated_at);
}

#[test]
fn test_update_changes_only_supplied_fields() {
    let ctx = TestContext::new();
    let me = owner(1);
    let playlist = ctx
        .engine
        .create_playlist(me, "  Morning  ", Some("wake up"))
        .expect("create");
    assert_eq!(playlist.name, "Morning");
    assert_eq!(playlist.description.as_deref(), Some("wake up"));

    let update = PlaylistUpdate {
        name: Some("Evening".into()),
        ..Default::default()
    };
    let updated = ctx
        .engine
        .update_playlist(playlist.id, me, &update)
        .expect("rename");
    assert_eq!(updated.name, "Evening");
    assert_eq!(updated.description.as_deref(), Some("wake up"));
    assert_eq!(updated.cover, DEFAULT_COVER);

    let update = PlaylistUpdate {
        description: Some(String::new()),
        ..Default::default()
    };
    let updated = ctx
        .engine
        .update_playlist(playlist.id, me, &update)
        .expect("clear description");
    assert_eq!(updated.description, None);
    assert_eq!(updated.name, "Evening");

    let stored = ctx.engine.find_playlist(playlist.id, me).expect("find");
    assert_eq!(stored, updated);
}

#[test]
fn test_invalid_input_is_rejected_before_writing() {
    let ctx = TestContext::new();
    let me = owner(1);

    let err = ctx.engine.create_playlist(me, "   ", None).unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err:?}");
    let err = ctx
        .engine
        .create_playlist(me, &"n".repeat(101), None)
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err:?}");
    assert_eq!(ctx.engine.count(me), 0);

    let id = ctx.playlist(me, "Valid");
    let update = PlaylistUpdate {
        name: Some(String::new()),
        cover: Some("new".into()),
        ..Default::default()
    };
    let err = ctx.engine.update_playlist(id, me, &update).unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err:?}");
    assert_eq!(ctx.engine.find_playlist(id, me).expect("find").cover, DEFAULT_COVER);
}

#[test]
fn test_failed_write_rolls_back_membership() {
    let ctx = TestContext::new();
    let me = owner(1);
    ctx.register("x", Some("X"), 60);
    let id = ctx.playlist(me, "Atomic");

    ctx.store
        .connection()
        .execute_batch(
            "CREATE TRIGGER lock_cover BEFORE UPDATE OF cover ON playlists
             BEGIN SELECT RAISE(ABORT, 'cover locked'); END;",
        )
        .expect("create trigger");

    let err = ctx.engine.add_track(id, "x", me).unwrap_err();
    assert!(matches!(err, Error::Store(_)), "{err:?}");

    assert!(ctx.order(id).is_empty());
    assert_eq!(ctx.engine.find_playlist(id, me).expect("find").cover, DEFAULT_COVER);
}

#[test]
fn test_delete_playlist_keeps_tracks() {
    let ctx = TestContext::new();
    let me = owner(1);
    ctx.register("a", None, 60);
    let id = ctx.playlist(me, "Doomed");
    ctx.engine.add_track(id, "a", me).expect("add");

    ctx.engine.delete_playlist(id, me).expect("delete");

    let err = ctx.engine.get_playlist(id, me).unwrap_err();
    assert!(matches!(err, Error::NotFoundOrAccessDenied), "{err:?}");
    assert!(ctx.engine.find_track("a").expect("find").is_some());
    assert!(
        ctx.engine
            .playlists_containing(me, "a")
            .expect("containing")
            .is_empty()
    );
}

#[test]
fn test_delete_track_reindexes_every_playlist() {
    let ctx = TestContext::new();
    let alice = owner(1);
    let bob = owner(2);
    for (external_id, cover) in [("a", Some("A")), ("b", None), ("c", None)] {
        ctx.register(external_id, cover, 60);
    }

    let mixed = ctx.playlist(alice, "Mixed");
    for external_id in ["a", "b", "c"] {
        ctx.engine.add_track(mixed, external_id, alice).expect("add");
    }
    let solo = ctx.playlist(bob, "Solo");
    ctx.engine.add_track(solo, "b", bob).expect("add");
    ctx.engine
        .update_playlist(
            solo,
            bob,
            &PlaylistUpdate {
                cover: Some("bob-art".into()),
                ..Default::default()
            },
        )
        .expect("set cover");

    assert!(ctx.engine.delete_track("b").expect("delete"));
    assert!(!ctx.engine.delete_track("b").expect("delete again"));

    assert_eq!(ctx.order(mixed), vec!["a", "c"]);
    assert_eq!(ctx.positions(mixed), dense(2));
    assert_eq!(ctx.engine.find_playlist(mixed, alice).expect("find").cover, "A");

    assert!(ctx.order(solo).is_empty());
    assert_eq!(
        ctx.engine.find_playlist(solo, bob).expect("find").cover,
        DEFAULT_COVER
    );
}

#[test]
fn test_stats_sum_member_durations() {
    let ctx = TestContext::new();
    let me = owner(1);
    let id = ctx.playlist(me, "Long");
    ctx.register("a", None, 3000);
    ctx.register("b", None, 900);
    ctx.register("c", None, 45);

    let stats = ctx.engine.get_stats(id).expect("empty stats");
    assert_eq!(stats.track_count, 0);
    assert_eq!(stats.formatted_duration, "0 min");

    for external_id in ["a", "b", "c"] {
        ctx.engine.add_track(id, external_id, me).expect("add");
    }

    let stats = ctx.engine.get_stats(id).expect("stats");
    assert_eq!(stats.track_count, 3);
    assert_eq!(stats.total_duration, 3945);
    assert_eq!(stats.formatted_duration, "1 hr 5 min");
}

#[test]
fn test_list_playlists_reports_track_counts() {
    let ctx = TestContext::new();
    let me = owner(1);
    ctx.register("a", None, 60);
    let first = ctx.playlist(me, "First");
    let second = ctx.playlist(me, "Second");
    ctx.playlist(owner(2), "Elsewhere");
    ctx.engine.add_track(second, "a", me).expect("add");

    let summaries = ctx.engine.list_playlists(me).expect("list");
    let listed: Vec<_> = summaries
        .iter()
        .map(|s| (s.playlist.id, s.track_count))
        .collect();

    assert_eq!(listed, vec![(second, 1), (first, 0)]);
    assert_eq!(ctx.engine.count(me), 2);
}

#[test]
fn test_counts_read_zero_when_store_fails() {
    let ctx = TestContext::new();
    let me = owner(1);
    ctx.register("a", None, 60);
    let id = ctx.playlist(me, "Broken");
    ctx.engine.add_track(id, "a", me).expect("add");

    ctx.store
        .connection()
        .execute_batch("DROP TABLE playlist_tracks; DROP TABLE playlists;")
        .expect("drop tables");

    assert_eq!(ctx.engine.get_track_count(id), 0);
    assert_eq!(ctx.engine.count(me), 0);
    assert!(ctx.engine.get_stats(id).is_err());
}

#[test]
fn test_record_play_updates_statistics() {
    let ctx = TestContext::new();
    ctx.register("a", None, 60);

    let played = ctx.engine.record_play("a").expect("play");
    assert_eq!(played.play_count, 1);
    assert!(played.last_played_at.is_some());

    let played = ctx.engine.record_play("a").expect("play again");
    assert_eq!(played.play_count, 2);

    // Re-ingesting metadata keeps the counters.
    ctx.register("a", Some("new-art"), 61);
    let track = ctx.engine.get_track("a").expect("get");
    assert_eq!(track.play_count, 2);
    assert_eq!(track.cover.as_deref(), Some("new-art"));

    let err = ctx.engine.record_play("ghost").unwrap_err();
    assert!(matches!(err, Error::TrackNotFound(_)), "{err:?}");
}
