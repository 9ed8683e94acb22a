//! Tests for the pipeline module

use super::*;
use crate::error::Error;
use crate::store::DuckDbStore;
use crate::types::{Artist, Song, SongKeys, Songplay, TimeRow, User};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::path::PathBuf;
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

fn store() -> DuckDbStore {
    let store = DuckDbStore::open_in_memory().unwrap();
    store.create_schema().unwrap();
    store
}

fn song_json() -> Value {
    json!({
        "num_songs": 1,
        "artist_id": "AR5KOSW1187FB35FF4",
        "artist_latitude": 49.80388,
        "artist_longitude": 15.47491,
        "artist_location": "Dubai UAE",
        "artist_name": "Elena",
        "song_id": "SOZCTXZ12AB0182364",
        "title": "Setanta matins",
        "duration": 269.58911,
        "year": 0
    })
}

fn event(page: &str, ts: i64, user_id: &str, level: &str, song: &str, length: f64) -> Value {
    json!({
        "artist": "Elena",
        "auth": "Logged In",
        "firstName": "Lily",
        "gender": "F",
        "lastName": "Koch",
        "length": length,
        "level": level,
        "location": "Chicago-Naperville-Elgin, IL-IN-WI",
        "page": page,
        "sessionId": 818,
        "song": song,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id
    })
}

fn login(ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged Out",
        "firstName": null,
        "length": null,
        "level": "free",
        "page": "Login",
        "sessionId": 5,
        "song": null,
        "ts": ts,
        "userId": ""
    })
}

fn write_jsonl(dir: &TempDir, name: &str, records: &[Value]) -> PathBuf {
    let body: Vec<String> = records.iter().map(Value::to_string).collect();
    let path = dir.path().join(name);
    std::fs::write(&path, body.join("\n")).unwrap();
    path
}

fn object(value: Value) -> crate::types::JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_filter_play_events_keeps_next_song_only() {
    let records = vec![
        object(event("NextSong", 1, "15", "free", "A", 1.0)),
        object(login(2)),
        object(event("NextSong", 3, "15", "free", "B", 1.0)),
    ];

    let events = filter_play_events(&records).unwrap();
    let ts: Vec<_> = events.iter().map(|e| e.ts).collect();
    assert_eq!(ts, vec![1, 3]);
}

#[test]
fn test_filter_does_not_validate_other_pages() {
    // A Login row lacks song fields; it must not raise a field error
    let records = vec![object(login(2))];
    assert!(filter_play_events(&records).unwrap().is_empty());
}

#[test]
fn test_filter_rejects_incomplete_play_event() {
    let mut broken = event("NextSong", 1, "15", "free", "A", 1.0);
    broken.as_object_mut().unwrap().remove("sessionId");

    let err = filter_play_events(&[object(broken)]).unwrap_err();
    assert!(matches!(err, Error::SchemaField { .. }));
}

// ============================================================================
// Song files
// ============================================================================

#[test]
fn test_process_song_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(&dir, "song.json", &[song_json()]);
    let store = store();

    let stats = Pipeline::default()
        .process_file(FileKind::Song, &store, &path)
        .unwrap();
    assert_eq!(stats.songs, 1);
    assert_eq!(stats.artists, 1);

    let song = store.song("SOZCTXZ12AB0182364").unwrap().unwrap();
    assert_eq!(song.title, "Setanta matins");
    assert_eq!(song.artist_id, "AR5KOSW1187FB35FF4");
    let artist = store.artist("AR5KOSW1187FB35FF4").unwrap().unwrap();
    assert_eq!(artist.name, "Elena");
}

#[test]
fn test_process_song_file_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(&dir, "song.json", &[song_json()]);
    let store = store();
    let pipeline = Pipeline::default();

    pipeline.process_song_file(&store, &path).unwrap();
    let first = (
        store.song("SOZCTXZ12AB0182364").unwrap(),
        store.artist("AR5KOSW1187FB35FF4").unwrap(),
    );
    pipeline.process_song_file(&store, &path).unwrap();

    let counts = store.table_counts().unwrap();
    assert_eq!(counts.songs, 1);
    assert_eq!(counts.artists, 1);
    assert_eq!(
        first,
        (
            store.song("SOZCTXZ12AB0182364").unwrap(),
            store.artist("AR5KOSW1187FB35FF4").unwrap()
        )
    );
}

#[test]
fn test_process_song_file_missing_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut record = song_json();
    record.as_object_mut().unwrap().remove("artist_name");
    let path = write_jsonl(&dir, "song.json", &[record]);

    let err = Pipeline::default()
        .process_song_file(&store(), &path)
        .unwrap_err();
    match err {
        Error::SchemaField { field, .. } => assert_eq!(field, "artist_name"),
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Log files
// ============================================================================

#[test]
fn test_process_log_file_filters_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(
        &dir,
        "log.json",
        &[
            event("NextSong", 1_541_469_196_796, "15", "free", "A", 1.0),
            login(1_541_469_200_000),
            event("NextSong", 1_541_469_300_000, "16", "paid", "B", 2.0),
        ],
    );
    let store = store();

    let stats = Pipeline::default().process_log_file(&store, &path).unwrap();
    assert_eq!(stats.events_read, 3);
    assert_eq!(stats.events_retained, 2);
    assert_eq!(stats.time_rows, 2);
    assert_eq!(stats.users_upserted, 2);
    assert_eq!(stats.songplays, 2);

    let counts = store.table_counts().unwrap();
    assert_eq!(counts.time, 2);
    assert_eq!(counts.users, 2);
    assert_eq!(counts.songplays, 2);
}

#[test]
fn test_process_log_file_resolves_keys() {
    let dir = tempfile::tempdir().unwrap();
    let song_path = write_jsonl(&dir, "song.json", &[song_json()]);
    let log_path = write_jsonl(
        &dir,
        "log.json",
        &[
            event("NextSong", 1, "15", "free", "Setanta matins", 269.58911),
            event("NextSong", 2, "15", "free", "Unknown Song", 269.58911),
        ],
    );
    let store = store();
    let pipeline = Pipeline::default();

    pipeline.process_song_file(&store, &song_path).unwrap();
    let stats = pipeline.process_log_file(&store, &log_path).unwrap();
    assert_eq!(stats.songplays_resolved, 1);
    assert_eq!(stats.songplays_unresolved, 1);

    let rows = store.songplays().unwrap();
    assert_eq!(rows[0].song_id.as_deref(), Some("SOZCTXZ12AB0182364"));
    assert_eq!(rows[0].artist_id.as_deref(), Some("AR5KOSW1187FB35FF4"));
    assert_eq!(rows[1].song_id, None);
    assert_eq!(rows[1].artist_id, None);
}

#[test]
fn test_user_last_write_wins_within_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(
        &dir,
        "log.json",
        &[
            event("NextSong", 1, "15", "free", "A", 1.0),
            event("NextSong", 2, "15", "paid", "A", 1.0),
        ],
    );
    let store = store();

    Pipeline::default().process_log_file(&store, &path).unwrap();
    assert_eq!(store.user("15").unwrap().unwrap().level, "paid");
}

#[test]
fn test_anonymous_play_skips_user_but_keeps_fact() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(&dir, "log.json", &[event("NextSong", 1, "", "free", "A", 1.0)]);
    let store = store();

    let stats = Pipeline::default().process_log_file(&store, &path).unwrap();
    assert_eq!(stats.users_skipped, 1);
    assert_eq!(stats.users_upserted, 0);

    let counts = store.table_counts().unwrap();
    assert_eq!(counts.users, 0);
    assert_eq!(counts.songplays, 1);
    assert_eq!(store.songplays().unwrap()[0].user_id, None);
}

#[test]
fn test_repeated_timestamp_keeps_one_time_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(
        &dir,
        "log.json",
        &[
            event("NextSong", 7, "15", "free", "A", 1.0),
            event("NextSong", 7, "16", "free", "B", 1.0),
        ],
    );
    let store = store();

    let stats = Pipeline::default().process_log_file(&store, &path).unwrap();
    assert_eq!(stats.time_rows, 2);
    assert_eq!(store.table_counts().unwrap().time, 1);
}

#[test]
fn test_malformed_log_line_aborts_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.json");
    std::fs::write(
        &path,
        format!("{}\n{{not json", event("NextSong", 1, "15", "free", "A", 1.0)),
    )
    .unwrap();
    let store = store();

    let err = Pipeline::default().process_log_file(&store, &path).unwrap_err();
    assert!(matches!(err, Error::Parse { line: Some(2), .. }));
    assert_eq!(store.table_counts().unwrap().songplays, 0);
}

// ============================================================================
// Resolver policy
// ============================================================================

fn ambiguous_store() -> DuckDbStore {
    let store = store();
    store
        .upsert_artist(&Artist {
            artist_id: "AR1".into(),
            name: "Elena".into(),
            location: None,
            latitude: None,
            longitude: None,
        })
        .unwrap();
    for id in ["S2", "S1"] {
        store
            .upsert_song(&Song {
                song_id: id.into(),
                title: "Twin".into(),
                artist_id: "AR1".into(),
                year: 2001,
                duration: 100.0,
            })
            .unwrap();
    }
    store
}

fn twin_event() -> crate::types::PlayEvent {
    crate::types::PlayEvent::from_record(&object(event(
        "NextSong", 1, "15", "free", "Twin", 100.0,
    )))
    .unwrap()
}

#[test]
fn test_ambiguous_match_is_a_miss_by_default() {
    let store = ambiguous_store();
    let keys = SongplayResolver::default()
        .resolve(&store, &twin_event())
        .unwrap();
    assert_eq!(keys, None);
}

#[test]
fn test_ambiguous_match_first_policy() {
    let store = ambiguous_store();
    let keys = SongplayResolver::new(AmbiguityPolicy::First)
        .resolve(&store, &twin_event())
        .unwrap();
    assert_eq!(
        keys,
        Some(SongKeys {
            song_id: "S1".into(),
            artist_id: "AR1".into()
        })
    );
}

#[test]
fn test_ambiguous_match_error_policy() {
    let store = ambiguous_store();
    let err = SongplayResolver::new(AmbiguityPolicy::Error)
        .resolve(&store, &twin_event())
        .unwrap_err();
    match err {
        Error::LookupAmbiguity { matches, title, .. } => {
            assert_eq!(matches, 2);
            assert_eq!(title, "Twin");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Write order
// ============================================================================

/// Store that records the operations it receives
#[derive(Default)]
struct RecordingStore {
    ops: RefCell<Vec<String>>,
}

impl RecordingStore {
    fn push(&self, op: String) -> crate::error::Result<()> {
        self.ops.borrow_mut().push(op);
        Ok(())
    }
}

impl WarehouseStore for RecordingStore {
    fn begin(&self) -> crate::error::Result<()> {
        self.push("begin".into())
    }
    fn commit(&self) -> crate::error::Result<()> {
        self.push("commit".into())
    }
    fn rollback(&self) -> crate::error::Result<()> {
        self.push("rollback".into())
    }
    fn upsert_song(&self, song: &Song) -> crate::error::Result<()> {
        self.push(format!("song {}", song.song_id))
    }
    fn upsert_artist(&self, artist: &Artist) -> crate::error::Result<()> {
        self.push(format!("artist {}", artist.artist_id))
    }
    fn upsert_time(&self, time: &TimeRow) -> crate::error::Result<()> {
        self.push(format!("time {}", time.start_time))
    }
    fn upsert_user(&self, user: &User) -> crate::error::Result<()> {
        self.push(format!("user {} {}", user.user_id, user.level))
    }
    fn lookup_song_keys(
        &self,
        title: &str,
        _artist: &str,
        _duration: f64,
    ) -> crate::error::Result<Vec<SongKeys>> {
        self.ops.borrow_mut().push(format!("lookup {title}"));
        Ok(Vec::new())
    }
    fn insert_songplay(&self, songplay: &Songplay) -> crate::error::Result<()> {
        self.push(format!("songplay {}", songplay.start_time))
    }
}

#[test]
fn test_log_file_write_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(
        &dir,
        "log.json",
        &[
            event("NextSong", 1, "15", "free", "A", 1.0),
            login(2),
            event("NextSong", 3, "16", "paid", "B", 1.0),
        ],
    );
    let store = RecordingStore::default();

    Pipeline::default().process_log_file(&store, &path).unwrap();

    assert_eq!(
        store.ops.into_inner(),
        vec![
            "time 1",
            "time 3",
            "user 15 free",
            "user 16 paid",
            "lookup A",
            "songplay 1",
            "lookup B",
            "songplay 3",
        ]
    );
}

#[test]
fn test_song_file_writes_song_then_artist() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(&dir, "song.json", &[song_json()]);
    let store = RecordingStore::default();

    Pipeline::default().process_song_file(&store, &path).unwrap();

    assert_eq!(
        store.ops.into_inner(),
        vec!["song SOZCTXZ12AB0182364", "artist AR5KOSW1187FB35FF4"]
    );
}
