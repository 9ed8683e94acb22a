//! Data model of the star schema
//!
//! Dimension rows (song, artist, time, user), the songplay fact row, and the
//! typed input records they are extracted from. Input records are validated
//! field by field when they are built, so the pipeline never indexes into
//! raw JSON by position.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type, one parsed input line
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Page action that marks a playback event in the activity log
pub const NEXT_SONG_PAGE: &str = "NextSong";

// ============================================================================
// Dimension Rows
// ============================================================================

/// Song dimension row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    /// Length in seconds
    pub duration: f64,
}

/// Artist dimension row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Time dimension row, derived from one event timestamp
///
/// `weekday` counts from Monday = 0 to Sunday = 6, `week` is the ISO 8601
/// week number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRow {
    /// Epoch milliseconds, the row key
    pub start_time: i64,
    pub hour: i32,
    pub day: i32,
    pub week: i32,
    pub month: i32,
    pub year: i32,
    pub weekday: i32,
}

/// User dimension row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    /// Subscription level ("free" / "paid")
    pub level: String,
}

// ============================================================================
// Fact Row
// ============================================================================

/// Songplay fact row
///
/// `song_id` and `artist_id` are only set when the play event resolved to
/// exactly one song/artist pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Songplay {
    pub start_time: i64,
    pub user_id: Option<String>,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// Surrogate key pair returned by a songplay lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongKeys {
    pub song_id: String,
    pub artist_id: String,
}

// ============================================================================
// Input Records
// ============================================================================

/// One song-metadata record: the song and its artist share a line
#[derive(Debug, Clone, PartialEq)]
pub struct SongMetadata {
    pub song: Song,
    pub artist: Artist,
}

impl SongMetadata {
    const RECORD: &'static str = "song metadata";

    /// Build from a raw record, validating every field up front
    pub fn from_record(record: &JsonObject) -> Result<Self> {
        let fields = FieldReader::new(Self::RECORD, record);

        let artist_id = fields.required_str("artist_id")?;
        let song = Song {
            song_id: fields.required_str("song_id")?,
            title: fields.required_str("title")?,
            artist_id: artist_id.clone(),
            year: i32::try_from(fields.required_i64("year")?)
                .map_err(|_| Error::invalid_field(Self::RECORD, "year", "is out of range"))?,
            duration: fields.required_f64("duration")?,
        };
        let artist = Artist {
            artist_id,
            name: fields.required_str("artist_name")?,
            location: fields.present_nullable_str("artist_location")?,
            latitude: fields.present_nullable_f64("artist_latitude")?,
            longitude: fields.present_nullable_f64("artist_longitude")?,
        };

        Ok(Self { song, artist })
    }
}

/// A retained playback event from an activity log
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    /// Epoch milliseconds
    pub ts: i64,
    /// `None` for events without an authenticated user
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: String,
    pub song: String,
    pub artist: String,
    pub length: f64,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl PlayEvent {
    const RECORD: &'static str = "log event";

    /// Whether a raw log record is a playback event
    ///
    /// Records without a `page` are never playback events.
    pub fn is_play(record: &JsonObject) -> bool {
        record.get("page").and_then(Value::as_str) == Some(NEXT_SONG_PAGE)
    }

    /// Build from a raw record that already passed [`PlayEvent::is_play`]
    pub fn from_record(record: &JsonObject) -> Result<Self> {
        let fields = FieldReader::new(Self::RECORD, record);

        Ok(Self {
            ts: fields.required_i64("ts")?,
            user_id: fields.user_id("userId")?,
            first_name: fields.nullable_str("firstName")?,
            last_name: fields.nullable_str("lastName")?,
            gender: fields.nullable_str("gender")?,
            level: fields.required_str("level")?,
            song: fields.required_str("song")?,
            artist: fields.required_str("artist")?,
            length: fields.required_f64("length")?,
            session_id: fields.required_i64("sessionId")?,
            location: fields.nullable_str("location")?,
            user_agent: fields.nullable_str("userAgent")?,
        })
    }

    /// User dimension row for this event, if it carries a user
    pub fn user(&self) -> Option<User> {
        self.user_id.as_ref().map(|user_id| User {
            user_id: user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender.clone(),
            level: self.level.clone(),
        })
    }

    /// Fact row for this event with the resolved keys
    pub fn songplay(&self, keys: Option<SongKeys>) -> Songplay {
        let (song_id, artist_id) = match keys {
            Some(keys) => (Some(keys.song_id), Some(keys.artist_id)),
            None => (None, None),
        };

        Songplay {
            start_time: self.ts,
            user_id: self.user_id.clone(),
            level: self.level.clone(),
            song_id,
            artist_id,
            session_id: self.session_id,
            location: self.location.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

// ============================================================================
// Field Extraction
// ============================================================================

/// Typed accessors over one raw record, reporting errors by field name
struct FieldReader<'a> {
    record_kind: &'static str,
    record: &'a JsonObject,
}

impl<'a> FieldReader<'a> {
    fn new(record_kind: &'static str, record: &'a JsonObject) -> Self {
        Self {
            record_kind,
            record,
        }
    }

    /// Value of a key that must be present and non-null
    fn required(&self, field: &str) -> Result<&'a Value> {
        match self.record.get(field) {
            None | Some(Value::Null) => Err(Error::missing_field(self.record_kind, field)),
            Some(value) => Ok(value),
        }
    }

    fn required_str(&self, field: &str) -> Result<String> {
        self.required(field)?
            .as_str()
            .map(String::from)
            .ok_or_else(|| Error::invalid_field(self.record_kind, field, "is not a string"))
    }

    fn required_f64(&self, field: &str) -> Result<f64> {
        self.required(field)?
            .as_f64()
            .ok_or_else(|| Error::invalid_field(self.record_kind, field, "is not a number"))
    }

    fn required_i64(&self, field: &str) -> Result<i64> {
        let value = self.required(field)?;
        as_integer(value)
            .ok_or_else(|| Error::invalid_field(self.record_kind, field, "is not an integer"))
    }

    /// Optional string: absent and null both read as `None`
    fn nullable_str(&self, field: &str) -> Result<Option<String>> {
        match self.record.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Error::invalid_field(
                self.record_kind,
                field,
                "is not a string",
            )),
        }
    }

    /// Key must exist, but its value may be null
    fn present_nullable_str(&self, field: &str) -> Result<Option<String>> {
        if !self.record.contains_key(field) {
            return Err(Error::missing_field(self.record_kind, field));
        }
        self.nullable_str(field)
    }

    /// Key must exist, but its value may be null
    fn present_nullable_f64(&self, field: &str) -> Result<Option<f64>> {
        match self.record.get(field) {
            None => Err(Error::missing_field(self.record_kind, field)),
            Some(Value::Null) => Ok(None),
            Some(value) => value.as_f64().map(Some).ok_or_else(|| {
                Error::invalid_field(self.record_kind, field, "is not a number")
            }),
        }
    }

    /// User ids arrive as strings or integers; empty means anonymous
    fn user_id(&self, field: &str) -> Result<Option<String>> {
        match self.record.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(value @ Value::Number(_)) => as_integer(value)
                .map(|id| Some(id.to_string()))
                .ok_or_else(|| {
                    Error::invalid_field(self.record_kind, field, "is not an integer id")
                }),
            Some(_) => Err(Error::invalid_field(
                self.record_kind,
                field,
                "is not a string or integer",
            )),
        }
    }
}

/// Integer view of a JSON number, accepting whole floats such as `39.0`
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
            .map(|f| f as i64)
    })
}
