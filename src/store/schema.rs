//! Star schema DDL

/// One table of the star schema
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub create: &'static str,
}

const SONGPLAY_SEQUENCE: &str = "songplay_id_seq";

pub const SONGPLAYS: Table = Table {
    name: "songplays",
    create: "CREATE TABLE IF NOT EXISTS songplays (
        songplay_id BIGINT PRIMARY KEY DEFAULT nextval('songplay_id_seq'),
        start_time BIGINT NOT NULL,
        user_id VARCHAR,
        level VARCHAR NOT NULL,
        song_id VARCHAR,
        artist_id VARCHAR,
        session_id BIGINT NOT NULL,
        location VARCHAR,
        user_agent VARCHAR
    );",
};

pub const USERS: Table = Table {
    name: "users",
    create: "CREATE TABLE IF NOT EXISTS users (
        user_id VARCHAR PRIMARY KEY,
        first_name VARCHAR,
        last_name VARCHAR,
        gender VARCHAR,
        level VARCHAR NOT NULL
    );",
};

pub const SONGS: Table = Table {
    name: "songs",
    create: "CREATE TABLE IF NOT EXISTS songs (
        song_id VARCHAR PRIMARY KEY,
        title VARCHAR NOT NULL,
        artist_id VARCHAR NOT NULL,
        year INTEGER NOT NULL,
        duration DOUBLE NOT NULL
    );",
};

pub const ARTISTS: Table = Table {
    name: "artists",
    create: "CREATE TABLE IF NOT EXISTS artists (
        artist_id VARCHAR PRIMARY KEY,
        name VARCHAR NOT NULL,
        location VARCHAR,
        latitude DOUBLE,
        longitude DOUBLE
    );",
};

pub const TIME: Table = Table {
    name: "time",
    create: "CREATE TABLE IF NOT EXISTS \"time\" (
        start_time BIGINT PRIMARY KEY,
        hour INTEGER NOT NULL,
        day INTEGER NOT NULL,
        week INTEGER NOT NULL,
        month INTEGER NOT NULL,
        year INTEGER NOT NULL,
        weekday INTEGER NOT NULL
    );",
};

/// Every table, fact table first
pub const TABLES: [Table; 5] = [SONGPLAYS, USERS, SONGS, ARTISTS, TIME];

/// Statements that create the whole schema
pub(crate) fn create_statements() -> Vec<String> {
    let mut statements = vec![format!(
        "CREATE SEQUENCE IF NOT EXISTS {SONGPLAY_SEQUENCE} START 1;"
    )];
    statements.extend(TABLES.iter().map(|t| t.create.to_string()));
    statements
}

/// Statements that drop the whole schema
pub(crate) fn drop_statements() -> Vec<String> {
    let mut statements: Vec<String> = TABLES
        .iter()
        .map(|t| format!("DROP TABLE IF EXISTS \"{}\";", t.name))
        .collect();
    statements.push(format!("DROP SEQUENCE IF EXISTS {SONGPLAY_SEQUENCE};"));
    statements
}

// ============================================================================
// Parameterized statements
// ============================================================================

pub(crate) const SONG_UPSERT: &str = "INSERT INTO songs (song_id, title, artist_id, year, duration)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT (song_id) DO UPDATE SET
        title = excluded.title,
        artist_id = excluded.artist_id,
        year = excluded.year,
        duration = excluded.duration";

pub(crate) const ARTIST_UPSERT: &str = "INSERT INTO artists (artist_id, name, location, latitude, longitude)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT (artist_id) DO UPDATE SET
        name = excluded.name,
        location = excluded.location,
        latitude = excluded.latitude,
        longitude = excluded.longitude";

pub(crate) const TIME_UPSERT: &str = "INSERT INTO \"time\" (start_time, hour, day, week, month, year, weekday)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT (start_time) DO NOTHING";

pub(crate) const USER_UPSERT: &str = "INSERT INTO users (user_id, first_name, last_name, gender, level)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT (user_id) DO UPDATE SET
        first_name = excluded.first_name,
        last_name = excluded.last_name,
        gender = excluded.gender,
        level = excluded.level";

pub(crate) const SONGPLAY_INSERT: &str = "INSERT INTO songplays
    (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

pub(crate) const SONG_SELECT: &str = "SELECT s.song_id, s.artist_id
    FROM songs s
    JOIN artists a ON s.artist_id = a.artist_id
    WHERE s.title = ? AND a.name = ? AND s.duration = ?
    ORDER BY s.song_id";
