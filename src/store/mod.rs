//! Analytical store module
//!
//! The pipeline talks to the store only through [`WarehouseStore`], a small
//! set of named write and lookup operations. [`DuckDbStore`] implements it
//! over a local DuckDB database and also owns schema provisioning.
//!
//! # Tables
//!
//! | Table       | Key          | Conflict policy          |
//! |-------------|--------------|--------------------------|
//! | `songs`     | `song_id`    | overwrite                |
//! | `artists`   | `artist_id`  | overwrite                |
//! | `time`      | `start_time` | ignore (derived values)  |
//! | `users`     | `user_id`    | overwrite                |
//! | `songplays` | `songplay_id`| append only              |

mod engine;
mod schema;
mod types;

pub use engine::DuckDbStore;
pub use schema::{Table, TABLES};
pub use types::{TableCounts, WarehouseStore};
